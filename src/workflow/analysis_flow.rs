//! 内容分析流程 - 流程层
//!
//! 核心职责：定义"一条内容"的完整分析流程
//!
//! 流程顺序：
//! 1. 校验配置（权重、超时）
//! 2. 调度分析器，得到结果包
//! 3. 聚合打分，得到评分报告

use tracing::{debug, info, warn};

use crate::config::AnalyzeConfig;
use crate::error::AppResult;
use crate::models::{ContentItem, OverallScore, ScoreReport};
use crate::orchestrator::Orchestrator;
use crate::scoring;
use crate::services::AnalyzerRegistry;
use crate::utils::logging::truncate_text;
use crate::workflow::analysis_ctx::AnalysisCtx;

/// 内容分析流程
///
/// - 不持有任何资源，只借用分析器表
/// - 配置按调用传入
pub struct AnalysisFlow<'a> {
    registry: &'a AnalyzerRegistry,
}

impl<'a> AnalysisFlow<'a> {
    pub fn new(registry: &'a AnalyzerRegistry) -> Self {
        Self { registry }
    }

    /// 分析一条内容
    pub async fn run(&self, content: &ContentItem, config: &AnalyzeConfig) -> AppResult<ScoreReport> {
        self.run_with_ctx(content, config, &AnalysisCtx::for_item(content))
            .await
    }

    /// 从原始文本分析，正文为空时在调度之前返回 `InvalidContent`
    pub async fn analyze_text(
        &self,
        text: &str,
        id: Option<String>,
        language: Option<String>,
        config: &AnalyzeConfig,
    ) -> AppResult<ScoreReport> {
        let content = ContentItem::new(text, id, language)?;
        self.run(&content, config).await
    }

    pub async fn run_with_ctx(
        &self,
        content: &ContentItem,
        config: &AnalyzeConfig,
        ctx: &AnalysisCtx,
    ) -> AppResult<ScoreReport> {
        config.validate()?;

        debug!("{} 正文: {}", ctx, truncate_text(content.text(), 60));

        let bundle = Orchestrator::new(self.registry)
            .analyze(content, config)
            .await;
        let report = scoring::score(&bundle, &config.weights);

        match report.overall {
            OverallScore::Determined(value) => info!(
                "{} ✅ 总分 {:.3}，建议 {} 条",
                ctx,
                value,
                report.recommendations.len()
            ),
            OverallScore::Undetermined => warn!("{} ⚠️ 所有维度均不可用，无法评分", ctx),
        }
        if !report.fallback_dimensions.is_empty() {
            info!("{} 使用兜底的维度: {:?}", ctx, report.fallback_dimensions);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::scoring::Weights;

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let registry = AnalyzerRegistry::new();
        let err = AnalysisFlow::new(&registry)
            .analyze_text("   ", None, None, &AnalyzeConfig::default())
            .await
            .unwrap_err();
        assert!(err.is_invalid_content());
    }

    #[tokio::test]
    async fn test_invalid_weights_are_rejected() {
        let registry = AnalyzerRegistry::new();
        let config = AnalyzeConfig {
            weights: Weights {
                bias: 0.9,
                readability: 0.9,
                sentiment: 0.9,
            },
            ..AnalyzeConfig::default()
        };
        let err = AnalysisFlow::new(&registry)
            .analyze_text("Some text.", None, None, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
