//! 批量内容处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：输出启动信息、按配置构建分析器表
//! 2. **批量加载**：扫描内容目录下的 TOML 文件（`Vec<ContentItem>`）
//! 3. **并发控制**：使用 Semaphore 限制同时分析的内容数量
//! 4. **结果输出**：每条内容的评分报告以 JSON 打印到标准输出
//! 5. **全局统计**：汇总所有内容的处理结果
//!
//! 单条内容的失败不会影响其他内容。

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::{ContentItem, ScoreReport};
use crate::services::AnalyzerRegistry;
use crate::utils::logging::{log_final_stats, log_startup};
use crate::workflow::{AnalysisCtx, AnalysisFlow};

/// 应用主结构
pub struct App {
    config: Config,
    registry: Arc<AnalyzerRegistry>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        config
            .analysis
            .validate()
            .context("默认分析配置无效")?;
        log_startup(&config);
        let registry = Arc::new(AnalyzerRegistry::from_config(&config));
        Ok(Self { config, registry })
    }

    /// 使用现成的分析器表（测试或嵌入时使用）
    pub fn with_registry(config: Config, registry: AnalyzerRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &AnalyzerRegistry {
        &self.registry
    }

    /// 运行批处理：加载、分析、打印、统计
    pub async fn run(&self) -> Result<ProcessingStats> {
        info!("\n📁 正在扫描内容目录: {}", self.config.content_folder);
        let items = crate::models::load_all_content_files(&self.config.content_folder).await?;

        if items.is_empty() {
            warn!("⚠️ 没有找到待分析的内容，程序结束");
            return Ok(ProcessingStats::default());
        }
        info!(
            "✓ 找到 {} 条内容，最大并发 {}",
            items.len(),
            self.config.max_concurrent_items
        );

        let (reports, stats) = self.process_all(items).await?;
        for report in &reports {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        log_final_stats(&stats);
        Ok(stats)
    }

    /// 并发分析全部内容，报告按输入顺序返回
    pub async fn process_all(
        &self,
        items: Vec<ContentItem>,
    ) -> Result<(Vec<ScoreReport>, ProcessingStats)> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_items.max(1)));
        let mut handles = Vec::with_capacity(items.len());

        for (idx, item) in items.into_iter().enumerate() {
            let item_index = idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let registry = Arc::clone(&self.registry);
            let analysis = self.config.analysis.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let ctx = AnalysisCtx::indexed(item_index, &item);
                AnalysisFlow::new(&registry)
                    .run_with_ctx(&item, &analysis, &ctx)
                    .await
            });
            handles.push((item_index, handle));
        }

        let mut stats = ProcessingStats {
            total: handles.len(),
            ..Default::default()
        };
        let mut reports = Vec::with_capacity(handles.len());

        for (item_index, handle) in handles {
            match handle.await {
                Ok(Ok(report)) => {
                    stats.record(&report);
                    reports.push(report);
                }
                Ok(Err(e)) => {
                    error!("[内容 #{}] ❌ 分析失败: {}", item_index, e);
                    stats.failed += 1;
                }
                Err(e) => {
                    error!("[内容 #{}] 任务执行失败: {}", item_index, e);
                    stats.failed += 1;
                }
            }
        }

        Ok((reports, stats))
    }
}

/// 批处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total: usize,
    /// 得到数值总分
    pub scored: usize,
    /// 全部维度缺失
    pub undetermined: usize,
    /// 至少一个维度使用了兜底
    pub with_fallback: usize,
    /// 内容无效或任务异常
    pub failed: usize,
}

impl ProcessingStats {
    fn record(&mut self, report: &ScoreReport) {
        if report.is_undetermined() {
            self.undetermined += 1;
        } else {
            self.scored += 1;
        }
        if !report.fallback_dimensions.is_empty() {
            self.with_fallback += 1;
        }
    }
}
