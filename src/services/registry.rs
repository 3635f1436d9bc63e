//! 分析器表
//!
//! 启动时构建一次，以引用方式传给编排层；没有全局注册表。

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::clients::{AsiOneClient, LlmClient};
use crate::config::{Config, SentimentProviderKind};
use crate::models::AnalyzerKind;
use crate::services::{
    Analyzer, ReadabilityAnalyzer, RemoteSentimentAnalyzer, RuleBiasAnalyzer, SentimentProvider,
};

/// 分析器表：分析器种类 → 分析器实现
#[derive(Clone, Default)]
pub struct AnalyzerRegistry {
    entries: BTreeMap<AnalyzerKind, Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    /// 空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册分析器，同种类的旧实现会被替换
    pub fn register(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.entries.insert(analyzer.kind(), analyzer);
        self
    }

    /// 按配置构建默认分析器表
    pub fn from_config(config: &Config) -> Self {
        let provider: Option<Arc<dyn SentimentProvider>> = match config.sentiment_provider {
            SentimentProviderKind::Llm => Some(Arc::new(LlmClient::new(config))),
            SentimentProviderKind::Asi => Some(Arc::new(AsiOneClient::new(config))),
            SentimentProviderKind::None => None,
        };

        let sentiment = match provider {
            Some(provider) => {
                info!(
                    "情感服务: {} (最大并发 {})",
                    provider.name(),
                    config.remote_max_in_flight
                );
                RemoteSentimentAnalyzer::new(provider, config.remote_max_in_flight)
            }
            None => {
                info!("未配置远端情感服务，情感维度将使用本地兜底");
                RemoteSentimentAnalyzer::unconfigured()
            }
        };

        Self::new()
            .register(Arc::new(RuleBiasAnalyzer))
            .register(Arc::new(ReadabilityAnalyzer))
            .register(Arc::new(sentiment))
    }

    pub fn get(&self, kind: AnalyzerKind) -> Option<Arc<dyn Analyzer>> {
        self.entries.get(&kind).cloned()
    }

    pub fn kinds(&self) -> impl Iterator<Item = AnalyzerKind> + '_ {
        self.entries.keys().copied()
    }
}
