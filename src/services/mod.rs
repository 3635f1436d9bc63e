//! 业务能力层（Services）
//!
//! 每个分析器只描述"我能对一段文字做什么"，不关心编排、超时和打分。
//! 编排层通过 [`Analyzer`] trait 调用它们。

pub mod bias;
pub mod lexicon;
pub mod readability;
pub mod registry;
pub mod sentiment;

use async_trait::async_trait;

use crate::error::AnalyzerError;
use crate::models::{AnalyzerKind, AnalyzerPayload, AnalyzerRequest};

pub use bias::{evaluate_bias, RuleBiasAnalyzer};
pub use readability::{compute_readability, ReadabilityAnalyzer};
pub use registry::AnalyzerRegistry;
pub use sentiment::{fallback_sentiment, RemoteSentimentAnalyzer, SentimentProvider};

/// 分析器运行位置，决定默认超时预算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    /// 本地计算
    Local,
    /// 需要网络调用
    Remote,
}

/// 分析器
///
/// 实现必须可以在多个分析之间并发共享（`Send + Sync`，不持有跨调用的可变状态）。
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// 分析器种类
    fn kind(&self) -> AnalyzerKind;

    /// 运行位置
    fn locality(&self) -> Locality {
        Locality::Local
    }

    /// 执行分析
    async fn analyze(&self, request: AnalyzerRequest) -> Result<AnalyzerPayload, AnalyzerError>;

    /// 本地兜底，必须是纯函数
    ///
    /// 返回 `None` 表示该分析器没有兜底，失败即失败。
    fn fallback(&self, _text: &str) -> Option<AnalyzerPayload> {
        None
    }
}
