//! 分析结果与结果包

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::content::AnalyzerKind;
use crate::models::payload::AnalyzerPayload;

/// 载荷含 NaN 或无穷时的失败原因
pub const NON_FINITE_PAYLOAD: &str = "analyzer returned a non-finite value";

/// 单个分析器的最终结果
///
/// 每个被分派的请求恰好产生一个 `AnalyzerResult`，即使分析任务崩溃或超时。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalyzerResult {
    /// 分析成功
    Success { payload: AnalyzerPayload },
    /// 远端不可用，使用了本地兜底
    Fallback {
        payload: AnalyzerPayload,
        reason: String,
    },
    /// 失败且没有兜底
    Failure { reason: String },
    /// 超出预算
    Timeout,
}

impl AnalyzerResult {
    /// 可用于打分的载荷（Success 或 Fallback）
    pub fn payload(&self) -> Option<&AnalyzerPayload> {
        match self {
            AnalyzerResult::Success { payload } | AnalyzerResult::Fallback { payload, .. } => {
                Some(payload)
            }
            AnalyzerResult::Failure { .. } | AnalyzerResult::Timeout => None,
        }
    }

    /// 简短的状态名，用于日志
    pub fn status(&self) -> &'static str {
        match self {
            AnalyzerResult::Success { .. } => "success",
            AnalyzerResult::Fallback { .. } => "fallback",
            AnalyzerResult::Failure { .. } => "failure",
            AnalyzerResult::Timeout => "timeout",
        }
    }
}

/// 单条内容的完整结果包
///
/// 交给聚合器之前，每个启用的分析器都有一项（完整不等于全部成功）。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    pub results: BTreeMap<AnalyzerKind, AnalyzerResult>,
}

impl ResultBundle {
    pub fn new(content_id: Option<String>) -> Self {
        Self {
            content_id,
            results: BTreeMap::new(),
        }
    }

    /// 写入一个分析器的结果
    pub fn with(mut self, kind: AnalyzerKind, result: AnalyzerResult) -> Self {
        self.results.insert(kind, result);
        self
    }

    pub fn get(&self, kind: AnalyzerKind) -> Option<&AnalyzerResult> {
        self.results.get(&kind)
    }

    /// 结果包是否覆盖了全部给定的分析器
    pub fn covers<'a>(&self, kinds: impl IntoIterator<Item = &'a AnalyzerKind>) -> bool {
        kinds.into_iter().all(|k| self.results.contains_key(k))
    }
}
