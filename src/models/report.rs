//! 评分报告

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::content::AnalyzerKind;

/// 总分
///
/// 所有维度都缺失时为 `Undetermined`，绝不用 0 冒充"低分"。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum OverallScore {
    Determined(f64),
    Undetermined,
}

impl OverallScore {
    pub fn value(self) -> Option<f64> {
        match self {
            OverallScore::Determined(v) => Some(v),
            OverallScore::Undetermined => None,
        }
    }

    pub fn is_determined(self) -> bool {
        matches!(self, OverallScore::Determined(_))
    }
}

/// 报告中记录的问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ReportIssue {
    /// 分析器超时，维度被排除
    AnalyzerTimeout { dimension: AnalyzerKind },
    /// 分析器失败且没有兜底，维度被排除
    AnalyzerFailure {
        dimension: AnalyzerKind,
        reason: String,
    },
    /// 使用了本地兜底数据
    AnalyzerFallbackUsed {
        dimension: AnalyzerKind,
        reason: String,
    },
    /// 没有任何可用维度
    AggregationUndetermined,
}

/// 不参与加权的附加信号
///
/// 维度集合是封闭的，篇幅和真实度只作为参考写入报告并驱动建议。
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentSignals {
    /// 篇幅分数，[0,1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_score: Option<f64>,
    /// 真实度，1 - 机器生成程度
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticity: Option<f64>,
    /// 远端给出的理由
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// 评分报告
///
/// 每条内容由聚合器创建一次，之后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    pub overall: OverallScore,
    /// 各可用维度的子分数，[0,1]
    pub breakdown: BTreeMap<AnalyzerKind, f64>,
    /// 重新归一化后实际使用的权重
    pub weights: BTreeMap<AnalyzerKind, f64>,
    pub recommendations: Vec<String>,
    pub fallback_dimensions: BTreeSet<AnalyzerKind>,
    /// 超时、失败或未启用的维度
    pub missing_dimensions: BTreeSet<AnalyzerKind>,
    pub issues: Vec<ReportIssue>,
    pub signals: ContentSignals,
}

impl ScoreReport {
    /// 是否无法评分
    pub fn is_undetermined(&self) -> bool {
        !self.overall.is_determined()
    }

    /// 某维度是否使用了兜底数据
    pub fn used_fallback(&self, kind: AnalyzerKind) -> bool {
        self.fallback_dimensions.contains(&kind)
    }

    pub fn is_missing(&self, kind: AnalyzerKind) -> bool {
        self.missing_dimensions.contains(&kind)
    }
}
