//! 各分析器的输出载荷

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::content::AnalyzerKind;

/// 偏见倾向标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BiasDirection {
    Neutral,
    SlightlyBiased,
    ModeratelyBiased,
    HighlyBiased,
}

impl BiasDirection {
    /// 由偏见分数推导倾向标签
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            BiasDirection::HighlyBiased
        } else if score > 0.5 {
            BiasDirection::ModeratelyBiased
        } else if score > 0.3 {
            BiasDirection::SlightlyBiased
        } else {
            BiasDirection::Neutral
        }
    }
}

/// 偏见检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasPayload {
    /// 偏见分数，[0,1]
    pub bias_score: f64,
    pub manipulation_flags: BTreeSet<String>,
    pub profanity_flags: BTreeSet<String>,
    /// 命中的极端/对立词汇
    #[serde(default)]
    pub matched_terms: BTreeSet<String>,
    pub direction: BiasDirection,
}

impl BiasPayload {
    /// 只有分数和标记的载荷，倾向标签由分数推导
    pub fn new(
        bias_score: f64,
        manipulation_flags: impl IntoIterator<Item = String>,
        profanity_flags: impl IntoIterator<Item = String>,
    ) -> Self {
        let bias_score = bias_score.clamp(0.0, 1.0);
        Self {
            bias_score,
            manipulation_flags: manipulation_flags.into_iter().collect(),
            profanity_flags: profanity_flags.into_iter().collect(),
            matched_terms: BTreeSet::new(),
            direction: BiasDirection::from_score(bias_score),
        }
    }
}

/// 可读性结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityPayload {
    /// 用于打分的年级水平
    pub grade_level: f64,
    /// `grade_level` 所采用的指数名称
    pub index_name: String,
    pub flesch_kincaid: f64,
    pub gunning_fog: f64,
    pub smog: f64,
    pub coleman_liau: f64,
    pub word_count: usize,
    pub sentence_count: usize,
    /// 篇幅分数，[0,1]；只给年级水平时为空
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_score: Option<f64>,
}

impl ReadabilityPayload {
    /// 只有年级水平的载荷（测试和外部分析器使用）
    pub fn with_grade(grade_level: f64, index_name: impl Into<String>) -> Self {
        Self {
            grade_level,
            index_name: index_name.into(),
            flesch_kincaid: grade_level,
            gunning_fog: grade_level,
            smog: grade_level,
            coleman_liau: grade_level,
            word_count: 0,
            sentence_count: 0,
            length_score: None,
        }
    }
}

/// 情感与主题结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPayload {
    /// 情感极性，[-1,1]
    pub polarity: f64,
    /// 主题标签，主主题在前
    pub topics: Vec<String>,
    /// 与已有内容的相似度，[0,1]
    pub similarity: f64,
    /// 像机器生成的程度，[0,1]；本地兜底不给出
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_detection: Option<f64>,
    /// 远端给出的简短理由
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl SentimentPayload {
    pub fn new(polarity: f64, topics: Vec<String>, similarity: f64) -> Self {
        Self {
            polarity: polarity.clamp(-1.0, 1.0),
            topics,
            similarity: similarity.clamp(0.0, 1.0),
            ai_detection: None,
            reasoning: None,
        }
    }

    pub fn with_ai_detection(mut self, ai_detection: f64) -> Self {
        self.ai_detection = Some(ai_detection.clamp(0.0, 1.0));
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        let reasoning = reasoning.into();
        let trimmed = reasoning.trim();
        self.reasoning = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// 真实度 = 1 - 机器生成程度
    pub fn authenticity(&self) -> Option<f64> {
        self.ai_detection.map(|ai| 1.0 - ai)
    }
}

/// 分析器载荷（每个分析器一种）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnalyzerPayload {
    Bias(BiasPayload),
    Readability(ReadabilityPayload),
    Sentiment(SentimentPayload),
}

impl AnalyzerPayload {
    /// 载荷对应的分析器种类
    pub fn kind(&self) -> AnalyzerKind {
        match self {
            AnalyzerPayload::Bias(_) => AnalyzerKind::Bias,
            AnalyzerPayload::Readability(_) => AnalyzerKind::Readability,
            AnalyzerPayload::Sentiment(_) => AnalyzerKind::Sentiment,
        }
    }

    /// 所有数值字段都是有限数
    ///
    /// NaN 经过 clamp 仍是 NaN，打分前必须挡住。
    pub fn is_finite(&self) -> bool {
        match self {
            AnalyzerPayload::Bias(p) => p.bias_score.is_finite(),
            AnalyzerPayload::Readability(p) => {
                p.grade_level.is_finite() && p.length_score.map_or(true, f64::is_finite)
            }
            AnalyzerPayload::Sentiment(p) => {
                p.polarity.is_finite()
                    && p.similarity.is_finite()
                    && p.ai_detection.map_or(true, f64::is_finite)
            }
        }
    }
}

impl From<BiasPayload> for AnalyzerPayload {
    fn from(p: BiasPayload) -> Self {
        AnalyzerPayload::Bias(p)
    }
}

impl From<ReadabilityPayload> for AnalyzerPayload {
    fn from(p: ReadabilityPayload) -> Self {
        AnalyzerPayload::Readability(p)
    }
}

impl From<SentimentPayload> for AnalyzerPayload {
    fn from(p: SentimentPayload) -> Self {
        AnalyzerPayload::Sentiment(p)
    }
}
