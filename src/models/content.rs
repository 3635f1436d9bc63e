//! 待分析内容与分派请求

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ContentError;

/// 分析器种类
///
/// 声明顺序即维度的固定顺序：报告明细、建议列表都按 Bias → Readability → Sentiment 排列。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    /// 偏见检测
    Bias,
    /// 可读性
    Readability,
    /// 情感与主题
    Sentiment,
}

impl AnalyzerKind {
    /// 全部维度（固定顺序）
    pub const ALL: [AnalyzerKind; 3] = [
        AnalyzerKind::Bias,
        AnalyzerKind::Readability,
        AnalyzerKind::Sentiment,
    ];

    /// 维度名称
    pub fn as_str(self) -> &'static str {
        match self {
            AnalyzerKind::Bias => "bias",
            AnalyzerKind::Readability => "readability",
            AnalyzerKind::Sentiment => "sentiment",
        }
    }

    /// 从名称解析（忽略大小写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bias" => Some(AnalyzerKind::Bias),
            "readability" => Some(AnalyzerKind::Readability),
            "sentiment" => Some(AnalyzerKind::Sentiment),
            _ => None,
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 待分析的内容
///
/// 只能通过 [`ContentItem::new`] 构造（反序列化也走同一校验），
/// 因此拿到的 `ContentItem` 正文一定非空。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContentItem")]
pub struct ContentItem {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

#[derive(Deserialize)]
struct RawContentItem {
    text: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

impl TryFrom<RawContentItem> for ContentItem {
    type Error = ContentError;

    fn try_from(raw: RawContentItem) -> Result<Self, Self::Error> {
        ContentItem::new(raw.text, raw.id, raw.language)
    }
}

impl ContentItem {
    /// 创建内容，正文为空或只有空白时返回 [`ContentError::EmptyText`]
    pub fn new(
        text: impl Into<String>,
        id: Option<String>,
        language: Option<String>,
    ) -> Result<Self, ContentError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ContentError::EmptyText);
        }
        if matches!(&id, Some(id) if id.trim().is_empty()) {
            return Err(ContentError::EmptyId);
        }
        Ok(Self {
            text,
            id,
            language: language.filter(|l| !l.trim().is_empty()),
        })
    }

    /// 只有正文的内容
    pub fn from_text(text: impl Into<String>) -> Result<Self, ContentError> {
        Self::new(text, None, None)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// 日志标签，没有 ID 时显示 "-"
    pub fn label(&self) -> &str {
        self.id().unwrap_or("-")
    }
}

/// 偏见检测的子检查开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasChecks {
    /// 脏话检测
    pub profanity: bool,
    /// 操纵性措辞检测
    pub manipulation: bool,
    /// 极端/对立词汇检测
    pub loaded_language: bool,
}

impl Default for BiasChecks {
    fn default() -> Self {
        Self {
            profanity: true,
            manipulation: true,
            loaded_language: true,
        }
    }
}

/// 单次分派请求
///
/// 由编排层为每个分析器创建，移交给分析任务后随任务结束而销毁。
#[derive(Debug, Clone)]
pub struct AnalyzerRequest {
    pub kind: AnalyzerKind,
    pub text: Arc<str>,
    pub language: Option<String>,
    pub budget: Duration,
    pub bias_checks: BiasChecks,
}
