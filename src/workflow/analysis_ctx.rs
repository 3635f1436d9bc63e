//! 分析上下文
//!
//! 封装"我正在分析第几条、哪条内容"这一信息，只用于日志。

use std::fmt::Display;

use crate::models::ContentItem;

#[derive(Debug, Clone, Default)]
pub struct AnalysisCtx {
    /// 批处理中的序号（从 1 开始）
    pub item_index: Option<usize>,
    pub content_id: Option<String>,
}

impl AnalysisCtx {
    pub fn for_item(item: &ContentItem) -> Self {
        Self {
            item_index: None,
            content_id: item.id().map(str::to_string),
        }
    }

    pub fn indexed(item_index: usize, item: &ContentItem) -> Self {
        Self {
            item_index: Some(item_index),
            ..Self::for_item(item)
        }
    }
}

impl Display for AnalysisCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = self.content_id.as_deref().unwrap_or("-");
        match self.item_index {
            Some(index) => write!(f, "[内容 #{} {}]", index, id),
            None => write!(f, "[内容 {}]", id),
        }
    }
}
