use crate::error::FileError;
use crate::models::content::ContentItem;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// TOML 内容文件
///
/// ```toml
/// [[items]]
/// id = "post-1"
/// language = "en"
/// text = "..."
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    #[serde(default)]
    pub items: Vec<ContentItem>,
}

/// 从 TOML 文件加载内容列表
///
/// 任意一条内容正文为空都会导致整个文件解析失败。
pub async fn load_content_file(toml_file_path: &Path) -> Result<Vec<ContentItem>> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let file: ContentFile = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(file.items)
}

/// 从文件夹中加载所有 TOML 文件中的内容
///
/// 无法解析的文件会被跳过并记录警告；文件按文件名排序以保证加载顺序稳定。
pub async fn load_all_content_files(folder_path: &str) -> Result<Vec<ContentItem>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }
        .into());
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut items = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_content_file(&path).await {
            Ok(file_items) => {
                tracing::info!("成功加载 {} 条内容", file_items.len());
                items.extend(file_items);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "content_scorer_{}_{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_all_skips_invalid_files() {
        let dir = temp_dir("loader");
        std::fs::write(
            dir.join("a.toml"),
            "[[items]]\nid = \"a-1\"\ntext = \"First post.\"\n\n[[items]]\ntext = \"Second post.\"\n",
        )
        .unwrap();
        std::fs::write(dir.join("b.toml"), "[[items]]\ntext = \"\"\n").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let items = load_all_content_files(dir.to_str().unwrap()).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id(), Some("a-1"));
        assert_eq!(items[1].text(), "Second post.");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        let result = load_all_content_files("/definitely/not/here").await;
        assert!(result.is_err());
    }
}
