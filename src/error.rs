use thiserror::Error;

/// 应用程序错误类型
///
/// 只有这里的错误会让一次分析整体失败；单个分析器的失败被编排层吸收，
/// 体现在 `ScoreReport` 的 issues 里。
#[derive(Debug, Error)]
pub enum AppError {
    /// 内容无效（在分派任何分析器之前拒绝）
    #[error("内容无效: {0}")]
    InvalidContent(#[from] ContentError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
}

/// 内容校验错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// 正文为空或只有空白字符
    #[error("正文不能为空")]
    EmptyText,
    /// 内容标识为空字符串
    #[error("内容ID不能为空字符串")]
    EmptyId,
}

/// 配置错误
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// 权重为负数或不是有限值
    #[error("维度 {dimension} 的权重 {value} 无效")]
    InvalidWeight { dimension: String, value: f64 },
    /// 权重之和不为 1
    #[error("权重之和必须为 1，实际为 {sum}")]
    WeightsDoNotSumToOne { sum: f64 },
    /// 超时预算为 0
    #[error("{name} 的超时时间必须大于 0")]
    InvalidTimeout { name: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 分析器错误
///
/// 由分析器实现返回，编排层据此决定记录 `Failure` 还是走本地兜底。
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// 网络请求失败（包括客户端自身的请求超时）
    #[error("{provider} 请求失败: {source}")]
    RequestFailed {
        provider: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 远端返回非 2xx 状态码
    #[error("{provider} 返回错误状态 {status}: {body}")]
    BadStatus {
        provider: String,
        status: u16,
        body: String,
    },
    /// 远端返回结果为空
    #[error("{provider} 返回内容为空")]
    EmptyResponse { provider: String },
    /// 远端返回内容无法解析
    #[error("{provider} 返回内容无法解析: {detail}")]
    MalformedResponse { provider: String, detail: String },
    /// 规则评估失败
    #[error("规则评估失败: {reason}")]
    Evaluation { reason: String },
    /// 并发限流器已关闭
    #[error("{provider} 并发限流器已关闭")]
    LimiterClosed { provider: String },
    /// 没有配置远端服务
    #[error("{provider} 未配置")]
    NotConfigured { provider: String },
}

// ========== 便捷构造函数 ==========

impl AnalyzerError {
    /// 创建请求失败错误
    pub fn request_failed(
        provider: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AnalyzerError::RequestFailed {
            provider: provider.into(),
            source: Box::new(source),
        }
    }

    /// 创建响应解析失败错误
    pub fn malformed(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        AnalyzerError::MalformedResponse {
            provider: provider.into(),
            detail: detail.into(),
        }
    }
}

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否为内容校验错误
    pub fn is_invalid_content(&self) -> bool {
        matches!(self, AppError::InvalidContent(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_content_converts_into_app_error() {
        let err: AppError = ContentError::EmptyText.into();
        assert!(err.is_invalid_content());
        assert_eq!(err.to_string(), "内容无效: 正文不能为空");
    }

    #[test]
    fn test_analyzer_error_display_names_provider() {
        let err = AnalyzerError::BadStatus {
            provider: "asi-one".to_string(),
            status: 429,
            body: "quota".to_string(),
        };
        assert!(err.to_string().contains("asi-one"));
        assert!(err.to_string().contains("429"));
    }
}
