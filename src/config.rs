use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::{AnalyzerKind, BiasChecks};
use crate::scoring::Weights;
use crate::services::Locality;

/// 远端情感服务选择
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentProviderKind {
    /// OpenAI 兼容接口（OpenAI、Ollama 等）
    Llm,
    /// ASI:One 接口
    Asi,
    /// 不调用远端，情感维度总是走本地兜底
    None,
}

impl FromStr for SentimentProviderKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "llm" | "openai" | "ollama" => Ok(Self::Llm),
            "asi" | "asi-one" => Ok(Self::Asi),
            "none" | "off" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

/// 超时后的处理策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// 超时即终态，该维度被排除
    #[default]
    Exclude,
    /// 有兜底的分析器超时后改用兜底结果
    Fallback,
}

impl FromStr for TimeoutPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclude" => Ok(Self::Exclude),
            "fallback" => Ok(Self::Fallback),
            _ => Err(()),
        }
    }
}

/// 各分析器的超时预算（毫秒）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// 本地分析器默认预算
    pub local_ms: u64,
    /// 远端分析器默认预算
    pub remote_ms: u64,
    pub bias_ms: Option<u64>,
    pub readability_ms: Option<u64>,
    pub sentiment_ms: Option<u64>,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            local_ms: 500,
            remote_ms: 5_000,
            bias_ms: None,
            readability_ms: None,
            sentiment_ms: None,
        }
    }
}

impl Timeouts {
    /// 某个分析器的预算：单独配置优先，否则按运行位置取默认值
    pub fn budget_for(&self, kind: AnalyzerKind, locality: Locality) -> Duration {
        let specific = match kind {
            AnalyzerKind::Bias => self.bias_ms,
            AnalyzerKind::Readability => self.readability_ms,
            AnalyzerKind::Sentiment => self.sentiment_ms,
        };
        let ms = specific.unwrap_or(match locality {
            Locality::Local => self.local_ms,
            Locality::Remote => self.remote_ms,
        });
        Duration::from_millis(ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("local_ms", Some(self.local_ms)),
            ("remote_ms", Some(self.remote_ms)),
            ("bias_ms", self.bias_ms),
            ("readability_ms", self.readability_ms),
            ("sentiment_ms", self.sentiment_ms),
        ];
        for (name, value) in named {
            if value == Some(0) {
                return Err(ConfigError::InvalidTimeout {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// 单次分析的配置
///
/// 每次调用显式传入，不存在会在请求之间悄悄变化的隐式默认值。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzeConfig {
    pub weights: Weights,
    pub timeouts: Timeouts,
    pub enabled_analyzers: BTreeSet<AnalyzerKind>,
    pub timeout_policy: TimeoutPolicy,
    pub bias_checks: BiasChecks,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            timeouts: Timeouts::default(),
            enabled_analyzers: AnalyzerKind::ALL.into_iter().collect(),
            timeout_policy: TimeoutPolicy::Exclude,
            bias_checks: BiasChecks::default(),
        }
    }
}

impl AnalyzeConfig {
    /// 校验权重和超时
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.timeouts.validate()
    }

    /// 只启用部分分析器
    pub fn with_enabled(mut self, kinds: impl IntoIterator<Item = AnalyzerKind>) -> Self {
        self.enabled_analyzers = kinds.into_iter().collect();
        self
    }
}

/// 程序配置
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时分析的内容数量
    pub max_concurrent_items: usize,
    /// TOML 内容文件存放目录
    pub content_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 远端情感服务 ---
    pub sentiment_provider: SentimentProviderKind,
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub asi_api_key: String,
    pub asi_api_base_url: String,
    pub asi_model_name: String,
    /// 客户端单次请求超时，应小于远端分析器的预算，这样网络超时会走兜底
    pub request_timeout_ms: u64,
    /// 同时在途的远端请求上限
    pub remote_max_in_flight: usize,
    // --- 分析默认值 ---
    pub analysis: AnalyzeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_items: 16,
            content_folder: "content".to_string(),
            verbose_logging: false,
            sentiment_provider: SentimentProviderKind::Llm,
            llm_api_key: "ollama".to_string(),
            llm_api_base_url: "http://localhost:11434/v1".to_string(),
            llm_model_name: "llama3.2".to_string(),
            asi_api_key: String::new(),
            asi_api_base_url: "https://api.asi1.ai/v1".to_string(),
            asi_model_name: "asi1-mini".to_string(),
            request_timeout_ms: 4_000,
            remote_max_in_flight: 8,
            analysis: AnalyzeConfig::default(),
        }
    }
}

impl Config {
    /// 默认配置 + 环境变量覆盖
    pub fn from_env() -> AppResult<Self> {
        Ok(Self::default().apply_overrides(|key| std::env::var(key).ok())?)
    }

    /// 读取可选的 TOML 配置文件，再应用环境变量覆盖
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        let config = base.apply_overrides(|key| std::env::var(key).ok())?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取配置，缺省字段取默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(display.clone(), e))?;
        toml::from_str(&content).map_err(|source| {
            AppError::File(FileError::TomlParseFailed {
                path: display,
                source,
            })
        })
    }

    /// 应用覆盖项，`lookup` 按变量名返回值
    pub fn apply_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = parse_var(&lookup, "MAX_CONCURRENT_ITEMS", "usize")? {
            self.max_concurrent_items = v;
        }
        if let Some(v) = lookup("CONTENT_FOLDER") {
            self.content_folder = v;
        }
        if let Some(v) = parse_var(&lookup, "VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        if let Some(v) = parse_var(&lookup, "SENTIMENT_PROVIDER", "llm|asi|none")? {
            self.sentiment_provider = v;
        }
        if let Some(v) = lookup("LLM_API_KEY") {
            self.llm_api_key = v;
        }
        if let Some(v) = lookup("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = lookup("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = lookup("ASI_API_KEY") {
            self.asi_api_key = v;
        }
        if let Some(v) = lookup("ASI_API_BASE_URL") {
            self.asi_api_base_url = v;
        }
        if let Some(v) = lookup("ASI_MODEL_NAME") {
            self.asi_model_name = v;
        }
        if let Some(v) = parse_var(&lookup, "REQUEST_TIMEOUT_MS", "u64")? {
            self.request_timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "REMOTE_MAX_IN_FLIGHT", "usize")? {
            self.remote_max_in_flight = v;
        }
        if let Some(v) = parse_var(&lookup, "LOCAL_TIMEOUT_MS", "u64")? {
            self.analysis.timeouts.local_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "REMOTE_TIMEOUT_MS", "u64")? {
            self.analysis.timeouts.remote_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "TIMEOUT_POLICY", "exclude|fallback")? {
            self.analysis.timeout_policy = v;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
