//! ASI:One 情感服务客户端
//!
//! 直接用 reqwest 调用 `{base}/chat/completions`，Bearer 鉴权。

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::clients::response::{parse_sentiment_response, user_message, SENTIMENT_SYSTEM_PROMPT};
use crate::config::Config;
use crate::error::AnalyzerError;
use crate::models::SentimentPayload;
use crate::services::SentimentProvider;

const PROVIDER: &str = "asi-one";

/// ASI:One 客户端
pub struct AsiOneClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model_name: String,
}

impl AsiOneClient {
    /// 创建新的 ASI:One 客户端，单次请求超时取自配置
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_else(|e| {
                warn!("HTTP 客户端构建失败，使用默认设置: {}", e);
                reqwest::Client::new()
            });

        Self {
            http,
            api_key: config.asi_api_key.clone(),
            endpoint: format!(
                "{}/chat/completions",
                config.asi_api_base_url.trim_end_matches('/')
            ),
            model_name: config.asi_model_name.clone(),
        }
    }

    fn request_body(&self, text: &str) -> Value {
        json!({
            "model": self.model_name,
            "messages": [
                { "role": "system", "content": SENTIMENT_SYSTEM_PROMPT },
                { "role": "user", "content": user_message(text) }
            ],
            "max_tokens": 300,
            "temperature": 0.05
        })
    }

    async fn chat(&self, text: &str) -> Result<String, AnalyzerError> {
        if self.api_key.is_empty() {
            return Err(AnalyzerError::NotConfigured {
                provider: PROVIDER.to_string(),
            });
        }

        debug!("调用 ASI:One，模型: {}", self.model_name);
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(text))
            .send()
            .await
            .map_err(|e| {
                warn!("ASI:One 请求失败: {}", e);
                AnalyzerError::request_failed(PROVIDER, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::BadStatus {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| AnalyzerError::malformed(PROVIDER, e.to_string()))?;

        json["choices"]
            .as_array()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice["message"]["content"].as_str())
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AnalyzerError::EmptyResponse {
                provider: PROVIDER.to_string(),
            })
    }
}

#[async_trait]
impl SentimentProvider for AsiOneClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn analyze_sentiment(&self, text: &str) -> Result<SentimentPayload, AnalyzerError> {
        let raw = self.chat(text).await?;
        parse_sentiment_response(PROVIDER, &raw)
    }
}
