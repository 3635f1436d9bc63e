//! OpenAI 兼容接口的情感服务客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型（OpenAI、Ollama 等兼容服务）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::clients::response::{parse_sentiment_response, user_message, SENTIMENT_SYSTEM_PROMPT};
use crate::config::Config;
use crate::error::AnalyzerError;
use crate::models::SentimentPayload;
use crate::services::SentimentProvider;

const PROVIDER: &str = "llm";

/// LLM 情感客户端
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    request_timeout: Duration,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            request_timeout: config.request_timeout(),
        }
    }

    /// 发送一次对话请求，返回模型输出的原始文本
    async fn chat(&self, text: &str) -> Result<String, AnalyzerError> {
        debug!("调用 LLM API，模型: {}，正文 {} 字符", self.model_name, text.len());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SENTIMENT_SYSTEM_PROMPT)
            .build()
            .map_err(|e| AnalyzerError::request_failed(PROVIDER, e))?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message(text))
            .build()
            .map_err(|e| AnalyzerError::request_failed(PROVIDER, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(0.05)
            .max_tokens(300u32)
            .build()
            .map_err(|e| AnalyzerError::request_failed(PROVIDER, e))?;

        let response = tokio::time::timeout(self.request_timeout, self.client.chat().create(request))
            .await
            .map_err(|elapsed| {
                warn!("LLM API 请求超时 ({:?})", self.request_timeout);
                AnalyzerError::request_failed(PROVIDER, elapsed)
            })?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                AnalyzerError::request_failed(PROVIDER, e)
            })?;

        debug!("LLM API 调用成功");

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AnalyzerError::EmptyResponse {
                provider: PROVIDER.to_string(),
            })
    }
}

#[async_trait]
impl SentimentProvider for LlmClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn analyze_sentiment(&self, text: &str) -> Result<SentimentPayload, AnalyzerError> {
        let raw = self.chat(text).await?;
        parse_sentiment_response(PROVIDER, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_takes_settings_from_config() {
        let config = Config {
            llm_model_name: "qwen2.5".to_string(),
            request_timeout_ms: 1234,
            ..Config::default()
        };
        let client = LlmClient::new(&config);
        assert_eq!(client.name(), "llm");
        assert_eq!(client.model_name, "qwen2.5");
        assert_eq!(client.request_timeout, Duration::from_millis(1234));
    }

    #[tokio::test]
    #[ignore] // 需要本地运行 Ollama
    async fn test_live_llm_sentiment() {
        let client = LlmClient::new(&Config::default());
        let payload = client
            .analyze_sentiment("I love sunny mornings at the beach")
            .await
            .unwrap();
        assert!(payload.polarity > 0.0);
    }
}
