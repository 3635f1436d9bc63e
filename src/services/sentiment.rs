//! 情感与主题分析器
//!
//! 远端服务负责情感极性、主题和相似度；远端不可用时由编排层调用
//! [`fallback_sentiment`] 做本地词典兜底。

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::AnalyzerError;
use crate::models::{AnalyzerKind, AnalyzerPayload, AnalyzerRequest, SentimentPayload};
use crate::services::lexicon::{tokenize, NEGATORS, SENTIMENT_LEXICON, STOPWORDS};
use crate::services::{Analyzer, Locality};

/// 兜底结果的相似度（本地无法判断，取中性偏低的固定值）
pub const FALLBACK_SIMILARITY: f64 = 0.3;

/// 兜底时没有可用主题词的默认主题
pub const DEFAULT_TOPIC: &str = "general";

/// 极性归一化常数，`sum / sqrt(sum² + α)`
const NORMALIZATION_ALPHA: f64 = 15.0;

/// 否定词后的情感词按此系数反转
const NEGATION_FACTOR: f64 = -0.75;

const MAX_TOPICS: usize = 3;

/// 远端情感服务
///
/// 实现会在多个分析之间共享，不能持有按调用变化的可变状态。
#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// 服务名称，用于日志和错误信息
    fn name(&self) -> &str;

    /// 调用远端服务
    async fn analyze_sentiment(&self, text: &str) -> Result<SentimentPayload, AnalyzerError>;
}

/// 本地词典兜底
///
/// 纯函数：同一段文字永远得到同一个结果。
pub fn fallback_sentiment(text: &str) -> SentimentPayload {
    let tokens = tokenize(text);

    let mut sum = 0.0;
    for (i, token) in tokens.iter().enumerate() {
        let Some(&weight) = SENTIMENT_LEXICON.get(token.as_str()) else {
            continue;
        };
        let negated = i > 0 && NEGATORS.contains(tokens[i - 1].as_str());
        sum += if negated { weight * NEGATION_FACTOR } else { weight };
    }
    let polarity = if sum == 0.0 {
        0.0
    } else {
        sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()
    };

    SentimentPayload::new(polarity, extract_topics(&tokens), FALLBACK_SIMILARITY)
}

/// 按词频取主题词，频率相同时先出现的优先
fn extract_topics(tokens: &[String]) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, token) in tokens.iter().enumerate() {
        let token = token.as_str();
        if token.chars().count() < 3
            || STOPWORDS.contains(token)
            || NEGATORS.contains(token)
            || SENTIMENT_LEXICON.contains_key(token)
            || token.chars().all(|c| !c.is_alphabetic())
        {
            continue;
        }
        counts.entry(token).or_insert((0, position)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, first))| (token, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let topics: Vec<String> = ranked
        .into_iter()
        .take(MAX_TOPICS)
        .map(|(token, _, _)| token.to_string())
        .collect();

    if topics.is_empty() {
        vec![DEFAULT_TOPIC.to_string()]
    } else {
        topics
    }
}

/// 远端情感分析器
///
/// 共享一个信号量限制同时在途的远端请求数；等待许可的时间计入该分析器的超时预算。
pub struct RemoteSentimentAnalyzer {
    provider: Option<Arc<dyn SentimentProvider>>,
    limiter: Arc<Semaphore>,
}

impl RemoteSentimentAnalyzer {
    /// 创建远端情感分析器
    ///
    /// # 参数
    /// - `provider`: 远端服务
    /// - `max_in_flight`: 同时在途的请求上限（至少为 1）
    pub fn new(provider: Arc<dyn SentimentProvider>, max_in_flight: usize) -> Self {
        Self {
            provider: Some(provider),
            limiter: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// 没有配置远端服务，每次调用都会失败并走兜底
    pub fn unconfigured() -> Self {
        Self {
            provider: None,
            limiter: Arc::new(Semaphore::new(1)),
        }
    }

    /// 关闭限流器，之后的调用立即失败
    pub fn close(&self) {
        self.limiter.close();
    }
}

#[async_trait]
impl Analyzer for RemoteSentimentAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Sentiment
    }

    fn locality(&self) -> Locality {
        Locality::Remote
    }

    async fn analyze(&self, request: AnalyzerRequest) -> Result<AnalyzerPayload, AnalyzerError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| AnalyzerError::NotConfigured {
                provider: "sentiment".to_string(),
            })?;

        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| AnalyzerError::LimiterClosed {
                provider: provider.name().to_string(),
            })?;

        debug!("调用远端情感服务: {}", provider.name());
        let payload = provider.analyze_sentiment(&request.text).await?;
        Ok(payload.into())
    }

    fn fallback(&self, text: &str) -> Option<AnalyzerPayload> {
        Some(fallback_sentiment(text).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BiasChecks;
    use std::time::Duration;

    struct FixedProvider(SentimentPayload);

    #[async_trait]
    impl SentimentProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn analyze_sentiment(&self, _text: &str) -> Result<SentimentPayload, AnalyzerError> {
            Ok(self.0.clone())
        }
    }

    fn request(text: &str) -> AnalyzerRequest {
        AnalyzerRequest {
            kind: AnalyzerKind::Sentiment,
            text: text.into(),
            language: None,
            budget: Duration::from_secs(1),
            bias_checks: BiasChecks::default(),
        }
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let text = "The new release is great, but the installer is broken and annoying.";
        assert_eq!(fallback_sentiment(text), fallback_sentiment(text));
    }

    #[test]
    fn test_fallback_polarity_sign() {
        assert!(fallback_sentiment("I love this, it is wonderful").polarity > 0.5);
        assert!(fallback_sentiment("This is terrible and useless").polarity < -0.5);
        assert_eq!(fallback_sentiment("The meeting is at noon").polarity, 0.0);
    }

    #[test]
    fn test_fallback_negation_flips_polarity() {
        let plain = fallback_sentiment("the food was good");
        let negated = fallback_sentiment("the food was not good");
        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
    }

    #[test]
    fn test_fallback_topics_by_frequency() {
        let payload = fallback_sentiment(
            "Rust compilers are fast. Rust tooling helps, and compilers keep improving. Rust wins.",
        );
        assert_eq!(payload.topics[0], "rust");
        assert_eq!(payload.topics[1], "compilers");
        assert_eq!(payload.topics.len(), 3);
        assert_eq!(payload.similarity, FALLBACK_SIMILARITY);

        assert_eq!(fallback_sentiment("ok").topics, vec![DEFAULT_TOPIC.to_string()]);
    }

    #[tokio::test]
    async fn test_remote_analyzer_uses_provider() {
        let expected = SentimentPayload::new(0.4, vec!["travel".to_string()], 0.1);
        let analyzer = RemoteSentimentAnalyzer::new(Arc::new(FixedProvider(expected.clone())), 2);
        let payload = analyzer.analyze(request("Paris in spring")).await.unwrap();
        assert_eq!(payload, AnalyzerPayload::Sentiment(expected));
        assert_eq!(analyzer.locality(), Locality::Remote);
    }

    #[tokio::test]
    async fn test_unconfigured_and_closed_limiter_fail() {
        let unconfigured = RemoteSentimentAnalyzer::unconfigured();
        assert!(matches!(
            unconfigured.analyze(request("hi")).await,
            Err(AnalyzerError::NotConfigured { .. })
        ));

        let payload = SentimentPayload::new(0.0, vec![], 0.0);
        let closed = RemoteSentimentAnalyzer::new(Arc::new(FixedProvider(payload)), 1);
        closed.close();
        assert!(matches!(
            closed.analyze(request("hi")).await,
            Err(AnalyzerError::LimiterClosed { .. })
        ));
        assert!(closed.fallback("hi").is_some());
    }
}
