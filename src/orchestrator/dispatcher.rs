//! 单条内容的分析器调度
//!
//! 一条内容 → 每个启用的分析器一个 tokio 任务 → 带超时地等待全部任务 → 结果包。
//! 分析器之间互不阻塞；超时的任务不会被等待，其迟到的结果直接丢弃。

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{AnalyzeConfig, TimeoutPolicy};
use crate::error::AnalyzerError;
use crate::models::{
    AnalyzerKind, AnalyzerPayload, AnalyzerRequest, AnalyzerResult, ContentItem, ResultBundle,
    NON_FINITE_PAYLOAD,
};
use crate::services::{Analyzer, AnalyzerRegistry};

/// 未注册分析器的失败原因
pub const NOT_REGISTERED: &str = "analyzer not registered";

type AnalyzerTask = JoinHandle<Result<AnalyzerPayload, AnalyzerError>>;

/// 分析器调度器
///
/// 只借用分析器表，不持有任何按内容变化的状态，可以被多条内容同时使用。
pub struct Orchestrator<'a> {
    registry: &'a AnalyzerRegistry,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a AnalyzerRegistry) -> Self {
        Self { registry }
    }

    /// 并发调用所有启用的分析器，返回完整的结果包
    ///
    /// 每个启用的维度在结果包里都恰好有一个结果；未启用的维度不出现。
    pub async fn analyze(&self, content: &ContentItem, config: &AnalyzeConfig) -> ResultBundle {
        let label = content.label().to_string();
        let text: Arc<str> = Arc::from(content.text());
        let mut bundle = ResultBundle::new(content.id().map(str::to_string));
        let mut pending = Vec::new();

        for &kind in &config.enabled_analyzers {
            let Some(analyzer) = self.registry.get(kind) else {
                warn!("[内容 {}] ⚠️ 分析器 {} 未注册", label, kind);
                bundle = bundle.with(
                    kind,
                    AnalyzerResult::Failure {
                        reason: NOT_REGISTERED.to_string(),
                    },
                );
                continue;
            };

            let budget = config.timeouts.budget_for(kind, analyzer.locality());
            let request = AnalyzerRequest {
                kind,
                text: Arc::clone(&text),
                language: content.language().map(str::to_string),
                budget,
                bias_checks: config.bias_checks,
            };

            let worker = Arc::clone(&analyzer);
            let handle: AnalyzerTask = tokio::spawn(async move { worker.analyze(request).await });
            debug!("[内容 {}] 已派发 {} (预算 {:?})", label, kind, budget);

            pending.push(await_analyzer(
                kind,
                analyzer,
                handle,
                budget,
                Arc::clone(&text),
                config.timeout_policy,
                label.clone(),
            ));
        }

        for (kind, result) in join_all(pending).await {
            bundle = bundle.with(kind, result);
        }
        debug_assert!(bundle.covers(&config.enabled_analyzers));

        info!(
            "[内容 {}] ✓ 分析器全部返回: {}",
            label,
            summarize(&bundle)
        );
        bundle
    }
}

/// 等待单个分析器，超时、报错、崩溃都归一成 [`AnalyzerResult`]
async fn await_analyzer(
    kind: AnalyzerKind,
    analyzer: Arc<dyn Analyzer>,
    handle: AnalyzerTask,
    budget: Duration,
    text: Arc<str>,
    policy: TimeoutPolicy,
    label: String,
) -> (AnalyzerKind, AnalyzerResult) {
    let result = match tokio::time::timeout(budget, handle).await {
        Ok(Ok(Ok(payload))) if payload.kind() != kind => {
            let reason = format!("{} 分析器返回了 {} 结果", kind, payload.kind());
            warn!("[内容 {}] ❌ {}", label, reason);
            AnalyzerResult::Failure { reason }
        }
        Ok(Ok(Ok(payload))) if !payload.is_finite() => {
            warn!("[内容 {}] ⚠️ {} 返回了非有限数值", label, kind);
            recover(analyzer.as_ref(), &text, NON_FINITE_PAYLOAD.to_string())
        }
        Ok(Ok(Ok(payload))) => AnalyzerResult::Success { payload },
        Ok(Ok(Err(e))) => {
            warn!("[内容 {}] ⚠️ {} 分析失败: {}", label, kind, e);
            recover(analyzer.as_ref(), &text, e.to_string())
        }
        Ok(Err(join_error)) => {
            let reason = if join_error.is_panic() {
                "analyzer panicked".to_string()
            } else {
                format!("analyzer task aborted: {}", join_error)
            };
            warn!("[内容 {}] ❌ {} 任务异常: {}", label, kind, reason);
            recover(analyzer.as_ref(), &text, reason)
        }
        Err(_) => {
            warn!("[内容 {}] ⏱️ {} 超时 ({:?})", label, kind, budget);
            on_timeout(analyzer.as_ref(), &text, budget, policy)
        }
    };
    (kind, result)
}

/// 报错后有兜底用兜底，没有则记为失败
fn recover(analyzer: &dyn Analyzer, text: &str, reason: String) -> AnalyzerResult {
    match analyzer.fallback(text) {
        Some(payload) => AnalyzerResult::Fallback { payload, reason },
        None => AnalyzerResult::Failure { reason },
    }
}

fn on_timeout(
    analyzer: &dyn Analyzer,
    text: &str,
    budget: Duration,
    policy: TimeoutPolicy,
) -> AnalyzerResult {
    match policy {
        TimeoutPolicy::Exclude => AnalyzerResult::Timeout,
        TimeoutPolicy::Fallback => match analyzer.fallback(text) {
            Some(payload) => AnalyzerResult::Fallback {
                payload,
                reason: format!("timed out after {} ms", budget.as_millis()),
            },
            None => AnalyzerResult::Timeout,
        },
    }
}

fn summarize(bundle: &ResultBundle) -> String {
    bundle
        .results
        .iter()
        .map(|(kind, result)| format!("{}={}", kind, result.status()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BiasPayload, ReadabilityPayload, SentimentPayload};
    use crate::services::Locality;
    use async_trait::async_trait;

    struct Slow {
        kind: AnalyzerKind,
        delay: Duration,
        with_fallback: bool,
    }

    #[async_trait]
    impl Analyzer for Slow {
        fn kind(&self) -> AnalyzerKind {
            self.kind
        }

        fn locality(&self) -> Locality {
            Locality::Remote
        }

        async fn analyze(
            &self,
            _request: AnalyzerRequest,
        ) -> Result<AnalyzerPayload, AnalyzerError> {
            tokio::time::sleep(self.delay).await;
            Ok(SentimentPayload::new(0.5, vec![], 0.0).into())
        }

        fn fallback(&self, _text: &str) -> Option<AnalyzerPayload> {
            self.with_fallback
                .then(|| SentimentPayload::new(0.0, vec![], 0.3).into())
        }
    }

    struct WrongKind;

    #[async_trait]
    impl Analyzer for WrongKind {
        fn kind(&self) -> AnalyzerKind {
            AnalyzerKind::Bias
        }

        async fn analyze(
            &self,
            _request: AnalyzerRequest,
        ) -> Result<AnalyzerPayload, AnalyzerError> {
            Ok(ReadabilityPayload::with_grade(5.0, "x").into())
        }
    }

    /// 返回 NaN 偏见分数的分析器
    struct NanBias {
        with_fallback: bool,
    }

    #[async_trait]
    impl Analyzer for NanBias {
        fn kind(&self) -> AnalyzerKind {
            AnalyzerKind::Bias
        }

        async fn analyze(
            &self,
            _request: AnalyzerRequest,
        ) -> Result<AnalyzerPayload, AnalyzerError> {
            Ok(BiasPayload::new(f64::NAN, Vec::new(), Vec::new()).into())
        }

        fn fallback(&self, _text: &str) -> Option<AnalyzerPayload> {
            self.with_fallback
                .then(|| BiasPayload::new(0.2, Vec::new(), Vec::new()).into())
        }
    }

    fn config(kinds: &[AnalyzerKind], policy: TimeoutPolicy) -> AnalyzeConfig {
        let mut config = AnalyzeConfig::default().with_enabled(kinds.iter().copied());
        config.timeouts.remote_ms = 30;
        config.timeout_policy = policy;
        config
    }

    #[tokio::test]
    async fn test_unregistered_analyzer_is_failure() {
        let registry = AnalyzerRegistry::new();
        let content = ContentItem::from_text("hello").unwrap();
        let bundle = Orchestrator::new(&registry)
            .analyze(&content, &config(&[AnalyzerKind::Readability], TimeoutPolicy::Exclude))
            .await;
        assert_eq!(
            bundle.get(AnalyzerKind::Readability),
            Some(&AnalyzerResult::Failure {
                reason: NOT_REGISTERED.to_string()
            })
        );
        assert_eq!(bundle.results.len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_policy_variants() {
        let registry = AnalyzerRegistry::new().register(Arc::new(Slow {
            kind: AnalyzerKind::Sentiment,
            delay: Duration::from_secs(5),
            with_fallback: true,
        }));
        let content = ContentItem::from_text("hello").unwrap();
        let orchestrator = Orchestrator::new(&registry);

        let excluded = orchestrator
            .analyze(&content, &config(&[AnalyzerKind::Sentiment], TimeoutPolicy::Exclude))
            .await;
        assert_eq!(
            excluded.get(AnalyzerKind::Sentiment),
            Some(&AnalyzerResult::Timeout)
        );

        let fallen_back = orchestrator
            .analyze(&content, &config(&[AnalyzerKind::Sentiment], TimeoutPolicy::Fallback))
            .await;
        match fallen_back.get(AnalyzerKind::Sentiment) {
            Some(AnalyzerResult::Fallback { reason, .. }) => assert!(reason.contains("30 ms")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_without_fallback_stays_timeout() {
        let registry = AnalyzerRegistry::new().register(Arc::new(Slow {
            kind: AnalyzerKind::Sentiment,
            delay: Duration::from_secs(5),
            with_fallback: false,
        }));
        let content = ContentItem::from_text("hello").unwrap();
        let bundle = Orchestrator::new(&registry)
            .analyze(&content, &config(&[AnalyzerKind::Sentiment], TimeoutPolicy::Fallback))
            .await;
        assert_eq!(bundle.get(AnalyzerKind::Sentiment), Some(&AnalyzerResult::Timeout));
    }

    #[tokio::test]
    async fn test_mismatched_payload_is_failure() {
        let registry = AnalyzerRegistry::new().register(Arc::new(WrongKind));
        let content = ContentItem::from_text("hello").unwrap();
        let bundle = Orchestrator::new(&registry)
            .analyze(&content, &config(&[AnalyzerKind::Bias], TimeoutPolicy::Exclude))
            .await;
        assert!(matches!(
            bundle.get(AnalyzerKind::Bias),
            Some(AnalyzerResult::Failure { .. })
        ));
    }

    #[tokio::test]
    async fn test_non_finite_payload_is_not_success() {
        let content = ContentItem::from_text("hello").unwrap();
        let config = config(&[AnalyzerKind::Bias], TimeoutPolicy::Exclude);

        let registry = AnalyzerRegistry::new().register(Arc::new(NanBias { with_fallback: false }));
        let bundle = Orchestrator::new(&registry).analyze(&content, &config).await;
        assert_eq!(
            bundle.get(AnalyzerKind::Bias),
            Some(&AnalyzerResult::Failure {
                reason: NON_FINITE_PAYLOAD.to_string()
            })
        );

        let registry = AnalyzerRegistry::new().register(Arc::new(NanBias { with_fallback: true }));
        let bundle = Orchestrator::new(&registry).analyze(&content, &config).await;
        match bundle.get(AnalyzerKind::Bias) {
            Some(AnalyzerResult::Fallback { payload, reason }) => {
                assert!(payload.is_finite());
                assert_eq!(reason, NON_FINITE_PAYLOAD);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(bundle.covers(&config.enabled_analyzers));
    }
}
