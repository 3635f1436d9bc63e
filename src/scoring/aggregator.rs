//! 聚合打分
//!
//! 输入一个结果包和权重，输出评分报告。纯函数，不做 I/O。

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::models::{
    AnalyzerKind, AnalyzerPayload, AnalyzerResult, ContentSignals, OverallScore, ReportIssue,
    ResultBundle, ScoreReport, NON_FINITE_PAYLOAD,
};
use crate::scoring::normalize::subscore;
use crate::scoring::recommend::recommendations_for;
use crate::scoring::Weights;

/// 把结果包聚合成评分报告
///
/// - 成功和兜底的维度参与加权，权重在这些维度上重新归一化
/// - 超时、失败、未启用、数值非有限的维度记为缺失
/// - 没有可用维度，或可用维度的权重全为 0 时，总分为 `Undetermined`
/// - 没有可用维度时不给建议
pub fn score(bundle: &ResultBundle, weights: &Weights) -> ScoreReport {
    let mut breakdown = BTreeMap::new();
    let mut fallback_dimensions = BTreeSet::new();
    let mut missing_dimensions = BTreeSet::new();
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();
    let mut signals = ContentSignals::default();

    for kind in AnalyzerKind::ALL {
        let Some(result) = bundle.get(kind) else {
            missing_dimensions.insert(kind);
            continue;
        };

        match result.payload() {
            Some(payload) if payload.is_finite() => {
                breakdown.insert(kind, subscore(payload));
                recommendations.extend(recommendations_for(payload));
                collect_signals(payload, &mut signals);
                if let AnalyzerResult::Fallback { reason, .. } = result {
                    fallback_dimensions.insert(kind);
                    issues.push(ReportIssue::AnalyzerFallbackUsed {
                        dimension: kind,
                        reason: reason.clone(),
                    });
                }
            }
            Some(_) => {
                warn!("⚠️ {} 维度的载荷含非有限数值，已排除", kind);
                missing_dimensions.insert(kind);
                issues.push(ReportIssue::AnalyzerFailure {
                    dimension: kind,
                    reason: NON_FINITE_PAYLOAD.to_string(),
                });
            }
            None => {
                missing_dimensions.insert(kind);
                match result {
                    AnalyzerResult::Failure { reason } => {
                        issues.push(ReportIssue::AnalyzerFailure {
                            dimension: kind,
                            reason: reason.clone(),
                        });
                    }
                    _ => issues.push(ReportIssue::AnalyzerTimeout { dimension: kind }),
                }
            }
        }
    }

    let available: BTreeSet<AnalyzerKind> = breakdown.keys().copied().collect();
    let applied = weights.renormalize(&available);

    let overall = if applied.is_empty() {
        issues.push(ReportIssue::AggregationUndetermined);
        OverallScore::Undetermined
    } else {
        let total: f64 = applied
            .iter()
            .map(|(kind, weight)| weight * breakdown.get(kind).copied().unwrap_or(0.0))
            .sum();
        OverallScore::Determined(total.clamp(0.0, 1.0))
    };

    debug!(
        "聚合完成: overall={:?}, 可用维度 {}, 缺失 {}, 兜底 {}",
        overall,
        available.len(),
        missing_dimensions.len(),
        fallback_dimensions.len()
    );

    ScoreReport {
        content_id: bundle.content_id.clone(),
        overall,
        breakdown,
        weights: applied,
        recommendations,
        fallback_dimensions,
        missing_dimensions,
        issues,
        signals,
    }
}

fn collect_signals(payload: &AnalyzerPayload, signals: &mut ContentSignals) {
    match payload {
        AnalyzerPayload::Readability(p) => signals.length_score = p.length_score,
        AnalyzerPayload::Sentiment(p) => {
            signals.authenticity = p.authenticity();
            signals.reasoning = p.reasoning.clone();
        }
        AnalyzerPayload::Bias(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BiasPayload, ReadabilityPayload, SentimentPayload};
    use std::collections::BTreeSet;

    fn bias(score: f64) -> AnalyzerResult {
        AnalyzerResult::Success {
            payload: BiasPayload::new(score, BTreeSet::new(), BTreeSet::new()).into(),
        }
    }

    fn readability(grade: f64) -> AnalyzerResult {
        AnalyzerResult::Success {
            payload: ReadabilityPayload::with_grade(grade, "test").into(),
        }
    }

    fn sentiment(polarity: f64) -> AnalyzerResult {
        AnalyzerResult::Success {
            payload: SentimentPayload::new(polarity, vec!["x".to_string()], 0.1).into(),
        }
    }

    #[test]
    fn test_scenario_profanity_exclamation() {
        let bundle = ResultBundle::new(Some("a".to_string()))
            .with(
                AnalyzerKind::Bias,
                AnalyzerResult::Success {
                    payload: BiasPayload::new(0.7, BTreeSet::new(), ["fuck".to_string()]).into(),
                },
            )
            .with(AnalyzerKind::Readability, readability(4.0))
            .with(AnalyzerKind::Sentiment, sentiment(0.9));

        let report = score(&bundle, &Weights::default());

        // bias 1 - (0.35 + 0.125) = 0.525, readability 1.0, sentiment 0.97
        let expected = 0.5 * 0.525 + 0.25 * 1.0 + 0.25 * 0.97;
        let overall = report.overall.value().unwrap();
        assert!((overall - expected).abs() < 1e-9);
        assert!((report.breakdown[&AnalyzerKind::Bias] - 0.525).abs() < 1e-9);
        assert_eq!(report.breakdown[&AnalyzerKind::Readability], 1.0);
        assert!(report.breakdown[&AnalyzerKind::Sentiment] > 0.9);

        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].contains("profanity"));
        assert!(report.missing_dimensions.is_empty());
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_missing_dimension_renormalizes() {
        let bundle = ResultBundle::new(None)
            .with(AnalyzerKind::Bias, bias(0.0))
            .with(AnalyzerKind::Readability, readability(20.0))
            .with(AnalyzerKind::Sentiment, AnalyzerResult::Timeout);

        let report = score(&bundle, &Weights::default());
        assert!(report.is_missing(AnalyzerKind::Sentiment));
        assert!(!report.used_fallback(AnalyzerKind::Sentiment));
        assert_eq!(
            report.issues,
            vec![ReportIssue::AnalyzerTimeout {
                dimension: AnalyzerKind::Sentiment
            }]
        );

        let sum: f64 = report.weights.values().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        let expected = (2.0 / 3.0) * 1.0 + (1.0 / 3.0) * 0.05;
        assert!((report.overall.value().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_counts_and_is_flagged() {
        let bundle = ResultBundle::new(None).with(
            AnalyzerKind::Sentiment,
            AnalyzerResult::Fallback {
                payload: SentimentPayload::new(0.0, vec![], 0.3).into(),
                reason: "llm 请求失败".to_string(),
            },
        );
        let report = score(&bundle, &Weights::default());
        assert!(report.used_fallback(AnalyzerKind::Sentiment));
        assert_eq!(report.overall, OverallScore::Determined(0.7));
        assert!(report.is_missing(AnalyzerKind::Bias));
        assert!(matches!(
            report.issues[0],
            ReportIssue::AnalyzerFallbackUsed { dimension: AnalyzerKind::Sentiment, .. }
        ));
    }

    #[test]
    fn test_all_missing_is_undetermined() {
        let bundle = ResultBundle::new(None)
            .with(AnalyzerKind::Bias, AnalyzerResult::Timeout)
            .with(
                AnalyzerKind::Readability,
                AnalyzerResult::Failure {
                    reason: "boom".to_string(),
                },
            )
            .with(AnalyzerKind::Sentiment, AnalyzerResult::Timeout);

        let report = score(&bundle, &Weights::default());
        assert!(report.is_undetermined());
        assert!(report.recommendations.is_empty());
        assert!(report.weights.is_empty());
        assert_eq!(report.issues.last(), Some(&ReportIssue::AggregationUndetermined));
        assert_eq!(report.missing_dimensions.len(), 3);
    }

    #[test]
    fn test_non_finite_payloads_are_excluded() {
        let bundle = ResultBundle::new(None)
            .with(AnalyzerKind::Bias, bias(f64::NAN))
            .with(AnalyzerKind::Readability, readability(4.0))
            .with(
                AnalyzerKind::Sentiment,
                AnalyzerResult::Fallback {
                    payload: SentimentPayload::new(f64::NAN, vec![], 0.3).into(),
                    reason: "llm 请求失败".to_string(),
                },
            );

        let report = score(&bundle, &Weights::default());
        assert_eq!(report.overall, OverallScore::Determined(1.0));
        assert_eq!(report.breakdown.len(), 1);
        assert!(report.is_missing(AnalyzerKind::Bias));
        assert!(report.is_missing(AnalyzerKind::Sentiment));
        assert!(!report.used_fallback(AnalyzerKind::Sentiment));
        assert_eq!(
            report.issues,
            vec![
                ReportIssue::AnalyzerFailure {
                    dimension: AnalyzerKind::Bias,
                    reason: NON_FINITE_PAYLOAD.to_string(),
                },
                ReportIssue::AnalyzerFailure {
                    dimension: AnalyzerKind::Sentiment,
                    reason: NON_FINITE_PAYLOAD.to_string(),
                },
            ]
        );

        let all_nan = ResultBundle::new(None).with(AnalyzerKind::Bias, bias(f64::NAN));
        assert!(score(&all_nan, &Weights::default()).is_undetermined());
    }

    #[test]
    fn test_zero_weighted_dimensions_are_undetermined() {
        let weights = Weights {
            bias: 1.0,
            readability: 0.0,
            sentiment: 0.0,
        };
        let bundle = ResultBundle::new(None)
            .with(AnalyzerKind::Bias, AnalyzerResult::Timeout)
            .with(AnalyzerKind::Readability, readability(19.0))
            .with(AnalyzerKind::Sentiment, sentiment(0.5));

        let report = score(&bundle, &weights);
        assert!(report.is_undetermined());
        assert!(report.weights.is_empty());
        assert_eq!(report.breakdown.len(), 2);
        assert!(!report.recommendations.is_empty());
        assert_eq!(report.issues.last(), Some(&ReportIssue::AggregationUndetermined));
    }

    #[test]
    fn test_signals_are_reported_without_weight() {
        let mut readable = crate::services::compute_readability("Short note here.");
        readable.grade_level = 5.0;
        let bundle = ResultBundle::new(None)
            .with(AnalyzerKind::Bias, bias(0.0))
            .with(AnalyzerKind::Readability, AnalyzerResult::Success { payload: readable.into() })
            .with(
                AnalyzerKind::Sentiment,
                AnalyzerResult::Success {
                    payload: SentimentPayload::new(0.0, vec![], 0.1)
                        .with_ai_detection(0.9)
                        .with_reasoning("templated")
                        .into(),
                },
            );

        let report = score(&bundle, &Weights::default());
        assert!((report.overall.value().unwrap() - (0.5 + 0.25 + 0.25 * 0.7)).abs() < 1e-9);
        assert!(report.signals.length_score.unwrap() < 0.2);
        assert!((report.signals.authenticity.unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(report.signals.reasoning.as_deref(), Some("templated"));
        assert!(report.recommendations.iter().any(|r| r.contains("very short")));
        assert!(report.recommendations.iter().any(|r| r.contains("machine-generated")));
    }

    #[test]
    fn test_overall_never_rises_with_bias() {
        let mut last = f64::INFINITY;
        for step in 0..=20 {
            let bundle = ResultBundle::new(None)
                .with(AnalyzerKind::Bias, bias(step as f64 / 20.0))
                .with(AnalyzerKind::Readability, readability(8.0))
                .with(AnalyzerKind::Sentiment, sentiment(0.2));
            let overall = score(&bundle, &Weights::default()).overall.value().unwrap();
            assert!((0.0..=1.0).contains(&overall));
            assert!(overall <= last);
            last = overall;
        }
    }
}
