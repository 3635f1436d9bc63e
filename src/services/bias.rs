//! 偏见检测 - 基于规则的评估器
//!
//! 规则：
//! - 极端化词汇、对立化词汇 → 计入偏见分数并记入 `matched_terms`
//! - 脏话（含屈折形式）→ 计入偏见分数并记入 `profanity_flags`
//! - 操纵性短语、绝对化断言 → 计入偏见分数并记入 `manipulation_flags`
//!
//! 同一个词只计一次，分数截断到 1.0。

use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::AnalyzerError;
use crate::models::{
    AnalyzerKind, AnalyzerPayload, AnalyzerRequest, BiasChecks, BiasDirection, BiasPayload,
};
use crate::services::lexicon::{
    contains_phrase, profanity_root, tokenize, ABSOLUTE_CLAIMS, EXTREME_WORDS,
    MANIPULATION_PHRASES, POLARIZING_WORDS,
};
use crate::services::Analyzer;

const EXTREME_WEIGHT: f64 = 0.3;
const POLARIZING_WEIGHT: f64 = 0.35;
const PROFANITY_WEIGHT: f64 = 0.4;
const MANIPULATION_WEIGHT: f64 = 0.3;
const ABSOLUTE_CLAIM_WEIGHT: f64 = 0.35;

/// 对文本执行偏见规则
pub fn evaluate_bias(text: &str, checks: BiasChecks) -> BiasPayload {
    let tokens = tokenize(text);
    let mut score = 0.0;
    let mut matched_terms = BTreeSet::new();
    let mut profanity_flags = BTreeSet::new();
    let mut manipulation_flags = BTreeSet::new();

    for token in &tokens {
        if checks.loaded_language {
            if EXTREME_WORDS.contains(token.as_str()) && matched_terms.insert(token.clone()) {
                score += EXTREME_WEIGHT;
            } else if POLARIZING_WORDS.contains(token.as_str())
                && matched_terms.insert(token.clone())
            {
                score += POLARIZING_WEIGHT;
            }
        }
        if checks.profanity {
            if let Some(root) = profanity_root(token) {
                if profanity_flags.insert(root.to_string()) {
                    score += PROFANITY_WEIGHT;
                }
            }
        }
    }

    if checks.manipulation {
        for phrase in MANIPULATION_PHRASES {
            if contains_phrase(&tokens, phrase) {
                manipulation_flags.insert(phrase.to_string());
                score += MANIPULATION_WEIGHT;
            }
        }
        for claim in ABSOLUTE_CLAIMS {
            if contains_phrase(&tokens, claim) {
                manipulation_flags.insert(claim.to_string());
                score += ABSOLUTE_CLAIM_WEIGHT;
            }
        }
    }

    let bias_score: f64 = f64::min(score, 1.0);
    debug!(
        "偏见规则评估完成: score={:.2}, 命中 {} 个词, 脏话 {} 个, 操纵 {} 个",
        bias_score,
        matched_terms.len(),
        profanity_flags.len(),
        manipulation_flags.len()
    );

    BiasPayload {
        bias_score,
        manipulation_flags,
        profanity_flags,
        matched_terms,
        direction: BiasDirection::from_score(bias_score),
    }
}

/// 基于规则的偏见分析器
///
/// 规则评估放到阻塞线程池执行，避免占用异步运行时的工作线程。
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBiasAnalyzer;

#[async_trait]
impl Analyzer for RuleBiasAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Bias
    }

    async fn analyze(&self, request: AnalyzerRequest) -> Result<AnalyzerPayload, AnalyzerError> {
        let AnalyzerRequest {
            text, bias_checks, ..
        } = request;
        let payload = tokio::task::spawn_blocking(move || evaluate_bias(&text, bias_checks))
            .await
            .map_err(|e| AnalyzerError::Evaluation {
                reason: e.to_string(),
            })?;
        Ok(payload.into())
    }
}
