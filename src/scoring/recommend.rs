//! 建议规则表
//!
//! 按维度固定顺序（Bias → Readability → Sentiment）逐条判断，
//! 同样的输入永远得到同样顺序的建议。缺失的维度不产生建议。

use crate::models::{AnalyzerPayload, BiasPayload, ReadabilityPayload, SentimentPayload};
use crate::scoring::normalize::{self, IDEAL_GRADE_LOW};

/// 偏见子分数低于此值时建议使用中立措辞
const BALANCED_WORDING_BELOW: f64 = 0.5;
/// 可读性子分数区间
const READABILITY_POOR_BELOW: f64 = 0.3;
const READABILITY_FAIR_BELOW: f64 = 0.7;
/// 情感子分数低于此值时提示负面语气
const NEGATIVE_TONE_BELOW: f64 = 0.4;
/// 相似度达到此值时提示原创性
const SIMILARITY_AT_LEAST: f64 = 0.7;
/// 篇幅分数低于此值时提示内容过短
const SHORT_CONTENT_BELOW: f64 = 0.2;
/// 机器生成程度达到此值时提示真实度
const AI_DETECTION_AT_LEAST: f64 = 0.7;

const EXPAND_NOTE: &str = "Expand the text with a little more detail and complete sentences.";

/// 为一个可用维度生成建议
pub fn recommendations_for(payload: &AnalyzerPayload) -> Vec<String> {
    match payload {
        AnalyzerPayload::Bias(bias) => bias_notes(bias),
        AnalyzerPayload::Readability(readability) => readability_notes(readability),
        AnalyzerPayload::Sentiment(sentiment) => sentiment_notes(sentiment),
    }
}

fn bias_notes(payload: &BiasPayload) -> Vec<String> {
    let mut notes = Vec::new();
    if !payload.profanity_flags.is_empty() {
        let terms: Vec<&str> = payload.profanity_flags.iter().map(String::as_str).collect();
        notes.push(format!(
            "Remove profanity ({}) to keep the tone professional.",
            terms.join(", ")
        ));
    }
    if !payload.manipulation_flags.is_empty() {
        let phrases: Vec<&str> = payload
            .manipulation_flags
            .iter()
            .map(String::as_str)
            .collect();
        notes.push(format!(
            "Avoid manipulative or absolute phrasing ({}); support claims with evidence instead.",
            phrases.join(", ")
        ));
    }
    if normalize::bias_subscore(payload) < BALANCED_WORDING_BELOW {
        notes.push("Use more balanced, neutral wording to reduce perceived bias.".to_string());
    }
    notes
}

fn readability_notes(payload: &ReadabilityPayload) -> Vec<String> {
    let sub = normalize::readability_subscore(payload);
    let too_easy = payload.grade_level < IDEAL_GRADE_LOW;
    let mut notes = Vec::new();
    if sub < READABILITY_FAIR_BELOW {
        if too_easy {
            notes.push(EXPAND_NOTE.to_string());
        } else if sub < READABILITY_POOR_BELOW {
            notes.push("Use shorter sentences and simpler words; the text is hard to read.".to_string());
        } else {
            notes.push("Simplify long sentences to make the text easier to follow.".to_string());
        }
    }
    // 已经提示扩写时不再重复
    let short = payload
        .length_score
        .is_some_and(|score| score < SHORT_CONTENT_BELOW);
    if short && !notes.iter().any(|n| n == EXPAND_NOTE) {
        notes.push("The text is very short; add context or a supporting example.".to_string());
    }
    notes
}

fn sentiment_notes(payload: &SentimentPayload) -> Vec<String> {
    let mut notes = Vec::new();
    if normalize::sentiment_subscore(payload) < NEGATIVE_TONE_BELOW {
        notes.push("The tone reads as strongly negative; consider a more constructive framing.".to_string());
    }
    if payload.similarity >= SIMILARITY_AT_LEAST {
        notes.push(
            "The text closely resembles common online content; add original thoughts or examples."
                .to_string(),
        );
    }
    if payload
        .ai_detection
        .is_some_and(|ai| ai >= AI_DETECTION_AT_LEAST)
    {
        notes.push(
            "The text reads as machine-generated; add a personal voice or first-hand detail."
                .to_string(),
        );
    }
    notes
}
