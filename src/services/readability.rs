//! 可读性分析器
//!
//! 纯函数，同一段文字永远得到同一组指数。年级水平取 Flesch–Kincaid、
//! Gunning Fog、SMOG、Coleman–Liau 四项的平均值。

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::AnalyzerError;
use crate::models::{AnalyzerKind, AnalyzerPayload, AnalyzerRequest, ReadabilityPayload};
use crate::services::Analyzer;

/// 复合指数名称
pub const COMPOSITE_INDEX: &str = "composite-grade";

/// 不计入复杂词的常见多音节词
const COMMON_POLYSYLLABLES: &[&str] = &[
    "beautiful",
    "wonderful",
    "terrible",
    "possible",
    "different",
    "important",
    "interesting",
    "necessary",
    "available",
    "comfortable",
    "responsible",
];

/// 计算可读性指数
///
/// 空文本返回全 0 的载荷而不是 NaN；单词文本也有确定的值。
pub fn compute_readability(text: &str) -> ReadabilityPayload {
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();

    if word_count == 0 {
        return ReadabilityPayload {
            grade_level: 0.0,
            index_name: COMPOSITE_INDEX.to_string(),
            flesch_kincaid: 0.0,
            gunning_fog: 0.0,
            smog: 0.0,
            coleman_liau: 0.0,
            word_count: 0,
            sentence_count: 0,
            length_score: Some(0.0),
        };
    }

    let sentence_count = count_sentences(text).max(1);
    let words_f = word_count as f64;
    let sentences_f = sentence_count as f64;

    let syllables: Vec<usize> = words.iter().map(|w| count_syllables(w)).collect();
    let total_syllables: usize = syllables.iter().sum();
    let complex_words = words
        .iter()
        .zip(&syllables)
        .filter(|&(word, &count)| count >= 3 && is_complex_candidate(word))
        .count() as f64;

    let words_per_sentence = words_f / sentences_f;
    let syllables_per_word = total_syllables as f64 / words_f;

    let flesch_kincaid = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;
    let gunning_fog = 0.4 * (words_per_sentence + 100.0 * (complex_words / words_f));
    let smog = if sentence_count >= 30 {
        1.043 * (30.0 * complex_words / sentences_f).sqrt() + 3.1291
    } else {
        1.043 * complex_words.sqrt() + 3.1291
    };

    let letters = text.chars().filter(|c| !c.is_whitespace()).count() as f64;
    let coleman_liau =
        0.0588 * (letters / words_f * 100.0) - 0.296 * (sentences_f / words_f * 100.0) - 15.8;

    let grade_level = (flesch_kincaid + gunning_fog + smog + coleman_liau) / 4.0;

    ReadabilityPayload {
        grade_level: round2(grade_level),
        index_name: COMPOSITE_INDEX.to_string(),
        flesch_kincaid: round2(flesch_kincaid),
        gunning_fog: round2(gunning_fog),
        smog: round2(smog),
        coleman_liau: round2(coleman_liau),
        word_count,
        sentence_count,
        length_score: Some(length_score(word_count)),
    }
}

/// 篇幅曲线的中点（词数）
const LENGTH_MIDPOINT: f64 = 50.0;
const LENGTH_STEEPNESS: f64 = 0.15;
/// 篇幅分数的下限
const LENGTH_FLOOR: f64 = 0.05;
/// 少于此词数时额外衰减
const SHORT_CONTENT_WORDS: usize = 10;
const SHORT_CONTENT_DECAY: f64 = 0.3;

/// 篇幅分数，[0,1]
///
/// S 形曲线：约 50 词过半，百词以上接近 1。不足 10 词时按缺少的词数再做指数衰减，
/// 所以分数随词数单调不减，0 词为 0。
pub fn length_score(word_count: usize) -> f64 {
    if word_count == 0 {
        return 0.0;
    }
    let words = word_count as f64;
    let sigmoid = 1.0 / (1.0 + (-LENGTH_STEEPNESS * (words - LENGTH_MIDPOINT)).exp());
    let mut score = LENGTH_FLOOR + (1.0 - LENGTH_FLOOR) * sigmoid;
    if word_count < SHORT_CONTENT_WORDS {
        let shortfall = (SHORT_CONTENT_WORDS - word_count) as f64;
        score *= (-SHORT_CONTENT_DECAY * shortfall).exp();
    }
    score.clamp(0.0, 1.0)
}

fn count_sentences(text: &str) -> usize {
    static SENTENCE_END: OnceLock<Regex> = OnceLock::new();
    SENTENCE_END
        .get_or_init(|| Regex::new(r"[.!?]+").expect("sentence regex is valid"))
        .find_iter(text)
        .count()
}

/// 估算音节数，每个词至少 1 个音节
fn count_syllables(word: &str) -> usize {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    static VOWEL_GROUP: OnceLock<Regex> = OnceLock::new();

    let lower: String = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();
    if lower.is_empty() {
        return 1;
    }

    let suffix = SUFFIX.get_or_init(|| Regex::new(r"(es|ed|ing)$").expect("suffix regex is valid"));
    let stripped = suffix.replace(&lower, "");
    let stem: &str = if stripped.is_empty() { &lower } else { &stripped };

    let vowels = VOWEL_GROUP.get_or_init(|| Regex::new(r"[aeiouy]+").expect("vowel regex is valid"));
    let mut count = vowels.find_iter(stem).count();
    if stem.ends_with('e') && count > 1 {
        count -= 1;
    }
    count.max(1)
}

/// 专有名词和常见多音节词不算复杂词
fn is_complex_candidate(word: &str) -> bool {
    let starts_upper = word.chars().next().is_some_and(|c| c.is_uppercase());
    let lower = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    !starts_upper && !COMMON_POLYSYLLABLES.contains(&lower.as_str())
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 可读性分析器
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadabilityAnalyzer;

#[async_trait]
impl Analyzer for ReadabilityAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Readability
    }

    async fn analyze(&self, request: AnalyzerRequest) -> Result<AnalyzerPayload, AnalyzerError> {
        Ok(compute_readability(&request.text).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BiasChecks;
    use std::time::Duration;

    #[test]
    fn test_readability_is_deterministic() {
        let text = "The committee deliberated extensively. Consequently, the recommendations were postponed indefinitely.";
        let first = compute_readability(text);
        let second = compute_readability(text);
        assert_eq!(first, second);
        assert!(first.grade_level.is_finite());
    }

    #[test]
    fn test_empty_and_single_word_are_defined() {
        let empty = compute_readability("");
        assert_eq!(empty.grade_level, 0.0);
        assert_eq!(empty.word_count, 0);

        let single = compute_readability("Hello");
        assert!(single.grade_level.is_finite());
        assert_eq!(single.word_count, 1);
        assert_eq!(single.sentence_count, 1);
    }

    #[test]
    fn test_short_exclamation_lands_in_low_grades() {
        let payload = compute_readability("This is fucking amazing!");
        assert_eq!(payload.word_count, 4);
        assert_eq!(payload.sentence_count, 1);
        assert!(payload.grade_level > 2.0 && payload.grade_level < 5.0);
    }

    #[test]
    fn test_dense_prose_scores_higher_grade() {
        let simple = compute_readability("The cat sat. The dog ran. We had fun.");
        let dense = compute_readability(
            "Notwithstanding considerable institutional opposition, the administration systematically implemented comprehensive organizational restructuring initiatives.",
        );
        assert!(dense.grade_level > simple.grade_level);
    }

    #[test]
    fn test_length_score_curve() {
        assert_eq!(length_score(0), 0.0);
        assert!(length_score(4) < 0.05);
        assert!((length_score(50) - 0.525).abs() < 1e-9);
        assert!(length_score(120) > 0.99);

        let mut last = 0.0;
        for words in 1..200 {
            let score = length_score(words);
            assert!(score >= last && score <= 1.0);
            last = score;
        }

        assert_eq!(compute_readability("").length_score, Some(0.0));
        assert_eq!(
            compute_readability("This is fucking amazing!").length_score,
            Some(length_score(4))
        );
    }

    #[test]
    fn test_syllable_estimates() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("amazing"), 2);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("!!!"), 1);
    }

    #[test]
    fn test_analyzer_wraps_payload() {
        let request = AnalyzerRequest {
            kind: AnalyzerKind::Readability,
            text: "Short and clear.".into(),
            language: None,
            budget: Duration::from_millis(100),
            bias_checks: BiasChecks::default(),
        };
        let payload = tokio_test::block_on(ReadabilityAnalyzer.analyze(request)).unwrap();
        assert_eq!(payload.kind(), AnalyzerKind::Readability);
    }
}
