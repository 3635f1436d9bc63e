//! 词表
//!
//! 偏见规则和情感兜底共用的静态词表，全部使用小写形式。

use phf::{phf_map, phf_set};
use regex::Regex;
use std::sync::OnceLock;

/// 极端化词汇
pub static EXTREME_WORDS: phf::Set<&'static str> = phf_set! {
    "always", "never", "disaster", "catastrophic", "terrible", "amazing",
    "perfect", "awful", "incredible", "revolutionary", "unprecedented",
    "devastating", "outstanding", "horrible", "brilliant", "nightmare",
    "breakthrough", "crisis", "exceptional", "tragic", "phenomenal",
};

/// 对立化词汇
pub static POLARIZING_WORDS: phf::Set<&'static str> = phf_set! {
    "woke", "snowflake", "boomer", "millennial", "gen-z", "cancel",
    "triggered", "offended", "privileged", "entitled", "toxic",
    "problematic", "controversial", "divisive", "extreme",
};

/// 脏话与侮辱性词汇（词根）
pub static PROFANITY_WORDS: phf::Set<&'static str> = phf_set! {
    "fuck", "shit", "damn", "hell", "bitch", "ass", "crap", "piss",
    "bastard", "dick", "cock", "pussy", "whore", "slut", "fag",
    "faggot", "retard", "idiot", "moron", "stupid",
};

/// 脏话词根允许的屈折后缀
pub const PROFANITY_SUFFIXES: &[&str] = &["ing", "in", "ed", "er", "ers", "es", "s", "y", "ty"];

/// 情绪操纵短语（按空格分词后的形式）
pub const MANIPULATION_PHRASES: &[&str] = &[
    "you must",
    "everyone knows",
    "obviously",
    "clearly",
    "without a doubt",
];

/// 绝对化断言
pub const ABSOLUTE_CLAIMS: &[&str] = &[
    "100%",
    "guaranteed",
    "proven",
    "scientific fact",
    "definitely",
];

/// 情感词典：词 → 极性权重
pub static SENTIMENT_LEXICON: phf::Map<&'static str, f64> = phf_map! {
    "good" => 1.5, "great" => 2.5, "excellent" => 3.0, "amazing" => 3.0,
    "awesome" => 3.0, "love" => 3.0, "loved" => 3.0, "like" => 1.0,
    "happy" => 2.5, "glad" => 2.0, "nice" => 1.5, "wonderful" => 3.0,
    "fantastic" => 3.0, "brilliant" => 2.5, "helpful" => 2.0, "best" => 3.0,
    "better" => 1.5, "enjoy" => 2.0, "enjoyed" => 2.0, "beautiful" => 2.5,
    "impressive" => 2.5, "success" => 2.0, "win" => 2.0, "recommend" => 1.5,
    "bad" => -2.5, "terrible" => -3.0, "awful" => -3.0, "horrible" => -3.0,
    "hate" => -3.0, "hated" => -3.0, "worst" => -3.0, "worse" => -2.0,
    "poor" => -2.0, "sad" => -2.0, "angry" => -2.5, "disappointing" => -2.5,
    "disappointed" => -2.5, "useless" => -2.5, "broken" => -2.0, "fail" => -2.0,
    "failed" => -2.0, "failure" => -2.5, "problem" => -1.5, "disaster" => -3.0,
    "nightmare" => -3.0, "annoying" => -2.0, "boring" => -2.0, "ugly" => -2.5,
};

/// 反转下一个情感词极性的否定词
pub static NEGATORS: phf::Set<&'static str> = phf_set! {
    "not", "no", "never", "isn't", "wasn't", "don't", "doesn't", "didn't",
    "can't", "won't", "aren't", "nothing",
};

/// 主题提取时忽略的停用词
pub static STOPWORDS: phf::Set<&'static str> = phf_set! {
    "the", "a", "an", "and", "or", "but", "if", "of", "to", "in", "on", "at",
    "for", "with", "is", "are", "was", "were", "be", "been", "it", "its",
    "this", "that", "these", "those", "i", "you", "he", "she", "we", "they",
    "my", "your", "our", "their", "me", "him", "her", "us", "them", "as",
    "by", "from", "so", "not", "no", "do", "does", "did", "have", "has",
    "had", "will", "would", "can", "could", "should", "just", "very", "really",
    "what", "which", "who", "about", "there", "here", "all", "more", "some",
};

/// 按小写分词
///
/// 保留字母、数字、撇号、连字符和 `%`，其他字符作为分隔符。
pub fn tokenize(text: &str) -> Vec<String> {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN_RE.get_or_init(|| {
        Regex::new(r"[\p{L}\p{N}%][\p{L}\p{N}%'\-]*").expect("token regex is valid")
    });
    let lower = text.to_lowercase();
    re.find_iter(&lower)
        .map(|m| m.as_str().trim_end_matches(['\'', '-']).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// 分词结果是否包含某个短语（按完整词匹配）
pub fn contains_phrase(tokens: &[String], phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.is_empty() || words.len() > tokens.len() {
        return false;
    }
    tokens
        .windows(words.len())
        .any(|window| window.iter().zip(&words).all(|(t, w)| t == w))
}

/// 词是否为脏话词根或其屈折形式，返回命中的词根
pub fn profanity_root(token: &str) -> Option<&'static str> {
    if let Some(root) = PROFANITY_WORDS.get_key(token) {
        return Some(*root);
    }
    PROFANITY_SUFFIXES.iter().find_map(|suffix| {
        token
            .strip_suffix(suffix)
            .filter(|stem| stem.len() >= 3)
            .and_then(|stem| PROFANITY_WORDS.get_key(stem).copied())
    })
}
