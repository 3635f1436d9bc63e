//! 各维度原始结果 → [0,1] 子分数

use crate::models::{AnalyzerPayload, BiasPayload, ReadabilityPayload, SentimentPayload};

/// 理想年级区间
pub const IDEAL_GRADE_LOW: f64 = 3.0;
pub const IDEAL_GRADE_HIGH: f64 = 10.0;

/// 年级曲线的节点，节点之间线性插值，两端之外取端点值
const READABILITY_KNOTS: [(f64, f64); 5] = [
    (-2.0, 0.1),
    (IDEAL_GRADE_LOW, 1.0),
    (IDEAL_GRADE_HIGH, 1.0),
    (14.0, 0.6),
    (20.0, 0.0),
];

const READABILITY_FLOOR: f64 = 0.05;

/// 中性情感的子分数
const SENTIMENT_NEUTRAL: f64 = 0.7;

pub fn readability_subscore(payload: &ReadabilityPayload) -> f64 {
    let grade = payload.grade_level;
    if !grade.is_finite() {
        return READABILITY_FLOOR;
    }

    let (first_x, first_y) = READABILITY_KNOTS[0];
    let (last_x, last_y) = READABILITY_KNOTS[READABILITY_KNOTS.len() - 1];
    let raw = if grade <= first_x {
        first_y
    } else if grade >= last_x {
        last_y
    } else {
        READABILITY_KNOTS
            .windows(2)
            .find(|pair| grade <= pair[1].0)
            .map(|pair| {
                let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
                y0 + (y1 - y0) * (grade - x0) / (x1 - x0)
            })
            .unwrap_or(last_y)
    };
    raw.clamp(READABILITY_FLOOR, 1.0)
}

/// 偏见强度：分数占一半，操纵和脏话各占四分之一
pub fn bias_intensity(payload: &BiasPayload) -> f64 {
    let manipulation = (payload.manipulation_flags.len() as f64 / 3.0).min(1.0);
    let profanity = (payload.profanity_flags.len() as f64 / 2.0).min(1.0);
    (0.5 * payload.bias_score + 0.25 * manipulation + 0.25 * profanity).clamp(0.0, 1.0)
}

pub fn bias_subscore(payload: &BiasPayload) -> f64 {
    1.0 - bias_intensity(payload)
}

/// 正面和中性内容优先，负面内容扣分，对极性单调
pub fn sentiment_subscore(payload: &SentimentPayload) -> f64 {
    let p = payload.polarity.clamp(-1.0, 1.0);
    let score = if p >= 0.0 {
        SENTIMENT_NEUTRAL + (1.0 - SENTIMENT_NEUTRAL) * p
    } else {
        SENTIMENT_NEUTRAL + SENTIMENT_NEUTRAL * p
    };
    score.clamp(0.0, 1.0)
}

pub fn subscore(payload: &AnalyzerPayload) -> f64 {
    match payload {
        AnalyzerPayload::Bias(bias) => bias_subscore(bias),
        AnalyzerPayload::Readability(readability) => readability_subscore(readability),
        AnalyzerPayload::Sentiment(sentiment) => sentiment_subscore(sentiment),
    }
}
