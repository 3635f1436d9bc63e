//! 远端情感服务返回内容的解析
//!
//! 两个服务都被要求只返回一个 JSON 对象，但模型经常包一层 ```json 代码块
//! 或在前后附带说明文字，这里统一处理。

use serde::Deserialize;

use crate::error::AnalyzerError;
use crate::models::SentimentPayload;

/// 请求模型时使用的系统提示词
pub const SENTIMENT_SYSTEM_PROMPT: &str = "You analyze short social posts. \
Return ONLY a valid JSON object with these exact fields: \
{\"sentiment\": <number from -1.0 to 1.0>, \
\"main_topic\": \"<string>\", \
\"secondary_topics\": [\"<string>\", \"<string>\"], \
\"similarity\": <number from 0.0 (original) to 1.0 (copied from common internet text)>, \
\"ai_detection\": <number from 0.0 (clearly human) to 1.0 (clearly machine-generated)>, \
\"reasoning\": \"<one short sentence>\"}. \
Use the same criteria for similar texts and put any explanation only in the reasoning field.";

#[derive(Debug, Deserialize)]
struct RawSentiment {
    sentiment: f64,
    #[serde(default)]
    main_topic: Option<String>,
    #[serde(default)]
    secondary_topics: Vec<String>,
    #[serde(default, alias = "plagiarism")]
    similarity: Option<f64>,
    #[serde(default)]
    ai_detection: Option<f64>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// 构造用户消息
pub fn user_message(text: &str) -> String {
    format!("Text: {}", text)
}

/// 解析模型输出为情感载荷
///
/// 主题顺序为主主题在前、次要主题在后，去重并忽略空白项；
/// 缺少相似度时按 0 处理。数值越界会被截断。
/// `ai_detection` 缺失或不是有限数时不记录，`reasoning` 为空白时不记录。
pub fn parse_sentiment_response(
    provider: &str,
    raw: &str,
) -> Result<SentimentPayload, AnalyzerError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| AnalyzerError::malformed(provider, "响应中没有 JSON 对象"))?;
    let parsed: RawSentiment = serde_json::from_str(json)
        .map_err(|e| AnalyzerError::malformed(provider, e.to_string()))?;

    if !parsed.sentiment.is_finite() {
        return Err(AnalyzerError::malformed(provider, "sentiment 不是有限数值"));
    }

    let mut topics: Vec<String> = Vec::new();
    for topic in parsed.main_topic.into_iter().chain(parsed.secondary_topics) {
        let topic = topic.trim();
        if topic.is_empty() || topics.iter().any(|t| t.eq_ignore_ascii_case(topic)) {
            continue;
        }
        topics.push(topic.to_string());
    }

    let similarity = parsed.similarity.filter(|s| s.is_finite()).unwrap_or(0.0);
    let mut payload = SentimentPayload::new(parsed.sentiment, topics, similarity);
    if let Some(ai) = parsed.ai_detection.filter(|ai| ai.is_finite()) {
        payload = payload.with_ai_detection(ai);
    }
    if let Some(reasoning) = parsed.reasoning {
        payload = payload.with_reasoning(reasoning);
    }
    Ok(payload)
}

/// 去掉代码块标记，取最外层的一对大括号
fn extract_json_object(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed);

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}
