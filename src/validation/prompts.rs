//! Prompts and response parsing for capability-backed answer scoring.

use serde::Deserialize;

use super::model::ValidationResult;
use crate::error::LlmError;
use crate::interview::model::{ConversationMessage, transcript_text};
use crate::llm::extract::{clean_text_reply, extract_json_object};
use crate::llm::{ChatMessage, CompletionRequest};

/// How many trailing transcript messages are shown to the scorer.
const CONTEXT_MESSAGES: usize = 4;

const VALIDATION_SYSTEM_PROMPT: &str = "\
You are a response validator for a vehicle financing interview.

Your job is to analyze if the user's answer:
1. Actually answers the question asked
2. Is realistic and makes sense
3. Provides useful information for financial assessment

Return ONLY a JSON object:
{
    \"is_valid\": true/false,
    \"is_relevant\": true/false,
    \"quality_score\": 0.0-1.0,
    \"should_accept\": true/false,
    \"issues\": [\"list of issues if any\"],
    \"suggestion\": \"how the user could improve the answer\"
}

Be strict with:
- Off-topic responses
- Nonsensical or joke answers
- Answers that dodge the question

Short answers are fine when they fully answer the question (a number for a budget, a model name for a vehicle question).
Mark should_accept as false if the answer doesn't genuinely address the question.";

/// Build the scoring request for one answer.
pub fn validation_request(
    question: &str,
    answer: &str,
    transcript: &[ConversationMessage],
) -> CompletionRequest {
    let start = transcript.len().saturating_sub(CONTEXT_MESSAGES);
    let context = match transcript_text(&transcript[start..]) {
        text if text.is_empty() => String::new(),
        text => format!("Previous conversation:\n{text}\n\n"),
    };

    CompletionRequest::new(vec![
        ChatMessage::system(VALIDATION_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "{context}Current Question: {question}\n\nUser's Answer: {answer}\n\n\
             Analyze this response and return ONLY a JSON object with the validation results."
        )),
    ])
    .with_max_tokens(400)
    .with_temperature(0.0)
}

#[derive(Debug, Deserialize)]
struct RawValidation {
    is_valid: bool,
    is_relevant: bool,
    quality_score: f32,
    #[serde(default)]
    should_accept: Option<bool>,
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    suggestion: Option<String>,
}

/// Parse the scorer's reply into a `ValidationResult`.
///
/// A reply without the required fields is malformed; callers fall back to
/// the rule-based scorer.
pub fn parse_validation(provider: &str, text: &str) -> Result<ValidationResult, LlmError> {
    let json = extract_json_object(text).ok_or_else(|| LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: "no JSON object in validation reply".to_string(),
    })?;
    let raw: RawValidation = serde_json::from_str(json)?;

    if !raw.quality_score.is_finite() {
        return Err(LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: "quality_score is not a number".to_string(),
        });
    }

    Ok(ValidationResult {
        // An explicit should_accept=false vetoes an otherwise valid answer
        is_valid: raw.is_valid && raw.should_accept.unwrap_or(true),
        is_relevant: raw.is_relevant,
        quality_score: raw.quality_score.clamp(0.0, 1.0),
        issues: raw.issues,
        suggestion: raw.suggestion.filter(|s| !s.trim().is_empty()),
    })
}

/// Build the request for an encouraging restatement of a rejected question.
pub fn repeat_request(question: &str, validation: &ValidationResult) -> CompletionRequest {
    let issues = if validation.issues.is_empty() {
        "the answer was too vague".to_string()
    } else {
        validation.issues.join(", ")
    };

    CompletionRequest::new(vec![ChatMessage::user(format!(
        "The user gave an inadequate answer to this question:\n\"{question}\"\n\n\
         Issues: {issues}\n\n\
         Generate a brief, encouraging message that politely asks them to provide more detail \
         and restates ONLY the original question (don't add prefixes). Keep it concise.\n\n\
         Return ONLY the message text (no quotes)."
    ))])
    .with_max_tokens(150)
    .with_temperature(0.4)
}

/// Clean a generated repeat message. Empty output is malformed.
pub fn parse_repeat(provider: &str, text: &str) -> Result<String, LlmError> {
    let message = clean_text_reply(text);
    if message.is_empty() {
        return Err(LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: "empty repeat message".to_string(),
        });
    }
    Ok(message)
}

/// Fixed re-ask used when no generated message is available.
pub fn fallback_repeat_message(question: &str) -> String {
    format!("Could you provide more detail? {question}")
}
