//! Interviewer prompt: ask for the single next question.

use std::sync::LazyLock;

use regex::Regex;

use super::model::{ConversationMessage, transcript_text};
use crate::error::LlmError;
use crate::llm::extract::clean_text_reply;
use crate::llm::{ChatMessage, CompletionRequest};
use crate::review::ProfileField;
use crate::review::extract::extract;

const INTERVIEWER_SYSTEM_PROMPT: &str = "\
You are a smart, friendly Toyota Financial Services assistant helping a user find the best way to finance or lease their next Toyota.

You are conducting a conversational interview to learn about the user's financial situation and vehicle preferences.

Keep your question:
- Concise and clear
- Professional yet friendly
- ONE question only, never several in one message
- Natural and conversational; acknowledge the previous answer briefly

Return ONLY the text of the next question.";

/// Bracketed control markers some models append, e.g. `[DONE]`.
static MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[A-Z_ ]+\]").unwrap());

/// Askable topics the transcript has not established yet, most important
/// first: required fields, then `goal`, then optional fields.
pub fn uncovered_topics(transcript: &[ConversationMessage], required: &[ProfileField]) -> Vec<ProfileField> {
    let draft = extract(transcript);
    let mut topics: Vec<ProfileField> = ProfileField::ALL
        .into_iter()
        .filter(|f| !f.is_derived() && !draft.is_populated(*f))
        .collect();
    topics.sort_by_key(|f| priority(*f, required));
    topics
}

fn priority(field: ProfileField, required: &[ProfileField]) -> u8 {
    match field {
        // Derived from income and preferences when never stated
        ProfileField::Goal => 1,
        f if ProfileField::DEFAULT_REQUIRED.contains(&f) || required.contains(&f) => 0,
        _ => 2,
    }
}

/// Build the request for question `turn + 1` (zero-based `turn`).
pub fn next_question_request(
    transcript: &[ConversationMessage],
    turn: usize,
    required: &[ProfileField],
) -> CompletionRequest {
    let uncovered = uncovered_topics(transcript, required);
    let focus = if uncovered.is_empty() {
        "Everything essential is covered; ask what matters most to them in a financing plan.".to_string()
    } else {
        let names: Vec<&str> = uncovered.iter().map(|f| f.as_str()).collect();
        format!(
            "Topics not yet covered, most important first: {}. Ask about the first one that fits the flow of conversation.",
            names.join(", ")
        )
    };

    CompletionRequest::new(vec![
        ChatMessage::system(INTERVIEWER_SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "Conversation so far:\n{}\n\nThis will be question {} of the interview. {focus}",
            transcript_text(transcript),
            turn + 1
        )),
    ])
    .with_max_tokens(200)
    .with_temperature(0.7)
}

/// Clean a generated question. Empty or marker-only output is malformed.
pub fn parse_next_question(provider: &str, text: &str) -> Result<String, LlmError> {
    let stripped = MARKER.replace_all(text, "");
    let question = clean_text_reply(&stripped);
    if question.is_empty() {
        return Err(LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: "no question in interviewer reply".to_string(),
        });
    }
    Ok(question)
}
