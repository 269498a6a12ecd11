//! Capability-backed profile extraction prompt.

use super::model::{ProfileDraft, RawProfile};
use crate::error::LlmError;
use crate::interview::model::{ConversationMessage, transcript_text};
use crate::llm::extract::extract_json_object;
use crate::llm::{ChatMessage, CompletionRequest};

const REVIEWER_SYSTEM_PROMPT: &str = "\
You analyze a vehicle financing interview and extract the user's profile.

Respond with ONE JSON object using exactly these keys. Use null for anything the conversation does not establish; never guess.
- \"bio\": 2-3 sentence summary of the user's background
- \"goal\": the user's primary goal for this vehicle
- \"location\": city and state, if stated
- \"interests\": comma-separated keywords
- \"skills\": comma-separated keywords
- \"title\": current professional title or role
- \"income\": annual income as a number
- \"credit_score\": a number between 300 and 850, or one of excellent/good/fair/poor
- \"preferred_lease_or_buy\": \"lease\" or \"buy\"
- \"vehicle_preferences\": models, body styles and features the user wants
- \"current_vehicle\": the user's current vehicle, if any
- \"payment_simulations\": payment figures discussed, if any
- \"plan_comparisons\": plan comparisons discussed, if any
- \"financial_tips\": financial tips given, if any
- \"suggested_models\": Toyota models that fit the user's budget and lifestyle

Output ONLY the JSON object. No extra text or explanations.";

pub fn profile_request(transcript: &[ConversationMessage]) -> CompletionRequest {
    CompletionRequest::new(vec![
        ChatMessage::system(REVIEWER_SYSTEM_PROMPT),
        ChatMessage::user(format!("Interview transcript:\n{}", transcript_text(transcript))),
    ])
    .with_max_tokens(1200)
    .with_temperature(0.0)
}

/// Parse the extraction reply into a draft. Completeness is decided later
/// against the required-field table, not by the model.
pub fn parse_profile(provider: &str, text: &str) -> Result<ProfileDraft, LlmError> {
    let json = extract_json_object(text).ok_or_else(|| LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: "no JSON object in profile reply".to_string(),
    })?;
    let raw: RawProfile = serde_json::from_str(json)?;
    Ok(raw.into_draft())
}
