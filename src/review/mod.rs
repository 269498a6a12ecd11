//! Profile review: turn a finished transcript into a `Profile`.

pub mod coerce;
pub mod extract;
pub mod model;
pub mod prompts;

pub use model::{CompleteProfile, CreditBand, CreditScore, LeaseOrBuy, Profile, ProfileDraft, ProfileField, RawProfile};

use std::sync::Arc;

use tracing::{info, warn};

use crate::advisor::Advisor;
use crate::interview::model::ConversationMessage;

/// Builds profiles from transcripts.
///
/// The advisor's draft is merged with the deterministic extraction, so the
/// capability can add detail but never loses a field the rules can find.
pub struct ProfileReviewer {
    advisor: Arc<dyn Advisor>,
    required_fields: Vec<ProfileField>,
}

impl ProfileReviewer {
    pub fn new(advisor: Arc<dyn Advisor>, required_fields: Vec<ProfileField>) -> Self {
        Self {
            advisor,
            required_fields,
        }
    }

    pub async fn review(&self, transcript: &[ConversationMessage]) -> Profile {
        let rule_draft = extract::extract(transcript);
        let mut draft = match self.advisor.extract_profile(transcript).await {
            Ok(draft) => draft,
            Err(e) => {
                warn!(advisor = self.advisor.name(), error = %e, "Profile extraction failed, using rules");
                ProfileDraft::default()
            }
        };
        draft.fill_from(rule_draft);
        extract::derive_advisory(&mut draft);

        let profile = draft.finish(&self.required_fields);
        match &profile {
            Profile::Complete(p) => info!(tier = %p.credit_tier(), "Profile complete"),
            Profile::Incomplete { missing_topics, .. } => {
                info!(missing = ?missing_topics, "Profile incomplete");
            }
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::{LlmAdvisor, RuleBasedAdvisor};
    use crate::config::InterviewConfig;
    use crate::error::LlmError;
    use crate::interview::model::{InterviewSession, MessageRole};
    use crate::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;

    fn jane() -> Vec<ConversationMessage> {
        let config = InterviewConfig::default();
        let answers = [
            "My name is Jane Doe",
            "$95,000",
            "720",
            "buy",
            "Camry Hybrid, fuel efficiency",
        ];
        let mut session = InterviewSession::with_id("s", 5);
        for (turn, answer) in answers.iter().enumerate() {
            session.push(MessageRole::Interviewer, config.fallback_question(turn));
            session.push(MessageRole::User, *answer);
        }
        session.transcript
    }

    fn rule_reviewer() -> ProfileReviewer {
        let config = InterviewConfig::default();
        ProfileReviewer::new(Arc::new(RuleBasedAdvisor::new(&config)), config.required_fields)
    }

    struct ReplyLlm(&'static str);

    #[async_trait]
    impl LlmProvider for ReplyLlm {
        fn model_name(&self) -> &str {
            "reply"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: self.0.to_string(),
                input_tokens: 0,
                output_tokens: 0,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }
    }

    #[tokio::test]
    async fn rules_complete_full_interview() {
        let profile = rule_reviewer().review(&jane()).await;
        let complete = profile.as_complete().expect("complete profile");
        assert_eq!(complete.income, dec!(95000));
        assert_eq!(complete.credit_score, CreditScore::Score(720));
        assert_eq!(complete.preferred_lease_or_buy, LeaseOrBuy::Buy);
        assert!(complete.suggested_models.starts_with("Toyota Camry Hybrid"));
    }

    #[tokio::test]
    async fn review_is_idempotent() {
        let reviewer = rule_reviewer();
        assert_eq!(reviewer.review(&jane()).await, reviewer.review(&jane()).await);
    }

    #[tokio::test]
    async fn short_transcript_is_incomplete() {
        let transcript = &jane()[..4];
        let profile = rule_reviewer().review(transcript).await;
        assert!(!profile.is_complete());
        assert!(profile.missing_topics().contains(&"credit_score".to_string()));
    }

    #[tokio::test]
    async fn capability_draft_wins_where_present() {
        let llm = ReplyLlm(r#"{"bio": "Jane Doe is a nurse in Austin.", "income": "not discussed", "location": "Austin, TX"}"#);
        let config = InterviewConfig::default();
        let reviewer = ProfileReviewer::new(Arc::new(LlmAdvisor::new(Arc::new(llm))), config.required_fields);
        let profile = reviewer.review(&jane()).await;
        let complete = profile.as_complete().expect("complete profile");
        assert_eq!(complete.bio, "Jane Doe is a nurse in Austin.");
        assert_eq!(complete.location.as_deref(), Some("Austin, TX"));
        // Unparseable capability income is filled from the transcript
        assert_eq!(complete.income, dec!(95000));
    }

    #[tokio::test]
    async fn malformed_capability_reply_falls_back() {
        let config = InterviewConfig::default();
        let reviewer = ProfileReviewer::new(
            Arc::new(LlmAdvisor::new(Arc::new(ReplyLlm("I cannot help with that.")))),
            config.required_fields,
        );
        assert!(reviewer.review(&jane()).await.is_complete());
    }
}
