//! Answer validation: decide whether an answer lets the interview move on.

pub mod model;
pub mod prompts;
pub mod rules;

pub use model::{Decision, ValidationResult};
pub use prompts::fallback_repeat_message;
pub use rules::{QuestionKind, RuleValidator};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::advisor::{Advisor, RuleBasedAdvisor};
use crate::interview::model::ConversationMessage;

/// Validates answers through the configured advisor, falling back to the
/// rule-based scorer whenever the advisor fails.
pub struct AnswerValidator {
    advisor: Arc<dyn Advisor>,
    rules: Arc<RuleBasedAdvisor>,
}

impl AnswerValidator {
    pub fn new(advisor: Arc<dyn Advisor>, rules: Arc<RuleBasedAdvisor>) -> Self {
        Self { advisor, rules }
    }

    /// Score `answer` and decide whether to proceed or re-ask.
    pub async fn validate_and_decide(
        &self,
        question: &str,
        answer: &str,
        transcript: &[ConversationMessage],
    ) -> Decision {
        let validation = match self.rules.validator().pre_screen(answer) {
            Some(rejection) => rejection,
            None => self.score(question, answer, transcript).await,
        };

        let should_proceed = validation.should_proceed();
        if should_proceed {
            info!(quality = validation.quality_score, "Answer accepted");
            return Decision {
                should_proceed,
                validation,
                repeat_message: None,
            };
        }

        info!(
            quality = validation.quality_score,
            issues = ?validation.issues,
            "Answer rejected"
        );
        let repeat_message = self.repeat_message(question, &validation).await;
        Decision {
            should_proceed,
            validation,
            repeat_message: Some(repeat_message),
        }
    }

    async fn score(&self, question: &str, answer: &str, transcript: &[ConversationMessage]) -> ValidationResult {
        match self.advisor.score_answer(question, answer, transcript).await {
            Ok(result) => {
                debug!(advisor = self.advisor.name(), "Answer scored");
                result
            }
            Err(e) => {
                warn!(advisor = self.advisor.name(), error = %e, "Answer scoring failed, using rules");
                self.rules.validator().score(question, answer)
            }
        }
    }

    async fn repeat_message(&self, question: &str, validation: &ValidationResult) -> String {
        match self.advisor.repeat_message(question, validation).await {
            Ok(message) => message,
            Err(e) => {
                warn!(advisor = self.advisor.name(), error = %e, "Repeat message failed, using template");
                fallback_repeat_message(question)
            }
        }
    }
}
