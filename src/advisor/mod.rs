//! `Advisor` trait: the strategy seam between rule-based and
//! capability-backed logic.
//!
//! Every component talks to one `Arc<dyn Advisor>`. With a provider
//! configured that is an `LlmAdvisor`; without one it is the
//! `RuleBasedAdvisor`, which never fails. Components that have a
//! deterministic equivalent keep a `RuleBasedAdvisor` beside the primary one
//! and fall back to it on any `LlmError`.

pub mod llm;
pub mod rules;

pub use llm::LlmAdvisor;
pub use rules::RuleBasedAdvisor;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::InterviewConfig;
use crate::error::{LlmError, ScenarioError};
use crate::interview::model::ConversationMessage;
use crate::llm::{LlmProvider, TimeoutProvider};
use crate::review::{CompleteProfile, ProfileDraft};
use crate::scenarios::{BranchFocus, FinancingScenario};
use crate::validation::ValidationResult;

/// One contract, two implementations.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Score an answer that already passed the deterministic pre-screen.
    async fn score_answer(
        &self,
        question: &str,
        answer: &str,
        transcript: &[ConversationMessage],
    ) -> Result<ValidationResult, LlmError>;

    /// Message re-asking `question` after a rejected answer.
    async fn repeat_message(&self, question: &str, validation: &ValidationResult) -> Result<String, LlmError>;

    /// Question for zero-based `turn`.
    async fn next_question(&self, transcript: &[ConversationMessage], turn: usize) -> Result<String, LlmError>;

    /// Draft profile from a finished transcript.
    async fn extract_profile(&self, transcript: &[ConversationMessage]) -> Result<ProfileDraft, LlmError>;

    /// Top-level scenarios. Callers validate the batch.
    async fn generate_scenarios(&self, profile: &CompleteProfile) -> Result<Vec<FinancingScenario>, ScenarioError>;

    /// Children of `parent` along `focus`. Callers validate the batch.
    async fn generate_children(
        &self,
        parent: &FinancingScenario,
        profile: &CompleteProfile,
        focus: BranchFocus,
    ) -> Result<Vec<FinancingScenario>, ScenarioError>;
}

/// Pick the strategy: capability-backed when a provider is available.
///
/// Every provider call is bounded by `config.llm_timeout`.
pub fn select_advisor(llm: Option<Arc<dyn LlmProvider>>, config: &InterviewConfig) -> Arc<dyn Advisor> {
    match llm {
        Some(llm) => {
            tracing::info!(
                model = llm.model_name(),
                timeout_secs = config.llm_timeout.as_secs_f64(),
                "Using capability-backed advisor"
            );
            let bounded: Arc<dyn LlmProvider> = Arc::new(TimeoutProvider::new(llm, config.llm_timeout));
            Arc::new(LlmAdvisor::new(bounded).with_required_fields(config.required_fields.clone()))
        }
        None => {
            tracing::info!("No text generation provider configured, using rule-based advisor");
            Arc::new(RuleBasedAdvisor::new(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionRequest, CompletionResponse, FinishReason};

    struct NamedLlm;

    #[async_trait]
    impl LlmProvider for NamedLlm {
        fn model_name(&self) -> &str {
            "named"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                content: String::new(),
                input_tokens: 0,
                output_tokens: 0,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }
    }

    #[test]
    fn selects_by_availability() {
        let config = InterviewConfig::default();
        assert_eq!(select_advisor(None, &config).name(), "rules");
        assert_eq!(select_advisor(Some(Arc::new(NamedLlm)), &config).name(), "named");
    }
}
