//! Deterministic advisor. Every method succeeds.

use async_trait::async_trait;

use super::Advisor;
use crate::config::InterviewConfig;
use crate::error::{LlmError, ScenarioError};
use crate::interview::model::ConversationMessage;
use crate::review::{CompleteProfile, ProfileDraft, extract};
use crate::scenarios::{BranchFocus, FinancingScenario, rules};
use crate::validation::{RuleValidator, ValidationResult, fallback_repeat_message};

pub struct RuleBasedAdvisor {
    validator: RuleValidator,
    config: InterviewConfig,
}

impl RuleBasedAdvisor {
    pub fn new(config: &InterviewConfig) -> Self {
        Self {
            validator: RuleValidator::new(config.min_answer_chars, config.acceptance_threshold),
            config: config.clone(),
        }
    }

    pub fn validator(&self) -> &RuleValidator {
        &self.validator
    }

    /// Fallback question for `turn`, clamped to the last entry.
    pub fn question_for(&self, turn: usize) -> &str {
        self.config.fallback_question(turn)
    }
}

#[async_trait]
impl Advisor for RuleBasedAdvisor {
    fn name(&self) -> &str {
        "rules"
    }

    async fn score_answer(
        &self,
        question: &str,
        answer: &str,
        _transcript: &[ConversationMessage],
    ) -> Result<ValidationResult, LlmError> {
        Ok(self.validator.score(question, answer))
    }

    async fn repeat_message(&self, question: &str, _validation: &ValidationResult) -> Result<String, LlmError> {
        Ok(fallback_repeat_message(question))
    }

    async fn next_question(&self, _transcript: &[ConversationMessage], turn: usize) -> Result<String, LlmError> {
        Ok(self.question_for(turn).to_string())
    }

    async fn extract_profile(&self, transcript: &[ConversationMessage]) -> Result<ProfileDraft, LlmError> {
        Ok(extract::extract(transcript))
    }

    async fn generate_scenarios(&self, profile: &CompleteProfile) -> Result<Vec<FinancingScenario>, ScenarioError> {
        Ok(rules::top_level(profile))
    }

    async fn generate_children(
        &self,
        parent: &FinancingScenario,
        profile: &CompleteProfile,
        focus: BranchFocus,
    ) -> Result<Vec<FinancingScenario>, ScenarioError> {
        Ok(rules::children(parent, profile, focus))
    }
}
