//! Capability-backed advisor: every call is a prompt plus a strict parse.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::Advisor;
use crate::error::{LlmError, ScenarioError};
use crate::interview::model::ConversationMessage;
use crate::interview::prompts::{next_question_request, parse_next_question};
use crate::llm::{CompletionRequest, LlmProvider};
use crate::review::{CompleteProfile, ProfileDraft, ProfileField};
use crate::review::prompts::{parse_profile, profile_request};
use crate::scenarios::model::parse_batch;
use crate::scenarios::prompts::{children_request, top_level_request};
use crate::scenarios::{BranchFocus, CHILD_BATCH_SIZE, FinancingScenario, TOP_LEVEL_BATCH_SIZE};
use crate::validation::ValidationResult;
use crate::validation::prompts::{parse_repeat, parse_validation, repeat_request, validation_request};

pub struct LlmAdvisor {
    llm: Arc<dyn LlmProvider>,
    /// Fields the interviewer prompt steers toward first.
    required_fields: Vec<ProfileField>,
}

impl LlmAdvisor {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            llm,
            required_fields: ProfileField::DEFAULT_REQUIRED.to_vec(),
        }
    }

    pub fn with_required_fields(mut self, fields: Vec<ProfileField>) -> Self {
        self.required_fields = fields;
        self
    }

    async fn ask(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let response = self.llm.complete(request).await?;
        debug!(
            model = self.llm.model_name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Completion received"
        );
        Ok(response.content)
    }
}

#[async_trait]
impl Advisor for LlmAdvisor {
    fn name(&self) -> &str {
        self.llm.model_name()
    }

    async fn score_answer(
        &self,
        question: &str,
        answer: &str,
        transcript: &[ConversationMessage],
    ) -> Result<ValidationResult, LlmError> {
        let text = self.ask(validation_request(question, answer, transcript)).await?;
        parse_validation(self.llm.model_name(), &text)
    }

    async fn repeat_message(&self, question: &str, validation: &ValidationResult) -> Result<String, LlmError> {
        let text = self.ask(repeat_request(question, validation)).await?;
        parse_repeat(self.llm.model_name(), &text)
    }

    async fn next_question(&self, transcript: &[ConversationMessage], turn: usize) -> Result<String, LlmError> {
        let text = self.ask(next_question_request(transcript, turn, &self.required_fields)).await?;
        parse_next_question(self.llm.model_name(), &text)
    }

    async fn extract_profile(&self, transcript: &[ConversationMessage]) -> Result<ProfileDraft, LlmError> {
        let text = self.ask(profile_request(transcript)).await?;
        parse_profile(self.llm.model_name(), &text)
    }

    async fn generate_scenarios(&self, profile: &CompleteProfile) -> Result<Vec<FinancingScenario>, ScenarioError> {
        let text = self.ask(top_level_request(profile)).await?;
        parse_batch(&text, TOP_LEVEL_BATCH_SIZE, true)
    }

    async fn generate_children(
        &self,
        parent: &FinancingScenario,
        profile: &CompleteProfile,
        focus: BranchFocus,
    ) -> Result<Vec<FinancingScenario>, ScenarioError> {
        let text = self.ask(children_request(parent, profile, focus)).await?;
        parse_batch(&text, CHILD_BATCH_SIZE, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::model::{InterviewSession, MessageRole};
    use crate::llm::{CompletionResponse, FinishReason};
    use std::sync::Mutex;

    /// Replies with `reply` and remembers the last prompt.
    struct ScriptedLlm {
        reply: String,
        last_system: Mutex<Option<String>>,
        last_user: Mutex<Option<String>>,
    }

    impl ScriptedLlm {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                last_system: Mutex::new(None),
                last_user: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedLlm {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            *self.last_system.lock().unwrap() = request.system_prompt().map(str::to_string);
            *self.last_user.lock().unwrap() = request.messages.last().map(|m| m.content.clone());
            Ok(CompletionResponse {
                content: self.reply.clone(),
                input_tokens: 10,
                output_tokens: 5,
                finish_reason: FinishReason::Stop,
                response_id: None,
            })
        }
    }

    struct DownLlm;

    #[async_trait]
    impl LlmProvider for DownLlm {
        fn model_name(&self) -> &str {
            "down"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            Err(LlmError::RequestFailed {
                provider: "down".into(),
                reason: "connection refused".into(),
            })
        }
    }

    #[tokio::test]
    async fn scores_with_validator_prompt() {
        let llm = Arc::new(ScriptedLlm::new(
            r#"{"is_valid": true, "is_relevant": true, "quality_score": 0.9, "should_accept": true, "issues": []}"#,
        ));
        let advisor = LlmAdvisor::new(llm.clone());
        let result = advisor.score_answer("What is your income?", "$95,000", &[]).await.unwrap();
        assert!(result.should_proceed());
        let system = llm.last_system.lock().unwrap().clone().unwrap();
        assert!(system.contains("response validator"));
    }

    #[tokio::test]
    async fn next_question_is_cleaned() {
        let advisor = LlmAdvisor::new(Arc::new(ScriptedLlm::new("\"What is your credit score?\"")));
        assert_eq!(advisor.next_question(&[], 2).await.unwrap(), "What is your credit score?");
    }

    #[tokio::test]
    async fn interviewer_prompt_targets_required_topics() {
        let llm = Arc::new(ScriptedLlm::new("What is your approximate annual income?"));
        let advisor = LlmAdvisor::new(llm.clone());
        let mut session = InterviewSession::with_id("s", 5);
        session.push(MessageRole::Interviewer, "What's your name and what do you do for work?");
        session.push(MessageRole::User, "My name is Jane Doe and I work as a nurse");

        advisor.next_question(&session.transcript, 1).await.unwrap();
        let prompt = llm.last_user.lock().unwrap().clone().unwrap();
        assert!(prompt.contains(
            "most important first: income, credit_score, preferred_lease_or_buy, vehicle_preferences, goal,"
        ));
    }

    #[tokio::test]
    async fn configured_required_fields_lead_the_prompt() {
        let llm = Arc::new(ScriptedLlm::new("Where do you live?"));
        let advisor = LlmAdvisor::new(llm.clone()).with_required_fields(vec![ProfileField::Location]);
        advisor.next_question(&[], 0).await.unwrap();
        let prompt = llm.last_user.lock().unwrap().clone().unwrap();
        let location = prompt.find("location").unwrap();
        let goal = prompt.find("goal").unwrap();
        assert!(location < goal);
    }

    #[tokio::test]
    async fn provider_errors_pass_through() {
        let advisor = LlmAdvisor::new(Arc::new(DownLlm));
        assert!(matches!(
            advisor.repeat_message("Q?", &ValidationResult::rejected("x", "y")).await,
            Err(LlmError::RequestFailed { .. })
        ));
    }
}
