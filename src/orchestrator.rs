//! Orchestrator: one session lifecycle from first question to scenarios.
//!
//! validate → advance or re-ask → (on completion) review → generate.
//! Each step runs with the session's lock held, so answers to the same
//! session are processed strictly one at a time.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::advisor::{Advisor, RuleBasedAdvisor, select_advisor};
use crate::config::InterviewConfig;
use crate::error::{Result, ScenarioError, SessionError};
use crate::interview::{ConversationMessage, InterviewController, InterviewSession};
use crate::llm::LlmProvider;
use crate::review::{Profile, ProfileReviewer};
use crate::scenarios::{FinancingScenario, ScenarioGenerator};
use crate::session::{InterviewRecord, SessionStore};
use crate::validation::{AnswerValidator, ValidationResult};

#[derive(Debug, Clone, Serialize)]
pub struct StartResponse {
    pub session_id: String,
    pub question: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerResponse {
    /// The next question, the re-asked question, or `None` once complete.
    pub next_question: Option<String>,
    pub is_complete: bool,
    /// The same question is being asked again; progress did not move.
    pub is_followup: bool,
    /// The answer was weak or off-topic; a clarifying question would help.
    pub needs_followup: bool,
    pub validation: ValidationResult,
    pub progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Profile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<FinancingScenario>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsResponse {
    pub analysis: Profile,
    pub recommendations: Vec<FinancingScenario>,
    pub conversation: Vec<ConversationMessage>,
}

pub struct Orchestrator {
    config: InterviewConfig,
    store: Arc<dyn SessionStore>,
    advisor: Arc<dyn Advisor>,
    rules: Arc<RuleBasedAdvisor>,
    validator: AnswerValidator,
    reviewer: ProfileReviewer,
    generator: ScenarioGenerator,
}

impl Orchestrator {
    /// Wire the components, capability-backed when `llm` is present.
    pub fn new(config: InterviewConfig, llm: Option<Arc<dyn LlmProvider>>, store: Arc<dyn SessionStore>) -> Self {
        let advisor = select_advisor(llm, &config);
        Self::with_advisor(config, advisor, store)
    }

    pub fn with_advisor(config: InterviewConfig, advisor: Arc<dyn Advisor>, store: Arc<dyn SessionStore>) -> Self {
        let rules = Arc::new(RuleBasedAdvisor::new(&config));
        Self {
            validator: AnswerValidator::new(advisor.clone(), rules.clone()),
            reviewer: ProfileReviewer::new(advisor.clone(), config.required_fields.clone()),
            generator: ScenarioGenerator::new(advisor.clone()),
            config,
            store,
            advisor,
            rules,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn generator(&self) -> &ScenarioGenerator {
        &self.generator
    }

    /// Create a session and issue its first question.
    pub async fn start_interview(&self) -> Result<StartResponse> {
        let mut controller = InterviewController::new(
            InterviewSession::new(self.config.max_questions),
            self.advisor.clone(),
            self.rules.clone(),
        );
        let question = controller.start()?;
        let session_id = controller.session_id().to_string();
        self.store.create(InterviewRecord::new(controller)).await;
        Ok(StartResponse { session_id, question })
    }

    /// Validate one answer and advance, re-ask, or finish.
    pub async fn submit_answer(&self, session_id: &str, answer: &str) -> Result<AnswerResponse> {
        let handle = self.store.get(session_id).await?;
        let mut record = handle.lock().await;
        if record.controller.session().is_complete() {
            return Err(SessionError::AlreadyComplete(session_id.to_string()).into());
        }
        record.touch();

        let question = record.controller.session().current_question.clone();
        let decision = self
            .validator
            .validate_and_decide(&question, answer, &record.controller.session().transcript)
            .await;
        record.validation_history.push(decision.validation.clone());

        if !decision.should_proceed {
            let repeat = decision
                .repeat_message
                .unwrap_or_else(|| crate::validation::fallback_repeat_message(&question));
            record.controller.reask(&repeat)?;
            return Ok(AnswerResponse {
                next_question: Some(repeat),
                is_complete: false,
                is_followup: true,
                needs_followup: decision.validation.should_ask_followup(),
                validation: decision.validation,
                progress: progress(record.controller.session()),
                analysis: None,
                recommendations: None,
            });
        }

        let next_question = record.controller.advance(answer).await?;
        if next_question.is_some() {
            return Ok(AnswerResponse {
                next_question,
                is_complete: false,
                is_followup: false,
                needs_followup: decision.validation.should_ask_followup(),
                validation: decision.validation,
                progress: progress(record.controller.session()),
                analysis: None,
                recommendations: None,
            });
        }

        let profile = self.reviewer.review(&record.controller.session().transcript).await;
        record.analysis = Some(profile.clone());
        if profile.is_complete() {
            record.recommendations = self.generator.generate(&profile).await?;
        } else {
            warn!(session_id, missing = ?profile.missing_topics(), "Interview finished without a complete profile");
        }
        info!(session_id, scenarios = record.recommendations.len(), "Interview results ready");

        Ok(AnswerResponse {
            next_question: None,
            is_complete: true,
            is_followup: false,
            needs_followup: decision.validation.should_ask_followup(),
            validation: decision.validation,
            progress: progress(record.controller.session()),
            analysis: Some(profile),
            recommendations: Some(record.recommendations.clone()),
        })
    }

    /// Final analysis and scenarios. Retries generation if it failed earlier.
    pub async fn get_results(&self, session_id: &str) -> Result<ResultsResponse> {
        let handle = self.store.get(session_id).await?;
        let mut record = handle.lock().await;
        if !record.controller.session().is_complete() {
            return Err(SessionError::NotComplete(session_id.to_string()).into());
        }
        record.touch();

        let profile = match record.analysis.clone() {
            Some(profile) => profile,
            None => {
                let profile = self.reviewer.review(&record.controller.session().transcript).await;
                record.analysis = Some(profile.clone());
                profile
            }
        };
        if profile.is_complete() && record.recommendations.is_empty() {
            info!(session_id, "Retrying scenario generation");
            record.recommendations = self.generator.generate(&profile).await?;
        }

        Ok(ResultsResponse {
            analysis: profile,
            recommendations: record.recommendations.clone(),
            conversation: record.controller.session().transcript.clone(),
        })
    }

    /// Three children of `parent` for `branch_level` (clamped to 1..=10).
    pub async fn expand(
        &self,
        parent: &FinancingScenario,
        profile: &Profile,
        branch_level: i64,
    ) -> std::result::Result<Vec<FinancingScenario>, ScenarioError> {
        self.generator.generate_children(parent, profile, branch_level).await
    }
}

fn progress(session: &InterviewSession) -> Progress {
    Progress {
        current: session.questions_asked,
        total: session.max_questions,
    }
}
