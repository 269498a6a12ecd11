//! Interview controller: owns one session's transcript and question counter.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::model::{InterviewSession, MessageRole, SessionStatus};
use super::state::InterviewPhase;
use crate::advisor::{Advisor, RuleBasedAdvisor};
use crate::error::InterviewError;

pub struct InterviewController {
    session: InterviewSession,
    advisor: Arc<dyn Advisor>,
    rules: Arc<RuleBasedAdvisor>,
}

impl InterviewController {
    pub fn new(session: InterviewSession, advisor: Arc<dyn Advisor>, rules: Arc<RuleBasedAdvisor>) -> Self {
        Self { session, advisor, rules }
    }

    pub fn session(&self) -> &InterviewSession {
        &self.session
    }

    pub fn session_id(&self) -> &str {
        &self.session.session_id
    }

    pub fn phase(&self) -> InterviewPhase {
        self.session.phase()
    }

    /// Issue the first question. A session can only be started once.
    pub fn start(&mut self) -> Result<String, InterviewError> {
        let phase = self.phase();
        if phase != InterviewPhase::AwaitingFirstQuestion {
            return Err(InterviewError::AlreadyStarted {
                session_id: self.session.session_id.clone(),
            });
        }
        let question = self.rules.question_for(0).to_string();
        self.ask(phase, question.clone());
        info!(session_id = %self.session.session_id, "Interview started");
        Ok(question)
    }

    /// Record an accepted answer and issue the next question, or `None` when
    /// the question cap has been reached.
    pub async fn advance(&mut self, answer: &str) -> Result<Option<String>, InterviewError> {
        let phase = self.check_awaiting_answer()?;
        self.session.push(MessageRole::User, answer.trim());

        match phase.next(self.session.max_questions) {
            Some(InterviewPhase::Complete) | None => {
                self.session.status = SessionStatus::Complete;
                info!(
                    session_id = %self.session.session_id,
                    questions = self.session.questions_asked,
                    "Interview complete"
                );
                Ok(None)
            }
            Some(_) => {
                let question = self.next_question().await;
                self.ask(phase, question.clone());
                Ok(Some(question))
            }
        }
    }

    /// Re-ask the outstanding question. Counters do not move.
    pub fn reask(&mut self, message: &str) -> Result<(), InterviewError> {
        self.check_awaiting_answer()?;
        self.session.push(MessageRole::Interviewer, message);
        debug!(session_id = %self.session.session_id, "Question re-asked");
        Ok(())
    }

    fn check_awaiting_answer(&self) -> Result<InterviewPhase, InterviewError> {
        let session_id = || self.session.session_id.clone();
        match self.phase() {
            InterviewPhase::AwaitingFirstQuestion => Err(InterviewError::NotStarted {
                session_id: session_id(),
            }),
            InterviewPhase::Complete => Err(InterviewError::AlreadyComplete {
                session_id: session_id(),
            }),
            phase @ InterviewPhase::AwaitingAnswer(_) => Ok(phase),
        }
    }

    async fn next_question(&self) -> String {
        let turn = self.session.questions_asked as usize;
        match self.advisor.next_question(&self.session.transcript, turn).await {
            Ok(question) => question,
            Err(e) => {
                warn!(
                    session_id = %self.session.session_id,
                    advisor = self.advisor.name(),
                    error = %e,
                    "Next question failed, using fallback"
                );
                self.rules.question_for(turn).to_string()
            }
        }
    }

    fn ask(&mut self, from: InterviewPhase, question: String) {
        let to = InterviewPhase::AwaitingAnswer(self.session.questions_asked + 1);
        debug_assert!(from.can_transition_to(to, self.session.max_questions.max(1)));
        self.session.push(MessageRole::Interviewer, question.as_str());
        self.session.questions_asked += 1;
        self.session.current_question = question;
    }
}
