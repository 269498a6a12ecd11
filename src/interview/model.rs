//! Transcript and session data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::InterviewPhase;

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    Interviewer,
    User,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interviewer => write!(f, "Interviewer"),
            Self::User => write!(f, "User"),
        }
    }
}

/// One entry of the append-only transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    /// Zero-based position in the transcript.
    pub position: usize,
    pub timestamp: DateTime<Utc>,
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Complete,
}

/// State of one interview. Mutated only by the controller; frozen once
/// `status` is `Complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub session_id: String,
    pub transcript: Vec<ConversationMessage>,
    /// 1-indexed count of questions issued (not answers received).
    pub questions_asked: u32,
    pub max_questions: u32,
    pub current_question: String,
    pub status: SessionStatus,
}

impl InterviewSession {
    /// Create an unstarted session with a fresh opaque id.
    pub fn new(max_questions: u32) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), max_questions)
    }

    pub fn with_id(session_id: impl Into<String>, max_questions: u32) -> Self {
        Self {
            session_id: session_id.into(),
            transcript: Vec::new(),
            questions_asked: 0,
            max_questions,
            current_question: String::new(),
            status: SessionStatus::InProgress,
        }
    }

    /// Current state-machine phase, derived from the counters.
    pub fn phase(&self) -> InterviewPhase {
        match (self.status, self.questions_asked) {
            (SessionStatus::Complete, _) => InterviewPhase::Complete,
            (SessionStatus::InProgress, 0) => InterviewPhase::AwaitingFirstQuestion,
            (SessionStatus::InProgress, n) => InterviewPhase::AwaitingAnswer(n),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == SessionStatus::Complete
    }

    pub(crate) fn push(&mut self, role: MessageRole, content: impl Into<String>) {
        let position = self.transcript.len();
        self.transcript.push(ConversationMessage {
            role,
            content: content.into(),
            position,
            timestamp: Utc::now(),
        });
    }
}

/// Render a transcript as `Role: content` lines for prompts.
pub fn transcript_text(transcript: &[ConversationMessage]) -> String {
    transcript
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pair each user answer with the interviewer message that preceded it.
pub fn question_answer_pairs(transcript: &[ConversationMessage]) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    let mut last_question: Option<&str> = None;
    for message in transcript {
        match message.role {
            MessageRole::Interviewer => last_question = Some(&message.content),
            MessageRole::User => {
                pairs.push((last_question.unwrap_or(""), message.content.as_str()));
            }
        }
    }
    pairs
}
