//! Configuration types.

use std::time::Duration;

use crate::llm::{LlmBackend, LlmConfig};
use crate::review::ProfileField;

/// Questions used when the capability is unavailable, in interview order.
/// Turn `n` uses entry `n`, clamped to the last entry.
pub const DEFAULT_FALLBACK_QUESTIONS: [&str; 5] = [
    "Hi! I'm your financing assistant. To get started, what's your name and what do you do for work?",
    "Thanks! What is your approximate annual income?",
    "What is your current credit score, roughly?",
    "Are you leaning toward leasing or buying your next vehicle?",
    "Which vehicle models or features are you most interested in?",
];

/// The interview's single configuration table: question plan, caps,
/// thresholds, and which profile fields must be filled for completion.
#[derive(Debug, Clone)]
pub struct InterviewConfig {
    /// Number of questions issued before the interview completes.
    pub max_questions: u32,
    /// Deterministic question plan used when the capability is unavailable.
    pub fallback_questions: Vec<String>,
    /// Profile fields that must be populated for a complete profile.
    pub required_fields: Vec<ProfileField>,
    /// Trimmed answers shorter than this are rejected outright.
    pub min_answer_chars: usize,
    /// Minimum quality score for an answer to be valid.
    pub acceptance_threshold: f32,
    /// Deadline applied to every capability call.
    pub llm_timeout: Duration,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            max_questions: 5,
            fallback_questions: DEFAULT_FALLBACK_QUESTIONS.iter().map(|q| q.to_string()).collect(),
            required_fields: ProfileField::DEFAULT_REQUIRED.to_vec(),
            min_answer_chars: 2,
            acceptance_threshold: 0.4,
            llm_timeout: Duration::from_secs(8),
        }
    }
}

impl InterviewConfig {
    /// Fallback question for a zero-based turn, clamped to the last entry.
    pub fn fallback_question(&self, turn: usize) -> &str {
        match self.fallback_questions.len() {
            0 => "Could you tell me more about your vehicle financing needs?",
            len => &self.fallback_questions[turn.min(len - 1)],
        }
    }
}

/// Process-level configuration for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Sessions idle longer than this are reclaimed.
    pub session_idle_timeout: Duration,
    /// `None` when no API key is present: everything runs rule-based.
    pub llm: Option<LlmConfig>,
    pub interview: InterviewConfig,
}

impl ServerConfig {
    /// Read configuration from the environment, defaulting anything missing.
    pub fn from_env() -> Result<Self, crate::error::ConfigError> {
        let port: u16 = std::env::var("AUTO_FINANCE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let idle_minutes: u64 = std::env::var("AUTO_FINANCE_SESSION_IDLE_MIN")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        let timeout_secs: u64 = std::env::var("AUTO_FINANCE_LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8);

        let max_questions: u32 = std::env::var("AUTO_FINANCE_MAX_QUESTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);

        let backend: LlmBackend = match std::env::var("AUTO_FINANCE_LLM_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => LlmBackend::Gemini,
        };

        let llm = std::env::var(backend.api_key_var())
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(|key| LlmConfig {
                backend,
                api_key: secrecy::SecretString::from(key),
                model: std::env::var("AUTO_FINANCE_LLM_MODEL")
                    .unwrap_or_else(|_| backend.default_model().to_string()),
            });

        Ok(Self {
            port,
            session_idle_timeout: Duration::from_secs(idle_minutes * 60),
            llm,
            interview: InterviewConfig {
                max_questions,
                llm_timeout: Duration::from_secs(timeout_secs),
                ..InterviewConfig::default()
            },
        })
    }
}
