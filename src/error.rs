//! Error types for the financing advisor.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Interview error: {0}")]
    Interview(#[from] InterviewError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Text generation capability errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("No text generation provider is configured")]
    NotConfigured,

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} rate limited, retry after {retry_after:?}")]
    RateLimited {
        provider: String,
        retry_after: Option<Duration>,
    },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Interview state machine misuse.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InterviewError {
    #[error("Interview {session_id} was already started")]
    AlreadyStarted { session_id: String },

    #[error("Interview {session_id} has not been started")]
    NotStarted { session_id: String },

    #[error("Interview {session_id} is already complete")]
    AlreadyComplete { session_id: String },
}

/// Session lookup and lifecycle errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Interview session {0} not found")]
    NotFound(String),

    #[error("Interview session {0} is already complete")]
    AlreadyComplete(String),

    #[error("Interview session {0} is not complete yet")]
    NotComplete(String),
}

/// Scenario generation errors, classified so callers can tell
/// "retry later" from "fix configuration" from "cannot use this output".
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("Generation quota exceeded, retry after {retry_after:?}")]
    QuotaExceeded { retry_after: Option<Duration> },

    #[error("Generation provider rejected credentials: {0}")]
    AuthFailure(String),

    #[error("Generated scenarios could not be used: {0}")]
    Parse(String),

    #[error("Generation provider unavailable: {0}")]
    Unavailable(String),

    #[error("Profile is incomplete, missing: {}", missing.join(", "))]
    IncompleteProfile { missing: Vec<String> },
}

impl ScenarioError {
    /// Whether the same request may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. } | Self::Unavailable(_))
    }

    /// Short machine-readable classification.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::QuotaExceeded { .. } => "quota",
            Self::AuthFailure(_) => "auth",
            Self::Parse(_) => "parse",
            Self::Unavailable(_) => "unavailable",
            Self::IncompleteProfile { .. } => "incomplete_profile",
        }
    }
}

impl From<LlmError> for ScenarioError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited { retry_after, .. } => Self::QuotaExceeded { retry_after },
            LlmError::AuthFailed { provider } => Self::AuthFailure(provider),
            LlmError::InvalidResponse { reason, .. } => Self::Parse(reason),
            LlmError::Json(e) => Self::Parse(e.to_string()),
            other @ (LlmError::NotConfigured
            | LlmError::RequestFailed { .. }
            | LlmError::Timeout { .. }) => Self::Unavailable(other.to_string()),
        }
    }
}

/// Result type alias for the advisor.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_maps_to_quota() {
        let err: ScenarioError = LlmError::RateLimited {
            provider: "gemini".into(),
            retry_after: Some(Duration::from_secs(30)),
        }
        .into();
        assert!(matches!(err, ScenarioError::QuotaExceeded { retry_after: Some(d) } if d.as_secs() == 30));
        assert!(err.is_retryable());
        assert_eq!(err.kind(), "quota");
    }

    #[test]
    fn auth_failure_is_not_retryable() {
        let err: ScenarioError = LlmError::AuthFailed {
            provider: "anthropic".into(),
        }
        .into();
        assert_eq!(err.kind(), "auth");
        assert!(!err.is_retryable());
    }

    #[test]
    fn invalid_response_maps_to_parse() {
        let err: ScenarioError = LlmError::InvalidResponse {
            provider: "stub".into(),
            reason: "not json".into(),
        }
        .into();
        assert_eq!(err.kind(), "parse");
    }

    #[test]
    fn timeout_maps_to_unavailable() {
        let err: ScenarioError = LlmError::Timeout {
            provider: "stub".into(),
            timeout: Duration::from_secs(5),
        }
        .into();
        assert_eq!(err.kind(), "unavailable");
        assert!(err.is_retryable());
    }

    #[test]
    fn incomplete_profile_lists_missing_fields() {
        let err = ScenarioError::IncompleteProfile {
            missing: vec!["income".into(), "credit_score".into()],
        };
        assert_eq!(err.to_string(), "Profile is incomplete, missing: income, credit_score");
    }
}
