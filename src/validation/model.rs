//! Validation result and accept/reject decision types.

use serde::{Deserialize, Serialize};

/// Outcome of checking one answer against its question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub is_relevant: bool,
    /// Quality in `[0, 1]`.
    pub quality_score: f32,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationResult {
    /// An outright rejection with a single issue.
    pub fn rejected(issue: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            is_relevant: false,
            quality_score: 0.0,
            issues: vec![issue.into()],
            suggestion: Some(suggestion.into()),
        }
    }

    /// A contextual acceptance at `score`.
    pub fn accepted(score: f32) -> Self {
        Self {
            is_valid: true,
            is_relevant: true,
            quality_score: score.clamp(0.0, 1.0),
            issues: Vec::new(),
            suggestion: None,
        }
    }

    /// Whether the interview may move past this answer.
    pub fn should_proceed(&self) -> bool {
        self.is_valid && self.is_relevant
    }

    /// Whether a clarifying follow-up would help even if the answer is kept.
    pub fn should_ask_followup(&self) -> bool {
        self.quality_score < 0.5 || !self.is_relevant
    }
}

/// The validator's accept/reject decision for one answer.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub should_proceed: bool,
    pub validation: ValidationResult,
    /// Present only when the question must be asked again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_message: Option<String>,
}
