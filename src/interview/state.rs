//! Interview state machine tracking which question is outstanding.

use serde::{Deserialize, Serialize};

/// Phases of one interview session.
///
/// `start()` moves `AwaitingFirstQuestion → AwaitingAnswer(1)`; each accepted
/// answer moves `AwaitingAnswer(n) → AwaitingAnswer(n + 1)` until the cap,
/// after which the next accepted answer moves to `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "question")]
pub enum InterviewPhase {
    AwaitingFirstQuestion,
    AwaitingAnswer(u32),
    Complete,
}

impl InterviewPhase {
    /// Check if a transition from `self` to `target` is valid under `max_questions`.
    pub fn can_transition_to(&self, target: InterviewPhase, max_questions: u32) -> bool {
        use InterviewPhase::*;
        match (*self, target) {
            (AwaitingFirstQuestion, AwaitingAnswer(1)) => true,
            (AwaitingAnswer(n), AwaitingAnswer(m)) => m == n + 1 && m <= max_questions,
            (AwaitingAnswer(n), Complete) => n >= max_questions,
            _ => false,
        }
    }

    /// Whether this phase is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Next phase after the outstanding question is answered, if any.
    pub fn next(&self, max_questions: u32) -> Option<InterviewPhase> {
        use InterviewPhase::*;
        match *self {
            AwaitingFirstQuestion => Some(AwaitingAnswer(1)),
            AwaitingAnswer(n) if n >= max_questions => Some(Complete),
            AwaitingAnswer(n) => Some(AwaitingAnswer(n + 1)),
            Complete => None,
        }
    }
}

impl Default for InterviewPhase {
    fn default() -> Self {
        Self::AwaitingFirstQuestion
    }
}

impl std::fmt::Display for InterviewPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingFirstQuestion => write!(f, "awaiting_first_question"),
            Self::AwaitingAnswer(n) => write!(f, "awaiting_answer({n})"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use InterviewPhase::*;
        let transitions = [
            (AwaitingFirstQuestion, AwaitingAnswer(1)),
            (AwaitingAnswer(1), AwaitingAnswer(2)),
            (AwaitingAnswer(4), AwaitingAnswer(5)),
            (AwaitingAnswer(5), Complete),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to, 5), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use InterviewPhase::*;
        // Skip ahead
        assert!(!AwaitingFirstQuestion.can_transition_to(AwaitingAnswer(2), 5));
        assert!(!AwaitingAnswer(1).can_transition_to(AwaitingAnswer(3), 5));
        // Past the cap
        assert!(!AwaitingAnswer(5).can_transition_to(AwaitingAnswer(6), 5));
        // Early completion
        assert!(!AwaitingAnswer(3).can_transition_to(Complete, 5));
        // Backward and out of terminal
        assert!(!AwaitingAnswer(2).can_transition_to(AwaitingAnswer(1), 5));
        assert!(!Complete.can_transition_to(AwaitingAnswer(1), 5));
        assert!(!Complete.can_transition_to(AwaitingFirstQuestion, 5));
    }

    #[test]
    fn next_walks_all_phases() {
        use InterviewPhase::*;
        let mut current = AwaitingFirstQuestion;
        let expected = [
            AwaitingAnswer(1),
            AwaitingAnswer(2),
            AwaitingAnswer(3),
            Complete,
        ];
        for expected_next in expected {
            let next = current.next(3).unwrap();
            assert!(current.can_transition_to(next, 3));
            assert_eq!(next, expected_next);
            current = next;
        }
        assert!(current.is_terminal());
        assert!(current.next(3).is_none());
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_value(InterviewPhase::AwaitingAnswer(2)).unwrap();
        assert_eq!(json, serde_json::json!({"phase": "awaiting_answer", "question": 2}));
        let json = serde_json::to_value(InterviewPhase::Complete).unwrap();
        assert_eq!(json, serde_json::json!({"phase": "complete"}));
    }
}
