//! Rule-based answer validation.
//!
//! Runs in four steps, each able to short-circuit the rest:
//! 1. empty or too-short answers → reject
//! 2. filler non-answers ("idk", "ok", greetings) → reject
//! 3. answers whose shape fits the question class (a digit for a budget
//!    question, a body style for a vehicle question) → accept
//! 4. general scoring on length, overlap with the question, and domain vocabulary

use tracing::debug;

use super::model::ValidationResult;
use crate::text::{has_any, has_digit, words};

/// Answers that never answer anything, compared trimmed and lower-cased.
pub const FILLER_ANSWERS: &[&str] = &[
    "hi", "hello", "hey", "sup", "yo", "idk", "i don't know", "dunno", "n/a", "none", "nothing",
    "ok", "okay", "fine", "whatever",
];

pub const VEHICLE_TYPES: &[&str] = &[
    "sedan", "suv", "truck", "van", "coupe", "hatchback", "crossover", "minivan", "hybrid",
    "electric", "camry", "corolla", "rav4", "tacoma", "highlander", "4runner", "tundra", "sienna",
    "prius", "avalon", "chr", "bz4x",
];

pub const OWNERSHIP_TOKENS: &[&str] = &["lease", "leasing", "buy", "buying", "purchase", "finance", "financing", "own"];

const TIME_KEYWORDS: &[&str] = &[
    "today", "tomorrow", "soon", "asap", "immediately", "now", "later", "week", "month", "year",
    "day", "next", "this", "within", "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december", "spring", "summer", "fall",
    "winter",
];

pub const EMPLOYMENT_KEYWORDS: &[&str] = &[
    "employed", "student", "work", "job", "business", "income", "salary", "self-employed",
    "freelance", "retired", "unemployed", "engineer", "teacher", "nurse", "manager", "developer",
    "doctor", "lawyer",
];

const YES_NO_TOKENS: &[&str] = &["yes", "no", "yeah", "nope", "yep", "nah"];

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "what", "how", "do", "you", "your", "my", "i", "in", "for",
    "to", "and", "or", "of", "what's", "which", "with",
];

const FINANCIAL_KEYWORDS: &[&str] = &[
    "job", "work", "income", "salary", "employed", "student", "business", "freelance",
    "self-employed", "credit", "score", "savings",
];

const VEHICLE_CONTEXT: &[&str] = &["car", "drive", "commute", "toyota", "honda", "ford", "lease", "buy"];

const BUDGET_KEYWORDS: &[&str] = &["budget", "afford", "payment", "monthly", "price", "cost", "dollar", "thousand"];

/// Question classes whose answers may legitimately be short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Budget,
    VehicleType,
    Timeline,
    EmploymentFinancial,
    YesNo,
}

impl QuestionKind {
    const ALL: [QuestionKind; 5] = [
        Self::Budget,
        Self::VehicleType,
        Self::Timeline,
        Self::EmploymentFinancial,
        Self::YesNo,
    ];

    fn question_keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Budget => &["budget", "payment", "monthly", "afford", "spend"],
            Self::VehicleType => &["vehicle", "car", "type", "model", "interested in", "lease", "leasing", "buy", "buying"],
            Self::Timeline => &["when", "timeline", "time", "purchase", "looking to"],
            Self::EmploymentFinancial => &[
                "employment", "work", "job", "income", "financial", "situation", "credit", "salary", "earn",
            ],
            Self::YesNo => &["have you", "do you", "are you", "will you", "did you"],
        }
    }

    /// Score given to an answer accepted by shape alone.
    fn shortcut_score(&self) -> f32 {
        match self {
            Self::Budget | Self::VehicleType => 0.7,
            Self::Timeline | Self::EmploymentFinancial => 0.65,
            Self::YesNo => 0.6,
        }
    }

    /// Whether `answer` has the shape this question class expects.
    fn accepts(&self, answer: &str) -> bool {
        let lower = answer.trim().to_lowercase();
        match self {
            Self::Budget => has_digit(answer),
            Self::VehicleType => has_any(answer, VEHICLE_TYPES) || has_any(answer, OWNERSHIP_TOKENS),
            Self::Timeline => {
                has_any(answer, TIME_KEYWORDS)
                    || has_digit(answer)
                    || (words(answer).len() == 1 && lower.chars().count() > 2)
            }
            Self::EmploymentFinancial => has_any(answer, EMPLOYMENT_KEYWORDS) || has_digit(answer),
            Self::YesNo => YES_NO_TOKENS.contains(&lower.as_str()),
        }
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Budget => "budget",
            Self::VehicleType => "vehicle_type",
            Self::Timeline => "timeline",
            Self::EmploymentFinancial => "employment_financial",
            Self::YesNo => "yes_no",
        };
        write!(f, "{s}")
    }
}

/// Every class whose keywords appear in the question, in priority order.
pub fn classify(question: &str) -> Vec<QuestionKind> {
    QuestionKind::ALL
        .into_iter()
        .filter(|kind| has_any(question, kind.question_keywords()))
        .collect()
}

/// Deterministic validator. Same input always yields the same result.
#[derive(Debug, Clone)]
pub struct RuleValidator {
    min_answer_chars: usize,
    acceptance_threshold: f32,
}

impl Default for RuleValidator {
    fn default() -> Self {
        Self {
            min_answer_chars: 2,
            acceptance_threshold: 0.4,
        }
    }
}

impl RuleValidator {
    pub fn new(min_answer_chars: usize, acceptance_threshold: f32) -> Self {
        Self {
            min_answer_chars,
            acceptance_threshold,
        }
    }

    /// Steps 1–2: rejections that hold no matter which scorer runs next.
    pub fn pre_screen(&self, answer: &str) -> Option<ValidationResult> {
        let trimmed = answer.trim();

        if trimmed.chars().count() < self.min_answer_chars {
            return Some(ValidationResult::rejected(
                "Answer is too short or empty",
                "Please provide a more detailed answer to help us understand your needs.",
            ));
        }

        let lowered = trimmed.to_lowercase();
        if FILLER_ANSWERS.contains(&lowered.as_str()) {
            return Some(ValidationResult::rejected(
                format!("'{trimmed}' does not answer the question"),
                "Please provide a meaningful answer to the question.",
            ));
        }

        None
    }

    /// Step 3: accept short answers whose shape fits the question class.
    pub fn contextual(&self, question: &str, answer: &str) -> Option<ValidationResult> {
        let kind = classify(question).into_iter().find(|kind| kind.accepts(answer))?;
        debug!(kind = %kind, answer, "Accepting answer by question context");
        Some(ValidationResult::accepted(kind.shortcut_score()))
    }

    /// Step 4: general scoring for answers no shortcut covered.
    pub fn general(&self, question: &str, answer: &str) -> ValidationResult {
        let answer_words = words(answer);
        let word_count = answer_words.len();

        if word_count < 2 {
            return ValidationResult {
                is_valid: false,
                is_relevant: false,
                quality_score: 0.1,
                issues: vec!["Answer is too brief to be meaningful".to_string()],
                suggestion: Some("Please provide more details in your answer.".to_string()),
            };
        }

        if word_count == 2 {
            return ValidationResult {
                is_valid: false,
                is_relevant: true,
                quality_score: 0.3,
                issues: vec!["Answer needs more detail".to_string()],
                suggestion: Some(
                    "Could you provide a bit more detail? This will help us give you better recommendations."
                        .to_string(),
                ),
            };
        }

        let mut issues = Vec::new();
        let mut score: f32 = 0.5;

        if word_count >= 5 {
            score += 0.2;
        }

        let question_words = words(question);
        let overlap = answer_words.iter().any(|w| {
            w.chars().count() > 2 && !STOP_WORDS.contains(&w.as_str()) && question_words.contains(w)
        });
        if overlap {
            score += 0.1;
        } else {
            score -= 0.1;
            issues.push("Answer might not be related to the question".to_string());
        }

        let has_context = has_any(answer, FINANCIAL_KEYWORDS)
            || has_any(answer, VEHICLE_TYPES)
            || has_any(answer, VEHICLE_CONTEXT)
            || has_any(answer, BUDGET_KEYWORDS)
            || answer.contains('$');
        if has_context {
            score += 0.2;
        }

        let quality_score = score.clamp(0.0, 1.0);
        let is_relevant = overlap || has_context || word_count >= 3;
        let is_valid = quality_score >= self.acceptance_threshold && is_relevant;

        ValidationResult {
            is_valid,
            is_relevant,
            quality_score,
            issues,
            suggestion: (!is_valid).then(|| {
                "Could you provide a bit more detail? This helps us give you better recommendations."
                    .to_string()
            }),
        }
    }

    /// All four steps in order.
    pub fn validate(&self, question: &str, answer: &str) -> ValidationResult {
        if let Some(rejection) = self.pre_screen(answer) {
            return rejection;
        }
        self.score(question, answer)
    }

    /// Steps 3–4 only; callers must have run `pre_screen` already.
    pub fn score(&self, question: &str, answer: &str) -> ValidationResult {
        self.contextual(question, answer)
            .unwrap_or_else(|| self.general(question, answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> RuleValidator {
        RuleValidator::default()
    }

    #[test]
    fn empty_and_single_char_rejected() {
        for answer in ["", "   ", "x"] {
            let r = validator().validate("What's your name?", answer);
            assert!(!r.is_valid, "{answer:?} should be rejected");
            assert_eq!(r.quality_score, 0.0);
        }
    }

    #[test]
    fn filler_rejected_regardless_of_question() {
        let questions = [
            "What's your monthly budget?",
            "Which vehicle are you interested in?",
            "Do you have a trade-in?",
            "When are you looking to purchase?",
        ];
        for q in questions {
            for answer in ["hi", "Hello", " OK ", "idk", "N/A", "whatever", "I don't know"] {
                let r = validator().validate(q, answer);
                assert!(!r.should_proceed(), "{answer:?} to {q:?} should be rejected");
                assert_eq!(r.quality_score, 0.0);
            }
        }
    }

    #[test]
    fn budget_digit_shortcut() {
        let r = validator().validate("What's your monthly budget?", "500");
        assert!(r.should_proceed());
        assert!(r.quality_score >= 0.6);
    }

    #[test]
    fn vehicle_type_shortcut() {
        let r = validator().validate("Which vehicle type do you prefer?", "SUV");
        assert!(r.should_proceed());
        assert!((r.quality_score - 0.7).abs() < 1e-6);

        let r = validator().validate("Are you leaning toward leasing or buying your next vehicle?", "buy");
        assert!(r.should_proceed());
    }

    #[test]
    fn timeline_shortcuts() {
        let v = validator();
        assert!(v.validate("When are you looking to purchase?", "soon").should_proceed());
        assert!(v.validate("When are you looking to purchase?", "in 3 months").should_proceed());
        assert!(v.validate("What's your timeline?", "Christmas").should_proceed());
    }

    #[test]
    fn employment_and_credit_shortcuts() {
        let v = validator();
        assert!(v.validate("What's your approximate annual income?", "$95,000").should_proceed());
        assert!(v.validate("What is your current credit score?", "720").should_proceed());
        assert!(v.validate("What do you do for work?", "nurse").should_proceed());
    }

    #[test]
    fn yes_no_shortcut() {
        let r = validator().validate("Do you have a trade-in?", "yes");
        assert!(r.should_proceed());
        assert!((r.quality_score - 0.6).abs() < 1e-6);
    }

    #[test]
    fn single_word_without_context_rejected() {
        let r = validator().validate("What's your name?", "Jane");
        assert!(!r.should_proceed());
        assert_eq!(r.issues, vec!["Answer is too brief to be meaningful".to_string()]);
    }

    #[test]
    fn two_words_need_more_detail() {
        let r = validator().validate("Tell us about yourself", "Jane Doe");
        assert!(!r.should_proceed());
        assert_eq!(r.issues, vec!["Answer needs more detail".to_string()]);
    }

    #[test]
    fn detailed_answer_scores_up() {
        let r = validator().validate("What's your name and what do you do for work?", "My name is Jane Doe");
        assert!(r.should_proceed());
        // 0.5 base + 0.2 length + 0.1 overlap on "name"
        assert!((r.quality_score - 0.8).abs() < 1e-6);
        assert!(r.issues.is_empty());
    }

    #[test]
    fn unrelated_three_words_flagged_but_kept() {
        let r = validator().validate("What's your name?", "purple monkey dishwasher");
        assert!(r.is_relevant);
        assert!((r.quality_score - 0.4).abs() < 1e-6);
        assert!(r.issues.iter().any(|i| i.contains("not be related")));
    }

    #[test]
    fn stricter_threshold_rejects_unrelated() {
        let strict = RuleValidator::new(2, 0.6);
        let r = strict.validate("What's your name?", "purple monkey dishwasher");
        assert!(!r.is_valid);
        assert!(r.suggestion.is_some());
    }

    #[test]
    fn identical_input_identical_output() {
        let v = validator();
        let a = v.validate("What's your monthly budget?", "around 400 dollars a month");
        let b = v.validate("What's your monthly budget?", "around 400 dollars a month");
        assert_eq!(a, b);
    }

    #[test]
    fn classify_orders_by_priority() {
        assert_eq!(
            classify("What monthly payment would you like for your next vehicle?"),
            vec![QuestionKind::Budget, QuestionKind::VehicleType]
        );
        assert!(classify("Tell me about yourself").is_empty());
    }
}
