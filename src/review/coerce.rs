//! Coercion of free-text and loosely typed JSON values into profile fields.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use super::model::{CreditBand, CreditScore, LeaseOrBuy};
use crate::text::{has_any, has_keyword};

static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*(k\b|thousand\b|m\b|mil\b|million\b)?").unwrap()
});

static THREE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{3})\b").unwrap());

/// Placeholder answers that mean "no value".
const EMPTY_MARKERS: &[&str] = &[
    "", "n/a", "na", "none", "null", "unknown", "not provided", "not discussed", "not mentioned",
    "not specified", "-",
];

/// Larger incomes are treated as misreadings.
const MAX_INCOME: Decimal = dec!(100000000);

const LEASE_TOKENS: &[&str] = &["lease", "leasing", "leased"];
const BUY_TOKENS: &[&str] = &["buy", "buying", "purchase", "purchasing", "own", "finance", "financing"];

/// Annual income from text such as "$95,000", "95k", "95 thousand" or
/// "about 8,000 a month".
pub fn parse_income(text: &str) -> Option<Decimal> {
    let caps = AMOUNT.captures(text)?;
    let digits = caps.get(1)?.as_str().replace(',', "");
    let mut amount = Decimal::from_str(&digits).ok()?;

    match caps.get(2).map(|m| m.as_str().to_lowercase()).as_deref() {
        Some("k" | "thousand") => amount = amount.checked_mul(dec!(1000))?,
        Some("m" | "mil" | "million") => amount = amount.checked_mul(dec!(1000000))?,
        _ => {}
    }

    if has_any(text, &["month", "monthly", "mo"]) {
        amount = amount.checked_mul(dec!(12))?;
    }

    plausible_income(amount)
}

fn plausible_income(amount: Decimal) -> Option<Decimal> {
    (amount > Decimal::ZERO && amount <= MAX_INCOME).then(|| amount.round_dp(2))
}

/// Credit score from a number in 300–850 or a band word.
pub fn parse_credit_score(text: &str) -> Option<CreditScore> {
    let numeric = THREE_DIGITS
        .captures_iter(text)
        .filter_map(|c| c.get(1)?.as_str().parse::<u16>().ok())
        .find(|n| (300..=850).contains(n));
    if let Some(score) = numeric {
        return Some(CreditScore::Score(score));
    }

    // Negative words first so "not good" reads as poor
    let band = if has_any(text, &["excellent", "great", "exceptional"]) {
        CreditBand::Excellent
    } else if has_any(text, &["poor", "bad", "not good", "low"]) {
        CreditBand::Poor
    } else if has_any(text, &["fair", "average", "okay", "decent"]) {
        CreditBand::Fair
    } else if has_keyword(text, "good") {
        CreditBand::Good
    } else {
        return None;
    };
    Some(CreditScore::Band(band))
}

/// Lease or buy preference. Mentioning both is undecided.
pub fn parse_lease_or_buy(text: &str) -> Option<LeaseOrBuy> {
    match (has_any(text, LEASE_TOKENS), has_any(text, BUY_TOKENS)) {
        (true, false) => Some(LeaseOrBuy::Lease),
        (false, true) => Some(LeaseOrBuy::Buy),
        _ => None,
    }
}

/// Non-placeholder text, trimmed.
pub fn clean_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if EMPTY_MARKERS.contains(&trimmed.to_lowercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Text form of a JSON value. Lists are joined with ", ".
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean_text(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_to_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(_) => Some(value.to_string()),
        Value::Null => None,
    }
}

pub fn value_to_income(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(Decimal::from_f64_retain)
            .and_then(plausible_income),
        Value::String(s) => parse_income(s),
        _ => None,
    }
}

pub fn value_to_credit_score(value: &Value) -> Option<CreditScore> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|f| f.round())
            .filter(|f| (300.0..=850.0).contains(f))
            .map(|f| CreditScore::Score(f as u16)),
        Value::String(s) => parse_credit_score(s),
        _ => None,
    }
}

pub fn value_to_lease_or_buy(value: &Value) -> Option<LeaseOrBuy> {
    match value {
        Value::String(s) => parse_lease_or_buy(s),
        _ => None,
    }
}
