//! Financing scenario record, plus parsing and validation of generated batches.

use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ScenarioError;
use crate::llm::extract::extract_json_array;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Finance,
    Lease,
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finance => write!(f, "finance"),
            Self::Lease => write!(f, "lease"),
        }
    }
}

/// One financing or leasing plan.
///
/// `interest_rate` is an APR percentage for finance plans and a money factor
/// for leases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingScenario {
    pub name: String,
    pub title: String,
    pub description: String,
    pub plan_type: PlanType,
    #[serde(with = "rust_decimal::serde::float")]
    pub down_payment: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_payment: Decimal,
    pub term_months: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub interest_rate: Decimal,
    pub positivity_score: u8,
    pub recommendations: String,
    pub suggested_model: String,
}

impl FinancingScenario {
    /// Check the numeric ranges every scenario must respect.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name is empty".to_string());
        }
        if self.suggested_model.trim().is_empty() {
            return Err("suggested_model is empty".to_string());
        }
        if self.down_payment < Decimal::ZERO {
            return Err(format!("down_payment {} is negative", self.down_payment));
        }
        if self.monthly_payment <= Decimal::ZERO {
            return Err(format!("monthly_payment {} is not positive", self.monthly_payment));
        }
        if !(12..=84).contains(&self.term_months) {
            return Err(format!("term_months {} outside 12-84", self.term_months));
        }
        if self.interest_rate < Decimal::ZERO || self.interest_rate > dec!(20) {
            return Err(format!("interest_rate {} outside 0-20", self.interest_rate));
        }
        if self.positivity_score > 100 {
            return Err(format!("positivity_score {} above 100", self.positivity_score));
        }
        Ok(())
    }

    /// Key on which top-level scenarios must differ.
    pub fn structure_key(&self) -> (PlanType, u32, Decimal) {
        (self.plan_type, self.term_months, self.down_payment.normalize())
    }
}

/// Validate a batch: exact count, per-record ranges, and optionally that no
/// two records share a structure.
pub fn validate_batch(
    scenarios: &[FinancingScenario],
    expected: usize,
    require_distinct: bool,
) -> Result<(), ScenarioError> {
    if scenarios.len() != expected {
        return Err(ScenarioError::Parse(format!(
            "expected {expected} scenarios, got {}",
            scenarios.len()
        )));
    }
    for (i, scenario) in scenarios.iter().enumerate() {
        scenario
            .validate()
            .map_err(|reason| ScenarioError::Parse(format!("scenario {}: {reason}", i + 1)))?;
    }
    if require_distinct {
        let mut seen = HashSet::new();
        for scenario in scenarios {
            if !seen.insert(scenario.structure_key()) {
                return Err(ScenarioError::Parse(format!(
                    "scenarios repeat the same {} plan over {} months",
                    scenario.plan_type, scenario.term_months
                )));
            }
        }
    }
    Ok(())
}

/// Scenario as emitted by a generator: numbers may arrive as strings.
#[derive(Debug, Deserialize)]
struct RawScenario {
    name: Option<Value>,
    title: Option<Value>,
    description: Option<Value>,
    plan_type: Option<Value>,
    down_payment: Option<Value>,
    monthly_payment: Option<Value>,
    term_months: Option<Value>,
    interest_rate: Option<Value>,
    positivity_score: Option<Value>,
    recommendations: Option<Value>,
    suggested_model: Option<Value>,
}

fn required<'a>(value: &'a Option<Value>, field: &str) -> Result<&'a Value, String> {
    match value {
        Some(Value::Null) | None => Err(format!("missing {field}")),
        Some(v) => Ok(v),
    }
}

fn text(value: &Option<Value>, field: &str) -> Result<String, String> {
    match required(value, field)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() {
                Err(format!("{field} is empty"))
            } else {
                Ok(parts.join(", "))
            }
        }
        _ => Err(format!("{field} is not text")),
    }
}

fn number(value: &Option<Value>, field: &str) -> Result<Decimal, String> {
    let raw = match required(value, field)? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
            .collect(),
        _ => return Err(format!("{field} is not a number")),
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| format!("{field} is not a number"))
}

impl RawScenario {
    fn into_scenario(self) -> Result<FinancingScenario, String> {
        let plan_type = match text(&self.plan_type, "plan_type")?.to_lowercase() {
            t if t.contains("lease") => PlanType::Lease,
            t if ["finance", "loan", "purchase", "buy"].iter().any(|k| t.contains(k)) => PlanType::Finance,
            other => return Err(format!("unknown plan_type '{other}'")),
        };

        let term = number(&self.term_months, "term_months")?.round();
        let term_months = u32::try_from(term.mantissa())
            .ok()
            .filter(|_| term.scale() == 0)
            .ok_or_else(|| format!("term_months {term} is not a whole number of months"))?;

        let positivity = number(&self.positivity_score, "positivity_score")?.round();
        if positivity < Decimal::ZERO || positivity > dec!(100) {
            return Err(format!("positivity_score {positivity} outside 0-100"));
        }
        let positivity_score = u8::try_from(positivity.mantissa())
            .map_err(|_| format!("positivity_score {positivity} outside 0-100"))?;

        Ok(FinancingScenario {
            name: text(&self.name, "name")?,
            title: text(&self.title, "title")?,
            description: text(&self.description, "description")?,
            plan_type,
            down_payment: number(&self.down_payment, "down_payment")?.round_dp(2),
            monthly_payment: number(&self.monthly_payment, "monthly_payment")?.round_dp(2),
            term_months,
            interest_rate: number(&self.interest_rate, "interest_rate")?,
            positivity_score,
            recommendations: text(&self.recommendations, "recommendations")?,
            suggested_model: text(&self.suggested_model, "suggested_model")?,
        })
    }
}

/// Parse generator output into exactly `expected` validated scenarios.
pub fn parse_batch(
    text: &str,
    expected: usize,
    require_distinct: bool,
) -> Result<Vec<FinancingScenario>, ScenarioError> {
    let json = extract_json_array(text)
        .ok_or_else(|| ScenarioError::Parse("no JSON array in generator output".to_string()))?;
    let raw: Vec<RawScenario> = serde_json::from_str(json)
        .map_err(|e| ScenarioError::Parse(format!("invalid scenario JSON: {e}")))?;

    let scenarios = raw
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            r.into_scenario()
                .map_err(|reason| ScenarioError::Parse(format!("scenario {}: {reason}", i + 1)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    validate_batch(&scenarios, expected, require_distinct)?;
    Ok(scenarios)
}
