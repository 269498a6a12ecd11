//! Profile data model: the fields, the draft they accumulate in, and the
//! complete/incomplete result.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::coerce::{value_to_credit_score, value_to_income, value_to_lease_or_buy, value_to_text};

/// Every field a profile can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Bio,
    Goal,
    Location,
    Interests,
    Skills,
    Title,
    Income,
    CreditScore,
    PreferredLeaseOrBuy,
    VehiclePreferences,
    CurrentVehicle,
    PaymentSimulations,
    PlanComparisons,
    FinancialTips,
    SuggestedModels,
}

impl ProfileField {
    pub const ALL: [ProfileField; 15] = [
        Self::Bio,
        Self::Goal,
        Self::Location,
        Self::Interests,
        Self::Skills,
        Self::Title,
        Self::Income,
        Self::CreditScore,
        Self::PreferredLeaseOrBuy,
        Self::VehiclePreferences,
        Self::CurrentVehicle,
        Self::PaymentSimulations,
        Self::PlanComparisons,
        Self::FinancialTips,
        Self::SuggestedModels,
    ];

    /// Fields a complete profile always carries.
    pub const DEFAULT_REQUIRED: [ProfileField; 10] = [
        Self::Bio,
        Self::Goal,
        Self::Income,
        Self::CreditScore,
        Self::PreferredLeaseOrBuy,
        Self::VehiclePreferences,
        Self::PaymentSimulations,
        Self::PlanComparisons,
        Self::FinancialTips,
        Self::SuggestedModels,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bio => "bio",
            Self::Goal => "goal",
            Self::Location => "location",
            Self::Interests => "interests",
            Self::Skills => "skills",
            Self::Title => "title",
            Self::Income => "income",
            Self::CreditScore => "credit_score",
            Self::PreferredLeaseOrBuy => "preferred_lease_or_buy",
            Self::VehiclePreferences => "vehicle_preferences",
            Self::CurrentVehicle => "current_vehicle",
            Self::PaymentSimulations => "payment_simulations",
            Self::PlanComparisons => "plan_comparisons",
            Self::FinancialTips => "financial_tips",
            Self::SuggestedModels => "suggested_models",
        }
    }

    /// Advisory fields computed from other fields rather than asked for.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            Self::PaymentSimulations | Self::PlanComparisons | Self::FinancialTips | Self::SuggestedModels
        )
    }
}

impl std::fmt::Display for ProfileField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credit quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CreditBand {
    pub fn from_score(score: u16) -> Self {
        match score {
            740.. => Self::Excellent,
            670..=739 => Self::Good,
            580..=669 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

impl std::fmt::Display for CreditBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        };
        write!(f, "{s}")
    }
}

/// Reported credit score: a number, or a band when no number was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreditScore {
    Score(u16),
    Band(CreditBand),
}

impl CreditScore {
    pub fn tier(&self) -> CreditBand {
        match self {
            Self::Score(n) => CreditBand::from_score(*n),
            Self::Band(band) => *band,
        }
    }
}

impl std::fmt::Display for CreditScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Score(n) => write!(f, "{n}"),
            Self::Band(band) => write!(f, "{band}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaseOrBuy {
    Lease,
    Buy,
}

impl std::fmt::Display for LeaseOrBuy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lease => write!(f, "lease"),
            Self::Buy => write!(f, "buy"),
        }
    }
}

/// Every field populated. Optional fields are ones the default question plan
/// does not ask about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteProfile {
    pub bio: String,
    pub goal: String,
    pub location: Option<String>,
    pub interests: Option<String>,
    pub skills: Option<String>,
    pub title: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub income: Decimal,
    pub credit_score: CreditScore,
    pub preferred_lease_or_buy: LeaseOrBuy,
    pub vehicle_preferences: String,
    pub current_vehicle: Option<String>,
    pub payment_simulations: String,
    pub plan_comparisons: String,
    pub financial_tips: String,
    pub suggested_models: String,
}

impl CompleteProfile {
    pub fn credit_tier(&self) -> CreditBand {
        self.credit_score.tier()
    }

    pub fn monthly_income(&self) -> Decimal {
        (self.income / dec!(12)).round_dp(2)
    }
}

/// Outcome of reviewing a transcript.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawProfile")]
pub enum Profile {
    Complete(Box<CompleteProfile>),
    Incomplete {
        reason: String,
        missing_topics: Vec<String>,
    },
}

impl Profile {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn as_complete(&self) -> Option<&CompleteProfile> {
        match self {
            Self::Complete(profile) => Some(profile),
            Self::Incomplete { .. } => None,
        }
    }

    /// Credit tier of a complete profile.
    pub fn risk_tier(&self) -> Option<CreditBand> {
        self.as_complete().map(CompleteProfile::credit_tier)
    }

    pub fn missing_topics(&self) -> &[String] {
        match self {
            Self::Complete(_) => &[],
            Self::Incomplete { missing_topics, .. } => missing_topics,
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum ProfileView<'a> {
    Complete {
        is_complete: bool,
        #[serde(flatten)]
        profile: &'a CompleteProfile,
    },
    Incomplete {
        is_complete: bool,
        reason: &'a str,
        missing_topics: &'a [String],
    },
}

impl Serialize for Profile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let view = match self {
            Self::Complete(profile) => ProfileView::Complete {
                is_complete: true,
                profile,
            },
            Self::Incomplete {
                reason,
                missing_topics,
            } => ProfileView::Incomplete {
                is_complete: false,
                reason,
                missing_topics,
            },
        };
        view.serialize(serializer)
    }
}

/// Fields gathered so far. Every extractor produces one of these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDraft {
    pub bio: Option<String>,
    pub goal: Option<String>,
    pub location: Option<String>,
    pub interests: Option<String>,
    pub skills: Option<String>,
    pub title: Option<String>,
    pub income: Option<Decimal>,
    pub credit_score: Option<CreditScore>,
    pub preferred_lease_or_buy: Option<LeaseOrBuy>,
    pub vehicle_preferences: Option<String>,
    pub current_vehicle: Option<String>,
    pub payment_simulations: Option<String>,
    pub plan_comparisons: Option<String>,
    pub financial_tips: Option<String>,
    pub suggested_models: Option<String>,
}

impl ProfileDraft {
    pub fn is_populated(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::Income => self.income.is_some(),
            ProfileField::CreditScore => self.credit_score.is_some(),
            ProfileField::PreferredLeaseOrBuy => self.preferred_lease_or_buy.is_some(),
            text_field => self.text(text_field).is_some(),
        }
    }

    fn text_slot(&mut self, field: ProfileField) -> Option<&mut Option<String>> {
        Some(match field {
            ProfileField::Bio => &mut self.bio,
            ProfileField::Goal => &mut self.goal,
            ProfileField::Location => &mut self.location,
            ProfileField::Interests => &mut self.interests,
            ProfileField::Skills => &mut self.skills,
            ProfileField::Title => &mut self.title,
            ProfileField::VehiclePreferences => &mut self.vehicle_preferences,
            ProfileField::CurrentVehicle => &mut self.current_vehicle,
            ProfileField::PaymentSimulations => &mut self.payment_simulations,
            ProfileField::PlanComparisons => &mut self.plan_comparisons,
            ProfileField::FinancialTips => &mut self.financial_tips,
            ProfileField::SuggestedModels => &mut self.suggested_models,
            ProfileField::Income | ProfileField::CreditScore | ProfileField::PreferredLeaseOrBuy => {
                return None;
            }
        })
    }

    /// Current value of a text field.
    pub fn text(&self, field: ProfileField) -> Option<&str> {
        let slot = match field {
            ProfileField::Bio => &self.bio,
            ProfileField::Goal => &self.goal,
            ProfileField::Location => &self.location,
            ProfileField::Interests => &self.interests,
            ProfileField::Skills => &self.skills,
            ProfileField::Title => &self.title,
            ProfileField::VehiclePreferences => &self.vehicle_preferences,
            ProfileField::CurrentVehicle => &self.current_vehicle,
            ProfileField::PaymentSimulations => &self.payment_simulations,
            ProfileField::PlanComparisons => &self.plan_comparisons,
            ProfileField::FinancialTips => &self.financial_tips,
            ProfileField::SuggestedModels => &self.suggested_models,
            ProfileField::Income | ProfileField::CreditScore | ProfileField::PreferredLeaseOrBuy => {
                return None;
            }
        };
        slot.as_deref()
    }

    /// Set a text field unless it already has a value. Returns whether it was set.
    pub fn set_text_if_empty(&mut self, field: ProfileField, value: impl Into<String>) -> bool {
        match self.text_slot(field) {
            Some(slot) if slot.is_none() => {
                *slot = Some(value.into());
                true
            }
            _ => false,
        }
    }

    /// Fill every empty field from `other`.
    pub fn fill_from(&mut self, other: ProfileDraft) {
        self.income = self.income.or(other.income);
        self.credit_score = self.credit_score.or(other.credit_score);
        self.preferred_lease_or_buy = self.preferred_lease_or_buy.or(other.preferred_lease_or_buy);
        for field in ProfileField::ALL {
            if let Some(value) = other.text(field) {
                self.set_text_if_empty(field, value);
            }
        }
    }

    /// Required fields without a value, in declaration order.
    ///
    /// The default required set always applies; `required` can only add to it.
    pub fn missing(&self, required: &[ProfileField]) -> Vec<ProfileField> {
        ProfileField::ALL
            .into_iter()
            .filter(|f| ProfileField::DEFAULT_REQUIRED.contains(f) || required.contains(f))
            .filter(|f| !self.is_populated(*f))
            .collect()
    }

    /// Close the draft into a profile.
    pub fn finish(self, required: &[ProfileField]) -> Profile {
        let missing = self.missing(required);
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(|f| f.as_str().to_string()).collect();
            return Profile::Incomplete {
                reason: format!("The interview did not establish: {}", names.join(", ")),
                missing_topics: names,
            };
        }

        // `missing` is empty, so every default-required field is present
        match (
            self.bio,
            self.goal,
            self.income,
            self.credit_score,
            self.preferred_lease_or_buy,
            self.vehicle_preferences,
            self.payment_simulations,
            self.plan_comparisons,
            self.financial_tips,
            self.suggested_models,
        ) {
            (
                Some(bio),
                Some(goal),
                Some(income),
                Some(credit_score),
                Some(preferred_lease_or_buy),
                Some(vehicle_preferences),
                Some(payment_simulations),
                Some(plan_comparisons),
                Some(financial_tips),
                Some(suggested_models),
            ) => Profile::Complete(Box::new(CompleteProfile {
                bio,
                goal,
                location: self.location,
                interests: self.interests,
                skills: self.skills,
                title: self.title,
                income,
                credit_score,
                preferred_lease_or_buy,
                vehicle_preferences,
                current_vehicle: self.current_vehicle,
                payment_simulations,
                plan_comparisons,
                financial_tips,
                suggested_models,
            })),
            _ => Profile::Incomplete {
                reason: "Profile fields are inconsistent".to_string(),
                missing_topics: Vec::new(),
            },
        }
    }
}

impl From<CompleteProfile> for ProfileDraft {
    fn from(p: CompleteProfile) -> Self {
        Self {
            bio: Some(p.bio),
            goal: Some(p.goal),
            location: p.location,
            interests: p.interests,
            skills: p.skills,
            title: p.title,
            income: Some(p.income),
            credit_score: Some(p.credit_score),
            preferred_lease_or_buy: Some(p.preferred_lease_or_buy),
            vehicle_preferences: Some(p.vehicle_preferences),
            current_vehicle: p.current_vehicle,
            payment_simulations: Some(p.payment_simulations),
            plan_comparisons: Some(p.plan_comparisons),
            financial_tips: Some(p.financial_tips),
            suggested_models: Some(p.suggested_models),
        }
    }
}

/// Loosely typed profile as it arrives from a generator or an API client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProfile {
    #[serde(default)]
    pub is_complete: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub missing_topics: Vec<String>,
    #[serde(default)]
    pub bio: Option<Value>,
    #[serde(default)]
    pub goal: Option<Value>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub interests: Option<Value>,
    #[serde(default)]
    pub skills: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub income: Option<Value>,
    #[serde(default)]
    pub credit_score: Option<Value>,
    #[serde(default)]
    pub preferred_lease_or_buy: Option<Value>,
    #[serde(default)]
    pub vehicle_preferences: Option<Value>,
    #[serde(default)]
    pub current_vehicle: Option<Value>,
    #[serde(default)]
    pub payment_simulations: Option<Value>,
    #[serde(default)]
    pub plan_comparisons: Option<Value>,
    #[serde(default)]
    pub financial_tips: Option<Value>,
    #[serde(default)]
    pub suggested_models: Option<Value>,
}

impl RawProfile {
    /// Coerce every field; values that fail coercion are left empty.
    pub fn into_draft(self) -> ProfileDraft {
        let text = |v: &Option<Value>| v.as_ref().and_then(value_to_text);
        ProfileDraft {
            bio: text(&self.bio),
            goal: text(&self.goal),
            location: text(&self.location),
            interests: text(&self.interests),
            skills: text(&self.skills),
            title: text(&self.title),
            income: self.income.as_ref().and_then(value_to_income),
            credit_score: self.credit_score.as_ref().and_then(value_to_credit_score),
            preferred_lease_or_buy: self.preferred_lease_or_buy.as_ref().and_then(value_to_lease_or_buy),
            vehicle_preferences: text(&self.vehicle_preferences),
            current_vehicle: text(&self.current_vehicle),
            payment_simulations: text(&self.payment_simulations),
            plan_comparisons: text(&self.plan_comparisons),
            financial_tips: text(&self.financial_tips),
            suggested_models: text(&self.suggested_models),
        }
    }

    /// Interpret against a required-field table.
    pub fn into_profile(self, required: &[ProfileField]) -> Profile {
        if self.is_complete == Some(false) {
            return Profile::Incomplete {
                reason: self
                    .reason
                    .unwrap_or_else(|| "Profile marked incomplete".to_string()),
                missing_topics: self.missing_topics,
            };
        }
        self.into_draft().finish(required)
    }
}

impl From<RawProfile> for Profile {
    fn from(raw: RawProfile) -> Self {
        raw.into_profile(&ProfileField::DEFAULT_REQUIRED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_draft() -> ProfileDraft {
        ProfileDraft {
            bio: Some("Jane Doe, a nurse".into()),
            goal: Some("Buy a reliable hybrid".into()),
            income: Some(dec!(95000)),
            credit_score: Some(CreditScore::Score(720)),
            preferred_lease_or_buy: Some(LeaseOrBuy::Buy),
            vehicle_preferences: Some("Camry Hybrid, fuel efficiency".into()),
            payment_simulations: Some("60 months at 5.9%".into()),
            plan_comparisons: Some("Buying builds equity".into()),
            financial_tips: Some("Keep payments under 15% of income".into()),
            suggested_models: Some("Toyota Camry Hybrid".into()),
            ..ProfileDraft::default()
        }
    }

    #[test]
    fn credit_tiers() {
        assert_eq!(CreditBand::from_score(800), CreditBand::Excellent);
        assert_eq!(CreditBand::from_score(740), CreditBand::Excellent);
        assert_eq!(CreditBand::from_score(720), CreditBand::Good);
        assert_eq!(CreditBand::from_score(600), CreditBand::Fair);
        assert_eq!(CreditBand::from_score(520), CreditBand::Poor);
        assert_eq!(CreditScore::Band(CreditBand::Fair).tier(), CreditBand::Fair);
    }

    #[test]
    fn full_draft_finishes_complete() {
        let profile = full_draft().finish(&ProfileField::DEFAULT_REQUIRED);
        let complete = profile.as_complete().unwrap();
        assert_eq!(complete.income, dec!(95000));
        assert_eq!(complete.credit_tier(), CreditBand::Good);
        assert_eq!(complete.monthly_income(), dec!(7916.67));
        assert_eq!(profile.risk_tier(), Some(CreditBand::Good));
        assert!(complete.location.is_none());
    }

    #[test]
    fn missing_fields_listed_in_order() {
        let mut draft = full_draft();
        draft.income = None;
        draft.bio = None;
        let profile = draft.finish(&ProfileField::DEFAULT_REQUIRED);
        assert!(!profile.is_complete());
        assert_eq!(profile.missing_topics(), ["bio".to_string(), "income".to_string()]);
    }

    #[test]
    fn configured_optional_field_becomes_required() {
        let profile = full_draft().finish(&[ProfileField::Location]);
        assert_eq!(profile.missing_topics(), ["location".to_string()]);
    }

    #[test]
    fn fill_from_keeps_existing_values() {
        let mut draft = ProfileDraft {
            bio: Some("from the model".into()),
            ..ProfileDraft::default()
        };
        draft.fill_from(full_draft());
        assert_eq!(draft.bio.as_deref(), Some("from the model"));
        assert_eq!(draft.income, Some(dec!(95000)));
        assert!(draft.finish(&[]).is_complete());
    }

    #[test]
    fn serializes_complete_shape() {
        let json = serde_json::to_value(full_draft().finish(&[])).unwrap();
        assert_eq!(json["is_complete"], json!(true));
        assert_eq!(json["income"], json!(95000.0));
        assert_eq!(json["credit_score"], json!(720));
        assert_eq!(json["preferred_lease_or_buy"], json!("buy"));
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn serializes_incomplete_shape() {
        let json = serde_json::to_value(ProfileDraft::default().finish(&[])).unwrap();
        assert_eq!(json["is_complete"], json!(false));
        assert!(json["reason"].is_string());
        assert_eq!(json["missing_topics"].as_array().unwrap().len(), 10);
        assert!(json.get("bio").is_none());
    }

    #[test]
    fn deserializes_loose_generator_output() {
        let profile: Profile = serde_json::from_value(json!({
            "is_complete": true,
            "bio": "Jane Doe, a nurse",
            "goal": "Buy a reliable hybrid",
            "income": "$95,000",
            "credit_score": "720",
            "preferred_lease_or_buy": "Buying",
            "vehicle_preferences": ["Camry Hybrid", "fuel efficiency"],
            "current_vehicle": "Not discussed",
            "payment_simulations": "60 months at 5.9%",
            "plan_comparisons": "Buying builds equity",
            "financial_tips": "Keep payments low",
            "suggested_models": "Toyota Camry Hybrid"
        }))
        .unwrap();
        let complete = profile.as_complete().unwrap();
        assert_eq!(complete.income, dec!(95000));
        assert_eq!(complete.credit_score, CreditScore::Score(720));
        assert_eq!(complete.vehicle_preferences, "Camry Hybrid, fuel efficiency");
        assert!(complete.current_vehicle.is_none());
    }

    #[test]
    fn unparseable_income_counts_as_missing() {
        let profile: Profile = serde_json::from_value(json!({
            "is_complete": true,
            "income": "comfortable"
        }))
        .unwrap();
        assert!(profile.missing_topics().contains(&"income".to_string()));
    }

    #[test]
    fn explicit_incomplete_kept() {
        let profile: Profile = serde_json::from_value(json!({
            "is_complete": false,
            "reason": "No income discussed",
            "missing_topics": ["income"]
        }))
        .unwrap();
        assert_eq!(
            profile,
            Profile::Incomplete {
                reason: "No income discussed".into(),
                missing_topics: vec!["income".into()],
            }
        );
    }
}
