//! The ten branch-focus levels used to expand a scenario into children.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchFocus {
    PaymentStructure,
    TrimLevel,
    AddOns,
    Insurance,
    Maintenance,
    TradeIn,
    LeaseVsBuy,
    Refinancing,
    EarlyPayoff,
    AlternativeModels,
}

impl BranchFocus {
    pub const ALL: [BranchFocus; 10] = [
        Self::PaymentStructure,
        Self::TrimLevel,
        Self::AddOns,
        Self::Insurance,
        Self::Maintenance,
        Self::TradeIn,
        Self::LeaseVsBuy,
        Self::Refinancing,
        Self::EarlyPayoff,
        Self::AlternativeModels,
    ];

    /// Focus for a 1-based level. Anything outside 1..=10 is level 1.
    pub fn from_level(level: i64) -> Self {
        usize::try_from(level)
            .ok()
            .and_then(|l| l.checked_sub(1))
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Self::PaymentStructure)
    }

    pub fn level(&self) -> u8 {
        match self {
            Self::PaymentStructure => 1,
            Self::TrimLevel => 2,
            Self::AddOns => 3,
            Self::Insurance => 4,
            Self::Maintenance => 5,
            Self::TradeIn => 6,
            Self::LeaseVsBuy => 7,
            Self::Refinancing => 8,
            Self::EarlyPayoff => 9,
            Self::AlternativeModels => 10,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::PaymentStructure => "Payment Structures",
            Self::TrimLevel => "Vehicle Trim Levels",
            Self::AddOns => "Add-Ons & Packages",
            Self::Insurance => "Insurance Options",
            Self::Maintenance => "Maintenance Plans",
            Self::TradeIn => "Trade-In Scenarios",
            Self::LeaseVsBuy => "Lease vs. Buy Comparison",
            Self::Refinancing => "Refinancing Options",
            Self::EarlyPayoff => "Early Payoff Strategies",
            Self::AlternativeModels => "Alternative Vehicles",
        }
    }

    /// What the three children must vary.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::PaymentStructure => "\
Generate 3 different PAYMENT STRUCTURE variations:
- Short-term high payment (36-48 months)
- Standard mid-term (60 months)
- Extended low payment (72-84 months)
Focus on how different loan terms affect monthly payments and total cost.",
            Self::TrimLevel => "\
Generate 3 different TRIM LEVEL options for the same model:
- Base/LE trim (budget-friendly)
- Mid-level/XLE trim (balanced features)
- Premium/Limited trim (fully loaded)
Show how trim upgrades affect pricing and value.",
            Self::AddOns => "\
Generate 3 scenarios with different WARRANTY AND PACKAGE combinations:
- Basic coverage only
- Extended warranty + protection package
- Premium coverage + maintenance package + GAP insurance
Explain cost vs. protection trade-offs.",
            Self::Insurance => "\
Generate 3 different INSURANCE SCENARIOS:
- Minimum required coverage
- Recommended full coverage
- Premium coverage with low deductibles
Include estimated insurance costs in monthly budget.",
            Self::Maintenance => "\
Generate 3 SERVICE AND MAINTENANCE options:
- Pay-as-you-go maintenance
- Prepaid maintenance plan (3 years)
- Premium ToyotaCare Plus (5 years)
Show long-term cost savings and convenience.",
            Self::TradeIn => "\
Generate 3 TRADE-IN options:
- No trade-in (higher loan amount)
- Average trade-in value ($5,000-$8,000)
- High trade-in value ($10,000+)
Show how trade-in equity reduces financing needs.",
            Self::LeaseVsBuy => "\
Generate 3 OWNERSHIP structure comparisons:
- Traditional purchase/finance
- Standard lease (36 months)
- Lease with purchase option at end
Compare long-term costs and flexibility.",
            Self::Refinancing => "\
Generate 3 REFINANCING scenarios (assuming purchase after 2 years):
- Refinance for lower rate
- Refinance for shorter term
- Refinance for lower payment
Show potential savings and payoff timeline changes.",
            Self::EarlyPayoff => "\
Generate 3 EARLY PAYMENT scenarios:
- Extra $50/month toward principal
- Extra $100/month toward principal
- Bi-weekly payment strategy
Calculate interest saved and time reduced.",
            Self::AlternativeModels => "\
Generate 3 ALTERNATIVE TOYOTA MODELS with similar profiles:
- Comparable model in different segment
- Hybrid/electric alternative
- Certified pre-owned recent model
Compare value, features, and total cost of ownership.",
        }
    }

    /// Whether children may suggest a different model than the parent.
    pub fn varies_model(&self) -> bool {
        matches!(self, Self::AlternativeModels)
    }
}

impl std::fmt::Display for BranchFocus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level {} ({})", self.level(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_round_trip() {
        for (i, focus) in BranchFocus::ALL.iter().enumerate() {
            assert_eq!(usize::from(focus.level()), i + 1);
            assert_eq!(BranchFocus::from_level(i as i64 + 1), *focus);
        }
    }

    #[test]
    fn out_of_range_clamps_to_first_level() {
        for level in [0, -3, 11, 15, i64::MAX] {
            assert_eq!(BranchFocus::from_level(level), BranchFocus::PaymentStructure);
        }
    }

    #[test]
    fn only_alternatives_vary_model() {
        let varying: Vec<_> = BranchFocus::ALL.iter().filter(|f| f.varies_model()).collect();
        assert_eq!(varying, vec![&BranchFocus::AlternativeModels]);
    }
}
