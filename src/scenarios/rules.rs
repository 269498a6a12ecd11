//! Rule-based scenario generation from catalog prices and closed-form math.
//!
//! Finance payments are exact amortizations of `price + extras - down`, so a
//! rule-based scenario can always be checked against the formula.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use super::branch::BranchFocus;
use super::catalog::{self, VehicleModel};
use super::finance::{
    amortized_payment, apr_for, lease_payment, money_factor, payoff_months, remaining_balance,
    residual_fraction, total_interest,
};
use super::model::{FinancingScenario, PlanType};
use crate::review::{CompleteProfile, CreditBand, LeaseOrBuy};
use crate::text::format_usd;

/// Largest share of the price a down payment may cover.
const MAX_DOWN_SHARE: Decimal = dec!(0.9);

/// Payments made before a refinance.
const REFINANCE_AFTER: u32 = 24;

/// A plan before its payment is computed.
struct Plan {
    name: String,
    description: String,
    recommendations: String,
    plan_type: PlanType,
    /// Vehicle price; lease residuals are taken on this.
    price: Decimal,
    /// Amounts rolled into the financed balance.
    extras: Decimal,
    down_payment: Decimal,
    term_months: u32,
    apr: Decimal,
    /// Costs added on top of the loan or lease payment.
    extra_monthly: Decimal,
    model: String,
}

impl Plan {
    fn new(name: impl Into<String>, plan_type: PlanType, model: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            recommendations: String::new(),
            plan_type,
            price,
            extras: Decimal::ZERO,
            down_payment: Decimal::ZERO,
            term_months: 60,
            apr: Decimal::ZERO,
            extra_monthly: Decimal::ZERO,
            model: model.into(),
        }
    }

    fn terms(mut self, down_payment: Decimal, term_months: u32, apr: Decimal) -> Self {
        self.down_payment = down_payment;
        self.term_months = term_months;
        self.apr = apr;
        self
    }

    fn describe(mut self, description: impl Into<String>, recommendations: impl Into<String>) -> Self {
        self.description = description.into();
        self.recommendations = recommendations.into();
        self
    }

    fn title(&self) -> String {
        let kind = match self.plan_type {
            PlanType::Finance => "Financing",
            PlanType::Lease => "Lease",
        };
        format!("{}-Month {kind} for {}", self.term_months, self.model)
    }

    fn down(&self) -> Decimal {
        self.down_payment
            .clamp(Decimal::ZERO, self.price * MAX_DOWN_SHARE)
            .round_dp(2)
    }

    /// Compute the payment from the plan's own terms.
    fn build(self, profile: &CompleteProfile) -> FinancingScenario {
        let down = self.down();
        let balance = self.price + self.extras - down;
        let (payment, rate) = match self.plan_type {
            PlanType::Finance => (amortized_payment(balance, self.apr, self.term_months), self.apr),
            PlanType::Lease => {
                let mf = money_factor(self.apr);
                (lease_payment(self.price, balance, mf, self.term_months), mf)
            }
        };
        let monthly = payment + self.extra_monthly;
        self.finish(profile, monthly, rate)
    }

    /// Use a payment computed elsewhere.
    fn finish(self, profile: &CompleteProfile, monthly_payment: Decimal, rate: Decimal) -> FinancingScenario {
        let monthly_payment = monthly_payment.round_dp(2);
        FinancingScenario {
            title: self.title(),
            down_payment: self.down(),
            positivity_score: positivity(monthly_payment, profile, self.plan_type, self.term_months),
            name: self.name,
            description: self.description,
            plan_type: self.plan_type,
            monthly_payment,
            term_months: self.term_months,
            interest_rate: rate,
            recommendations: self.recommendations,
            suggested_model: self.model,
        }
    }
}

/// How favorable a payment is for this profile, 0–100.
///
/// Starts from affordability (100 minus three times the payment's share of
/// monthly income), rewards matching the stated preference and penalizes
/// terms over six years.
pub fn positivity(monthly_payment: Decimal, profile: &CompleteProfile, plan_type: PlanType, term_months: u32) -> u8 {
    let monthly_income = profile.monthly_income();
    let mut score = if monthly_income > Decimal::ZERO {
        dec!(100) - dec!(300) * monthly_payment / monthly_income
    } else {
        Decimal::ZERO
    };
    let preferred = matches!(
        (plan_type, profile.preferred_lease_or_buy),
        (PlanType::Finance, LeaseOrBuy::Buy) | (PlanType::Lease, LeaseOrBuy::Lease)
    );
    if preferred {
        score += dec!(8);
    }
    if term_months > 72 {
        score -= dec!(8);
    }
    score.clamp(Decimal::ZERO, dec!(100)).round().to_u8().unwrap_or(0)
}

fn share(price: Decimal, fraction: Decimal) -> Decimal {
    (price * fraction).round_dp(2)
}

/// The five top-level scenarios for a profile.
pub fn top_level(profile: &CompleteProfile) -> Vec<FinancingScenario> {
    let vehicle = catalog::select_model(Some(profile.vehicle_preferences.as_str()), profile.income);
    let tier = profile.credit_tier();
    let model = vehicle.display_name();
    let price = vehicle.price;

    let preference_plan = match profile.preferred_lease_or_buy {
        LeaseOrBuy::Buy => Plan::new("Zero-Down Finance", PlanType::Finance, &model, price)
            .terms(Decimal::ZERO, 48, apr_for(tier, 48))
            .describe(
                format!("Drive the {model} home with nothing down over four years. Keeps your savings intact at the cost of a higher balance."),
                "Make sure an emergency fund stays in place, since you start with no equity.",
            ),
        LeaseOrBuy::Lease => Plan::new("Low-Mileage Lease", PlanType::Lease, &model, price)
            .terms(share(price, dec!(0.05)), 24, apr_for(tier, 24))
            .describe(
                format!("A two-year lease on the {model} with a high residual value. Suits drivers who stay under 10,000 miles a year."),
                "Track your mileage; overage fees usually run 15-25 cents per mile.",
            ),
    };

    [
        Plan::new("Short-Term Saver", PlanType::Finance, &model, price)
            .terms(share(price, dec!(0.20)), 36, apr_for(tier, 36))
            .describe(
                format!("Finance the {model} over three years with 20% down. Higher payments, but the least interest paid overall."),
                "Choose this if your budget can absorb a higher payment; you own the car outright in three years.",
            ),
        Plan::new("Standard Finance", PlanType::Finance, &model, price)
            .terms(share(price, dec!(0.10)), 60, apr_for(tier, 60))
            .describe(
                format!("A five-year loan on the {model} with 10% down. Balances a moderate payment against total cost."),
                "Adding to the down payment later through extra principal payments shortens the loan.",
            ),
        Plan::new("Extended Low Payment", PlanType::Finance, &model, price)
            .terms(share(price, dec!(0.05)), 84, apr_for(tier, 84))
            .describe(
                format!("Stretch payments on the {model} over seven years with 5% down for the lowest monthly cost."),
                "Long terms raise total interest and the risk of owing more than the car is worth.",
            ),
        Plan::new("Standard Lease", PlanType::Lease, &model, price)
            .terms(share(price, dec!(0.05)), 36, apr_for(tier, 36))
            .describe(
                format!("Lease the {model} for three years with 5% down. Lower payments and a new car every few years."),
                "Leases suit stable commutes; compare the buyout price against market value at lease end.",
            ),
        preference_plan,
    ]
    .into_iter()
    .map(|plan| plan.build(profile))
    .collect()
}

/// What children inherit from their parent.
struct Basis<'a> {
    parent: &'a FinancingScenario,
    vehicle: &'static VehicleModel,
    price: Decimal,
    down: Decimal,
    term: u32,
    apr: Decimal,
    tier: CreditBand,
}

impl<'a> Basis<'a> {
    fn new(parent: &'a FinancingScenario, profile: &CompleteProfile) -> Self {
        let tier = profile.credit_tier();
        let vehicle = catalog::find_model(&parent.suggested_model)
            .unwrap_or_else(|| catalog::select_model(Some(profile.vehicle_preferences.as_str()), profile.income));
        let term = parent.term_months.clamp(12, 84);

        // Money factors are always below 0.1; anything larger is already an APR
        let apr = match parent.plan_type {
            PlanType::Lease if parent.interest_rate < dec!(0.1) => parent.interest_rate * dec!(2400),
            _ => parent.interest_rate,
        };
        let apr = if apr < Decimal::ZERO || apr > dec!(20) {
            apr_for(tier, term)
        } else {
            apr.round_dp(2)
        };

        Self {
            parent,
            vehicle,
            price: vehicle.price,
            down: parent.down_payment.max(Decimal::ZERO),
            term,
            apr,
            tier,
        }
    }

    fn model(&self) -> &str {
        &self.parent.suggested_model
    }

    /// A plan shaped like the parent.
    fn like_parent(&self, name: impl Into<String>) -> Plan {
        Plan::new(name, self.parent.plan_type, self.model(), self.price).terms(self.down, self.term, self.apr)
    }

    /// The parent expressed as a loan, for strategies that only apply to loans.
    fn as_loan(&self) -> (Decimal, u32, Decimal) {
        let (term, apr) = match self.parent.plan_type {
            PlanType::Finance if self.term > REFINANCE_AFTER => (self.term, self.apr),
            _ => (60, apr_for(self.tier, 60)),
        };
        let down = self.down.min(self.price * MAX_DOWN_SHARE);
        (self.price - down, term, apr)
    }
}

/// Three children of `parent` varying along `focus`.
pub fn children(parent: &FinancingScenario, profile: &CompleteProfile, focus: BranchFocus) -> Vec<FinancingScenario> {
    let basis = Basis::new(parent, profile);
    match focus {
        BranchFocus::PaymentStructure => payment_structures(&basis, profile),
        BranchFocus::TrimLevel => trims(&basis, profile),
        BranchFocus::AddOns => add_ons(&basis, profile),
        BranchFocus::Insurance => insurance(&basis, profile),
        BranchFocus::Maintenance => maintenance(&basis, profile),
        BranchFocus::TradeIn => trade_ins(&basis, profile),
        BranchFocus::LeaseVsBuy => ownership(&basis, profile),
        BranchFocus::Refinancing => refinancing(&basis, profile),
        BranchFocus::EarlyPayoff => early_payoff(&basis, profile),
        BranchFocus::AlternativeModels => alternatives(&basis, profile),
    }
}

fn payment_structures(basis: &Basis<'_>, profile: &CompleteProfile) -> Vec<FinancingScenario> {
    [
        (36, "Short-Term Plan", "Pay the loan off in three years for the least total interest."),
        (60, "Standard-Term Plan", "Five years keeps the payment moderate with reasonable total cost."),
        (84, "Extended-Term Plan", "Seven years gives the lowest payment but the most interest."),
    ]
    .into_iter()
    .map(|(term, name, description)| {
        let apr = apr_for(basis.tier, term);
        let principal = basis.price - basis.down.min(basis.price * MAX_DOWN_SHARE);
        let interest = total_interest(principal, amortized_payment(principal, apr, term), term);
        Plan::new(name, PlanType::Finance, basis.model(), basis.price)
            .terms(basis.down, term, apr)
            .describe(
                format!("{description} Total interest is about {}.", format_usd(interest)),
                "Pick the shortest term whose payment still leaves room in your monthly budget.",
            )
            .build(profile)
    })
    .collect()
}

fn trims(basis: &Basis<'_>, profile: &CompleteProfile) -> Vec<FinancingScenario> {
    [
        ("LE Trim Plan", dec!(1.00), "The base LE trim keeps the price and payment lowest."),
        ("XLE Trim Plan", dec!(1.12), "The XLE trim adds comfort and technology features for about 12% more."),
        ("Limited Trim Plan", dec!(1.25), "The fully loaded Limited trim costs about 25% more than the base."),
    ]
    .into_iter()
    .map(|(name, multiplier, description)| {
        let price = (basis.price * multiplier).round_dp(2);
        let mut plan = basis.like_parent(name).describe(
            format!("{description} Priced at {}.", format_usd(price)),
            "Mid-level trims usually hold resale value best relative to their cost.",
        );
        plan.price = price;
        plan.build(profile)
    })
    .collect()
}

fn add_ons(basis: &Basis<'_>, profile: &CompleteProfile) -> Vec<FinancingScenario> {
    [
        ("Basic Coverage", dec!(0), "Factory warranty only, with nothing extra rolled into the loan."),
        ("Extended Warranty", dec!(2500), "Adds an extended warranty and protection package, financed with the vehicle."),
        ("Premium Protection", dec!(4800), "Premium coverage with maintenance and GAP insurance, financed with the vehicle."),
    ]
    .into_iter()
    .map(|(name, extras, description)| {
        let mut plan = basis.like_parent(name).describe(
            format!("{description} Package cost: {}.", format_usd(extras)),
            "Packages financed with the car accrue interest; paying for them up front is cheaper.",
        );
        plan.extras = extras;
        plan.build(profile)
    })
    .collect()
}

fn insurance(basis: &Basis<'_>, profile: &CompleteProfile) -> Vec<FinancingScenario> {
    [
        ("Minimum Coverage", dec!(90), "State-minimum liability coverage"),
        ("Full Coverage", dec!(150), "Recommended full coverage with collision and comprehensive"),
        ("Premium Coverage", dec!(210), "Premium coverage with low deductibles"),
    ]
    .into_iter()
    .map(|(name, premium, coverage)| {
        let mut plan = basis.like_parent(name).describe(
            format!(
                "{coverage}. The monthly payment includes an estimated {}/month insurance premium.",
                format_usd(premium)
            ),
            "Lenders require full coverage on financed and leased cars; compare quotes before signing.",
        );
        plan.extra_monthly = premium;
        plan.build(profile)
    })
    .collect()
}

fn maintenance(basis: &Basis<'_>, profile: &CompleteProfile) -> Vec<FinancingScenario> {
    [
        ("Pay-As-You-Go", dec!(0), "Pay for service visits as they come."),
        ("Prepaid Maintenance", dec!(1200), "A three-year prepaid maintenance plan rolled into the payment."),
        ("ToyotaCare Plus", dec!(2400), "Five years of scheduled maintenance rolled into the payment."),
    ]
    .into_iter()
    .map(|(name, cost, description)| {
        let mut plan = basis.like_parent(name).describe(
            format!("{description} Plan cost: {}.", format_usd(cost)),
            "Prepaid plans lock in today's service prices and make budgeting predictable.",
        );
        plan.extras = cost;
        plan.build(profile)
    })
    .collect()
}

fn trade_ins(basis: &Basis<'_>, profile: &CompleteProfile) -> Vec<FinancingScenario> {
    [
        ("No Trade-In", dec!(0), "No trade-in, so the full balance is financed."),
        ("Average Trade-In", dec!(6500), "An average trade-in applied to the down payment."),
        ("High-Value Trade-In", dec!(11000), "A high-value trade-in applied to the down payment."),
    ]
    .into_iter()
    .map(|(name, credit, description)| {
        let plan = basis
            .like_parent(name)
            .terms(basis.down + credit, basis.term, basis.apr)
            .describe(
                format!("{description} Trade-in credit: {}.", format_usd(credit)),
                "Get an independent appraisal so you know what your trade-in is worth.",
            );
        plan.build(profile)
    })
    .collect()
}

fn ownership(basis: &Basis<'_>, profile: &CompleteProfile) -> Vec<FinancingScenario> {
    let buyout = format_usd(basis.price * residual_fraction(36));
    let mut with_option = Plan::new("Lease With Buyout", PlanType::Lease, basis.model(), basis.price)
        .terms(basis.down, 36, apr_for(basis.tier, 36))
        .describe(
            format!("A 36-month lease with a guaranteed purchase option at the end for {buyout}. Includes the purchase-option fee."),
            "Buy at lease end only if the car is worth more than the buyout price.",
        );
    with_option.extras = dec!(395);

    vec![
        Plan::new("Traditional Finance", PlanType::Finance, basis.model(), basis.price)
            .terms(basis.down, 60, apr_for(basis.tier, 60))
            .describe(
                "A 60-month loan. You build equity and keep the car with no mileage limits.",
                "Buying pays off if you keep cars longer than five years.",
            )
            .build(profile),
        Plan::new("Standard Lease", PlanType::Lease, basis.model(), basis.price)
            .terms(basis.down, 36, apr_for(basis.tier, 36))
            .describe(
                "A 36-month lease with lower payments and a new car every three years.",
                "Leasing suits predictable mileage and a preference for always driving something new.",
            )
            .build(profile),
        with_option.build(profile),
    ]
}

fn refinancing(basis: &Basis<'_>, profile: &CompleteProfile) -> Vec<FinancingScenario> {
    let (principal, term, apr) = basis.as_loan();
    let payment = amortized_payment(principal, apr, term);
    let balance = remaining_balance(principal, apr, payment, REFINANCE_AFTER);
    let remaining = (term - REFINANCE_AFTER).max(12);
    let lower_rate = (apr - dec!(1.5)).max(Decimal::ZERO);

    [
        ("Lower Rate Refinance", remaining, lower_rate, "Refinance the remaining term at a rate 1.5 points lower."),
        ("Shorter-Term Refinance", 36, apr_for(basis.tier, 36), "Refinance into a 36-month loan to finish sooner."),
        ("Lower Payment Refinance", 60, apr_for(basis.tier, 60), "Refinance into a fresh 60-month loan to cut the payment."),
    ]
    .into_iter()
    .map(|(name, new_term, new_apr, description)| {
        Plan::new(name, PlanType::Finance, basis.model(), balance)
            .terms(Decimal::ZERO, new_term, new_apr)
            .describe(
                format!(
                    "{description} After {REFINANCE_AFTER} payments of {} the balance is about {}.",
                    format_usd(payment),
                    format_usd(balance)
                ),
                "Refinancing pays off when the rate drop outweighs any fees; check for prepayment penalties.",
            )
            .build(profile)
    })
    .collect()
}

fn early_payoff(basis: &Basis<'_>, profile: &CompleteProfile) -> Vec<FinancingScenario> {
    let (principal, term, apr) = basis.as_loan();
    let payment = amortized_payment(principal, apr, term);
    let base_interest = total_interest(principal, payment, term);

    let strategies = [
        ("Extra $50 Monthly", payment + dec!(50), "Add $50 a month toward principal."),
        ("Extra $100 Monthly", payment + dec!(100), "Add $100 a month toward principal."),
        (
            "Bi-Weekly Payments",
            (payment * dec!(13) / dec!(12)).round_dp(2),
            "Pay half the payment every two weeks, which adds one full payment a year.",
        ),
    ];

    strategies
        .into_iter()
        .map(|(name, monthly, description)| {
            let months = payoff_months(principal, apr, monthly).unwrap_or(term).clamp(12, 84);
            let saved = (base_interest - total_interest(principal, monthly, months)).max(Decimal::ZERO);
            Plan::new(name, PlanType::Finance, basis.model(), basis.price)
                .terms(principal_down(basis), months, apr)
                .describe(
                    format!(
                        "{description} Pays off in {months} months instead of {term}, saving about {} in interest.",
                        format_usd(saved)
                    ),
                    "Confirm extra payments are applied to principal, not future payments.",
                )
                .finish(profile, monthly, apr)
        })
        .collect()
}

fn principal_down(basis: &Basis<'_>) -> Decimal {
    basis.down.min(basis.price * MAX_DOWN_SHARE)
}

fn alternatives(basis: &Basis<'_>, profile: &CompleteProfile) -> Vec<FinancingScenario> {
    let down_share = if basis.price > Decimal::ZERO {
        (basis.down / basis.price).clamp(Decimal::ZERO, dec!(0.5))
    } else {
        Decimal::ZERO
    };

    let other_segment = catalog::nearest_other_segment(basis.vehicle);
    let electrified = match catalog::electrified_alternative(basis.vehicle) {
        same if same.name == basis.vehicle.name => catalog::CATALOG
            .iter()
            .filter(|m| m.is_electrified() && m.name != basis.vehicle.name)
            .min_by_key(|m| (m.price - basis.vehicle.price).abs())
            .unwrap_or(other_segment),
        alt => alt,
    };

    let alternative = |vehicle: &VehicleModel, name: &str, description: String| {
        Plan::new(name, basis.parent.plan_type, vehicle.display_name(), vehicle.price)
            .terms(share(vehicle.price, down_share), basis.term, basis.apr)
            .describe(description, "Test-drive alternatives back to back before deciding.")
            .build(profile)
    };

    let cpo_price = share(basis.vehicle.price, dec!(0.80));
    let mut cpo = Plan::new(
        "Certified Pre-Owned",
        basis.parent.plan_type,
        format!("Certified Pre-Owned {}", basis.vehicle.display_name()),
        cpo_price,
    )
    .terms(share(cpo_price, down_share), basis.term, basis.apr + dec!(1.0))
    .describe(
        format!(
            "A recent certified pre-owned {} at about 80% of new, with a manufacturer-backed warranty.",
            basis.vehicle.name
        ),
        "Used-car rates run higher, so the savings come mostly from the lower price.",
    );
    cpo.apr = cpo.apr.min(dec!(20));

    vec![
        alternative(
            other_segment,
            "Different Segment",
            format!(
                "The {} offers a different body style at a similar price.",
                other_segment.display_name()
            ),
        ),
        alternative(
            electrified,
            "Electrified Alternative",
            format!(
                "The {} trades a higher price for lower fuel costs.",
                electrified.display_name()
            ),
        ),
        cpo.build(profile),
    ]
}
