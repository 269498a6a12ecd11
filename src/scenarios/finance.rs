//! Closed-form loan and lease arithmetic.
//!
//! Rates are annual percentages (`5.9` means 5.9% APR). Every money result is
//! rounded to cents.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::review::CreditBand;

/// Longest payoff the simulation will walk before giving up.
const MAX_PAYOFF_MONTHS: u32 = 600;

fn monthly_rate(annual_rate_pct: Decimal) -> Decimal {
    annual_rate_pct / dec!(1200)
}

/// Standard amortized monthly payment for `principal` over `months`.
pub fn amortized_payment(principal: Decimal, annual_rate_pct: Decimal, months: u32) -> Decimal {
    if principal <= Decimal::ZERO || months == 0 {
        return Decimal::ZERO;
    }
    let r = monthly_rate(annual_rate_pct);
    if r.is_zero() {
        return (principal / Decimal::from(months)).round_dp(2);
    }
    let growth = (Decimal::ONE + r).powu(u64::from(months));
    (principal * r * growth / (growth - Decimal::ONE)).round_dp(2)
}

/// Balance left after `payments_made` payments of `payment`.
pub fn remaining_balance(
    principal: Decimal,
    annual_rate_pct: Decimal,
    payment: Decimal,
    payments_made: u32,
) -> Decimal {
    let r = monthly_rate(annual_rate_pct);
    let balance = if r.is_zero() {
        principal - payment * Decimal::from(payments_made)
    } else {
        let growth = (Decimal::ONE + r).powu(u64::from(payments_made));
        principal * growth - payment * (growth - Decimal::ONE) / r
    };
    balance.max(Decimal::ZERO).round_dp(2)
}

/// Months needed to retire `principal` paying `payment` each month.
///
/// `None` when the payment never covers the interest.
pub fn payoff_months(principal: Decimal, annual_rate_pct: Decimal, payment: Decimal) -> Option<u32> {
    if principal <= Decimal::ZERO {
        return Some(0);
    }
    let r = monthly_rate(annual_rate_pct);
    if payment <= principal * r {
        return None;
    }
    let mut balance = principal;
    for month in 1..=MAX_PAYOFF_MONTHS {
        balance = balance + balance * r - payment;
        // Cent rounding of `payment` can leave a few cents at the end
        if balance < Decimal::ONE {
            return Some(month);
        }
    }
    None
}

/// Total interest paid over the life of an amortized loan.
pub fn total_interest(principal: Decimal, payment: Decimal, months: u32) -> Decimal {
    (payment * Decimal::from(months) - principal).max(Decimal::ZERO).round_dp(2)
}

/// Lease money factor equivalent to an APR.
pub fn money_factor(annual_rate_pct: Decimal) -> Decimal {
    (annual_rate_pct / dec!(2400)).round_dp(5)
}

/// Residual value as a fraction of price for a lease of `months`.
pub fn residual_fraction(months: u32) -> Decimal {
    match months {
        0..=24 => dec!(0.65),
        25..=36 => dec!(0.58),
        _ => dec!(0.52),
    }
}

/// Monthly lease payment: depreciation plus rent charge.
///
/// The residual is taken on `price`; `cap_cost` is what is actually leased
/// (price plus any rolled-in extras, less the down payment).
pub fn lease_payment(price: Decimal, cap_cost: Decimal, money_factor: Decimal, months: u32) -> Decimal {
    if months == 0 {
        return Decimal::ZERO;
    }
    let cap_cost = cap_cost.max(Decimal::ZERO);
    let residual = price * residual_fraction(months);
    let depreciation = ((cap_cost - residual) / Decimal::from(months)).max(Decimal::ZERO);
    let rent = (cap_cost + residual) * money_factor;
    (depreciation + rent).round_dp(2)
}

/// Base APR for a credit tier.
pub fn base_apr(tier: CreditBand) -> Decimal {
    match tier {
        CreditBand::Excellent => dec!(3.9),
        CreditBand::Good => dec!(5.9),
        CreditBand::Fair => dec!(8.9),
        CreditBand::Poor => dec!(12.9),
    }
}

/// APR for a tier and term. Long terms cost more, short terms less.
pub fn apr_for(tier: CreditBand, months: u32) -> Decimal {
    let base = base_apr(tier);
    if months >= 72 {
        base + dec!(0.5)
    } else if months <= 36 {
        base - dec!(0.5)
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amortization_matches_known_value() {
        // 25,000 at 6% over 60 months is 483.32
        assert_eq!(amortized_payment(dec!(25000), dec!(6), 60), dec!(483.32));
    }

    #[test]
    fn zero_rate_is_straight_division() {
        assert_eq!(amortized_payment(dec!(12000), Decimal::ZERO, 48), dec!(250));
    }

    #[test]
    fn nothing_to_finance() {
        assert_eq!(amortized_payment(Decimal::ZERO, dec!(5), 60), Decimal::ZERO);
        assert_eq!(amortized_payment(dec!(-10), dec!(5), 60), Decimal::ZERO);
    }

    #[test]
    fn longer_terms_lower_payment() {
        let short = amortized_payment(dec!(27000), apr_for(CreditBand::Good, 36), 36);
        let long = amortized_payment(dec!(27000), apr_for(CreditBand::Good, 84), 84);
        assert!(short > long);
    }

    #[test]
    fn balance_after_full_term_is_zero() {
        let payment = amortized_payment(dec!(20000), dec!(5), 48);
        let balance = remaining_balance(dec!(20000), dec!(5), payment, 48);
        assert!(balance < dec!(1));
        let midway = remaining_balance(dec!(20000), dec!(5), payment, 24);
        assert!(midway > dec!(9000) && midway < dec!(11000));
    }

    #[test]
    fn extra_principal_shortens_payoff() {
        let payment = amortized_payment(dec!(25000), dec!(5.9), 60);
        assert_eq!(payoff_months(dec!(25000), dec!(5.9), payment), Some(60));
        let faster = payoff_months(dec!(25000), dec!(5.9), payment + dec!(100)).unwrap();
        assert!(faster < 60);
    }

    #[test]
    fn payoff_impossible_when_payment_below_interest() {
        assert_eq!(payoff_months(dec!(25000), dec!(12), dec!(200)), None);
    }

    #[test]
    fn lease_cheaper_than_finance_same_term() {
        let mf = money_factor(dec!(5.9));
        assert_eq!(mf, dec!(0.00246));
        let lease = lease_payment(dec!(30000), dec!(28500), mf, 36);
        let finance = amortized_payment(dec!(28500), dec!(5.9), 36);
        assert!(lease > Decimal::ZERO);
        assert!(lease < finance);
    }

    #[test]
    fn residual_steps() {
        assert_eq!(residual_fraction(24), dec!(0.65));
        assert_eq!(residual_fraction(36), dec!(0.58));
        assert_eq!(residual_fraction(39), dec!(0.52));
    }

    #[test]
    fn apr_adjusts_by_term() {
        assert_eq!(apr_for(CreditBand::Excellent, 60), dec!(3.9));
        assert_eq!(apr_for(CreditBand::Excellent, 36), dec!(3.4));
        assert_eq!(apr_for(CreditBand::Poor, 84), dec!(13.4));
    }
}
