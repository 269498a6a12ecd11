//! Deterministic profile extraction from a transcript.
//!
//! Each user answer is attributed to the field its question asks about.
//! A few regex scans then pick up details volunteered along the way
//! (occupation, city, current car), and the advisory fields are derived
//! from what was collected.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::coerce::{clean_text, parse_credit_score, parse_income, parse_lease_or_buy};
use super::model::{CreditBand, LeaseOrBuy, ProfileDraft, ProfileField};
use crate::interview::model::{ConversationMessage, question_answer_pairs};
use crate::scenarios::catalog::{self, VehicleModel};
use crate::scenarios::finance::{amortized_payment, apr_for, lease_payment, money_factor};
use crate::text::{format_usd, has_any};

/// Question keywords per field, checked in this order. Lease-or-buy comes
/// first because those questions also mention "vehicle".
const TOPIC_KEYWORDS: &[(ProfileField, &[&str])] = &[
    (ProfileField::PreferredLeaseOrBuy, &["lease", "leasing", "buy", "buying", "own or lease"]),
    (ProfileField::CurrentVehicle, &["currently drive", "current vehicle", "current car", "drive now"]),
    (ProfileField::CreditScore, &["credit"]),
    (ProfileField::Income, &["income", "salary", "earn", "make a year"]),
    (ProfileField::Location, &["live", "located", "based", "city", "where are you"]),
    (ProfileField::Goal, &["goal", "goals", "hoping", "looking for", "why"]),
    (ProfileField::VehiclePreferences, &["model", "vehicle", "car", "features", "type"]),
    (ProfileField::Interests, &["interests", "hobbies", "enjoy", "free time"]),
    (ProfileField::Skills, &["skills", "good at"]),
    (ProfileField::Bio, &["name", "yourself", "about you"]),
    (ProfileField::Title, &["work", "job", "occupation", "profession", "for a living"]),
];

static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:i am an?|i'm an?|i work as an?|working as an?)\s+([a-z][a-z\- ]{2,40}?)(?:\s+(?:at|for|in)\b|[,.!]|$)")
        .unwrap()
});

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[Ll]ive in|[Ll]iving in|[Bb]ased in|[Ll]ocated in|I'm from|I am from)\s+([A-Z][A-Za-z.'\-]*(?:\s+[A-Z][A-Za-z.'\-]*)*(?:,\s*[A-Z]{2})?)")
        .unwrap()
});

static CURRENT_VEHICLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:i currently drive|i drive|currently have|my current car is)\s+(?:an?\s+|the\s+)?([a-z0-9][a-z0-9 .'\-]{1,40}?)(?:[,.!]|\s+(?:and|but)\b|$)")
        .unwrap()
});

/// Field a question is asking about.
pub fn topic_of(question: &str) -> Option<ProfileField> {
    TOPIC_KEYWORDS
        .iter()
        .find(|(_, keywords)| has_any(question, keywords))
        .map(|(field, _)| *field)
}

/// Build a draft from the transcript. Same transcript, same draft.
pub fn extract(transcript: &[ConversationMessage]) -> ProfileDraft {
    let mut draft = ProfileDraft::default();

    for (question, answer) in question_answer_pairs(transcript) {
        let Some(field) = topic_of(question) else {
            continue;
        };
        match field {
            ProfileField::Income => draft.income = draft.income.or_else(|| parse_income(answer)),
            ProfileField::CreditScore => {
                draft.credit_score = draft.credit_score.or_else(|| parse_credit_score(answer));
            }
            ProfileField::PreferredLeaseOrBuy => {
                draft.preferred_lease_or_buy =
                    draft.preferred_lease_or_buy.or_else(|| parse_lease_or_buy(answer));
            }
            text_field => {
                if let Some(text) = clean_text(answer) {
                    draft.set_text_if_empty(text_field, text);
                }
            }
        }
    }

    scan_volunteered(&mut draft, transcript);
    derive_advisory(&mut draft);
    draft
}

fn scan_volunteered(draft: &mut ProfileDraft, transcript: &[ConversationMessage]) {
    for (_, answer) in question_answer_pairs(transcript) {
        if let Some(title) = TITLE.captures(answer).and_then(|c| c.get(1)) {
            draft.set_text_if_empty(ProfileField::Title, title.as_str().trim());
        }
        if let Some(place) = LOCATION.captures(answer).and_then(|c| c.get(1)) {
            draft.set_text_if_empty(ProfileField::Location, place.as_str().trim());
        }
        if let Some(car) = CURRENT_VEHICLE.captures(answer).and_then(|c| c.get(1)) {
            draft.set_text_if_empty(ProfileField::CurrentVehicle, car.as_str().trim());
        }
    }
}

/// Fill the advisory fields from the collected ones. Each stays empty when
/// its inputs are missing.
pub fn derive_advisory(draft: &mut ProfileDraft) {
    let Some(income) = draft.income else {
        return;
    };
    let primary = catalog::select_model(draft.vehicle_preferences.as_deref(), income);

    if draft.vehicle_preferences.is_some() {
        let names: Vec<String> = catalog::suggestions(primary)
            .iter()
            .map(|m| m.display_name())
            .collect();
        draft.set_text_if_empty(ProfileField::SuggestedModels, names.join(", "));
    }

    let Some(tier) = draft.credit_score.map(|c| c.tier()) else {
        return;
    };
    let monthly_income = income / dec!(12);
    draft.set_text_if_empty(ProfileField::FinancialTips, financial_tips(monthly_income, tier));

    if draft.vehicle_preferences.is_none() {
        return;
    }
    let finance_60 = amortized_payment(primary.price * dec!(0.9), apr_for(tier, 60), 60);
    let finance_36 = amortized_payment(primary.price * dec!(0.8), apr_for(tier, 36), 36);
    let lease_36 = lease_payment(primary.price, primary.price * dec!(0.95), money_factor(apr_for(tier, 36)), 36);
    draft.set_text_if_empty(
        ProfileField::PaymentSimulations,
        format!(
            "{} at {}: 60-month finance with 10% down at {}% APR is about {}/month; \
             36-month finance with 20% down at {}% APR is about {}/month; \
             36-month lease with 5% down is about {}/month.",
            primary.display_name(),
            format_usd(primary.price),
            apr_for(tier, 60),
            format_usd(finance_60),
            apr_for(tier, 36),
            format_usd(finance_36),
            format_usd(lease_36),
        ),
    );

    let Some(preference) = draft.preferred_lease_or_buy else {
        return;
    };
    draft.set_text_if_empty(
        ProfileField::PlanComparisons,
        plan_comparison(preference, finance_60, lease_36),
    );
    draft.set_text_if_empty(ProfileField::Goal, goal(preference, primary, monthly_income));
}

fn financial_tips(monthly_income: Decimal, tier: CreditBand) -> String {
    let ceiling = monthly_income * dec!(0.15);
    let credit_tip = match tier {
        CreditBand::Excellent => "Your credit qualifies for the lowest promotional rates, so compare dealer APR offers against your bank.",
        CreditBand::Good => "Getting pre-approved before visiting the dealer gives you a rate to negotiate against.",
        CreditBand::Fair => "A larger down payment offsets the higher rate your credit tier attracts.",
        CreditBand::Poor => "Consider a co-signer or a shorter, cheaper vehicle while you rebuild credit.",
    };
    format!(
        "Keep total vehicle costs under 15% of monthly income (about {}). {credit_tip}",
        format_usd(ceiling)
    )
}

fn plan_comparison(preference: LeaseOrBuy, finance: Decimal, lease: Decimal) -> String {
    let difference = format_usd((finance - lease).abs());
    match preference {
        LeaseOrBuy::Buy => format!(
            "Buying costs about {difference}/month more than leasing but builds equity and has no mileage limits."
        ),
        LeaseOrBuy::Lease => format!(
            "Leasing saves about {difference}/month over buying, at the cost of mileage limits and no equity."
        ),
    }
}

fn goal(preference: LeaseOrBuy, model: &VehicleModel, monthly_income: Decimal) -> String {
    let verb = match preference {
        LeaseOrBuy::Buy => "Buy",
        LeaseOrBuy::Lease => "Lease",
    };
    format!(
        "{verb} a {} with a payment that stays under {}/month.",
        model.display_name(),
        format_usd(monthly_income * dec!(0.15))
    )
}
