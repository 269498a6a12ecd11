//! Scenario-generation prompts for the language capability.

use super::branch::BranchFocus;
use super::model::FinancingScenario;
use crate::llm::{ChatMessage, CompletionRequest};
use crate::review::CompleteProfile;

const SCENARIO_FIELDS: &str = "\
Each scenario object MUST include these fields:
- \"name\": Short label (2-4 words), e.g. \"Standard Purchase Plan\"
- \"title\": 5-10 word description, e.g. \"60-Month Finance Plan for Toyota Camry Hybrid\"
- \"description\": Concise explanation (2-3 sentences) tailored to the user's profile
- \"plan_type\": Either \"finance\" or \"lease\"
- \"down_payment\": Recommended down payment (numeric, in USD)
- \"monthly_payment\": Estimated monthly payment (numeric, in USD)
- \"term_months\": Total number of months for the plan (numeric, 12-84)
- \"interest_rate\": APR percentage for finance plans, or money factor for leases (numeric, 0-20)
- \"positivity_score\": 0-100, how favorable the plan is for this user (higher is better)
- \"recommendations\": Brief financial tips (1-2 sentences)
- \"suggested_model\": Recommended Toyota model aligned with the user's lifestyle and budget";

const TOP_LEVEL_SYSTEM_PROMPT: &str = "\
You are an expert auto financing scenario generator for Toyota Financial Services.

Create exactly 5 realistic, personalized and financially sound financing or leasing scenarios for the customer profile you are given. Be professional and analytical; prioritize accuracy in payment projections.";

const TOP_LEVEL_RULES: &str = "\
CRITICAL RULES:
1. Use ONLY the provided customer data (income, credit score, preferences).
2. Monthly payments must follow from price, down payment, term and rate.
3. The 5 scenarios must be FINANCIALLY DISTINCT: no two may share the same plan type, term and down payment.
4. Output ONLY a JSON array of 5 objects. No explanations, comments or extra text.";

const CHILDREN_SYSTEM_PROMPT: &str = "\
You are an expert auto financing scenario generator for Toyota Financial Services.

You expand one existing financing scenario into 3 variations along a single focus area.";

fn profile_json(profile: &CompleteProfile) -> String {
    serde_json::to_string_pretty(profile).unwrap_or_else(|_| format!("{profile:?}"))
}

pub fn top_level_request(profile: &CompleteProfile) -> CompletionRequest {
    let system = format!("{TOP_LEVEL_SYSTEM_PROMPT}\n\n{SCENARIO_FIELDS}\n\n{TOP_LEVEL_RULES}");
    CompletionRequest::new(vec![
        ChatMessage::system(system),
        ChatMessage::user(format!(
            "USER PROFILE:\n{}\n\nGenerate the 5 scenarios:",
            profile_json(profile)
        )),
    ])
    .with_max_tokens(3000)
    .with_temperature(0.4)
}

pub fn children_request(
    parent: &FinancingScenario,
    profile: &CompleteProfile,
    focus: BranchFocus,
) -> CompletionRequest {
    let model_rule = if focus.varies_model() {
        "\"suggested_model\" should name a different model from the parent scenario."
    } else {
        "\"suggested_model\" MUST stay the same as the parent scenario."
    };
    let system = format!(
        "{CHILDREN_SYSTEM_PROMPT}\n\nBRANCH LEVEL {level}: {name}\n\n{instruction}\n\n{SCENARIO_FIELDS}\n\n\
CRITICAL RULES:\n\
1. Create 3 variations focused on: {name}\n\
2. {model_rule}\n\
3. Numeric values must be realistic and consistent with the parent scenario.\n\
4. Output ONLY a JSON array of 3 objects. No explanations, comments or extra text.",
        level = focus.level(),
        name = focus.name(),
        instruction = focus.instruction(),
    );
    let parent_json = serde_json::to_string_pretty(parent).unwrap_or_else(|_| format!("{parent:?}"));
    CompletionRequest::new(vec![
        ChatMessage::system(system),
        ChatMessage::user(format!(
            "PARENT SCENARIO:\n{parent_json}\n\nUSER PROFILE:\n{}\n\nGenerate 3 variations for {}:",
            profile_json(profile),
            focus.name()
        )),
    ])
    .with_max_tokens(2000)
    .with_temperature(0.4)
}
