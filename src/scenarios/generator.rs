//! Scenario generator: profile in, validated batch out.

use std::sync::Arc;

use tracing::{info, warn};

use super::branch::BranchFocus;
use super::model::{FinancingScenario, validate_batch};
use super::{CHILD_BATCH_SIZE, TOP_LEVEL_BATCH_SIZE};
use crate::advisor::Advisor;
use crate::error::ScenarioError;
use crate::review::{CompleteProfile, Profile};

/// Produces top-level batches and child expansions.
///
/// There is no fallback here: a failed or unusable generation surfaces as a
/// classified `ScenarioError` so callers can tell retry-later from
/// fix-configuration from bad output.
pub struct ScenarioGenerator {
    advisor: Arc<dyn Advisor>,
}

impl ScenarioGenerator {
    pub fn new(advisor: Arc<dyn Advisor>) -> Self {
        Self { advisor }
    }

    /// Exactly five distinct scenarios for a complete profile.
    pub async fn generate(&self, profile: &Profile) -> Result<Vec<FinancingScenario>, ScenarioError> {
        let profile = require_complete(profile)?;
        let scenarios = self
            .advisor
            .generate_scenarios(profile)
            .await
            .inspect_err(|e| log_failure(self.advisor.name(), "top-level", e))?;
        validate_batch(&scenarios, TOP_LEVEL_BATCH_SIZE, true)
            .inspect_err(|e| log_failure(self.advisor.name(), "top-level", e))?;
        info!(
            advisor = self.advisor.name(),
            count = scenarios.len(),
            model = %scenarios[0].suggested_model,
            "Generated scenarios"
        );
        Ok(scenarios)
    }

    /// Exactly three children of `parent`. Levels outside 1..=10 use level 1.
    pub async fn generate_children(
        &self,
        parent: &FinancingScenario,
        profile: &Profile,
        branch_level: i64,
    ) -> Result<Vec<FinancingScenario>, ScenarioError> {
        let profile = require_complete(profile)?;
        let focus = BranchFocus::from_level(branch_level);
        if i64::from(focus.level()) != branch_level {
            warn!(branch_level, focus = %focus, "Branch level out of range, clamped");
        }
        let children = self
            .advisor
            .generate_children(parent, profile, focus)
            .await
            .inspect_err(|e| log_failure(self.advisor.name(), focus.name(), e))?;
        validate_batch(&children, CHILD_BATCH_SIZE, false)
            .inspect_err(|e| log_failure(self.advisor.name(), focus.name(), e))?;
        info!(
            advisor = self.advisor.name(),
            parent = %parent.name,
            focus = %focus,
            "Generated child scenarios"
        );
        Ok(children)
    }
}

fn require_complete(profile: &Profile) -> Result<&CompleteProfile, ScenarioError> {
    profile.as_complete().ok_or_else(|| ScenarioError::IncompleteProfile {
        missing: profile.missing_topics().to_vec(),
    })
}

fn log_failure(advisor: &str, batch: &str, error: &ScenarioError) {
    warn!(advisor, batch, kind = error.kind(), error = %error, "Scenario generation failed");
}
