//! Financing scenarios: the record, the math behind it, and the generator.

pub mod branch;
pub mod catalog;
pub mod finance;
pub mod generator;
pub mod model;
pub mod prompts;
pub mod rules;

pub use branch::BranchFocus;
pub use generator::ScenarioGenerator;
pub use model::{FinancingScenario, PlanType};

/// Scenarios in a top-level batch.
pub const TOP_LEVEL_BATCH_SIZE: usize = 5;

/// Scenarios per child expansion.
pub const CHILD_BATCH_SIZE: usize = 3;
