//! Auto Finance Advisor: a validated vehicle-financing interview that ends in
//! a batch of financing and leasing scenarios.

pub mod advisor;
pub mod config;
pub mod error;
pub mod interview;
pub mod llm;
pub mod orchestrator;
pub mod review;
pub mod routes;
pub mod scenarios;
pub mod session;
pub mod text;
pub mod validation;
