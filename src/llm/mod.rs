//! Text generation capability.
//!
//! Supports:
//! - **Anthropic**: Messages API over reqwest
//! - **Gemini**: `generateContent` over reqwest
//!
//! Providers built here are unbounded. `advisor::select_advisor` wraps them
//! in a `TimeoutProvider`, so a slow call surfaces as `LlmError::Timeout` and
//! callers fall back exactly as they would for any other capability failure.

pub mod anthropic;
pub mod extract;
pub mod gemini;
pub mod provider;
pub mod timeout;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use provider::*;
pub use timeout::TimeoutProvider;

use std::sync::Arc;

use crate::error::ConfigError;

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Anthropic,
    Gemini,
}

impl LlmBackend {
    /// Default model for the backend.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => "claude-sonnet-4-20250514",
            Self::Gemini => "gemini-2.0-flash",
        }
    }

    /// Environment variable holding the backend's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GOOGLE_API_KEY",
        }
    }
}

impl std::str::FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(ConfigError::InvalidValue {
                key: "AUTO_FINANCE_LLM_BACKEND".to_string(),
                message: format!("unknown backend '{other}'"),
            }),
        }
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub api_key: secrecy::SecretString,
    pub model: String,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Arc<dyn LlmProvider> {
    match config.backend {
        LlmBackend::Anthropic => {
            tracing::info!("Using Anthropic (model: {})", config.model);
            Arc::new(AnthropicProvider::new(config.api_key.clone(), &config.model))
        }
        LlmBackend::Gemini => {
            tracing::info!("Using Gemini (model: {})", config.model);
            Arc::new(GeminiProvider::new(config.api_key.clone(), &config.model))
        }
    }
}
