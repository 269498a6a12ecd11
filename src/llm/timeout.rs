//! Deadline wrapper: a provider call that outlives its budget is a failure.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::provider::{CompletionRequest, CompletionResponse, LlmProvider};
use crate::error::LlmError;

/// Wraps another provider and fails calls that exceed `timeout`.
pub struct TimeoutProvider {
    inner: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl TimeoutProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl LlmProvider for TimeoutProvider {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        match tokio::time::timeout(self.timeout, self.inner.complete(request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    model = self.inner.model_name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "LLM call timed out"
                );
                Err(LlmError::Timeout {
                    provider: self.inner.model_name().to_string(),
                    timeout: self.timeout,
                })
            }
        }
    }
}
