//! Anthropic Messages API provider.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::provider::{
    classify_http_failure, parse_retry_after, CompletionRequest, CompletionResponse,
    FinishReason, LlmProvider, Role,
};
use crate::error::LlmError;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Anthropic Claude provider over plain HTTP.
pub struct AnthropicProvider {
    api_key: SecretString,
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            model: model.into(),
            base_url: API_URL.to_string(),
        }
    }

    /// Point the provider at a different endpoint (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    id: Option<String>,
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| serde_json::json!({ "role": m.role, "content": m.content }))
            .collect();

        let mut body = serde_json::json!({
            "model": &self.model,
            "max_tokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": messages,
        });
        if let Some(system) = request.system_prompt() {
            body["system"] = serde_json::Value::String(system.to_string());
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: "anthropic".to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers().get(reqwest::header::RETRY_AFTER));
            let text = response.text().await.unwrap_or_default();
            return Err(classify_http_failure("anthropic", status.as_u16(), &text, retry_after));
        }

        let parsed: ApiResponse = response.json().await.map_err(|e| LlmError::InvalidResponse {
            provider: "anthropic".to_string(),
            reason: e.to_string(),
        })?;

        let content: String = parsed
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if content.trim().is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: "anthropic".to_string(),
                reason: "empty completion".to_string(),
            });
        }

        let usage = parsed.usage.unwrap_or(Usage {
            input_tokens: 0,
            output_tokens: 0,
        });
        let finish_reason = match parsed.stop_reason.as_deref() {
            Some("end_turn") | Some("stop_sequence") => FinishReason::Stop,
            Some("max_tokens") => FinishReason::Length,
            _ => FinishReason::Other,
        };

        Ok(CompletionResponse {
            content,
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            finish_reason,
            response_id: parsed.id,
        })
    }
}
