//! Provider HTTP contracts against a local stub server.
//!
//! Each test serves one canned reply on a random port and points a real
//! provider at it with `with_base_url`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use auto_finance_advisor::error::LlmError;
use auto_finance_advisor::llm::{
    AnthropicProvider, ChatMessage, CompletionRequest, FinishReason, GeminiProvider, LlmProvider,
};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// What the stub answers with, and what it saw.
#[derive(Clone)]
struct Stub {
    status: StatusCode,
    retry_after: Option<&'static str>,
    body: Value,
    seen: Arc<Mutex<Vec<(String, HeaderMap)>>>,
}

impl Stub {
    fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            retry_after: None,
            body,
            seen: Arc::default(),
        }
    }

    fn with_retry_after(mut self, seconds: &'static str) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    fn last_path(&self) -> String {
        self.seen.lock().unwrap().last().map(|(p, _)| p.clone()).unwrap_or_default()
    }

    fn last_header(&self, name: &str) -> Option<String> {
        self.seen
            .lock()
            .unwrap()
            .last()
            .and_then(|(_, h)| h.get(name))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

async fn reply(State(stub): State<Stub>, uri: Uri, headers: HeaderMap) -> Response {
    stub.seen.lock().unwrap().push((uri.path().to_string(), headers));
    let mut response = (stub.status, axum::Json(stub.body.clone())).into_response();
    if let Some(seconds) = stub.retry_after {
        response
            .headers_mut()
            .insert(axum::http::header::RETRY_AFTER, seconds.parse().unwrap());
    }
    response
}

/// Serve `stub` for every path on a random port, return its base URL.
async fn start_stub(stub: Stub) -> String {
    let app = Router::new().fallback(reply).with_state(stub);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://127.0.0.1:{port}")
}

fn request() -> CompletionRequest {
    CompletionRequest::new(vec![
        ChatMessage::system("You are a financing interviewer."),
        ChatMessage::user("Ask about income."),
    ])
    .with_max_tokens(64)
}

fn anthropic(base: &str) -> AnthropicProvider {
    AnthropicProvider::new(SecretString::from("sk-test"), "claude-test").with_base_url(format!("{base}/v1/messages"))
}

fn gemini(base: &str) -> GeminiProvider {
    GeminiProvider::new(SecretString::from("g-test"), "gemini-test").with_base_url(format!("{base}/v1beta/models"))
}

#[tokio::test]
async fn anthropic_rate_limit_carries_retry_after() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::new(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"type": "error", "error": {"type": "rate_limit_error", "message": "slow down"}}),
        )
        .with_retry_after("7");
        let base = start_stub(stub.clone()).await;

        let err = anthropic(&base).complete(request()).await.unwrap_err();
        match err {
            LlmError::RateLimited { provider, retry_after } => {
                assert_eq!(provider, "anthropic");
                assert_eq!(retry_after, Some(Duration::from_secs(7)));
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
        assert_eq!(stub.last_path(), "/v1/messages");
        assert_eq!(stub.last_header("x-api-key").as_deref(), Some("sk-test"));
        assert!(stub.last_header("anthropic-version").is_some());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn anthropic_bad_key_is_auth_failure() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::new(
            StatusCode::UNAUTHORIZED,
            json!({"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}}),
        );
        let base = start_stub(stub).await;

        let err = anthropic(&base).complete(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::AuthFailed { ref provider } if provider == "anthropic"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn anthropic_success_is_parsed() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::new(
            StatusCode::OK,
            json!({
                "id": "msg_1",
                "content": [{"type": "text", "text": "What is your annual income?"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 8}
            }),
        );
        let base = start_stub(stub).await;

        let response = anthropic(&base).complete(request()).await.unwrap();
        assert_eq!(response.content, "What is your annual income?");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!((response.input_tokens, response.output_tokens), (12, 8));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn gemini_quota_carries_retry_after() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::new(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}),
        )
        .with_retry_after("12");
        let base = start_stub(stub.clone()).await;

        let err = gemini(&base).complete(request()).await.unwrap_err();
        match err {
            LlmError::RateLimited { provider, retry_after } => {
                assert_eq!(provider, "gemini");
                assert_eq!(retry_after, Some(Duration::from_secs(12)));
            }
            other => panic!("expected rate limit, got {other:?}"),
        }
        assert_eq!(stub.last_path(), "/v1beta/models/gemini-test:generateContent");
        assert_eq!(stub.last_header("x-goog-api-key").as_deref(), Some("g-test"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn gemini_bad_key_is_auth_failure() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::new(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"code": 401, "message": "API key not valid", "status": "UNAUTHENTICATED"}}),
        );
        let base = start_stub(stub).await;

        let err = gemini(&base).complete(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::AuthFailed { ref provider } if provider == "gemini"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn gemini_success_is_parsed() {
    timeout(TEST_TIMEOUT, async {
        let stub = Stub::new(
            StatusCode::OK,
            json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "What is your credit score?"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 20, "candidatesTokenCount": 6}
            }),
        );
        let base = start_stub(stub).await;

        let response = gemini(&base).complete(request()).await.unwrap();
        assert_eq!(response.content, "What is your credit score?");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!((response.input_tokens, response.output_tokens), (20, 6));
    })
    .await
    .expect("test timed out");
}
