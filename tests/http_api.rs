//! Integration tests for the REST surface.
//!
//! Each test spins up an Axum server on a random port and exercises the
//! real JSON contract with reqwest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use auto_finance_advisor::config::InterviewConfig;
use auto_finance_advisor::error::LlmError;
use auto_finance_advisor::llm::{CompletionRequest, CompletionResponse, LlmProvider};
use auto_finance_advisor::orchestrator::Orchestrator;
use auto_finance_advisor::routes::{ApiState, api_routes};
use auto_finance_advisor::session::InMemorySessionStore;

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const JANE: [&str; 5] = [
    "My name is Jane Doe",
    "$95,000",
    "720",
    "buy",
    "Camry Hybrid, fuel efficiency",
];

/// Every call is rate limited.
struct ExhaustedLlm;

#[async_trait]
impl LlmProvider for ExhaustedLlm {
    fn model_name(&self) -> &str {
        "exhausted"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::RateLimited {
            provider: "exhausted".into(),
            retry_after: Some(Duration::from_secs(30)),
        })
    }
}

/// Start an Axum server on a random port, return its base URL.
async fn start_server(llm: Option<Arc<dyn LlmProvider>>) -> String {
    let orchestrator = Arc::new(Orchestrator::new(
        InterviewConfig::default(),
        llm,
        InMemorySessionStore::new(),
    ));
    let app = api_routes(ApiState { orchestrator });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

async fn start(client: &reqwest::Client, base: &str) -> Value {
    let resp = client
        .post(format!("{base}/api/interview/start"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

async fn answer(client: &reqwest::Client, base: &str, session_id: &str, text: &str) -> reqwest::Response {
    client
        .post(format!("{base}/api/interview/{session_id}/answer"))
        .json(&json!({ "answer": text }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn full_interview_over_http() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(None).await;
        let client = reqwest::Client::new();

        let started = start(&client, &base).await;
        let session_id = started["session_id"].as_str().unwrap().to_string();
        assert!(started["question"].as_str().unwrap().contains("name"));

        // Results are not available mid-interview
        let early = client
            .get(format!("{base}/api/interview/{session_id}/results"))
            .send()
            .await
            .unwrap();
        assert_eq!(early.status(), 409);
        let body: Value = early.json().await.unwrap();
        assert_eq!(body["kind"], "not_complete");
        assert_eq!(body["retryable"], false);

        let mut last = Value::Null;
        for text in JANE {
            let resp = answer(&client, &base, &session_id, text).await;
            assert_eq!(resp.status(), 200);
            last = resp.json().await.unwrap();
            assert_eq!(last["is_followup"], false);
        }
        assert_eq!(last["is_complete"], true);
        assert_eq!(last["progress"], json!({"current": 5, "total": 5}));
        assert_eq!(last["analysis"]["is_complete"], true);
        assert_eq!(last["recommendations"].as_array().unwrap().len(), 5);

        let resp = client
            .get(format!("{base}/api/interview/{session_id}/results"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let results: Value = resp.json().await.unwrap();
        assert_eq!(results["conversation"].as_array().unwrap().len(), 10);
        assert_eq!(results["analysis"]["income"], 95000.0);

        // Expand the first scenario along the trade-in branch
        let resp = client
            .post(format!("{base}/api/scenarios/expand"))
            .json(&json!({
                "parent_scenario": results["recommendations"][0],
                "profile": results["analysis"],
                "branch_level": 6,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let children: Value = resp.json().await.unwrap();
        assert_eq!(children.as_array().unwrap().len(), 3);

        // A finished interview refuses more answers
        let resp = answer(&client, &base, &session_id, "I also want heated seats").await;
        assert_eq!(resp.status(), 409);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rejected_answer_is_a_followup() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(None).await;
        let client = reqwest::Client::new();
        let started = start(&client, &base).await;
        let session_id = started["session_id"].as_str().unwrap();

        let resp = answer(&client, &base, session_id, "whatever").await;
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["is_followup"], true);
        assert_eq!(body["is_complete"], false);
        assert_eq!(body["validation"]["is_valid"], false);
        assert_eq!(body["progress"]["current"], 1);
        assert!(body.get("analysis").is_none());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unknown_session_is_404() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(None).await;
        let client = reqwest::Client::new();
        let resp = answer(&client, &base, "no-such-session", "My name is Jane Doe").await;
        assert_eq!(resp.status(), 404);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["kind"], "not_found");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn expand_with_incomplete_profile_is_422() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(None).await;
        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{base}/api/scenarios/expand"))
            .json(&json!({
                "parent_scenario": {
                    "name": "Standard Finance",
                    "title": "60-month loan",
                    "description": "Balanced payment",
                    "plan_type": "finance",
                    "down_payment": 3000.0,
                    "monthly_payment": 520.0,
                    "term_months": 60,
                    "interest_rate": 5.9,
                    "positivity_score": 70,
                    "recommendations": "Keep an emergency fund",
                    "suggested_model": "Toyota Camry Hybrid"
                },
                "profile": {"is_complete": false, "reason": "short", "missing_topics": ["income"]},
                "branch_level": 2,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 422);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["kind"], "incomplete_profile");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn quota_exhaustion_is_429_with_retry_after() {
    timeout(TEST_TIMEOUT, async {
        let base = start_server(Some(Arc::new(ExhaustedLlm))).await;
        let client = reqwest::Client::new();
        let started = start(&client, &base).await;
        let session_id = started["session_id"].as_str().unwrap();

        for text in &JANE[..4] {
            assert_eq!(answer(&client, &base, session_id, text).await.status(), 200);
        }
        let resp = answer(&client, &base, session_id, JANE[4]).await;
        assert_eq!(resp.status(), 429);
        assert_eq!(resp.headers()["retry-after"], "30");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["kind"], "quota");
        assert_eq!(body["retryable"], true);

        // The interview finished; results retry generation and hit the same limit
        let resp = client
            .get(format!("{base}/api/interview/{session_id}/results"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 429);
    })
    .await
    .expect("test timed out");
}
