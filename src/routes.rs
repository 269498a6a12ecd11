//! REST endpoints for the interview and scenario expansion.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::error::{Error, ScenarioError, SessionError};
use crate::orchestrator::Orchestrator;
use crate::review::Profile;
use crate::scenarios::FinancingScenario;

/// Shared state for the API routes.
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
}

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    answer: String,
}

#[derive(Debug, Deserialize)]
struct ExpandRequest {
    parent_scenario: FinancingScenario,
    profile: Profile,
    #[serde(default = "first_level")]
    branch_level: i64,
}

fn first_level() -> i64 {
    1
}

/// An error rendered as `{"error", "kind", "retryable"}` with a status
/// that tells clients whether to retry, fix configuration, or fix the request.
#[derive(Debug)]
pub struct ApiError(Error);

impl<E: Into<Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Session(SessionError::NotFound(_)) => StatusCode::NOT_FOUND,
            Error::Session(_) | Error::Interview(_) => StatusCode::CONFLICT,
            Error::Scenario(e) => match e {
                ScenarioError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
                ScenarioError::AuthFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
                ScenarioError::Parse(_) | ScenarioError::Unavailable(_) => StatusCode::BAD_GATEWAY,
                ScenarioError::IncompleteProfile { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Error::Llm(_) => StatusCode::BAD_GATEWAY,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match &self.0 {
            Error::Session(SessionError::NotFound(_)) => "not_found",
            Error::Session(SessionError::AlreadyComplete(_)) => "already_complete",
            Error::Session(SessionError::NotComplete(_)) => "not_complete",
            Error::Interview(_) => "interview_state",
            Error::Scenario(e) => e.kind(),
            Error::Llm(_) => "unavailable",
            Error::Config(_) => "config",
        }
    }

    fn retryable(&self) -> bool {
        match &self.0 {
            Error::Scenario(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }
        let body = Json(serde_json::json!({
            "error": self.0.to_string(),
            "kind": self.kind(),
            "retryable": self.retryable(),
        }));
        let mut response = (status, body).into_response();
        if let Error::Scenario(ScenarioError::QuotaExceeded {
            retry_after: Some(delay),
        }) = &self.0
            && let Ok(value) = HeaderValue::from_str(&delay.as_secs().max(1).to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

/// POST /api/interview/start
async fn start_interview(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let started = state.orchestrator.start_interview().await?;
    Ok(Json(started))
}

/// POST /api/interview/{session_id}/answer
async fn submit_answer(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.orchestrator.submit_answer(&session_id, &request.answer).await?;
    Ok(Json(response))
}

/// GET /api/interview/{session_id}/results
///
/// 409 until the interview is complete.
async fn get_results(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state.orchestrator.get_results(&session_id).await?;
    Ok(Json(results))
}

/// POST /api/scenarios/expand
///
/// Returns three child scenarios of `parent_scenario`.
async fn expand_scenario(
    State(state): State<ApiState>,
    Json(request): Json<ExpandRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let children = state
        .orchestrator
        .expand(&request.parent_scenario, &request.profile, request.branch_level)
        .await?;
    Ok(Json(children))
}

/// Build the API routes.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/api/interview/start", post(start_interview))
        .route("/api/interview/{session_id}/answer", post(submit_answer))
        .route("/api/interview/{session_id}/results", get(get_results))
        .route("/api/scenarios/expand", post(expand_scenario))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn quota_is_429_with_retry_after() {
        let err = ApiError::from(ScenarioError::QuotaExceeded {
            retry_after: Some(Duration::from_secs(30)),
        });
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(err.retryable());
        let response = err.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "30");
    }

    #[test]
    fn status_mapping() {
        let cases: Vec<(Error, StatusCode, &str)> = vec![
            (SessionError::NotFound("x".into()).into(), StatusCode::NOT_FOUND, "not_found"),
            (SessionError::NotComplete("x".into()).into(), StatusCode::CONFLICT, "not_complete"),
            (SessionError::AlreadyComplete("x".into()).into(), StatusCode::CONFLICT, "already_complete"),
            (ScenarioError::AuthFailure("gemini".into()).into(), StatusCode::SERVICE_UNAVAILABLE, "auth"),
            (ScenarioError::Parse("bad".into()).into(), StatusCode::BAD_GATEWAY, "parse"),
            (ScenarioError::Unavailable("down".into()).into(), StatusCode::BAD_GATEWAY, "unavailable"),
            (
                ScenarioError::IncompleteProfile { missing: vec![] }.into(),
                StatusCode::UNPROCESSABLE_ENTITY,
                "incomplete_profile",
            ),
        ];
        for (err, status, kind) in cases {
            let err = ApiError(err);
            assert_eq!(err.status(), status);
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn auth_is_not_retryable() {
        assert!(!ApiError::from(ScenarioError::AuthFailure("anthropic".into())).retryable());
    }

    #[test]
    fn expand_request_defaults_to_first_level() {
        let request: ExpandRequest = serde_json::from_value(serde_json::json!({
            "parent_scenario": {
                "name": "Standard Finance",
                "title": "60 months",
                "description": "d",
                "plan_type": "finance",
                "down_payment": 3000.0,
                "monthly_payment": 520.5,
                "term_months": 60,
                "interest_rate": 5.9,
                "positivity_score": 70,
                "recommendations": "r",
                "suggested_model": "Toyota Camry Hybrid"
            },
            "profile": {"is_complete": false, "reason": "r", "missing_topics": ["income"]}
        }))
        .unwrap();
        assert_eq!(request.branch_level, 1);
        assert!(!request.profile.is_complete());
    }
}
