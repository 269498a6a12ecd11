//! Session store: per-session state behind a per-session lock.

pub mod memory;

pub use memory::{InMemorySessionStore, spawn_expiry_task};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::SessionError;
use crate::interview::InterviewController;
use crate::review::Profile;
use crate::scenarios::FinancingScenario;
use crate::validation::ValidationResult;

/// Everything the orchestrator keeps for one interview.
pub struct InterviewRecord {
    pub controller: InterviewController,
    /// One entry per submitted answer, accepted or not.
    pub validation_history: Vec<ValidationResult>,
    /// Set once the interview completes.
    pub analysis: Option<Profile>,
    /// Empty until generation succeeds.
    pub recommendations: Vec<FinancingScenario>,
    pub last_active: DateTime<Utc>,
}

impl InterviewRecord {
    pub fn new(controller: InterviewController) -> Self {
        Self {
            controller,
            validation_history: Vec::new(),
            analysis: None,
            recommendations: Vec::new(),
            last_active: Utc::now(),
        }
    }

    pub fn session_id(&self) -> &str {
        self.controller.session_id()
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Whether the record has been idle longer than `max_idle`.
    pub fn is_idle(&self, max_idle: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_active)
            .to_std()
            .is_ok_and(|idle| idle > max_idle)
    }
}

/// Shared handle to one session. Holding the lock serializes every step of
/// that session; other sessions are unaffected.
pub type SessionHandle = Arc<Mutex<InterviewRecord>>;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new record under its session id.
    async fn create(&self, record: InterviewRecord) -> SessionHandle;

    async fn get(&self, session_id: &str) -> Result<SessionHandle, SessionError>;

    /// Remove a session. Returns whether it existed.
    async fn remove(&self, session_id: &str) -> bool;

    /// Drop sessions idle longer than `max_idle`. Returns how many were dropped.
    async fn expire_idle(&self, max_idle: Duration) -> usize;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
