//! In-memory session store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::{InterviewRecord, SessionHandle, SessionStore};
use crate::error::SessionError;

/// How often the expiry task sweeps.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, record: InterviewRecord) -> SessionHandle {
        let session_id = record.session_id().to_string();
        let handle = Arc::new(Mutex::new(record));
        self.sessions.write().await.insert(session_id.clone(), handle.clone());
        debug!(session_id = %session_id, "Session created");
        handle
    }

    async fn get(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    async fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    async fn expire_idle(&self, max_idle: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        // A locked session is in use, so it is not idle
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(record) => !record.is_idle(max_idle, now),
            Err(_) => true,
        });
        let expired = before - sessions.len();
        if expired > 0 {
            info!(count = expired, "Expired idle sessions");
        }
        expired
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Sweep idle sessions every minute.
pub fn spawn_expiry_task(store: Arc<dyn SessionStore>, max_idle: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            store.expire_idle(max_idle).await;
        }
    })
}
