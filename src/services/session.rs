use crate::{
    error::GasWindowError,
    models::{HealthPoint, SessionInfo},
    services::observation_store::ObservationStore,
};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

const HEALTH_HISTORY_CAP: usize = 1000;

/// State owned by a single analysis session. Nothing here is shared across
/// sessions.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub store: ObservationStore,
    health_history: VecDeque<HealthPoint>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            store: ObservationStore::new(),
            health_history: VecDeque::new(),
        }
    }

    pub fn record_health(&mut self, point: HealthPoint) {
        if self.health_history.len() >= HEALTH_HISTORY_CAP {
            self.health_history.pop_front();
        }
        self.health_history.push_back(point);
    }

    pub fn health_history(&self) -> Vec<HealthPoint> {
        self.health_history.iter().copied().collect()
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.id,
            created_at: self.created_at,
            observation_count: self.store.len(),
        }
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Live sessions, evicted after sitting idle.
///
/// Each session is locked for the duration of an ingest or analysis, so
/// cycles on the same session never overlap.
pub struct SessionRegistry {
    sessions: Cache<Uuid, SessionHandle>,
}

impl SessionRegistry {
    pub fn new(max_sessions: u64, idle_timeout: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(max_sessions)
            .time_to_idle(idle_timeout)
            .build();

        Self { sessions }
    }

    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(Session::new(id)));
        self.sessions.insert(id, handle.clone()).await;
        tracing::info!("Session {} created", id);
        (id, handle)
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, GasWindowError> {
        match self.sessions.get(&id).await {
            Some(handle) => {
                tracing::debug!("Session hit: {}", id);
                Ok(handle)
            }
            None => Err(GasWindowError::SessionNotFound(id.to_string())),
        }
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), GasWindowError> {
        match self.sessions.remove(&id).await {
            Some(_) => {
                tracing::info!("Session {} removed", id);
                Ok(())
            }
            None => Err(GasWindowError::SessionNotFound(id.to_string())),
        }
    }

    pub async fn count(&self) -> u64 {
        self.sessions.run_pending_tasks().await;
        self.sessions.entry_count()
    }
}
