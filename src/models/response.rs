use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub request_id: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, session_id: Option<Uuid>) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
            session_id,
            request_id: Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub active_sessions: u64,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Stats {
    pub sessions_created: u64,
    pub active_sessions: u64,
    pub batches_ingested: u64,
    pub observations_accepted: u64,
    pub observations_rejected: u64,
    pub analyses_run: u64,
    pub insufficient_data: u64,
    pub uptime_seconds: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub observation_count: usize,
}
