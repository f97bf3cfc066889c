use crate::{
    error::GasWindowError,
    handlers::AppState,
    models::{ApiResponse, IngestReport, Observation, SessionInfo},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    /// Raw records; each one is validated on its own.
    pub observations: Vec<serde_json::Value>,
    #[serde(default)]
    pub replace: bool,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<SessionInfo>>) {
    let (id, handle) = state.sessions.create().await;
    state.analytics.record_session();

    let info = handle.lock().await.info();
    (StatusCode::CREATED, Json(ApiResponse::ok(info, Some(id))))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, GasWindowError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn ingest_observations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<ApiResponse<IngestReport>>, GasWindowError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    if request.replace {
        session.store.clear();
    }
    let report = session.store.ingest_raw(request.observations);
    state.analytics.record_ingest(&report);

    tracing::info!(
        "Session {}: ingested {} observations ({} rejected, {} stored)",
        id,
        report.accepted,
        report.rejected,
        report.stored
    );

    Ok(Json(ApiResponse::ok(report, Some(id))))
}

pub async fn list_observations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ApiResponse<Vec<Observation>>>, GasWindowError> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;

    let observations = match (query.start, query.end) {
        (None, None) => session.store.observations(),
        (start, end) => {
            let start = start.unwrap_or(DateTime::<Utc>::MIN_UTC);
            let end = end.unwrap_or(DateTime::<Utc>::MAX_UTC);
            session.store.range(start, end)?
        }
    };

    Ok(Json(ApiResponse::ok(observations, Some(id))))
}
