use crate::{
    error::GasWindowError,
    handlers::AppState,
    models::{AnalysisReport, ApiResponse, BinnedSeries, CheapestHour},
    services::{resampler::resample, BinWidth},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub bin_width_secs: Option<i64>,
}

pub async fn get_series(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<ApiResponse<BinnedSeries>>, GasWindowError> {
    let width = match query.bin_width_secs {
        Some(secs) => BinWidth::from_secs(secs)?,
        None => state.analyzer.bin_width(),
    };

    let handle = state.sessions.get(id).await?;
    let series = resample(&handle.lock().await.store.observations(), width);

    Ok(Json(ApiResponse::ok(series, Some(id))))
}

/// Runs one full analysis cycle over the session's current store.
pub async fn run_analysis(state: &AppState, id: Uuid) -> Result<AnalysisReport, GasWindowError> {
    let handle = state.sessions.get(id).await?;
    let report = state.analyzer.analyze(&handle.lock().await.store)?;
    state.analytics.record_analysis(&report);

    Ok(report)
}

pub async fn get_forecast(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AnalysisReport>>, GasWindowError> {
    let report = run_analysis(&state, id).await?;
    Ok(Json(ApiResponse::ok(report, Some(id))))
}

pub async fn get_cheapest_hour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CheapestHour>>, GasWindowError> {
    let handle = state.sessions.get(id).await?;
    let result = state.analyzer.cheapest_hour(&handle.lock().await.store);

    if let Err(GasWindowError::InsufficientData { .. }) = &result {
        state.analytics.record_insufficient_data();
    }

    Ok(Json(ApiResponse::ok(result?, Some(id))))
}
