use crate::{
    error::GasWindowError,
    handlers::AppState,
    models::{ApiResponse, HealthPoint, PortfolioHealth, PortfolioRequest},
    services::portfolio::portfolio_health,
};
use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

pub async fn evaluate_portfolio(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PortfolioRequest>,
) -> Result<Json<ApiResponse<PortfolioHealth>>, GasWindowError> {
    let handle = state.sessions.get(id).await?;
    let health = portfolio_health(&request)?;

    handle.lock().await.record_health(HealthPoint {
        timestamp: health.evaluated_at,
        health_factor: health.health_factor,
    });

    tracing::info!(
        "Session {}: portfolio health {:?} across {} protocols",
        id,
        health.health_factor,
        health.protocols.len()
    );

    Ok(Json(ApiResponse::ok(health, Some(id))))
}

pub async fn get_health_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<HealthPoint>>>, GasWindowError> {
    let handle = state.sessions.get(id).await?;
    let history = handle.lock().await.health_history();
    Ok(Json(ApiResponse::ok(history, Some(id))))
}
