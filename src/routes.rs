use crate::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", axum::routing::delete(delete_session))
        .route(
            "/api/sessions/:id/observations",
            post(ingest_observations).get(list_observations),
        )
        .route("/api/sessions/:id/series", get(get_series))
        .route("/api/sessions/:id/forecast", get(get_forecast))
        .route("/api/sessions/:id/cheapest-hour", get(get_cheapest_hour))
        .route("/api/sessions/:id/portfolio/health", post(evaluate_portfolio))
        .route("/api/sessions/:id/portfolio/history", get(get_health_history))
        .route("/ws/sessions/:id", get(websocket_handler))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
