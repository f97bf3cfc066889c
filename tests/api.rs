use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Timelike, Utc};
use gas_window::{config::Config, handlers::AppState, models::Horizon, routes::build_router};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let config = Config {
        horizons: vec![Horizon::new("10m", 6, 0.3), Horizon::new("6h", 216, 0.3)],
        ..Default::default()
    };
    build_router(AppState::new(config).unwrap())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_stats() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    new_session(&app).await;
    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["sessions_created"], 1);
}

#[tokio::test]
async fn test_ingest_skips_malformed_records() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/observations", id),
        Some(json!({
            "observations": [
                {"timestamp": 1_700_000_000, "fee_gwei": 10.0},
                {"timestamp": 1_700_000_300, "fee_gwei": -1.0},
                {"timestamp": {"nested": true}, "fee_gwei": 1.0},
                {"timestamp": "2023-11-14T22:23:20Z", "base_fee_per_gas": "0x4a817c800"}
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["accepted"], 2);
    assert_eq!(body["data"]["rejected"], 2);
    assert_eq!(body["data"]["stored"], 2);

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["observations_rejected"], 2);
}

#[tokio::test]
async fn test_series_and_forecast() {
    let app = app();
    let id = new_session(&app).await;

    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let observations: Vec<Value> = (0..12)
        .flat_map(|i| {
            let ts = start + Duration::minutes(10 * i);
            vec![
                json!({"timestamp": ts.timestamp(), "fee_gwei": 10.0 + i as f64}),
                json!({"timestamp": ts.timestamp() + 300, "fee_gwei": 12.0 + i as f64}),
            ]
        })
        .collect();

    send(
        &app,
        "POST",
        &format!("/api/sessions/{}/observations", id),
        Some(json!({ "observations": observations })),
    )
    .await;

    let (status, series) = send(&app, "GET", &format!("/api/sessions/{}/series", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let bins = series["data"]["bins"].as_array().unwrap();
    assert_eq!(bins.len(), 12);
    assert_eq!(bins[0]["mean_fee_gwei"], 11.0);

    let (status, report) =
        send(&app, "GET", &format!("/api/sessions/{}/forecast", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let forecasts = report["data"]["forecasts"].as_array().unwrap();
    // Last 6 bin means: 17..=22, q0.3 -> position 1.5 -> 18.5
    assert_eq!(forecasts[0]["outcome"]["status"], "computed");
    let value = forecasts[0]["outcome"]["value"].as_f64().unwrap();
    assert!((value - 18.5).abs() < 1e-9);
    assert_eq!(forecasts[1]["outcome"]["status"], "insufficient_data");
    assert_eq!(forecasts[1]["outcome"]["required"], 216);
    assert_eq!(forecasts[1]["outcome"]["available"], 12);

    // Each request analyses the store as it is now.
    let next = start + Duration::minutes(120);
    send(
        &app,
        "POST",
        &format!("/api/sessions/{}/observations", id),
        Some(json!({ "observations": [{"timestamp": next.timestamp(), "fee_gwei": 40.0}] })),
    )
    .await;
    let (_, report) = send(&app, "GET", &format!("/api/sessions/{}/forecast", id), None).await;
    assert_eq!(report["data"]["observation_count"], 25);
    assert_eq!(report["data"]["forecasts"][1]["outcome"]["available"], 13);
    // Last 6 bin means: 18..=22 and 40, q0.3 -> 19.5
    let value = report["data"]["forecasts"][0]["outcome"]["value"].as_f64().unwrap();
    assert!((value - 19.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_cheapest_hour_two_days() {
    let app = app();
    let id = new_session(&app).await;

    let day0 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let observations: Vec<Value> = (0..48)
        .map(|h| {
            let ts = day0 + Duration::hours(h);
            let fee = if ts.hour() == 3 { 100.0 } else { 200.0 };
            json!({"timestamp": ts.to_rfc3339(), "fee_gwei": fee})
        })
        .collect();

    send(
        &app,
        "POST",
        &format!("/api/sessions/{}/observations", id),
        Some(json!({ "observations": observations })),
    )
    .await;

    let (status, body) =
        send(&app, "GET", &format!("/api/sessions/{}/cheapest-hour", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["best_hour"], 3);
    assert_eq!(body["data"]["avg_fee_gwei"], 100.0);
    assert_eq!(body["data"]["hourly"].as_object().unwrap().len(), 24);
}

#[tokio::test]
async fn test_empty_session_reports_insufficient_data() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) =
        send(&app, "GET", &format!("/api/sessions/{}/cheapest-hour", id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_code"], "INSUFFICIENT_DATA");

    let (status, report) =
        send(&app, "GET", &format!("/api/sessions/{}/forecast", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"]["time_of_day"]["status"], "insufficient_data");
}

#[tokio::test]
async fn test_observation_range_and_replace() {
    let app = app();
    let id = new_session(&app).await;
    let uri = format!("/api/sessions/{}/observations", id);

    let batch: Vec<Value> = (0..5)
        .map(|i| json!({"timestamp": 1_700_000_000 + i * 60, "fee_gwei": i as f64}))
        .collect();
    send(&app, "POST", &uri, Some(json!({ "observations": batch }))).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("{}?start=2023-11-14T22:14:20Z&end=2023-11-14T22:16:20Z", uri),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        "GET",
        &format!("{}?start=2023-11-14T22:16:20Z&end=2023-11-14T22:14:20Z", uri),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_RANGE");

    let (_, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({
            "observations": [{"timestamp": 1_800_000_000, "fee_gwei": 1.0}],
            "replace": true
        })),
    )
    .await;
    assert_eq!(body["data"]["stored"], 1);
}

#[tokio::test]
async fn test_portfolio_health_and_history() {
    let app = app();
    let id = new_session(&app).await;
    let uri = format!("/api/sessions/{}/portfolio/health", id);

    let (status, body) = send(
        &app,
        "POST",
        &uri,
        Some(json!({
            "wallet": "0x1111111111111111111111111111111111111111",
            "positions": [
                {"protocol": "aave", "collateral_usd": 1000.0, "borrowed_usd": 400.0},
                {"protocol": "spark", "collateral_usd": 50.0, "borrowed_usd": 0.0}
            ],
            "liquidation_thresholds": {"aave": 0.8, "spark": 0.75}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["health_factor"]["kind"], "finite");
    let hf = body["data"]["health_factor"]["value"].as_f64().unwrap();
    assert!((hf - 3.125).abs() < 1e-9);
    assert_eq!(body["data"]["protocols"][1]["health_factor"]["kind"], "no_debt");

    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(json!({
            "positions": [{"protocol": "aave", "collateral_usd": 1.0, "borrowed_usd": 1.0}],
            "liquidation_thresholds": {}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, history) = send(
        &app,
        "GET",
        &format!("/api/sessions/{}/portfolio/history", id),
        None,
    )
    .await;
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_and_deleted_sessions() {
    let app = app();
    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/sessions/{}/forecast", missing),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "SESSION_NOT_FOUND");

    let id = new_session(&app).await;
    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/sessions/{}/series", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_timestamps_at_the_edges_of_the_calendar() {
    let app = app();
    let id = new_session(&app).await;
    // 100 seconds before the last second chrono can represent.
    let late = 8_210_266_876_799_i64 - 100;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/observations", id),
        Some(json!({
            "observations": [
                {"timestamp": late - 3600, "fee_gwei": 9.0},
                {"timestamp": late, "fee_gwei": 4.0},
                {"timestamp": -8_334_601_315_100_i64, "fee_gwei": 1.0}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["accepted"], 2);
    assert_eq!(body["data"]["rejected"], 1);

    let (status, report) =
        send(&app, "GET", &format!("/api/sessions/{}/forecast", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["data"]["time_of_day"]["status"], "computed");

    let (status, best) =
        send(&app, "GET", &format!("/api/sessions/{}/cheapest-hour", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(best["data"]["avg_fee_gwei"], 4.0);
}

#[tokio::test]
async fn test_portfolio_rejects_overflowing_amounts() {
    let app = app();
    let id = new_session(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{}/portfolio/health", id),
        Some(json!({
            "positions": [{"protocol": "aave", "collateral_usd": 1e300, "borrowed_usd": 1e-300}],
            "liquidation_thresholds": {"aave": 0.8}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_PARAMETER");

    let (_, history) = send(
        &app,
        "GET",
        &format!("/api/sessions/{}/portfolio/history", id),
        None,
    )
    .await;
    assert!(history["data"].as_array().unwrap().is_empty());
}
