use anyhow::{Context, Result};
use gas_window::{
    client::FeedClient,
    models::{ForecastOutcome, RawObservation, TimeOfDayOutcome},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let base_url =
        std::env::var("GAS_WINDOW_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let feed_file = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FEED_FILE").ok())
        .context("Usage: feed-agent <observations.json> (or set FEED_FILE)")?;

    let raw = std::fs::read_to_string(&feed_file)
        .with_context(|| format!("Failed to read {}", feed_file))?;
    let observations: Vec<RawObservation> =
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", feed_file))?;

    println!("gas-window feed agent");
    println!("=====================");
    println!("Server: {}", base_url);
    println!("Observations: {}", observations.len());
    println!();

    let client = FeedClient::new(base_url);
    let session = client.create_session().await?;
    println!("Session: {}", session);

    let report = client.push(session, &observations, true).await?;
    println!(
        "Ingested: {} accepted, {} rejected, {} stored",
        report.accepted, report.rejected, report.stored
    );
    println!();

    let analysis = client.forecast(session).await?;
    for f in &analysis.forecasts {
        match &f.outcome {
            ForecastOutcome::Computed { value } => {
                println!("[{}] q{:.2}: {:.3} {}", f.label, f.quantile, value, f.unit)
            }
            ForecastOutcome::InsufficientData {
                required,
                available,
            } => println!(
                "[{}] not enough history ({} of {} bins)",
                f.label, available, required
            ),
        }
    }

    match &analysis.time_of_day {
        TimeOfDayOutcome::Computed(best) => println!(
            "Cheapest hour: {:02}:00 UTC ({:.2} gwei)",
            best.best_hour, best.avg_fee_gwei
        ),
        TimeOfDayOutcome::InsufficientData { span_days } => {
            println!("Cheapest hour: no data in the last {} days", span_days)
        }
    }

    Ok(())
}
