use crate::models::Horizon;
use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Forecasting
    pub bin_width_secs: i64,
    pub horizons: Vec<Horizon>,
    pub hourly_span_days: i64,

    // Sessions
    pub session_idle_secs: u64,
    pub max_sessions: u64,
    pub dashboard_refresh_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            host: "0.0.0.0".to_string(),
            port: 8080,
            bin_width_secs: 600,
            horizons: default_horizons(),
            hourly_span_days: 30,
            session_idle_secs: 3600,
            max_sessions: 1000,
            dashboard_refresh_secs: 5,
        }
    }
}

pub fn default_horizons() -> Vec<Horizon> {
    vec![Horizon::new("10m", 36, 0.30), Horizon::new("6h", 216, 0.30)]
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            environment: Self::parse_environment()?,
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: Self::parse_var("PORT", defaults.port)?,

            bin_width_secs: Self::parse_var("BIN_WIDTH_SECS", defaults.bin_width_secs)?,
            horizons: match std::env::var("FORECAST_HORIZONS") {
                Ok(spec) => parse_horizons(&spec)?,
                Err(_) => defaults.horizons,
            },
            hourly_span_days: Self::parse_var("HOURLY_SPAN_DAYS", defaults.hourly_span_days)?,

            session_idle_secs: Self::parse_var("SESSION_IDLE_SECS", defaults.session_idle_secs)?,
            max_sessions: Self::parse_var("MAX_SESSIONS", defaults.max_sessions)?,
            dashboard_refresh_secs: Self::parse_var(
                "DASHBOARD_REFRESH_SECS",
                defaults.dashboard_refresh_secs,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn parse_var<T>(var: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match std::env::var(var) {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}", var)),
            Err(_) => Ok(default),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.bin_width_secs <= 0 {
            bail!("BIN_WIDTH_SECS must be positive");
        }
        if self.hourly_span_days <= 0 {
            bail!("HOURLY_SPAN_DAYS must be positive");
        }
        if self.dashboard_refresh_secs == 0 {
            bail!("DASHBOARD_REFRESH_SECS must be positive");
        }
        if self.horizons.is_empty() {
            bail!("FORECAST_HORIZONS must name at least one horizon");
        }

        let mut labels = HashSet::new();
        for h in &self.horizons {
            if h.window_bins == 0 {
                bail!("Horizon {} needs a window of at least one bin", h.label);
            }
            if !(0.0..=1.0).contains(&h.quantile) {
                bail!("Horizon {} quantile {} is outside [0, 1]", h.label, h.quantile);
            }
            if !labels.insert(h.label.as_str()) {
                bail!("Duplicate horizon label: {}", h.label);
            }
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

/// Parses `label:window_bins:quantile` entries separated by commas.
pub fn parse_horizons(spec: &str) -> Result<Vec<Horizon>> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
            let [label, window, quantile] = parts.as_slice() else {
                bail!("Horizon {:?} must look like label:window_bins:quantile", entry);
            };
            let window_bins = window
                .parse()
                .with_context(|| format!("Invalid window in horizon {:?}", entry))?;
            let quantile = quantile
                .parse()
                .with_context(|| format!("Invalid quantile in horizon {:?}", entry))?;
            Ok(Horizon::new(*label, window_bins, quantile))
        })
        .collect()
}
