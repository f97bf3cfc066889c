use crate::{
    config::Config,
    error::GasWindowError,
    models::{AnalysisReport, BinnedSeries, CheapestHour, Horizon, TimeOfDayOutcome},
    services::{
        forecaster::forecast_horizons,
        observation_store::ObservationStore,
        resampler::{resample, BinWidth},
        time_of_day::cheapest_hour,
    },
};
use chrono::{DateTime, Duration, Utc};

/// Runs the resample -> forecast -> time-of-day pipeline over a store.
#[derive(Debug, Clone)]
pub struct FeeAnalyzer {
    bin_width: BinWidth,
    horizons: Vec<Horizon>,
    hourly_span: Duration,
}

impl FeeAnalyzer {
    pub fn new(
        bin_width: BinWidth,
        horizons: Vec<Horizon>,
        hourly_span: Duration,
    ) -> Result<Self, GasWindowError> {
        if horizons.is_empty() {
            return Err(GasWindowError::ConfigError(
                "at least one forecast horizon is required".to_string(),
            ));
        }
        if hourly_span <= Duration::zero() {
            return Err(GasWindowError::ConfigError(
                "hourly aggregation span must be positive".to_string(),
            ));
        }

        Ok(Self {
            bin_width,
            horizons,
            hourly_span,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GasWindowError> {
        let hourly_span = Duration::try_days(config.hourly_span_days).ok_or_else(|| {
            GasWindowError::ConfigError(format!(
                "hourly span of {} days is out of range",
                config.hourly_span_days
            ))
        })?;
        Self::new(
            BinWidth::from_secs(config.bin_width_secs)?,
            config.horizons.clone(),
            hourly_span,
        )
    }

    pub fn bin_width(&self) -> BinWidth {
        self.bin_width
    }

    pub fn horizons(&self) -> &[Horizon] {
        &self.horizons
    }

    pub fn series(&self, store: &ObservationStore) -> BinnedSeries {
        resample(&store.observations(), self.bin_width)
    }

    /// Cheapest hour over `[latest - span, latest]`.
    pub fn cheapest_hour(&self, store: &ObservationStore) -> Result<CheapestHour, GasWindowError> {
        let Some(latest) = store.latest() else {
            return Err(GasWindowError::InsufficientData {
                required: 1,
                available: 0,
            });
        };

        let start = latest
            .timestamp()
            .checked_sub_signed(self.hourly_span)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        cheapest_hour(&store.since(start))
    }

    pub fn analyze(&self, store: &ObservationStore) -> Result<AnalysisReport, GasWindowError> {
        let series = self.series(store);
        let forecasts = forecast_horizons(&series, &self.horizons)?;

        let time_of_day = match self.cheapest_hour(store) {
            Ok(best) => TimeOfDayOutcome::Computed(best),
            Err(GasWindowError::InsufficientData { .. }) => TimeOfDayOutcome::InsufficientData {
                span_days: self.hourly_span.num_days(),
            },
            Err(e) => return Err(e),
        };

        for f in &forecasts {
            match f.outcome.value() {
                Some(value) => tracing::info!(
                    "Forecast {}: q{:.2} over {} bins = {:.3} gwei",
                    f.label,
                    f.quantile,
                    f.window_bins,
                    value
                ),
                None => tracing::debug!("Forecast {}: insufficient data", f.label),
            }
        }

        Ok(AnalysisReport {
            generated_at: Utc::now(),
            observation_count: store.len(),
            span: store.span(),
            series,
            forecasts,
            time_of_day,
        })
    }
}
