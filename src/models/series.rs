use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub start: DateTime<Utc>,
    pub mean_fee_gwei: f64,
}

/// Fixed-width series of bin means. Only bins that received at least one
/// observation are present; keys are strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinnedSeries {
    pub bin_width_secs: i64,
    pub bins: Vec<Bin>,
}

impl BinnedSeries {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn get(&self, start: DateTime<Utc>) -> Option<f64> {
        self.bins
            .binary_search_by_key(&start, |b| b.start)
            .ok()
            .map(|i| self.bins[i].mean_fee_gwei)
    }

    pub fn last(&self) -> Option<&Bin> {
        self.bins.last()
    }

    /// The last `n` present bins, oldest first. Shorter when fewer exist.
    pub fn tail(&self, n: usize) -> &[Bin] {
        &self.bins[self.bins.len().saturating_sub(n)..]
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.bins.iter().map(|b| b.mean_fee_gwei)
    }
}

/// Mean fee per hour-of-day (0-23). Hours that never saw data are absent.
pub type HourlyTable = BTreeMap<u32, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheapestHour {
    pub best_hour: u32,
    pub avg_fee_gwei: f64,
    pub hourly: HourlyTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    pub label: String,
    pub window_bins: usize,
    pub quantile: f64,
}

impl Horizon {
    pub fn new(label: impl Into<String>, window_bins: usize, quantile: f64) -> Self {
        Self {
            label: label.into(),
            window_bins,
            quantile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    Computed { value: f64 },
    InsufficientData { required: usize, available: usize },
}

impl ForecastOutcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            ForecastOutcome::Computed { value } => Some(*value),
            ForecastOutcome::InsufficientData { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonForecast {
    pub label: String,
    pub window_bins: usize,
    pub quantile: f64,
    pub as_of: Option<DateTime<Utc>>,
    pub outcome: ForecastOutcome,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeOfDayOutcome {
    Computed(CheapestHour),
    InsufficientData { span_days: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}

/// Output of one ingest -> resample -> forecast cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub observation_count: usize,
    pub span: Option<Span>,
    pub series: BinnedSeries,
    pub forecasts: Vec<HorizonForecast>,
    pub time_of_day: TimeOfDayOutcome,
}
