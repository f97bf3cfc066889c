use crate::models::{AnalysisReport, ForecastOutcome, IngestReport, Stats, TimeOfDayOutcome};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Process-wide counters. Lost on restart.
pub struct Analytics {
    sessions_created: AtomicU64,
    batches_ingested: AtomicU64,
    observations_accepted: AtomicU64,
    observations_rejected: AtomicU64,
    analyses_run: AtomicU64,
    insufficient_data: AtomicU64,
    start_time: Instant,
}

impl Default for Analytics {
    fn default() -> Self {
        Self::new()
    }
}

impl Analytics {
    pub fn new() -> Self {
        Self {
            sessions_created: AtomicU64::new(0),
            batches_ingested: AtomicU64::new(0),
            observations_accepted: AtomicU64::new(0),
            observations_rejected: AtomicU64::new(0),
            analyses_run: AtomicU64::new(0),
            insufficient_data: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_session(&self) {
        self.sessions_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ingest(&self, report: &IngestReport) {
        self.batches_ingested.fetch_add(1, Ordering::Relaxed);
        self.observations_accepted
            .fetch_add(report.accepted as u64, Ordering::Relaxed);
        self.observations_rejected
            .fetch_add(report.rejected as u64, Ordering::Relaxed);

        if report.rejected > 0 {
            tracing::warn!(
                "Ingest skipped {} malformed observations ({} accepted)",
                report.rejected,
                report.accepted
            );
        }
    }

    pub fn record_analysis(&self, report: &AnalysisReport) {
        self.analyses_run.fetch_add(1, Ordering::Relaxed);

        let short_forecasts = report
            .forecasts
            .iter()
            .filter(|f| matches!(f.outcome, ForecastOutcome::InsufficientData { .. }))
            .count() as u64;
        let short_hourly = matches!(
            report.time_of_day,
            TimeOfDayOutcome::InsufficientData { .. }
        ) as u64;

        self.insufficient_data
            .fetch_add(short_forecasts + short_hourly, Ordering::Relaxed);
    }

    pub fn record_insufficient_data(&self) {
        self.insufficient_data.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self, active_sessions: u64) -> Stats {
        Stats {
            sessions_created: self.sessions_created.load(Ordering::Relaxed),
            active_sessions,
            batches_ingested: self.batches_ingested.load(Ordering::Relaxed),
            observations_accepted: self.observations_accepted.load(Ordering::Relaxed),
            observations_rejected: self.observations_rejected.load(Ordering::Relaxed),
            analyses_run: self.analyses_run.load(Ordering::Relaxed),
            insufficient_data: self.insufficient_data.load(Ordering::Relaxed),
            uptime_seconds: self.uptime_seconds(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
