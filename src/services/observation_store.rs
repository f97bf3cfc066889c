use crate::{
    error::GasWindowError,
    models::{IngestReport, Observation, Span},
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Time-ordered fee observations, unique by timestamp.
///
/// Later ingests overwrite earlier values at the same timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationStore {
    entries: BTreeMap<DateTime<Utc>, Observation>,
}

impl ObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ingest<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut count = 0;
        for obs in batch {
            self.entries.insert(obs.timestamp(), obs);
            count += 1;
        }
        count
    }

    /// Validates each record on its own; malformed ones are skipped and counted.
    pub fn ingest_raw<I, T>(&mut self, batch: I) -> IngestReport
    where
        I: IntoIterator<Item = T>,
        T: TryInto<Observation, Error = GasWindowError>,
    {
        let mut report = IngestReport::default();

        for record in batch {
            match record.try_into() {
                Ok(obs) => {
                    self.entries.insert(obs.timestamp(), obs);
                    report.accepted += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping observation: {}", e);
                    report.rejected += 1;
                }
            }
        }

        report.stored = self.entries.len();
        report
    }

    /// Drops the current contents and ingests `batch` in their place.
    pub fn replace<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = Observation>,
    {
        self.clear();
        self.ingest(batch)
    }

    /// Observations with `start <= timestamp < end`.
    pub fn range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Observation>, GasWindowError> {
        if end < start {
            return Err(GasWindowError::InvalidRange { start, end });
        }

        Ok(self
            .entries
            .range(start..end)
            .map(|(_, &obs)| obs)
            .collect())
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.entries.values().copied().collect()
    }

    pub fn span(&self) -> Option<Span> {
        let (&earliest, _) = self.entries.first_key_value()?;
        let (&latest, _) = self.entries.last_key_value()?;
        Some(Span { earliest, latest })
    }

    /// Observations with `timestamp >= start`, through the latest one.
    pub fn since(&self, start: DateTime<Utc>) -> Vec<Observation> {
        self.entries.range(start..).map(|(_, &obs)| obs).collect()
    }

    pub fn latest(&self) -> Option<Observation> {
        self.entries.last_key_value().map(|(_, &obs)| obs)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
