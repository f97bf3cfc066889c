use crate::{
    error::GasWindowError,
    models::{CheapestHour, HourlyTable, Observation},
    services::resampler::{resample, BinWidth},
};
use chrono::Timelike;
use std::collections::BTreeMap;

/// Mean of the hourly bin means per UTC hour-of-day.
pub fn hourly_table(observations: &[Observation]) -> HourlyTable {
    let series = resample(observations, BinWidth::ONE_HOUR);

    let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for bin in &series.bins {
        let entry = sums.entry(bin.start.hour()).or_insert((0.0, 0));
        entry.0 += bin.mean_fee_gwei;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(hour, (sum, count))| (hour, sum / count as f64))
        .collect()
}

/// Hour with the lowest mean; ties go to the lowest hour.
pub fn cheapest_in_table(hourly: HourlyTable) -> Result<CheapestHour, GasWindowError> {
    let mut best: Option<(u32, f64)> = None;
    for (&hour, &avg) in &hourly {
        match best {
            Some((_, best_avg)) if avg >= best_avg => {}
            _ => best = Some((hour, avg)),
        }
    }

    let (best_hour, avg_fee_gwei) = best.ok_or(GasWindowError::InsufficientData {
        required: 1,
        available: 0,
    })?;

    Ok(CheapestHour {
        best_hour,
        avg_fee_gwei,
        hourly,
    })
}

pub fn cheapest_hour(observations: &[Observation]) -> Result<CheapestHour, GasWindowError> {
    cheapest_in_table(hourly_table(observations))
}
