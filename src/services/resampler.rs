use crate::{
    error::GasWindowError,
    models::{Bin, BinnedSeries, Observation},
};
use chrono::{DateTime, Duration, Utc};

/// Width of a resampling bin, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinWidth(i64);

impl BinWidth {
    pub const TEN_MINUTES: BinWidth = BinWidth(600);
    pub const ONE_HOUR: BinWidth = BinWidth(3600);

    pub fn from_secs(secs: i64) -> Result<Self, GasWindowError> {
        if secs <= 0 {
            return Err(GasWindowError::InvalidParameter(format!(
                "bin width must be positive, got {}s",
                secs
            )));
        }
        Ok(Self(secs))
    }

    pub fn from_duration(width: Duration) -> Result<Self, GasWindowError> {
        Self::from_secs(width.num_seconds())
    }

    pub fn secs(&self) -> i64 {
        self.0
    }

    /// Start of the bin containing `ts`. Bins are aligned to the Unix epoch.
    ///
    /// `None` when that start falls outside the range chrono can represent.
    pub fn floor(&self, ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let secs = ts.timestamp();
        let start = secs.checked_sub(secs.rem_euclid(self.0))?;
        DateTime::from_timestamp(start, 0)
    }
}

/// Averages observations into fixed-width bins. Empty bins are left out.
///
/// Input is sorted here if needed (stable, by timestamp), so callers may pass
/// sequences from any source.
pub fn resample(observations: &[Observation], width: BinWidth) -> BinnedSeries {
    let sorted_input = observations
        .windows(2)
        .all(|w| w[0].timestamp() <= w[1].timestamp());

    let owned;
    let ordered: &[Observation] = if sorted_input {
        observations
    } else {
        let mut copy = observations.to_vec();
        copy.sort_by_key(|o| o.timestamp());
        owned = copy;
        &owned
    };

    let mut bins: Vec<Bin> = Vec::new();
    let mut current: Option<(DateTime<Utc>, f64, usize)> = None;

    for obs in ordered {
        let Some(key) = width.floor(obs.timestamp()) else {
            tracing::warn!(
                "Dropping observation at {}: bin start out of range",
                obs.timestamp()
            );
            continue;
        };
        match current.as_mut() {
            Some((start, sum, count)) if *start == key => {
                *sum += obs.fee_gwei();
                *count += 1;
            }
            _ => {
                if let Some((start, sum, count)) = current.take() {
                    bins.push(Bin {
                        start,
                        mean_fee_gwei: sum / count as f64,
                    });
                }
                current = Some((key, obs.fee_gwei(), 1));
            }
        }
    }

    if let Some((start, sum, count)) = current {
        bins.push(Bin {
            start,
            mean_fee_gwei: sum / count as f64,
        });
    }

    BinnedSeries {
        bin_width_secs: width.secs(),
        bins,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn obs(secs: i64, fee: f64) -> Observation {
        Observation::new(at(secs), fee).unwrap()
    }

    #[test]
    fn test_bin_width_validation() {
        assert!(BinWidth::from_secs(0).is_err());
        assert!(BinWidth::from_secs(-600).is_err());
        assert_eq!(BinWidth::from_duration(Duration::minutes(10)).unwrap(), BinWidth::TEN_MINUTES);
    }

    #[test]
    fn test_floor_is_epoch_aligned() {
        let w = BinWidth::TEN_MINUTES;
        assert_eq!(w.floor(at(1_700_000_123)), Some(at(1_699_999_800)));
        assert_eq!(w.floor(at(1_699_999_800)), Some(at(1_699_999_800)));
        assert_eq!(w.floor(at(-1)), Some(at(-600)));
    }

    #[test]
    fn test_floor_at_chrono_limits() {
        let w = BinWidth::TEN_MINUTES;
        let near_min = DateTime::<Utc>::MIN_UTC + Duration::seconds(100);
        let near_max = DateTime::<Utc>::MAX_UTC - Duration::seconds(100);

        // MIN_UTC is midnight, so 10-minute bins stay aligned there while a
        // 7-second bin would have to start one second before it.
        assert_eq!(w.floor(near_min), Some(DateTime::<Utc>::MIN_UTC));
        let odd = BinWidth::from_secs(7).unwrap();
        assert_eq!(odd.floor(DateTime::<Utc>::MIN_UTC), None);

        let start = w.floor(near_max).unwrap();
        assert_eq!(start.timestamp().rem_euclid(600), 0);
        assert!(start <= near_max && near_max - start < Duration::seconds(600));

        let series = resample(&[Observation::new(near_max, 7.0).unwrap()], w);
        assert_eq!(series.bins, vec![Bin { start, mean_fee_gwei: 7.0 }]);
    }

    #[test]
    fn test_two_observations_average_into_one_bin() {
        let t0 = 1_700_000_400; // 10-minute aligned
        let series = resample(&[obs(t0, 10.0), obs(t0 + 300, 20.0)], BinWidth::TEN_MINUTES);
        assert_eq!(series.len(), 1);
        assert_eq!(series.bins[0].start, at(t0));
        assert_eq!(series.bins[0].mean_fee_gwei, 15.0);
    }

    #[test]
    fn test_gaps_are_not_filled() {
        let series = resample(
            &[obs(0, 1.0), obs(3 * 600 + 5, 4.0)],
            BinWidth::TEN_MINUTES,
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(at(0)), Some(1.0));
        assert_eq!(series.get(at(600)), None);
        assert_eq!(series.get(at(1800)), Some(4.0));
    }

    #[test]
    fn test_unsorted_input() {
        let sorted = resample(
            &[obs(0, 1.0), obs(10, 3.0), obs(700, 5.0)],
            BinWidth::TEN_MINUTES,
        );
        let shuffled = resample(
            &[obs(700, 5.0), obs(10, 3.0), obs(0, 1.0)],
            BinWidth::TEN_MINUTES,
        );
        assert_eq!(sorted, shuffled);
        assert!(sorted.bins.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn test_empty_input() {
        let series = resample(&[], BinWidth::TEN_MINUTES);
        assert!(series.is_empty());
        assert_eq!(series.bin_width_secs, 600);
    }

    #[test]
    fn test_resampling_binned_points_is_idempotent() {
        let raw: Vec<Observation> = (0..50)
            .map(|i| obs(i * 137, (i % 7) as f64 + 0.5))
            .collect();
        let once = resample(&raw, BinWidth::TEN_MINUTES);

        let as_points: Vec<Observation> = once
            .bins
            .iter()
            .map(|b| Observation::new(b.start, b.mean_fee_gwei).unwrap())
            .collect();
        let twice = resample(&as_points, BinWidth::TEN_MINUTES);
        assert_eq!(once, twice);
    }
}
