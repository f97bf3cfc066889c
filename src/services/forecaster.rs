use crate::{
    error::GasWindowError,
    models::{BinnedSeries, ForecastOutcome, Horizon, HorizonForecast},
};

/// q-th quantile of `values` with linear interpolation between order
/// statistics: position `q * (n - 1)` in the ascending sort.
pub fn quantile(values: &[f64], q: f64) -> Result<f64, GasWindowError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(GasWindowError::InvalidParameter(format!(
            "quantile must be within [0, 1], got {}",
            q
        )));
    }
    if values.is_empty() {
        return Err(GasWindowError::InsufficientData {
            required: 1,
            available: 0,
        });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    let (lo, hi) = (sorted[lower], sorted[upper]);
    Ok((lo + (hi - lo) * frac).clamp(lo, hi))
}

/// Trailing quantile over the last `window_bins` present bins of `series`.
///
/// Gap bins do not count towards the window.
pub fn forecast(
    series: &BinnedSeries,
    window_bins: usize,
    q: f64,
) -> Result<f64, GasWindowError> {
    if window_bins == 0 {
        return Err(GasWindowError::InvalidParameter(
            "window must contain at least one bin".to_string(),
        ));
    }
    if series.len() < window_bins {
        return Err(GasWindowError::InsufficientData {
            required: window_bins,
            available: series.len(),
        });
    }

    let window: Vec<f64> = series.tail(window_bins).iter().map(|b| b.mean_fee_gwei).collect();
    quantile(&window, q)
}

/// Evaluates every horizon on its own. Parameter errors still fail the call;
/// short history is reported per horizon.
pub fn forecast_horizons(
    series: &BinnedSeries,
    horizons: &[Horizon],
) -> Result<Vec<HorizonForecast>, GasWindowError> {
    let as_of = series.last().map(|b| b.start);

    horizons
        .iter()
        .map(|h| {
            let outcome = match forecast(series, h.window_bins, h.quantile) {
                Ok(value) => ForecastOutcome::Computed { value },
                Err(GasWindowError::InsufficientData {
                    required,
                    available,
                }) => ForecastOutcome::InsufficientData {
                    required,
                    available,
                },
                Err(e) => return Err(e),
            };

            Ok(HorizonForecast {
                label: h.label.clone(),
                window_bins: h.window_bins,
                quantile: h.quantile,
                as_of,
                outcome,
                unit: "gwei".to_string(),
            })
        })
        .collect()
}
