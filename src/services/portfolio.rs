use crate::{
    error::GasWindowError,
    models::{HealthFactor, PortfolioHealth, PortfolioRequest, Position, ProtocolHealth},
};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

fn check_usd(value: f64, field: &str, protocol: &str) -> Result<(), GasWindowError> {
    if !value.is_finite() || value < 0.0 {
        return Err(GasWindowError::InvalidParameter(format!(
            "{} for {} must be a non-negative amount, got {}",
            field, protocol, value
        )));
    }
    Ok(())
}

/// `(collateral / borrowed) / threshold`, or `NoDebt` when nothing is borrowed.
///
/// A ratio that overflows `f64` is rejected rather than reported.
pub fn health_factor(
    collateral_usd: f64,
    borrowed_usd: f64,
    threshold: f64,
) -> Result<HealthFactor, GasWindowError> {
    if borrowed_usd == 0.0 {
        return Ok(HealthFactor::NoDebt);
    }

    let value = (collateral_usd / borrowed_usd) / threshold;
    if !value.is_finite() {
        return Err(GasWindowError::InvalidParameter(format!(
            "health factor for collateral {} / borrowed {} is not representable",
            collateral_usd, borrowed_usd
        )));
    }
    Ok(HealthFactor::finite(value))
}

/// Per-protocol totals and health factors, sorted by protocol name.
pub fn protocol_health(
    positions: &[Position],
    thresholds: &HashMap<String, f64>,
) -> Result<Vec<ProtocolHealth>, GasWindowError> {
    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for p in positions {
        check_usd(p.collateral_usd, "collateral_usd", &p.protocol)?;
        check_usd(p.borrowed_usd, "borrowed_usd", &p.protocol)?;
        let entry = totals.entry(p.protocol.as_str()).or_insert((0.0, 0.0));
        entry.0 += p.collateral_usd;
        entry.1 += p.borrowed_usd;
    }

    for (protocol, (collateral, borrowed)) in &totals {
        if !collateral.is_finite() || !borrowed.is_finite() {
            return Err(GasWindowError::InvalidParameter(format!(
                "position totals for {} overflow",
                protocol
            )));
        }
    }

    totals
        .into_iter()
        .map(|(protocol, (collateral, borrowed))| {
            let threshold = *thresholds.get(protocol).ok_or_else(|| {
                GasWindowError::InvalidParameter(format!(
                    "no liquidation threshold for {}",
                    protocol
                ))
            })?;
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err(GasWindowError::InvalidParameter(format!(
                    "liquidation threshold for {} must be in (0, 1], got {}",
                    protocol, threshold
                )));
            }

            Ok(ProtocolHealth {
                protocol: protocol.to_string(),
                total_collateral_usd: collateral,
                total_borrowed_usd: borrowed,
                liquidation_threshold: threshold,
                health_factor: health_factor(collateral, borrowed, threshold)?,
            })
        })
        .collect()
}

/// Portfolio health is the weakest protocol's health factor.
pub fn portfolio_health(request: &PortfolioRequest) -> Result<PortfolioHealth, GasWindowError> {
    let protocols = protocol_health(&request.positions, &request.liquidation_thresholds)?;

    let health_factor = protocols
        .iter()
        .map(|p| p.health_factor)
        .reduce(|a, b| if b < a { b } else { a })
        .ok_or(GasWindowError::InsufficientData {
            required: 1,
            available: 0,
        })?;

    if health_factor.is_liquidatable() {
        tracing::warn!(
            wallet = ?request.wallet,
            "Portfolio health factor below 1.0: {:?}",
            health_factor
        );
    }

    Ok(PortfolioHealth {
        wallet: request.wallet,
        protocols,
        health_factor,
        evaluated_at: Utc::now(),
    })
}
