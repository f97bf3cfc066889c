use chrono::{DateTime, Utc};
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub protocol: String,
    pub collateral_usd: f64,
    pub borrowed_usd: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRequest {
    #[serde(default)]
    pub wallet: Option<Address>,
    pub positions: Vec<Position>,
    /// Liquidation threshold per protocol, in (0, 1].
    pub liquidation_thresholds: HashMap<String, f64>,
}

/// Health factor of a lending position. Below 1.0 means liquidatable.
///
/// `NoDebt` stands for a zero borrow balance and sorts above every finite value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HealthFactor {
    Finite { value: f64 },
    NoDebt,
}

impl HealthFactor {
    pub fn finite(value: f64) -> Self {
        HealthFactor::Finite { value }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            HealthFactor::Finite { value } => Some(*value),
            HealthFactor::NoDebt => None,
        }
    }

    pub fn is_liquidatable(&self) -> bool {
        matches!(self, HealthFactor::Finite { value } if *value < 1.0)
    }
}

impl PartialOrd for HealthFactor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (HealthFactor::NoDebt, HealthFactor::NoDebt) => Some(Ordering::Equal),
            (HealthFactor::NoDebt, HealthFactor::Finite { .. }) => Some(Ordering::Greater),
            (HealthFactor::Finite { .. }, HealthFactor::NoDebt) => Some(Ordering::Less),
            (HealthFactor::Finite { value: a }, HealthFactor::Finite { value: b }) => {
                a.partial_cmp(b)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolHealth {
    pub protocol: String,
    pub total_collateral_usd: f64,
    pub total_borrowed_usd: f64,
    pub liquidation_threshold: f64,
    pub health_factor: HealthFactor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioHealth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<Address>,
    pub protocols: Vec<ProtocolHealth>,
    pub health_factor: HealthFactor,
    pub evaluated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthPoint {
    pub timestamp: DateTime<Utc>,
    pub health_factor: HealthFactor,
}
