use crate::error::GasWindowError;
use chrono::{DateTime, SubsecRound, Utc};
use ethers::types::U256;
use serde::{Deserialize, Serialize};

/// A single fee reading. Fees are in gwei.
///
/// Only built through [`Observation::new`], so the fee is always finite and
/// non-negative and the timestamp is whole seconds at or after the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawObservation")]
pub struct Observation {
    timestamp: DateTime<Utc>,
    fee_gwei: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, fee_gwei: f64) -> Result<Self, GasWindowError> {
        if timestamp < DateTime::<Utc>::UNIX_EPOCH {
            return Err(GasWindowError::MalformedObservation(format!(
                "timestamp {} is before the Unix epoch",
                timestamp
            )));
        }
        if !fee_gwei.is_finite() {
            return Err(GasWindowError::MalformedObservation(format!(
                "non-finite fee at {}",
                timestamp
            )));
        }
        if fee_gwei < 0.0 {
            return Err(GasWindowError::MalformedObservation(format!(
                "negative fee {} at {}",
                fee_gwei, timestamp
            )));
        }

        Ok(Self {
            timestamp: timestamp.trunc_subsecs(0),
            fee_gwei,
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn fee_gwei(&self) -> f64 {
        self.fee_gwei
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    UnixSeconds(i64),
    Text(String),
}

impl RawTimestamp {
    pub fn parse(&self) -> Result<DateTime<Utc>, GasWindowError> {
        let secs = match self {
            RawTimestamp::UnixSeconds(secs) => *secs,
            RawTimestamp::Text(text) => {
                let text = text.trim();
                match text.parse::<i64>() {
                    Ok(secs) => secs,
                    Err(_) => {
                        return DateTime::parse_from_rfc3339(text)
                            .map(|dt| dt.with_timezone(&Utc))
                            .map_err(|e| {
                                GasWindowError::MalformedObservation(format!(
                                    "unparseable timestamp {:?}: {}",
                                    text, e
                                ))
                            });
                    }
                }
            }
        };

        DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            GasWindowError::MalformedObservation(format!("timestamp {} out of range", secs))
        })
    }
}

/// A record as delivered by the fetch side, before validation.
///
/// The fee may arrive either already in gwei or as the raw `baseFeePerGas`
/// quantity (wei) of a block header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    pub timestamp: RawTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_gwei: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<U256>,
}

impl RawObservation {
    pub fn from_value(value: serde_json::Value) -> Result<Self, GasWindowError> {
        serde_json::from_value(value)
            .map_err(|e| GasWindowError::MalformedObservation(format!("unparseable record: {}", e)))
    }

    fn fee_in_gwei(&self) -> Result<f64, GasWindowError> {
        match (self.fee_gwei, self.base_fee_per_gas) {
            (Some(gwei), _) => Ok(gwei),
            (None, Some(wei)) => {
                if wei.bits() > 128 {
                    return Err(GasWindowError::MalformedObservation(format!(
                        "base fee {} wei too large",
                        wei
                    )));
                }
                Ok(wei.as_u128() as f64 / 1e9)
            }
            (None, None) => Err(GasWindowError::MalformedObservation(
                "missing fee_gwei or base_fee_per_gas".to_string(),
            )),
        }
    }
}

impl TryFrom<RawObservation> for Observation {
    type Error = GasWindowError;

    fn try_from(raw: RawObservation) -> Result<Self, Self::Error> {
        let timestamp = raw.timestamp.parse()?;
        let fee = raw.fee_in_gwei()?;
        Observation::new(timestamp, fee)
    }
}

impl TryFrom<serde_json::Value> for Observation {
    type Error = GasWindowError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        RawObservation::from_value(value)?.try_into()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub accepted: usize,
    pub rejected: usize,
    pub stored: usize,
}
