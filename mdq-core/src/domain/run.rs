//! Run records and the risk factor registry entry.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::AssetClass;

/// Identifier of one DQ run, assigned by the run store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunId(pub i64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry in the risk factor registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub id: String,
    pub asset_class: AssetClass,
    pub description: String,
    pub unit: String,
}

/// Parameters captured on the run record for reproducibility.
///
/// `fingerprint` is the blake3 hash of the full evaluation settings
/// (see [`crate::fingerprint`]); two runs with the same fingerprint
/// evaluated the same configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    pub lookback_days: u32,
    pub fingerprint: String,
}

/// One evaluation pass over one risk factor at one as-of date.
///
/// `finished_at` doubles as the success flag: a run that aborted keeps
/// `None` and that absence is the failure signal for downstream
/// monitoring. There is no separate "failed" status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqRun {
    pub id: RunId,
    pub asset_class: AssetClass,
    pub risk_factor_id: String,
    pub as_of: NaiveDate,
    pub parameters: RunParameters,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl DqRun {
    /// A run is complete iff its completion timestamp is set.
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}
