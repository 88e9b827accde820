//! Store seams consumed by the orchestrator.
//!
//! The engine is deliberately ignorant of persistence mechanics: it
//! reads deduplicated, sorted series keyed by source name and appends
//! run rows and exception rows. Implementations must support safe
//! concurrent appends — each run only ever touches rows tagged with
//! its own run id, so concurrent runs never contend on the same rows.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::{AssetClass, Issue, RiskFactor, RunId, RunParameters, Series};

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("run {0} not found")]
    RunNotFound(RunId),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Read side: the risk factor registry and persisted series.
pub trait SeriesStore {
    /// Registry lookup; `None` means the id was never ingested.
    fn risk_factor(&self, id: &str) -> Result<Option<RiskFactor>, StoreError>;

    /// All per-source series for a risk factor, keyed by source name.
    /// Each series is already deduplicated and sorted.
    fn load_series(&self, id: &str) -> Result<BTreeMap<String, Series>, StoreError>;
}

/// Fields for a new run row; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewRun {
    pub asset_class: AssetClass,
    pub risk_factor_id: String,
    pub as_of: NaiveDate,
    pub parameters: RunParameters,
    pub started_at: DateTime<Utc>,
}

/// Write side: run rows and exception rows.
pub trait RunStore {
    fn create_run(&self, run: NewRun) -> Result<RunId, StoreError>;

    /// Mark a run complete. Only called after every exception is written.
    fn finish_run(&self, run_id: RunId, finished_at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Append the issues of one run as open exceptions.
    fn insert_exceptions(
        &self,
        run_id: RunId,
        risk_factor_id: &str,
        issues: &[Issue],
    ) -> Result<(), StoreError>;
}
