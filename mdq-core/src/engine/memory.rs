//! In-memory reference store.
//!
//! Backs tests and batch sweeps that do not need durable persistence.
//! One mutex around the whole state is enough: runs only append rows
//! tagged with their own run id, so the lock is contended, never the
//! rows themselves.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::domain::{DqRun, ExceptionRecord, Issue, RiskFactor, RunId, Series};

use super::store::{NewRun, RunStore, SeriesStore, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    risk_factors: BTreeMap<String, RiskFactor>,
    series: BTreeMap<String, BTreeMap<String, Series>>,
    runs: BTreeMap<RunId, DqRun>,
    exceptions: Vec<ExceptionRecord>,
    next_run_id: i64,
}

/// Thread-safe in-memory implementation of both store seams.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    /// Register a risk factor in the registry (idempotent overwrite).
    pub fn register_risk_factor(&self, rf: RiskFactor) {
        if let Ok(mut state) = self.lock() {
            state.risk_factors.insert(rf.id.clone(), rf);
        }
    }

    /// Insert or replace the series for one (risk factor, source) pair.
    pub fn insert_series(&self, risk_factor_id: &str, source: &str, series: Series) {
        if let Ok(mut state) = self.lock() {
            state
                .series
                .entry(risk_factor_id.to_string())
                .or_default()
                .insert(source.to_string(), series);
        }
    }

    /// Snapshot of one run row.
    pub fn run(&self, id: RunId) -> Option<DqRun> {
        self.lock().ok().and_then(|state| state.runs.get(&id).cloned())
    }

    /// Snapshot of all run rows, ordered by id.
    pub fn runs(&self) -> Vec<DqRun> {
        self.lock()
            .map(|state| state.runs.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of all persisted exceptions, in insertion order.
    ///
    /// Read access exists for export and assertions; the engine itself
    /// never reads exceptions back.
    pub fn exceptions(&self) -> Vec<ExceptionRecord> {
        self.lock()
            .map(|state| state.exceptions.clone())
            .unwrap_or_default()
    }

    /// Exceptions belonging to one run.
    pub fn exceptions_for_run(&self, run_id: RunId) -> Vec<ExceptionRecord> {
        self.exceptions()
            .into_iter()
            .filter(|e| e.dq_run_id == run_id)
            .collect()
    }
}

impl SeriesStore for MemoryStore {
    fn risk_factor(&self, id: &str) -> Result<Option<RiskFactor>, StoreError> {
        Ok(self.lock()?.risk_factors.get(id).cloned())
    }

    fn load_series(&self, id: &str) -> Result<BTreeMap<String, Series>, StoreError> {
        Ok(self.lock()?.series.get(id).cloned().unwrap_or_default())
    }
}

impl RunStore for MemoryStore {
    fn create_run(&self, run: NewRun) -> Result<RunId, StoreError> {
        let mut state = self.lock()?;
        state.next_run_id += 1;
        let id = RunId(state.next_run_id);
        state.runs.insert(
            id,
            DqRun {
                id,
                asset_class: run.asset_class,
                risk_factor_id: run.risk_factor_id,
                as_of: run.as_of,
                parameters: run.parameters,
                started_at: run.started_at,
                finished_at: None,
            },
        );
        Ok(id)
    }

    fn finish_run(&self, run_id: RunId, finished_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let run = state
            .runs
            .get_mut(&run_id)
            .ok_or(StoreError::RunNotFound(run_id))?;
        run.finished_at = Some(finished_at);
        Ok(())
    }

    fn insert_exceptions(
        &self,
        run_id: RunId,
        risk_factor_id: &str,
        issues: &[Issue],
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state.runs.contains_key(&run_id) {
            return Err(StoreError::RunNotFound(run_id));
        }
        state.exceptions.extend(
            issues
                .iter()
                .map(|issue| ExceptionRecord::from_issue(run_id, risk_factor_id, issue.clone())),
        );
        Ok(())
    }
}
