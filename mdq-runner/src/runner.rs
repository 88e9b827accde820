//! Universe sweep — one independent DQ run per configured risk factor.
//!
//! Rule evaluators are pure over their input slices and the engine is
//! immutable, so factors evaluate in parallel with no coordination:
//! each run appends only rows tagged with its own run id. A failed
//! factor never aborts the sweep; its outcome carries the error and
//! its run row (if one was created) stays unfinished.

use rayon::prelude::*;

use mdq_core::domain::RunId;
use mdq_core::engine::{DqEngine, EngineError, MemoryStore, RunRequest, RunStore, SeriesStore};

use crate::config::UniverseConfig;

/// Outcome of one factor's run within a sweep.
#[derive(Debug)]
pub struct SweepOutcome {
    pub risk_factor_id: String,
    pub result: Result<RunId, EngineError>,
}

/// Aggregate view over a sweep's outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl SweepSummary {
    pub fn of(outcomes: &[SweepOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
        SweepSummary { succeeded, failed: outcomes.len() - succeeded }
    }
}

/// Build the engine a config describes.
pub fn build_engine(config: &UniverseConfig) -> DqEngine {
    DqEngine::new(config.rules.clone(), config.relations.clone())
}

/// Register the configured universe into an in-memory store.
///
/// Series still have to be inserted by the caller; this only seeds the
/// risk factor registry.
pub fn register_universe(store: &MemoryStore, config: &UniverseConfig) {
    for entry in &config.risk_factors {
        store.register_risk_factor(entry.to_risk_factor());
    }
}

/// Sweep every configured risk factor, in parallel, against one store.
///
/// Outcomes come back in universe order regardless of scheduling.
pub fn run_universe<S>(engine: &DqEngine, store: &S, config: &UniverseConfig) -> Vec<SweepOutcome>
where
    S: SeriesStore + RunStore + Sync,
{
    let outcomes: Vec<SweepOutcome> = config
        .risk_factors
        .par_iter()
        .map(|entry| {
            let request = RunRequest::new(entry.asset_class, entry.id.clone(), config.as_of)
                .with_lookback(config.lookback_days);
            let result = engine.run_dq(store, store, &request);
            if let Err(err) = &result {
                tracing::warn!(risk_factor = %entry.id, error = %err, "dq run failed");
            }
            SweepOutcome { risk_factor_id: entry.id.clone(), result }
        })
        .collect();

    let summary = SweepSummary::of(&outcomes);
    tracing::info!(
        as_of = %config.as_of,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "universe sweep complete"
    );
    outcomes
}
