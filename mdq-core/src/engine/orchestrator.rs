//! The run orchestrator — one evaluation pass per risk factor per as-of.
//!
//! State machine: created -> evaluating -> finished, or created ->
//! evaluating -> aborted (implicit: `finished_at` stays unset). Any
//! error after run creation propagates and leaves the run row
//! unfinished; that absence is the failure signal, there is no
//! separate failed status and no retry.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::calendar;
use crate::domain::{AssetClass, Issue, RunParameters, Series};
use crate::fingerprint::run_fingerprint;
use crate::rules::RuleSet;
use crate::sources::SourceSelector;

use super::store::{NewRun, RunStore, SeriesStore, StoreError};
use crate::domain::RunId;

/// Default evaluation window length.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 400;

/// Errors from one orchestrated run.
///
/// `UnknownRiskFactor` fails before any run row exists; the others
/// leave a created run unfinished. Rule evaluators are total functions,
/// so a defect inside one is a panic that propagates — by design there
/// is no per-rule isolation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown risk factor '{0}'; was it ever ingested?")]
    UnknownRiskFactor(String),
    #[error("no observations stored for risk factor '{0}'")]
    NoObservations(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parameters of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub asset_class: AssetClass,
    pub risk_factor_id: String,
    pub as_of: NaiveDate,
    pub lookback_days: u32,
}

impl RunRequest {
    pub fn new(asset_class: AssetClass, risk_factor_id: impl Into<String>, as_of: NaiveDate) -> Self {
        RunRequest {
            asset_class,
            risk_factor_id: risk_factor_id.into(),
            as_of,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    pub fn with_lookback(mut self, lookback_days: u32) -> Self {
        self.lookback_days = lookback_days;
        self
    }
}

/// One currency triangle: legs AB, BC, AC plus the vendor buckets to
/// try, in priority order. An empty bucket list falls back to the fx
/// primary preference order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleSpec {
    pub ab: String,
    pub bc: String,
    pub ac: String,
    #[serde(default)]
    pub vendor_buckets: Vec<String>,
}

impl TriangleSpec {
    pub fn involves(&self, risk_factor_id: &str) -> bool {
        self.ab == risk_factor_id || self.bc == risk_factor_id || self.ac == risk_factor_id
    }
}

/// Relational checks wiring: which benchmark gets a correlation peer,
/// which triangles exist. Explicit configuration, not hard-coded ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationPolicy {
    /// benchmark risk factor id -> peer risk factor id
    #[serde(default)]
    pub correlation_peers: BTreeMap<String, String>,
    #[serde(default)]
    pub triangles: Vec<TriangleSpec>,
}

/// The orchestrator. Holds the injected rule battery and relation
/// wiring; immutable for its lifetime, shareable across worker threads.
#[derive(Debug, Clone, Default)]
pub struct DqEngine {
    rules: RuleSet,
    selector: SourceSelector,
    relations: RelationPolicy,
}

impl DqEngine {
    pub fn new(rules: RuleSet, relations: RelationPolicy) -> Self {
        DqEngine { rules, selector: SourceSelector, relations }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Execute one evaluation pass and persist its exception set.
    ///
    /// Steps run strictly in order; the returned id refers to a
    /// finished run. On error after run creation the run row stays
    /// unfinished and no exception consistency is guaranteed.
    pub fn run_dq<SS, RS>(
        &self,
        series_store: &SS,
        run_store: &RS,
        request: &RunRequest,
    ) -> Result<RunId, EngineError>
    where
        SS: SeriesStore + ?Sized,
        RS: RunStore + ?Sized,
    {
        // 1. Validate before any run row exists.
        series_store
            .risk_factor(&request.risk_factor_id)?
            .ok_or_else(|| EngineError::UnknownRiskFactor(request.risk_factor_id.clone()))?;

        // 2. Create the run and capture its id immediately; everything
        // below refers to the id, never to a stale run object.
        let fingerprint = run_fingerprint(
            request.asset_class,
            &request.risk_factor_id,
            request.as_of,
            request.lookback_days,
            &self.rules,
        );
        let run_id = run_store.create_run(NewRun {
            asset_class: request.asset_class,
            risk_factor_id: request.risk_factor_id.clone(),
            as_of: request.as_of,
            parameters: RunParameters { lookback_days: request.lookback_days, fingerprint },
            started_at: Utc::now(),
        })?;
        tracing::info!(
            run_id = %run_id,
            risk_factor = %request.risk_factor_id,
            as_of = %request.as_of,
            "dq run started"
        );

        // 3. Load everything we have for this factor.
        let series_by_source = series_store.load_series(&request.risk_factor_id)?;
        if series_by_source.is_empty() {
            tracing::warn!(run_id = %run_id, risk_factor = %request.risk_factor_id, "no series; run aborted");
            return Err(EngineError::NoObservations(request.risk_factor_id.clone()));
        }

        // 4. Evaluation window and expected dates.
        let start = request.as_of - Duration::days(i64::from(request.lookback_days));
        let expected = calendar::expected_dates(request.asset_class, start, request.as_of);

        // 5. Resolve sources. The availability set is non-empty here.
        let available: BTreeSet<String> = series_by_source.keys().cloned().collect();
        let pick = match self.selector.pick(request.asset_class, &available) {
            Some(p) => p,
            None => return Err(EngineError::NoObservations(request.risk_factor_id.clone())),
        };
        let primary = series_by_source
            .get(&pick.primary)
            .map(|s| s.window(start, request.as_of))
            .unwrap_or_default();

        // 6. Unconditional single-series rules on the windowed primary.
        let mut issues: Vec<Issue> = Vec::new();
        issues.extend(self.rules.spike.evaluate(&primary));
        issues.extend(self.rules.missing_dates.evaluate(&primary, Some(&expected)));
        issues.extend(self.rules.staleness.evaluate(&primary));

        // 7. Cross-source reconciliation iff a secondary resolved.
        if let Some(secondary) = &pick.secondary {
            if let Some(other) = series_by_source.get(secondary) {
                let other = other.window(start, request.as_of);
                issues.extend(self.rules.reconcile.evaluate(
                    &primary,
                    &other,
                    request.asset_class,
                    None,
                    &pick.primary,
                    secondary,
                ));
            }
        }

        // 8. Asset-class-specific relational checks.
        match request.asset_class {
            AssetClass::Rates => {
                issues.extend(self.correlation_issues(series_store, request, &primary)?);
            }
            AssetClass::Fx => {
                issues.extend(self.triangle_issues(series_store, request)?);
            }
            _ => {}
        }

        // 9-10. Persist, then mark complete.
        run_store.insert_exceptions(run_id, &request.risk_factor_id, &issues)?;
        run_store.finish_run(run_id, Utc::now())?;
        tracing::info!(run_id = %run_id, exceptions = issues.len(), "dq run finished");
        Ok(run_id)
    }

    /// Correlation break against the configured peer tenor, if any.
    fn correlation_issues<SS>(
        &self,
        series_store: &SS,
        request: &RunRequest,
        primary: &Series,
    ) -> Result<Vec<Issue>, EngineError>
    where
        SS: SeriesStore + ?Sized,
    {
        let peer_id = match self.relations.correlation_peers.get(&request.risk_factor_id) {
            Some(id) => id,
            None => return Ok(Vec::new()),
        };
        let peer_sources = series_store.load_series(peer_id)?;
        let available: BTreeSet<String> = peer_sources.keys().cloned().collect();
        let peer = match self.selector.pick(request.asset_class, &available) {
            Some(pick) => match peer_sources.get(&pick.primary) {
                Some(series) => series,
                None => return Ok(Vec::new()),
            },
            // Peer not ingested: skip, absence of a source is never an error.
            None => return Ok(Vec::new()),
        };
        Ok(self.rules.correlation.evaluate(primary, peer))
    }

    /// FX triangles involving this factor: per triangle, try vendor
    /// buckets in priority order and evaluate only the first where all
    /// three legs share the vendor.
    fn triangle_issues<SS>(
        &self,
        series_store: &SS,
        request: &RunRequest,
    ) -> Result<Vec<Issue>, EngineError>
    where
        SS: SeriesStore + ?Sized,
    {
        let mut issues = Vec::new();
        for spec in self
            .relations
            .triangles
            .iter()
            .filter(|t| t.involves(&request.risk_factor_id))
        {
            let ab = series_store.load_series(&spec.ab)?;
            let bc = series_store.load_series(&spec.bc)?;
            let ac = series_store.load_series(&spec.ac)?;

            let default_buckets: Vec<String> = SourceSelector::primary_preferences(AssetClass::Fx)
                .iter()
                .map(|s| s.to_string())
                .collect();
            let buckets = if spec.vendor_buckets.is_empty() {
                &default_buckets
            } else {
                &spec.vendor_buckets
            };

            let bucket = buckets
                .iter()
                .find(|b| ab.contains_key(*b) && bc.contains_key(*b) && ac.contains_key(*b));
            if let Some(bucket) = bucket {
                issues.extend(self.rules.fx_triangle.evaluate(
                    &ab[bucket],
                    &bc[bucket],
                    &ac[bucket],
                    bucket,
                ));
            }
            // No fully-available bucket: skip this triangle entirely.
        }
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_spec_involvement() {
        let spec = TriangleSpec {
            ab: "EURUSD".into(),
            bc: "USDGBP".into(),
            ac: "EURGBP".into(),
            vendor_buckets: vec![],
        };
        assert!(spec.involves("USDGBP"));
        assert!(!spec.involves("USDJPY"));
    }

    #[test]
    fn request_builder_defaults_lookback() {
        let req = RunRequest::new(
            AssetClass::Fx,
            "EURUSD",
            NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
        );
        assert_eq!(req.lookback_days, DEFAULT_LOOKBACK_DAYS);
        assert_eq!(req.with_lookback(90).lookback_days, 90);
    }
}
