//! Reconciliation rule — cross-source divergence.
//!
//! Two vendors quoting the same risk factor should broadly agree. For
//! priced assets (fx, equities, commodities) the comparison runs on
//! returns, which tolerates differing close times across vendors; for
//! rates it runs on raw levels. A consecutive-breach persistence filter
//! suppresses one-day vendor lag while catching sustained divergence.

use serde::{Deserialize, Serialize};

use super::{clamp_severity, streak_filter};
use crate::domain::{align_pair, AssetClass, Issue, Series, SuggestedAction};

/// Rule name in returns mode.
pub const RECONCILE_RETURNS_RULE_NAME: &str = "reconcile.returns_diff";
/// Rule name in level mode.
pub const RECONCILE_LEVEL_RULE_NAME: &str = "reconcile.abs_pct";

/// Comparison basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileMode {
    Returns,
    Level,
}

impl ReconcileMode {
    /// Default mode per asset class: returns everywhere except rates.
    pub fn default_for(asset_class: AssetClass) -> Self {
        match asset_class {
            AssetClass::Rates => ReconcileMode::Level,
            _ => ReconcileMode::Returns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileRule {
    /// Level mode: absolute difference tolerance.
    pub abs_tol: f64,
    /// Level mode: relative difference tolerance (both must breach).
    pub pct_tol: f64,
    /// Returns mode: |return difference| tolerance for the default
    /// calibration (fx and equities carry their own, see `evaluate`).
    pub ret_tol: f64,
    /// Consecutive breaching dates required before flagging.
    pub consecutive: usize,
    /// Prefer log-returns when a series is strictly positive.
    pub use_log_returns: bool,
}

impl Default for ReconcileRule {
    fn default() -> Self {
        ReconcileRule {
            abs_tol: 0.0005,
            pct_tol: 0.002,
            ret_tol: 0.003,
            consecutive: 3,
            use_log_returns: true,
        }
    }
}

impl ReconcileRule {
    /// Compare primary against a secondary source.
    ///
    /// `mode` overrides the asset-class default when given. Sources are
    /// named only for the evidence payload.
    pub fn evaluate(
        &self,
        primary: &Series,
        other: &Series,
        asset_class: AssetClass,
        mode: Option<ReconcileMode>,
        source_a: &str,
        source_b: &str,
    ) -> Vec<Issue> {
        let aligned = align_pair(primary, other);
        if aligned.is_empty() {
            return Vec::new();
        }
        match mode.unwrap_or_else(|| ReconcileMode::default_for(asset_class)) {
            ReconcileMode::Returns => self.evaluate_returns(&aligned, asset_class, source_a, source_b),
            ReconcileMode::Level => self.evaluate_level(&aligned, source_a, source_b),
        }
    }

    /// Asset-class calibration for returns mode.
    fn returns_calibration(&self, asset_class: AssetClass) -> (f64, usize) {
        match asset_class {
            AssetClass::Fx => (0.004, 3),
            AssetClass::Equities => (0.006, 2),
            _ => (self.ret_tol, self.consecutive.max(1)),
        }
    }

    fn evaluate_returns(
        &self,
        aligned: &[(chrono::NaiveDate, f64, f64)],
        asset_class: AssetClass,
        source_a: &str,
        source_b: &str,
    ) -> Vec<Issue> {
        let (ret_tol, consecutive) = self.returns_calibration(asset_class);
        if aligned.len() < 2 {
            return Vec::new();
        }

        let a: Vec<f64> = aligned.iter().map(|r| r.1).collect();
        let b: Vec<f64> = aligned.iter().map(|r| r.2).collect();
        let ra = self.column_returns(&a);
        let rb = self.column_returns(&b);

        // Index 0 has no return; everything below runs over 1..n.
        let rdiff: Vec<f64> = ra.iter().zip(&rb).skip(1).map(|(x, y)| (x - y).abs()).collect();
        let breach: Vec<bool> = rdiff.iter().map(|&d| d > ret_tol).collect();
        let flagged = streak_filter(&breach, consecutive);

        let mut out = Vec::new();
        for (k, flag) in flagged.iter().enumerate() {
            if !flag {
                continue;
            }
            let i = k + 1;
            let dv = rdiff[k];
            out.push(Issue {
                rule: RECONCILE_RETURNS_RULE_NAME.to_string(),
                obs_date: aligned[i].0,
                severity: clamp_severity(70.0 + 30.0 * (dv / (5.0 * ret_tol)).min(1.0)),
                suggested_action: SuggestedAction::SourceSwitch,
                details: serde_json::json!({
                    "mode": "returns",
                    "ret_diff": dv,
                    "ret_tol": ret_tol,
                    "a_ret": ra[i],
                    "b_ret": rb[i],
                    "consecutive": consecutive,
                    "source_a": source_a,
                    "source_b": source_b,
                }),
            });
        }
        out
    }

    fn evaluate_level(
        &self,
        aligned: &[(chrono::NaiveDate, f64, f64)],
        source_a: &str,
        source_b: &str,
    ) -> Vec<Issue> {
        let consecutive = self.consecutive.max(1);
        let abs_diff: Vec<f64> = aligned.iter().map(|r| (r.1 - r.2).abs()).collect();
        // Relative to the primary level; undefined at zero, which can
        // never breach (a zero rate with any absolute gap is left to
        // the absolute tolerance alone to reason about in review).
        let pct_diff: Vec<Option<f64>> = aligned
            .iter()
            .zip(&abs_diff)
            .map(|(r, &ad)| if r.1 != 0.0 { Some(ad / r.1.abs()) } else { None })
            .collect();

        let breach: Vec<bool> = abs_diff
            .iter()
            .zip(&pct_diff)
            .map(|(&ad, pd)| ad > self.abs_tol && pd.map(|p| p > self.pct_tol).unwrap_or(false))
            .collect();
        let flagged = streak_filter(&breach, consecutive);

        let mut out = Vec::new();
        for (i, flag) in flagged.iter().enumerate() {
            if !flag {
                continue;
            }
            let ad = abs_diff[i];
            let pd = pct_diff[i].unwrap_or(ad);
            out.push(Issue {
                rule: RECONCILE_LEVEL_RULE_NAME.to_string(),
                obs_date: aligned[i].0,
                severity: clamp_severity(70.0 + 30.0 * (pd / (5.0 * self.pct_tol)).min(1.0)),
                suggested_action: SuggestedAction::SourceSwitch,
                details: serde_json::json!({
                    "mode": "level",
                    "abs_diff": ad,
                    "pct_diff": pd,
                    "abs_tol": self.abs_tol,
                    "pct_tol": self.pct_tol,
                    "consecutive": consecutive,
                    "source_a": source_a,
                    "source_b": source_b,
                }),
            });
        }
        out
    }

    /// Log-returns when the column is strictly positive, simple
    /// percentage change otherwise. Index 0 is a placeholder.
    fn column_returns(&self, values: &[f64]) -> Vec<f64> {
        let use_log = self.use_log_returns && values.iter().all(|&v| v > 0.0);
        let mut out = vec![f64::NAN; values.len()];
        for i in 1..values.len() {
            out[i] = if use_log {
                (values[i] / values[i - 1]).ln()
            } else {
                values[i] / values[i - 1] - 1.0
            };
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_util::{daily_series, day};
    use crate::domain::Series;
    use chrono::Duration;

    #[test]
    fn identical_series_never_flag_in_returns_mode() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64).sin() * 5.0).collect();
        let a = daily_series(&values);
        let b = a.clone();
        let issues = ReconcileRule::default().evaluate(&a, &b, AssetClass::Fx, None, "ecb_fx", "yfinance");
        assert!(issues.is_empty());
    }

    #[test]
    fn sustained_return_divergence_is_flagged() {
        // b drifts 1% per day against a from index 10 on: every return
        // differs by ~0.01 > fx tolerance 0.004.
        let a_vals: Vec<f64> = (0..30).map(|_| 1.10).collect();
        let b_vals: Vec<f64> = (0..30)
            .map(|i| if i < 10 { 1.10 } else { 1.10 * 1.01f64.powi(i - 9) })
            .collect();
        let a = daily_series(&a_vals);
        let b = daily_series(&b_vals);

        let issues = ReconcileRule::default().evaluate(&a, &b, AssetClass::Fx, None, "ecb_fx", "yfinance");
        assert!(!issues.is_empty());
        // Persistence: the first two breaching dates are absorbed.
        assert_eq!(issues[0].obs_date, day(12));
        assert_eq!(issues[0].rule, RECONCILE_RETURNS_RULE_NAME);
        assert_eq!(issues[0].suggested_action, SuggestedAction::SourceSwitch);
        assert_eq!(issues[0].details["source_b"], "yfinance");
    }

    #[test]
    fn single_day_divergence_is_suppressed() {
        let mut b_vals: Vec<f64> = (0..30).map(|_| 1.10).collect();
        b_vals[15] = 1.15; // one-day vendor glitch, two breaching returns
        let a = daily_series(&vec![1.10; 30]);
        let b = daily_series(&b_vals);
        let issues = ReconcileRule::default().evaluate(&a, &b, AssetClass::Fx, None, "a", "b");
        assert!(issues.is_empty());
    }

    #[test]
    fn equities_calibration_needs_two_consecutive() {
        // Divergent returns on exactly two consecutive days.
        let a_vals = vec![100.0; 20];
        let mut b_vals = vec![100.0; 20];
        for (i, v) in b_vals.iter_mut().enumerate() {
            if i >= 10 && i < 12 {
                *v = 100.0 * 1.02f64.powi(i as i32 - 9);
            } else if i >= 12 {
                *v = 100.0 * 1.02f64.powi(2);
            }
        }
        let a = daily_series(&a_vals);
        let b = daily_series(&b_vals);
        let issues = ReconcileRule::default().evaluate(&a, &b, AssetClass::Equities, None, "a", "b");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].obs_date, day(11));
    }

    #[test]
    fn level_mode_requires_both_tolerances() {
        let rule = ReconcileRule { consecutive: 1, ..ReconcileRule::default() };
        // abs gap 0.0004 < abs_tol: never flags even at huge pct gap.
        let a = daily_series(&[0.010, 0.010, 0.010]);
        let b = daily_series(&[0.0104, 0.0104, 0.0104]);
        assert!(rule.evaluate(&a, &b, AssetClass::Rates, None, "fred", "yf").is_empty());

        // abs gap 0.008 and pct gap 0.8% both breach.
        let c = daily_series(&[1.000, 1.000, 1.000]);
        let e = daily_series(&[1.008, 1.008, 1.008]);
        let issues = rule.evaluate(&c, &e, AssetClass::Rates, None, "fred", "yf");
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].rule, RECONCILE_LEVEL_RULE_NAME);
        // pct 0.008 is 4x pct_tol: severity 70 + 30 * 4/5 = 94.
        assert_eq!(issues[0].severity, 94);
    }

    #[test]
    fn disjoint_dates_yield_nothing() {
        let a = daily_series(&[1.0, 2.0, 3.0]);
        let base = day(100);
        let b = Series::from_points((0..3).map(|i| (base + Duration::days(i), 1.0)));
        assert!(ReconcileRule::default().evaluate(&a, &b, AssetClass::Fx, None, "a", "b").is_empty());
    }

    #[test]
    fn mode_override_beats_asset_class_default() {
        let rule = ReconcileRule { consecutive: 1, ..ReconcileRule::default() };
        let a = daily_series(&[100.0, 100.0, 100.0]);
        let b = daily_series(&[101.0, 101.0, 101.0]);
        // Returns of both are flat: returns mode sees no divergence...
        assert!(rule
            .evaluate(&a, &b, AssetClass::Equities, None, "a", "b")
            .is_empty());
        // ...but a forced level comparison flags the 1% level gap.
        let issues = rule.evaluate(&a, &b, AssetClass::Equities, Some(ReconcileMode::Level), "a", "b");
        assert_eq!(issues.len(), 3);
    }
}
