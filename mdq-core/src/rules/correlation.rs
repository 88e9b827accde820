//! Correlation-break rule — relational check against a peer series.
//!
//! A benchmark tenor and its peer (say 10Y vs 2Y) normally track each
//! other; a rolling correlation collapsing toward zero is informative,
//! not self-evidently an error, hence the "review" action.

use serde::{Deserialize, Serialize};

use super::{clamp_severity, rolling_pearson};
use crate::domain::{align_pair, Issue, Series, SuggestedAction};

/// Rule name on emitted issues.
pub const CORR_RULE_NAME: &str = "relations.corr_break";

/// Extra points beyond the window before a rolling correlation is
/// trusted at all.
const MIN_EXTRA_POINTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationBreakRule {
    /// Trailing rolling window.
    pub window: usize,
    /// Flag when |rolling corr| falls below this.
    pub min_abs_corr: f64,
}

impl Default for CorrelationBreakRule {
    fn default() -> Self {
        CorrelationBreakRule { window: 60, min_abs_corr: 0.2 }
    }
}

impl CorrelationBreakRule {
    /// Evaluate primary against a peer. Fewer than `window + 10`
    /// aligned points: no issues.
    pub fn evaluate(&self, primary: &Series, peer: &Series) -> Vec<Issue> {
        let aligned = align_pair(primary, peer);
        if aligned.len() < self.window + MIN_EXTRA_POINTS {
            return Vec::new();
        }
        let x: Vec<f64> = aligned.iter().map(|r| r.1).collect();
        let y: Vec<f64> = aligned.iter().map(|r| r.2).collect();
        let corr = rolling_pearson(&x, &y, self.window);

        let mut out = Vec::new();
        for (i, &c) in corr.iter().enumerate() {
            if c.is_nan() || c.abs() >= self.min_abs_corr {
                continue;
            }
            let sev = 70.0 + 50.0 * (self.min_abs_corr - c.abs()) / self.min_abs_corr;
            out.push(Issue {
                rule: CORR_RULE_NAME.to_string(),
                obs_date: aligned[i].0,
                severity: clamp_severity(sev),
                suggested_action: SuggestedAction::Review,
                details: serde_json::json!({
                    "rolling_corr": c,
                    "window": self.window,
                }),
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_util::daily_series;

    fn wave(n: usize, phase: f64) -> Vec<f64> {
        (0..n).map(|i| (i as f64 * 0.37 + phase).sin()).collect()
    }

    #[test]
    fn insufficient_sample_yields_nothing() {
        // 69 aligned points is one short of window + 10.
        let a = daily_series(&wave(69, 0.0));
        let b = daily_series(&wave(69, 3.0));
        assert!(CorrelationBreakRule::default().evaluate(&a, &b).is_empty());
    }

    #[test]
    fn tightly_coupled_series_never_flag() {
        let values = wave(120, 0.0);
        let a = daily_series(&values);
        let scaled: Vec<f64> = values.iter().map(|v| v * 3.0 + 1.0).collect();
        let b = daily_series(&scaled);
        assert!(CorrelationBreakRule::default().evaluate(&a, &b).is_empty());
    }

    #[test]
    fn decoupled_series_flag_for_review() {
        // Orthogonal oscillations: rolling correlation hovers near zero.
        let n = 120;
        let a_vals: Vec<f64> = (0..n).map(|i| (i as f64 * std::f64::consts::PI / 2.0).sin()).collect();
        let b_vals: Vec<f64> = (0..n).map(|i| (i as f64 * std::f64::consts::PI / 2.0).cos()).collect();
        let a = daily_series(&a_vals);
        let b = daily_series(&b_vals);

        let issues = CorrelationBreakRule::default().evaluate(&a, &b);
        assert!(!issues.is_empty());
        let issue = &issues[0];
        assert_eq!(issue.rule, CORR_RULE_NAME);
        assert_eq!(issue.suggested_action, SuggestedAction::Review);
        assert!(issue.severity >= 70);
        assert!(issue.details["rolling_corr"].as_f64().unwrap().abs() < 0.2);
    }

    #[test]
    fn severity_grows_as_correlation_collapses() {
        // |corr| just under the bound scores near 70; zero scores clamped 100.
        let near = 70.0 + 50.0 * (0.2 - 0.19) / 0.2;
        let zero = 70.0 + 50.0 * (0.2 - 0.0) / 0.2;
        assert!(near < zero);
        assert_eq!(super::clamp_severity(near), 72);
        assert_eq!(super::clamp_severity(zero), 100);
    }
}
