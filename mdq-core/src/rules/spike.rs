//! Spike rule — Hampel-style robust outlier detection.
//!
//! Robust z-score: (value − rolling median) / (1.4826 × rolling MAD).
//! Both statistics use the same centered window and minimum-observation
//! requirement, so the score is resistant to the very outliers it
//! flags. A zero MAD leaves the scale undefined and the point
//! unflagged — flat neighborhoods must not produce divide-by-zero
//! false positives.

use serde::{Deserialize, Serialize};

use super::{clamp_severity, rolling_median_centered};
use crate::domain::{Issue, Series, SuggestedAction};

/// Rule name on emitted issues.
pub const SPIKE_RULE_NAME: &str = "spikes.hampel";

/// Gaussian-consistency factor for the MAD scale estimator.
const MAD_SCALE: f64 = 1.4826;

/// Minimum history before robust statistics are trusted at all.
const COLD_START_MIN_POINTS: usize = 30;

/// Robust z beyond which a spike is judged unrecoverable.
const REMOVE_THRESHOLD: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpikeRule {
    /// Centered rolling window for median and MAD.
    pub window: usize,
    /// Flag threshold on |robust z|.
    pub n_sigmas: f64,
}

impl Default for SpikeRule {
    fn default() -> Self {
        SpikeRule { window: 21, n_sigmas: 6.0 }
    }
}

impl SpikeRule {
    /// Evaluate one deduplicated, sorted series.
    ///
    /// Fewer than 30 points: no issues (cold-start invariant).
    pub fn evaluate(&self, series: &Series) -> Vec<Issue> {
        if series.len() < COLD_START_MIN_POINTS {
            return Vec::new();
        }
        let values: Vec<f64> = series.values().collect();
        let min_periods = (self.window / 3).max(10);

        let med = rolling_median_centered(&values, self.window, min_periods);
        let abs_resid: Vec<f64> = values
            .iter()
            .zip(&med)
            .map(|(v, m)| (v - m).abs())
            .collect();
        let mad = rolling_median_centered(&abs_resid, self.window, min_periods);

        let mut out = Vec::new();
        for (i, obs) in series.iter().enumerate() {
            if med[i].is_nan() || mad[i].is_nan() || mad[i] == 0.0 {
                continue;
            }
            let z = (obs.value - med[i]) / (MAD_SCALE * mad[i]);
            if z.abs() < self.n_sigmas {
                continue;
            }
            let action = if z.abs() < REMOVE_THRESHOLD {
                SuggestedAction::Winsorize
            } else {
                SuggestedAction::Remove
            };
            out.push(Issue {
                rule: SPIKE_RULE_NAME.to_string(),
                obs_date: obs.date,
                severity: clamp_severity(40.0 + 10.0 * z.abs()),
                suggested_action: action,
                details: serde_json::json!({
                    "z_robust": z,
                    "window": self.window,
                    "n_sigmas": self.n_sigmas,
                }),
            });
        }
        out
    }
}
