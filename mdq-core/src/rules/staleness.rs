//! Staleness rule — flat-line detection.
//!
//! A vendor that stops refreshing a feed keeps republishing the last
//! value; the tell is a run of unchanged observations. Severity grows
//! with streak length, so the longer the flat line the higher it ranks
//! in review.

use serde::{Deserialize, Serialize};

use super::clamp_severity;
use crate::domain::{Issue, Series, SuggestedAction};

/// Rule name on emitted issues.
pub const STALE_RULE_NAME: &str = "gaps.stale";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalenessRule {
    /// Unchanged-streak length at which flagging starts.
    pub min_streak: usize,
    /// Absolute tolerance for "unchanged". Zero means exact equality.
    pub atol: f64,
}

impl Default for StalenessRule {
    fn default() -> Self {
        StalenessRule { min_streak: 3, atol: 0.0 }
    }
}

impl StalenessRule {
    /// Emit one issue per date while an unchanged streak is at or past
    /// `min_streak` — every date of the tail, not only the last one.
    pub fn evaluate(&self, series: &Series) -> Vec<Issue> {
        if series.len() < self.min_streak + 1 {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut streak = 0usize;
        let mut prev: Option<f64> = None;
        for obs in series.iter() {
            let unchanged = match prev {
                Some(p) => (obs.value - p).abs() <= self.atol,
                None => false,
            };
            prev = Some(obs.value);

            if unchanged {
                streak += 1;
                if streak >= self.min_streak {
                    out.push(Issue {
                        rule: STALE_RULE_NAME.to_string(),
                        obs_date: obs.date,
                        severity: clamp_severity(30.0 + 12.0 * streak as f64),
                        suggested_action: SuggestedAction::Review,
                        details: serde_json::json!({"streak": streak}),
                    });
                }
            } else {
                streak = 0;
            }
        }
        out
    }
}
