//! FX triangle rule — cross-rate no-arbitrage check.
//!
//! For legs AB, BC, AC of a currency triangle the quoted cross must
//! equal the product of its constituents: AC = AB x BC. A sustained
//! relative error means one of the three quotes is stale or wrong.
//! Evaluated per same-vendor bucket, so a close-time mismatch between
//! vendors cannot masquerade as an arbitrage.

use serde::{Deserialize, Serialize};

use super::{clamp_severity, streak_filter};
use crate::domain::{align_triple, Issue, Series, SuggestedAction};

/// Rule name prefix; the vendor bucket label is appended.
pub const FX_TRIANGLE_RULE_PREFIX: &str = "relations.fx_triangle";

/// Tighter tolerance for the single-vendor variant, where close-time
/// noise is absent and a breach is more meaningful.
pub const STRICT_SINGLE_VENDOR_REL_TOL: f64 = 0.0025;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxTriangleRule {
    /// Relative error threshold on |implied/AC - 1|.
    pub rel_tol: f64,
    /// Consecutive breaching dates required before flagging.
    pub consecutive: usize,
}

impl Default for FxTriangleRule {
    fn default() -> Self {
        FxTriangleRule { rel_tol: 0.005, consecutive: 3 }
    }
}

impl FxTriangleRule {
    /// The strict single-vendor calibration.
    pub fn strict() -> Self {
        FxTriangleRule { rel_tol: STRICT_SINGLE_VENDOR_REL_TOL, consecutive: 3 }
    }

    /// Evaluate one same-vendor bucket of legs. `bucket` labels which
    /// vendor triple produced the evaluation and is suffixed onto the
    /// rule name.
    pub fn evaluate(&self, ab: &Series, bc: &Series, ac: &Series, bucket: &str) -> Vec<Issue> {
        let aligned = align_triple(ab, bc, ac);
        if aligned.is_empty() {
            return Vec::new();
        }
        let consecutive = self.consecutive.max(1);
        let rule_name = format!("{FX_TRIANGLE_RULE_PREFIX}.{bucket}");

        // Relative error against the quoted cross; the quoted leg is
        // the one under test.
        let rel_err: Vec<Option<f64>> = aligned
            .iter()
            .map(|&(_, vab, vbc, vac)| {
                if vac == 0.0 {
                    None
                } else {
                    Some((vab * vbc / vac - 1.0).abs())
                }
            })
            .collect();

        let breach: Vec<bool> = rel_err
            .iter()
            .map(|e| e.map(|v| v >= self.rel_tol).unwrap_or(false))
            .collect();
        let flagged = streak_filter(&breach, consecutive);

        let mut out = Vec::new();
        for (i, flag) in flagged.iter().enumerate() {
            if !flag {
                continue;
            }
            let err = match rel_err[i] {
                Some(e) => e,
                None => continue,
            };
            let ratio = err / self.rel_tol;
            out.push(Issue {
                rule: rule_name.clone(),
                obs_date: aligned[i].0,
                severity: clamp_severity(60.0 + 40.0 * ((ratio - 1.0) / 4.0).min(1.0)),
                suggested_action: SuggestedAction::SourceSwitch,
                details: serde_json::json!({
                    "rel_error": err,
                    "rel_tol": self.rel_tol,
                    "implied": aligned[i].1 * aligned[i].2,
                    "quoted": aligned[i].3,
                    "consecutive": consecutive,
                    "vendor_bucket": bucket,
                }),
            });
        }
        out
    }
}
