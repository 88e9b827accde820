//! The rule battery — six stateless evaluators over series slices.
//!
//! Each rule is an immutable config struct with named, typed fields and
//! an `evaluate` method over its specific inputs. There are no global
//! rule instances and no dynamic dispatch: the orchestrator owns one
//! [`RuleSet`] with one typed field per rule, so the battery is closed
//! at compile time.
//!
//! Shared here: NaN-aware rolling statistics and the consecutive-breach
//! persistence filter used by reconciliation and the FX triangle.

pub mod correlation;
pub mod fx_triangle;
pub mod missing_dates;
pub mod reconcile;
pub mod spike;
pub mod staleness;

pub use correlation::CorrelationBreakRule;
pub use fx_triangle::FxTriangleRule;
pub use missing_dates::MissingDatesRule;
pub use reconcile::{ReconcileMode, ReconcileRule};
pub use spike::SpikeRule;
pub use staleness::StalenessRule;

use serde::{Deserialize, Serialize};

/// The full rule battery with its configuration, injected into the
/// orchestrator. One field per rule; no process-wide defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub spike: SpikeRule,
    #[serde(default)]
    pub missing_dates: MissingDatesRule,
    #[serde(default)]
    pub staleness: StalenessRule,
    #[serde(default)]
    pub reconcile: ReconcileRule,
    #[serde(default)]
    pub correlation: CorrelationBreakRule,
    #[serde(default)]
    pub fx_triangle: FxTriangleRule,
}

/// Clamp a raw severity score to the 1..=100 scale (truncating, as the
/// scores are computed in floating point).
pub(crate) fn clamp_severity(raw: f64) -> u8 {
    raw.clamp(1.0, 100.0) as u8
}

/// Centered rolling median with a minimum-observation requirement.
///
/// For index `i` the window covers `[i - w/2, i + w/2]` clipped to the
/// slice. Positions with fewer than `min_periods` non-NaN values in the
/// window yield NaN. NaN inputs are skipped, not propagated.
pub(crate) fn rolling_median_centered(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    let half = window / 2;
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    let mut buf = Vec::with_capacity(window);
    for i in 0..n {
        let lo = i.saturating_sub(half);
        let hi = (i + half + 1).min(n);
        buf.clear();
        buf.extend(values[lo..hi].iter().copied().filter(|v| !v.is_nan()));
        if buf.len() >= min_periods {
            out[i] = median_of(&mut buf);
        }
    }
    out
}

/// Median of a scratch buffer (sorted in place).
fn median_of(buf: &mut [f64]) -> f64 {
    buf.sort_by(|a, b| a.partial_cmp(b).expect("no NaN in median buffer"));
    let n = buf.len();
    if n % 2 == 1 {
        buf[n / 2]
    } else {
        (buf[n / 2 - 1] + buf[n / 2]) / 2.0
    }
}

/// Trailing rolling Pearson correlation over a full window.
///
/// Positions before the window fills, or where either side has zero
/// variance, yield NaN.
pub(crate) fn rolling_pearson(x: &[f64], y: &[f64], window: usize) -> Vec<f64> {
    debug_assert_eq!(x.len(), y.len());
    let n = x.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 || n < window {
        return out;
    }
    for i in (window - 1)..n {
        let xs = &x[i + 1 - window..=i];
        let ys = &y[i + 1 - window..=i];
        out[i] = pearson(xs, ys);
    }
    out
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    let denom = (vx * vy).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        cov / denom
    }
}

/// Consecutive-breach persistence filter.
///
/// `out[i]` is true iff `breach[i]` and the `consecutive - 1` entries
/// before it are all true — a sliding logical AND over the shifted
/// breach sequence. Every fully-covered date of a streak qualifies,
/// not only the last one; the same semantic is used by every streak
/// rule in the battery.
pub(crate) fn streak_filter(breach: &[bool], consecutive: usize) -> Vec<bool> {
    if consecutive <= 1 {
        return breach.to_vec();
    }
    breach
        .iter()
        .enumerate()
        .map(|(i, &b)| b && i + 1 >= consecutive && breach[i + 1 - consecutive..i].iter().all(|&p| p))
        .collect()
}
