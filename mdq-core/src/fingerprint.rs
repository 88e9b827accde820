//! Run fingerprints — content-addressable evaluation settings.
//!
//! The fingerprint is the blake3 hash of the canonical JSON of
//! everything that determines a run's output besides the stored data:
//! asset class, risk factor, as-of date, lookback, and the full rule
//! configuration. Two runs with equal fingerprints over the same
//! stored series are guaranteed to produce the same exception set,
//! which is the audit property the engine is built around.

use serde::Serialize;

use crate::domain::AssetClass;
use crate::rules::RuleSet;

#[derive(Serialize)]
struct FingerprintInput<'a> {
    asset_class: AssetClass,
    risk_factor_id: &'a str,
    as_of: chrono::NaiveDate,
    lookback_days: u32,
    rules: &'a RuleSet,
}

/// Compute the hex fingerprint for one run's settings.
pub fn run_fingerprint(
    asset_class: AssetClass,
    risk_factor_id: &str,
    as_of: chrono::NaiveDate,
    lookback_days: u32,
    rules: &RuleSet,
) -> String {
    let input = FingerprintInput { asset_class, risk_factor_id, as_of, lookback_days, rules };
    let json = serde_json::to_string(&input).expect("fingerprint input serialization failed");
    blake3::hash(json.as_bytes()).to_hex().to_string()
}
