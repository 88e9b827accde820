//! Property tests for rule invariants.
//!
//! Uses proptest to verify:
//! 1. Spike cold start — under 30 points, never any issue
//! 2. Missing dates — exactly expected minus observed, idempotent
//! 3. Reconciliation — identical series never flag, any tolerance
//! 4. Staleness — severities never decrease along one flat streak
//! 5. Correlation — under window + 10 aligned points, never any issue

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use std::collections::BTreeSet;

use mdq_core::domain::{AssetClass, Series};
use mdq_core::rules::{
    CorrelationBreakRule, MissingDatesRule, ReconcileRule, SpikeRule, StalenessRule,
};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

fn daily_series(values: &[f64]) -> Series {
    Series::from_points(
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (base_date() + Duration::days(i as i64), v)),
    )
}

// ── Strategies ───────────────────────────────────────────────────────

fn arb_value() -> impl Strategy<Value = f64> {
    // Finite, non-degenerate market-ish levels.
    (0.01..10_000.0_f64).prop_map(|v| (v * 1e6).round() / 1e6)
}

fn arb_short_series() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_value(), 0..30)
}

fn arb_asset_class() -> impl Strategy<Value = AssetClass> {
    prop_oneof![
        Just(AssetClass::Equities),
        Just(AssetClass::Rates),
        Just(AssetClass::Fx),
        Just(AssetClass::Commodities),
    ]
}

// ── 1. Spike cold start ─────────────────────────────────────────────

proptest! {
    /// Under 30 points there is never enough history for robust stats.
    #[test]
    fn spike_cold_start_never_flags(values in arb_short_series()) {
        let issues = SpikeRule::default().evaluate(&daily_series(&values));
        prop_assert!(issues.is_empty());
    }
}

// ── 2. Missing dates ────────────────────────────────────────────────

proptest! {
    /// Issues are exactly the expected dates without an observation,
    /// and re-evaluation returns the identical set.
    #[test]
    fn missing_dates_are_expected_minus_observed(mask in prop::collection::vec(any::<bool>(), 10..60)) {
        let expected: BTreeSet<NaiveDate> =
            (0..mask.len()).map(|i| base_date() + Duration::days(i as i64)).collect();
        let series = Series::from_points(
            mask.iter()
                .enumerate()
                .filter(|(_, &present)| present)
                .map(|(i, _)| (base_date() + Duration::days(i as i64), 1.0 + i as f64)),
        );

        let issues = MissingDatesRule {}.evaluate(&series, Some(&expected));
        let again = MissingDatesRule {}.evaluate(&series, Some(&expected));
        prop_assert_eq!(&issues, &again);

        if series.is_empty() {
            prop_assert!(issues.is_empty());
        } else {
            let observed: BTreeSet<NaiveDate> = series.dates().collect();
            let flagged: BTreeSet<NaiveDate> = issues.iter().map(|i| i.obs_date).collect();
            let wanted: BTreeSet<NaiveDate> = expected.difference(&observed).copied().collect();
            prop_assert_eq!(flagged, wanted);
        }
    }
}

// ── 3. Reconciliation ───────────────────────────────────────────────

proptest! {
    /// A source can never diverge from itself, whatever the asset
    /// class calibration says.
    #[test]
    fn identical_series_never_reconcile_flag(
        values in prop::collection::vec(arb_value(), 2..120),
        asset_class in arb_asset_class(),
    ) {
        let a = daily_series(&values);
        let b = a.clone();
        let issues = ReconcileRule::default().evaluate(&a, &b, asset_class, None, "a", "b");
        prop_assert!(issues.is_empty());
    }
}

// ── 4. Staleness ────────────────────────────────────────────────────

proptest! {
    /// Severity never decreases along a single unbroken flat streak.
    #[test]
    fn staleness_severity_is_monotone(prefix in 1..5usize, tail in 4..40usize) {
        let mut values: Vec<f64> = (0..prefix).map(|i| 10.0 + i as f64).collect();
        values.extend(std::iter::repeat(99.0).take(tail));

        let issues = StalenessRule::default().evaluate(&daily_series(&values));
        prop_assert!(!issues.is_empty());
        let sevs: Vec<u8> = issues.iter().map(|i| i.severity).collect();
        prop_assert!(sevs.windows(2).all(|w| w[0] <= w[1]));
        // The tail of length n contributes n-1 unchanged steps,
        // flagged from min_streak on.
        prop_assert_eq!(issues.len(), tail - 3);
    }
}

// ── 5. Correlation sample floor ─────────────────────────────────────

proptest! {
    /// Below window + 10 aligned points the rule stays silent, whatever
    /// the data looks like.
    #[test]
    fn correlation_needs_minimum_sample(values in prop::collection::vec(arb_value(), 0..70)) {
        let a = daily_series(&values);
        let b = daily_series(&values.iter().rev().copied().collect::<Vec<_>>());
        let issues = CorrelationBreakRule::default().evaluate(&a, &b);
        prop_assert!(issues.is_empty());
    }
}
