//! Missing-dates rule — gap detection against the expected-date set.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::{Issue, Series, SuggestedAction};

/// Rule name on emitted issues.
pub const MISSING_RULE_NAME: &str = "gaps.missing_bdays";

/// Fixed severity for a missing expected date: annoying, rarely fatal.
const MISSING_SEVERITY: u8 = 55;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingDatesRule {}

impl MissingDatesRule {
    /// One issue per date expected but not observed.
    ///
    /// With no expected set supplied, falls back to plain weekdays
    /// spanning the observed range. An empty series yields nothing —
    /// there is no anchor to interpolate from.
    pub fn evaluate(&self, series: &Series, expected: Option<&BTreeSet<NaiveDate>>) -> Vec<Issue> {
        let (first, last) = match (series.first_date(), series.last_date()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Vec::new(),
        };

        let fallback;
        let expected = match expected {
            Some(set) => set,
            None => {
                fallback = weekday_range(first, last);
                &fallback
            }
        };

        let observed: BTreeSet<NaiveDate> = series.dates().collect();
        expected
            .iter()
            .filter(|d| !observed.contains(*d))
            .map(|&obs_date| Issue {
                rule: MISSING_RULE_NAME.to_string(),
                obs_date,
                severity: MISSING_SEVERITY,
                suggested_action: SuggestedAction::Interpolate,
                details: serde_json::json!({"reason": "missing_expected_date"}),
            })
            .collect()
    }
}

fn weekday_range(start: NaiveDate, end: NaiveDate) -> BTreeSet<NaiveDate> {
    let mut out = BTreeSet::new();
    let mut d = start;
    while d <= end {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            out.insert(d);
        }
        d += Duration::days(1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series_on(dates: &[&str]) -> Series {
        Series::from_points(dates.iter().map(|s| (d(s), 1.0)))
    }

    #[test]
    fn issues_are_exactly_expected_minus_observed() {
        let series = series_on(&["2024-06-03", "2024-06-05"]);
        let expected: BTreeSet<NaiveDate> =
            [d("2024-06-03"), d("2024-06-04"), d("2024-06-05")].into_iter().collect();

        let issues = MissingDatesRule {}.evaluate(&series, Some(&expected));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].obs_date, d("2024-06-04"));
        assert_eq!(issues[0].severity, 55);
        assert_eq!(issues[0].suggested_action, SuggestedAction::Interpolate);
    }

    #[test]
    fn rerun_is_idempotent() {
        let series = series_on(&["2024-06-03", "2024-06-07"]);
        let expected = weekday_range(d("2024-06-03"), d("2024-06-07"));
        let a = MissingDatesRule {}.evaluate(&series, Some(&expected));
        let b = MissingDatesRule {}.evaluate(&series, Some(&expected));
        assert_eq!(a, b);
        assert_eq!(a.len(), 3); // Tue, Wed, Thu missing
    }

    #[test]
    fn fallback_uses_weekdays_of_observed_span() {
        // Mon 06-03 .. Mon 06-10, weekend in between is not expected.
        let series = series_on(&["2024-06-03", "2024-06-10"]);
        let issues = MissingDatesRule {}.evaluate(&series, None);
        let missing: Vec<NaiveDate> = issues.iter().map(|i| i.obs_date).collect();
        assert_eq!(
            missing,
            vec![d("2024-06-04"), d("2024-06-05"), d("2024-06-06"), d("2024-06-07")]
        );
    }

    #[test]
    fn empty_series_yields_nothing() {
        let expected = weekday_range(d("2024-06-03"), d("2024-06-07"));
        assert!(MissingDatesRule {}.evaluate(&Series::default(), Some(&expected)).is_empty());
    }
}
