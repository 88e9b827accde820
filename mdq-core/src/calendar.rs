//! Calendar service — expected observation dates per asset class.
//!
//! Holiday rules are fixed tables compiled into this module, not
//! call-time configuration: two calls with the same arguments always
//! return the same set, which the missing-dates rule depends on for
//! reproducible runs.
//!
//! Coverage is deliberately "good enough for DQ": the US set excludes
//! Columbus and Veterans Day (markets trade), the TARGET-like set is
//! the ECB core six. Both kill the obvious false positives without
//! pretending to be an exchange calendar product.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeSet;

use crate::domain::AssetClass;

/// Expected observation dates for `asset_class` over `[start, end]`, inclusive.
///
/// - equities / rates: weekdays minus the US market holiday set
/// - fx: weekdays minus a TARGET-like holiday set
/// - commodities: plain weekdays
pub fn expected_dates(asset_class: AssetClass, start: NaiveDate, end: NaiveDate) -> BTreeSet<NaiveDate> {
    let holidays = match asset_class {
        AssetClass::Equities | AssetClass::Rates => us_market_holidays(start, end),
        AssetClass::Fx => target_holidays(start, end),
        AssetClass::Commodities => BTreeSet::new(),
    };
    weekdays(start, end)
        .into_iter()
        .filter(|d| !holidays.contains(d))
        .collect()
}

/// All weekdays (Mon-Fri) in `[start, end]`.
fn weekdays(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut d = start;
    while d <= end {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(d);
        }
        d += Duration::days(1);
    }
    out
}

/// US market holidays in `[start, end]`.
///
/// Fixed-date holidays observe the nearest weekday (Sat -> Fri,
/// Sun -> Mon). New Year observed on Dec 31 belongs to the prior
/// calendar year, hence the widened year range.
fn us_market_holidays(start: NaiveDate, end: NaiveDate) -> BTreeSet<NaiveDate> {
    let mut out = BTreeSet::new();
    for year in (start.year() - 1)..=(end.year() + 1) {
        for d in us_market_holidays_for_year(year) {
            if d >= start && d <= end {
                out.insert(d);
            }
        }
    }
    out
}

fn us_market_holidays_for_year(year: i32) -> Vec<NaiveDate> {
    let easter = easter_sunday(year);
    vec![
        nearest_weekday(ymd(year, 1, 1)),               // New Year's Day
        nth_weekday(year, 1, Weekday::Mon, 3),          // MLK Day
        nth_weekday(year, 2, Weekday::Mon, 3),          // Presidents Day
        easter - Duration::days(2),                     // Good Friday
        last_weekday(year, 5, Weekday::Mon),            // Memorial Day
        nearest_weekday(ymd(year, 6, 19)),              // Juneteenth
        nearest_weekday(ymd(year, 7, 4)),               // Independence Day
        nth_weekday(year, 9, Weekday::Mon, 1),          // Labor Day
        nth_weekday(year, 11, Weekday::Thu, 4),         // Thanksgiving
        nearest_weekday(ymd(year, 12, 25)),             // Christmas
    ]
}

/// TARGET-like holidays in `[start, end]`: fixed dates, no shifting.
fn target_holidays(start: NaiveDate, end: NaiveDate) -> BTreeSet<NaiveDate> {
    let mut out = BTreeSet::new();
    for year in start.year()..=end.year() {
        let easter = easter_sunday(year);
        for d in [
            ymd(year, 1, 1),            // New Year's Day
            easter - Duration::days(2), // Good Friday
            easter + Duration::days(1), // Easter Monday
            ymd(year, 5, 1),            // Labour Day
            ymd(year, 12, 25),          // Christmas
            ymd(year, 12, 26),          // Boxing Day
        ] {
            if d >= start && d <= end {
                out.insert(d);
            }
        }
    }
    out
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // All call sites use hardcoded valid month/day combinations.
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixed holiday date")
}

/// Saturday observes Friday, Sunday observes Monday.
fn nearest_weekday(d: NaiveDate) -> NaiveDate {
    match d.weekday() {
        Weekday::Sat => d - Duration::days(1),
        Weekday::Sun => d + Duration::days(1),
        _ => d,
    }
}

/// The n-th (1-based) given weekday of a month.
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first = ymd(year, month, 1);
    let offset = (7 + weekday.num_days_from_monday() as i64
        - first.weekday().num_days_from_monday() as i64)
        % 7;
    first + Duration::days(offset + 7 * (n as i64 - 1))
}

/// The last given weekday of a month.
fn last_weekday(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let next_month = if month == 12 { ymd(year + 1, 1, 1) } else { ymd(year, month + 1, 1) };
    let mut d = next_month - Duration::days(1);
    while d.weekday() != weekday {
        d -= Duration::days(1);
    }
    d
}

/// Easter Sunday via the anonymous Gregorian computus.
fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = ((h + l - 7 * m + 114) % 31) + 1;
    ymd(year, month as u32, day as u32)
}
