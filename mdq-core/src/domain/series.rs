//! Series — a sparse, date-indexed observation sequence for one
//! (risk factor, source) pair.
//!
//! The constructor enforces the two invariants every rule evaluator
//! relies on: at most one value per date (keep-last on conflict, the
//! typical vendor overwrite behavior) and strict ascending date order.
//! NaN values are dropped on construction, so downstream code never
//! sees them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Deduplicated, date-sorted observation sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    points: Vec<Observation>,
}

impl Series {
    /// Build a series from raw (date, value) pairs.
    ///
    /// Drops NaN values, keeps the last value per date, sorts ascending.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (date, value) in points {
            if value.is_nan() {
                continue;
            }
            by_date.insert(date, value);
        }
        Series {
            points: by_date
                .into_iter()
                .map(|(date, value)| Observation { date, value })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.points.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|o| o.date)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|o| o.value)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|o| o.date)
    }

    /// Restrict to observations with `start <= date <= end`.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Series {
        Series {
            points: self
                .points
                .iter()
                .filter(|o| o.date >= start && o.date <= end)
                .copied()
                .collect(),
        }
    }

    /// True iff every value is strictly positive (log-returns are defined).
    pub fn all_positive(&self) -> bool {
        self.points.iter().all(|o| o.value > 0.0)
    }
}

/// Inner-join two series on date.
pub fn align_pair(a: &Series, b: &Series) -> Vec<(NaiveDate, f64, f64)> {
    let bm: BTreeMap<NaiveDate, f64> = b.iter().map(|o| (o.date, o.value)).collect();
    a.iter()
        .filter_map(|o| bm.get(&o.date).map(|&v| (o.date, o.value, v)))
        .collect()
}

/// Inner-join three series on date.
pub fn align_triple(a: &Series, b: &Series, c: &Series) -> Vec<(NaiveDate, f64, f64, f64)> {
    let bm: BTreeMap<NaiveDate, f64> = b.iter().map(|o| (o.date, o.value)).collect();
    let cm: BTreeMap<NaiveDate, f64> = c.iter().map(|o| (o.date, o.value)).collect();
    a.iter()
        .filter_map(|o| match (bm.get(&o.date), cm.get(&o.date)) {
            (Some(&vb), Some(&vc)) => Some((o.date, o.value, vb, vc)),
            _ => None,
        })
        .collect()
}
