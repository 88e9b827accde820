//! MDQ Core — market-data quality engine.
//!
//! This crate contains the heart of the data-quality system:
//! - Domain types (series, issues, runs, exceptions, risk factors)
//! - Calendar service (expected observation dates per asset class)
//! - Deterministic vendor source selection
//! - Six statistical rule evaluators (spike, missing dates, staleness,
//!   cross-source reconciliation, correlation break, FX triangle)
//! - The run orchestrator that composes them into one evaluation pass
//!   and persists the resulting exception set
//!
//! Everything here is deterministic and synchronous: two runs over the
//! same stored series with the same configuration produce the same
//! exception set, which is what makes the output auditable.

pub mod calendar;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod rules;
pub mod sources;
