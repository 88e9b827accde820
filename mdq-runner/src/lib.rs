//! MDQ Runner — batch orchestration over a configured universe.
//!
//! Wires a TOML universe configuration into a [`mdq_core::engine::DqEngine`],
//! sweeps every configured risk factor in parallel (one independent run
//! each), and exports the persisted exception set as review artifacts.

pub mod config;
pub mod export;
pub mod runner;

pub use config::{ConfigError, RiskFactorEntry, UniverseConfig};
pub use export::{export_exceptions_csv, export_exceptions_json, write_exceptions_csv};
pub use runner::{build_engine, register_universe, run_universe, SweepOutcome, SweepSummary};
