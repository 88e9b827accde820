//! The DQ run orchestrator and its store seams.
//!
//! `DqEngine` composes the calendar service, source selector, and rule
//! battery into one synchronous evaluation pass per (risk factor,
//! as-of) and hands the resulting issues to the run store. Stores are
//! traits: the engine reads series, writes exceptions, and never reads
//! exceptions back.

pub mod memory;
pub mod orchestrator;
pub mod store;

pub use memory::MemoryStore;
pub use orchestrator::{DqEngine, EngineError, RelationPolicy, RunRequest, TriangleSpec, DEFAULT_LOOKBACK_DAYS};
pub use store::{NewRun, RunStore, SeriesStore, StoreError};
