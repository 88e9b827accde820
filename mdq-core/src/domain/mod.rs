//! Domain types for MDQ.

pub mod asset_class;
pub mod exception;
pub mod issue;
pub mod run;
pub mod series;

pub use asset_class::AssetClass;
pub use exception::{ExceptionRecord, ExceptionStatus};
pub use issue::{Issue, SuggestedAction};
pub use run::{DqRun, RiskFactor, RunId, RunParameters};
pub use series::{align_pair, align_triple, Observation, Series};
