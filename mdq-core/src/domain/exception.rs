//! Persisted form of an [`Issue`](super::Issue).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Issue, RunId, SuggestedAction};

/// Triage lifecycle of a persisted exception.
///
/// The engine only ever writes `Open`; triage transitions belong to the
/// review workflow, not to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionStatus {
    Open,
    Triaged,
    Closed,
}

impl ExceptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExceptionStatus::Open => "open",
            ExceptionStatus::Triaged => "triaged",
            ExceptionStatus::Closed => "closed",
        }
    }
}

/// An [`Issue`] after the orchestrator wrote it, tagged with its run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionRecord {
    pub dq_run_id: RunId,
    pub risk_factor_id: String,
    pub rule: String,
    pub obs_date: NaiveDate,
    pub severity: u8,
    pub status: ExceptionStatus,
    pub suggested_action: SuggestedAction,
    pub details: serde_json::Value,
}

impl ExceptionRecord {
    /// Attach run/risk-factor identity to a transient issue.
    pub fn from_issue(dq_run_id: RunId, risk_factor_id: &str, issue: Issue) -> Self {
        ExceptionRecord {
            dq_run_id,
            risk_factor_id: risk_factor_id.to_string(),
            rule: issue.rule,
            obs_date: issue.obs_date,
            severity: issue.severity,
            status: ExceptionStatus::Open,
            suggested_action: issue.suggested_action,
            details: issue.details,
        }
    }
}
