//! Issue — one detected anomaly, produced transiently by a rule
//! evaluator and persisted as an exception by the orchestrator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a reviewer should do with the flagged observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    Review,
    Winsorize,
    Remove,
    Interpolate,
    SourceSwitch,
}

impl SuggestedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestedAction::Review => "review",
            SuggestedAction::Winsorize => "winsorize",
            SuggestedAction::Remove => "remove",
            SuggestedAction::Interpolate => "interpolate",
            SuggestedAction::SourceSwitch => "source_switch",
        }
    }
}

impl fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected anomaly.
///
/// `severity` is 1..=100; `details` is the structured evidence payload
/// that makes the exception explainable to a reviewer (robust z-score,
/// tolerances, streak length, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub rule: String,
    pub obs_date: NaiveDate,
    pub severity: u8,
    pub suggested_action: SuggestedAction,
    pub details: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggested_action_serde_is_snake_case() {
        let json = serde_json::to_string(&SuggestedAction::SourceSwitch).unwrap();
        assert_eq!(json, "\"source_switch\"");
    }

    #[test]
    fn issue_wire_shape_round_trips() {
        let issue = Issue {
            rule: "spikes.hampel".into(),
            obs_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            severity: 82,
            suggested_action: SuggestedAction::Winsorize,
            details: serde_json::json!({"z_robust": 4.2, "window": 21}),
        };
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("\"2024-03-15\""));
        let back: Issue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, issue);
    }
}
