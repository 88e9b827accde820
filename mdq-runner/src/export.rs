//! Exception export — CSV and JSON artifacts for the review pack.
//!
//! Rows are ordered the way reviewers triage: severity descending,
//! then observation date descending. The `details` payload is embedded
//! as a compact JSON string in CSV and kept structured in JSON.

use std::path::Path;

use anyhow::{Context, Result};

use mdq_core::domain::ExceptionRecord;

/// Sort a copy of the records into triage order.
fn triage_order(records: &[ExceptionRecord]) -> Vec<&ExceptionRecord> {
    let mut sorted: Vec<&ExceptionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.obs_date.cmp(&a.obs_date))
            .then(a.dq_run_id.cmp(&b.dq_run_id))
            .then(a.rule.cmp(&b.rule))
    });
    sorted
}

/// Render the exception set as CSV.
pub fn export_exceptions_csv(records: &[ExceptionRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "dq_run_id",
        "risk_factor_id",
        "rule",
        "obs_date",
        "severity",
        "status",
        "suggested_action",
        "details",
    ])
    .context("failed to write CSV header")?;

    for record in triage_order(records) {
        let details =
            serde_json::to_string(&record.details).context("failed to serialize details")?;
        wtr.write_record([
            record.dq_run_id.to_string(),
            record.risk_factor_id.clone(),
            record.rule.clone(),
            record.obs_date.to_string(),
            record.severity.to_string(),
            record.status.as_str().to_string(),
            record.suggested_action.as_str().to_string(),
            details,
        ])
        .context("failed to write CSV row")?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Write the CSV artifact to disk.
pub fn write_exceptions_csv(path: &Path, records: &[ExceptionRecord]) -> Result<()> {
    let csv = export_exceptions_csv(records)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}

/// Render the exception set as pretty JSON, in triage order.
pub fn export_exceptions_json(records: &[ExceptionRecord]) -> Result<String> {
    let ordered: Vec<&ExceptionRecord> = triage_order(records);
    serde_json::to_string_pretty(&ordered).context("failed to serialize exceptions to JSON")
}
