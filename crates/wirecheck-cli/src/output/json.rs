//! JSON output formatter
//!
//! The report is emitted as-is with a format version on top, so the finding
//! lists stay at the top level next to `summary`, `fixes` and `diagnostics`.

use serde::Serialize;
use wirecheck_core::{AuditReport, FixOutcome};

pub const FORMAT_VERSION: &str = "1.0";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonOutput<'a> {
    pub version: &'static str,
    pub wirecheck_version: &'static str,
    #[serde(flatten)]
    pub report: &'a AuditReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_outcome: Option<&'a FixOutcome>,
}

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, report: &AuditReport, outcome: Option<&FixOutcome>) -> String {
        let output = JsonOutput {
            version: FORMAT_VERSION,
            wirecheck_version: env!("CARGO_PKG_VERSION"),
            report,
            fix_outcome: outcome,
        };
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
