//! Markdown report for pull requests and issue trackers

use std::fmt::Write;

use wirecheck_core::findings::FindingCategory;
use wirecheck_core::{AuditReport, FixOutcome};

use super::category_entries;

pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, report: &AuditReport, outcome: Option<&FixOutcome>) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# wirecheck report");
        let _ = writeln!(out);
        let _ = writeln!(out, "- HTML file: `{}`", report.html_file);
        let _ = writeln!(out, "- JavaScript root: `{}`", report.js_root);
        let _ = writeln!(
            out,
            "- Scanned: {} scripts, {} functions, {} element ids, {} inline handlers",
            report.stats.js_files,
            report.stats.functions,
            report.stats.element_ids,
            report.stats.event_handlers
        );
        let _ = writeln!(out);

        self.write_summary(&mut out, report);
        for category in FindingCategory::ALL {
            self.write_category(&mut out, report, category);
        }
        self.write_diagnostics(&mut out, report);
        self.write_fixes(&mut out, report, outcome);

        out
    }

    fn write_summary(&self, out: &mut String, report: &AuditReport) {
        let counts = &report.summary.by_severity;
        let _ = writeln!(out, "## Executive Summary");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Severity | Count |");
        let _ = writeln!(out, "|----------|-------|");
        let _ = writeln!(out, "| Critical | {} |", counts.critical);
        let _ = writeln!(out, "| Warning | {} |", counts.warning);
        let _ = writeln!(out, "| Info | {} |", counts.info);
        let _ = writeln!(out, "| **Total** | **{}** |", report.summary.total);
        let _ = writeln!(out);
    }

    fn write_category(&self, out: &mut String, report: &AuditReport, category: FindingCategory) {
        let entries = category_entries(report, category);
        // Duplicate ids are omitted from the report entirely when there are none.
        if entries.is_empty() && category == FindingCategory::DuplicateIds {
            return;
        }

        let _ = writeln!(out, "## {} ({})", category.title(), entries.len());
        let _ = writeln!(out);
        if entries.is_empty() {
            let _ = writeln!(out, "_None found._");
        }
        for entry in &entries {
            let _ = writeln!(
                out,
                "- **{}** `{}` {} (`{}`)",
                entry.severity,
                entry.check_id,
                entry.message,
                entry.location()
            );
        }
        let _ = writeln!(out);
    }

    fn write_diagnostics(&self, out: &mut String, report: &AuditReport) {
        if report.diagnostics.is_empty() && report.html_diagnostics.is_empty() {
            return;
        }

        let _ = writeln!(out, "## Diagnostics");
        let _ = writeln!(out);
        for diag in &report.diagnostics {
            let location = match diag.line {
                Some(line) => format!("{}:{}", diag.file_path, line),
                None => diag.file_path.clone(),
            };
            let _ = writeln!(out, "- `{}`: {}", location, diag.message);
        }
        for diag in &report.html_diagnostics {
            let _ = writeln!(
                out,
                "- `{}:{}`: {}",
                report.html_file, diag.line_number, diag.message
            );
        }
        let _ = writeln!(out);
    }

    fn write_fixes(&self, out: &mut String, report: &AuditReport, outcome: Option<&FixOutcome>) {
        if report.fixes.is_empty() {
            return;
        }

        let _ = writeln!(out, "## Suggested Fixes");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Type | Location | Description | Safe |");
        let _ = writeln!(out, "|------|----------|-------------|------|");
        for fix in &report.fixes {
            let _ = writeln!(
                out,
                "| {} | `{}:{}` | {} | {} |",
                fix.kind,
                fix.file_path,
                fix.line_number,
                fix.description.replace('|', "\\|"),
                if fix.safe { "yes" } else { "no" }
            );
        }
        let _ = writeln!(out);

        if let Some(outcome) = outcome {
            let _ = writeln!(out, "## Applied Fixes");
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{} applied, {} failed.",
                outcome.applied.len(),
                outcome.failed.len()
            );
            let _ = writeln!(out);
            for failure in &outcome.failed {
                let _ = writeln!(
                    out,
                    "- `{}`: {}",
                    failure.path.display(),
                    failure.message
                );
            }
            if !outcome.failed.is_empty() {
                let _ = writeln!(out);
            }
        }
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}
