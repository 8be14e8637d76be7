//! Pretty formatter for human-readable terminal output

use colored::{ColoredString, Colorize};
use wirecheck_core::{AuditReport, FixOutcome, Severity};

use super::{Entry, entries};

pub struct PrettyFormatter;

impl PrettyFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(&self, report: &AuditReport, outcome: Option<&FixOutcome>) -> String {
        let mut output = String::new();

        for entry in entries(report) {
            output.push_str(&self.format_entry(&entry));
            output.push_str("\n\n");
        }

        for diag in &report.diagnostics {
            output.push_str(&format!(
                "{}: {}\n",
                "skipped".yellow().bold(),
                diag
            ));
        }
        for diag in &report.html_diagnostics {
            output.push_str(&format!(
                "{}: {}:{}: {}\n",
                "html".yellow().bold(),
                report.html_file,
                diag.line_number,
                diag.message
            ));
        }

        output.push_str(&self.format_summary(report));
        output.push_str(&self.format_fixes(report, outcome));
        output
    }

    fn format_entry(&self, entry: &Entry) -> String {
        let header = format!(
            "{}[{}]: {}",
            self.colorize_severity(entry.severity),
            entry.check_id.dimmed(),
            entry.message
        );
        let location = format!("  {} {}", "-->".blue(), entry.location());
        format!("{}\n{}", header, location)
    }

    fn colorize_severity(&self, severity: Severity) -> ColoredString {
        match severity {
            Severity::Critical => "critical".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        }
    }

    fn format_summary(&self, report: &AuditReport) -> String {
        let summary = &report.summary;
        if summary.total == 0 {
            return format!(
                "{} No problems found ({} scripts, {} element ids)\n",
                "✓".green().bold(),
                report.stats.js_files,
                report.stats.element_ids
            );
        }

        let counts = &summary.by_severity;
        let mut parts = Vec::new();
        if counts.critical > 0 {
            parts.push(format!("{} critical", counts.critical).red().to_string());
        }
        if counts.warning > 0 {
            let noun = if counts.warning == 1 { "warning" } else { "warnings" };
            parts.push(format!("{} {}", counts.warning, noun).yellow().to_string());
        }
        if counts.info > 0 {
            parts.push(format!("{} info", counts.info).blue().to_string());
        }

        let noun = if summary.total == 1 { "problem" } else { "problems" };
        format!(
            "{} {} {} ({})\n",
            "✗".red().bold(),
            summary.total,
            noun,
            parts.join(", ")
        )
    }

    fn format_fixes(&self, report: &AuditReport, outcome: Option<&FixOutcome>) -> String {
        match outcome {
            Some(outcome) => {
                let mut out = format!(
                    "{} Applied {} fix(es)\n",
                    "✓".green().bold(),
                    outcome.applied.len()
                );
                if let Some(backup) = outcome.backups.first() {
                    let dir = backup.backup.parent().unwrap_or(&backup.backup);
                    out.push_str(&format!("  backups written to {}\n", dir.display()));
                }
                if !outcome.failed.is_empty() {
                    out.push_str(&format!(
                        "{} {} fix(es) could not be applied\n",
                        "✗".red().bold(),
                        outcome.failed.len()
                    ));
                }
                out
            }
            None if !report.fixes.is_empty() => {
                let safe = report.fixes.iter().filter(|f| f.safe).count();
                format!(
                    "{} {} fix(es) available, {} safe. Run with {} to apply them.\n",
                    "hint:".cyan().bold(),
                    report.fixes.len(),
                    safe,
                    "--fix".bold()
                )
            }
            None => String::new(),
        }
    }
}

impl Default for PrettyFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::sample_report;
    use serial_test::serial;

    fn plain<T>(f: impl FnOnce() -> T) -> T {
        colored::control::set_override(false);
        let result = f();
        colored::control::unset_override();
        result
    }

    #[test]
    #[serial]
    fn entries_render_header_and_location() {
        let (_dir, report) = sample_report();

        let output = plain(|| PrettyFormatter::new().format(&report, None));

        assert!(output.contains("critical[W002]: onclick on #save calls undefined function 'saveAll'"));
        assert!(output.contains("  --> "));
        assert!(output.contains("index.html:2"));
    }

    #[test]
    #[serial]
    fn summary_counts_problems() {
        let (_dir, report) = sample_report();

        let output = plain(|| PrettyFormatter::new().format(&report, None));

        assert!(output.contains(&format!("✗ {} problems", report.summary.total)));
        assert!(output.contains("1 critical"));
        assert!(output.contains("Run with --fix"));
    }

    #[test]
    #[serial]
    fn applied_fixes_are_reported() {
        let (_dir, report) = sample_report();
        let outcome = FixOutcome::default();

        let output = plain(|| PrettyFormatter::new().format(&report, Some(&outcome)));

        assert!(output.contains("✓ Applied 0 fix(es)"));
        assert!(!output.contains("Run with --fix"));
    }
}
