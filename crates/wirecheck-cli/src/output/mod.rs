//! Report rendering
//!
//! Every formatter walks the same flattened view of the findings, so the
//! terminal, Markdown and JSON renderings agree on wording and order.

pub mod json;
pub mod markdown;
pub mod pretty;

use wirecheck_core::findings::FindingCategory;
use wirecheck_core::{AuditReport, Severity};

/// One finding, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub check_id: &'static str,
    pub category: FindingCategory,
    pub severity: Severity,
    pub message: String,
    pub file: String,
    pub line: Option<usize>,
}

impl Entry {
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{}", self.file, line),
            None => self.file.clone(),
        }
    }
}

pub fn check_id(category: FindingCategory) -> &'static str {
    match category {
        FindingCategory::OrphanedFunctions => "W001",
        FindingCategory::BrokenHandlers => "W002",
        FindingCategory::UnusedFunctions => "W003",
        FindingCategory::NonFunctionalElements => "W004",
        FindingCategory::PatternIssues => "W005",
        FindingCategory::DuplicateIds => "W006",
    }
}

fn element_label(tag: Option<&str>, id: Option<&str>) -> String {
    match (tag, id) {
        (Some(tag), Some(id)) => format!("<{}> #{}", tag, id),
        (Some(tag), None) => format!("<{}>", tag),
        (None, Some(id)) => format!("#{}", id),
        (None, None) => "element".to_string(),
    }
}

/// Entries for one category, in scan order.
pub fn category_entries(report: &AuditReport, category: FindingCategory) -> Vec<Entry> {
    let findings = &report.findings;
    let html = report.html_file.as_str();
    let entry = |message: String, file: &str, line: Option<usize>| Entry {
        check_id: check_id(category),
        category,
        severity: category.default_severity(),
        message,
        file: file.to_string(),
        line,
    };

    match category {
        FindingCategory::OrphanedFunctions => findings
            .orphaned_functions
            .iter()
            .map(|f| {
                entry(
                    format!(
                        "'{}' looks up #{} with {}, but the page has no such id",
                        f.function_name,
                        f.missing_element_id,
                        f.query_method.as_str()
                    ),
                    &f.file_path,
                    Some(f.line_number),
                )
            })
            .collect(),
        FindingCategory::BrokenHandlers => findings
            .broken_handlers
            .iter()
            .map(|f| {
                entry(
                    format!(
                        "{} on {} calls undefined function '{}'",
                        f.event_type,
                        element_label(None, f.element_id.as_deref()),
                        f.missing_function
                    ),
                    html,
                    Some(f.html_line_number),
                )
            })
            .collect(),
        FindingCategory::UnusedFunctions => findings
            .unused_functions
            .iter()
            .map(|f| {
                entry(
                    format!("function '{}' is never called", f.function_name),
                    &f.file_path,
                    Some(f.line_number),
                )
            })
            .collect(),
        FindingCategory::NonFunctionalElements => findings
            .non_functional_elements
            .iter()
            .map(|f| {
                entry(
                    format!(
                        "{}: {}",
                        element_label(Some(&f.tag_name), f.element_id.as_deref()),
                        f.reason
                    ),
                    html,
                    Some(f.html_line_number),
                )
            })
            .collect(),
        FindingCategory::PatternIssues => findings
            .pattern_issues
            .iter()
            .map(|f| Entry {
                severity: f.severity,
                ..entry(
                    format!(
                        "{} #{} is missing {}",
                        f.pattern,
                        f.element_id,
                        f.missing_components.join(", ")
                    ),
                    html,
                    None,
                )
            })
            .collect(),
        FindingCategory::DuplicateIds => findings
            .duplicate_ids
            .iter()
            .map(|f| {
                let lines: Vec<String> = f.line_numbers.iter().map(|n| n.to_string()).collect();
                entry(
                    format!(
                        "id '{}' is defined {} times (lines {})",
                        f.element_id,
                        f.line_numbers.len(),
                        lines.join(", ")
                    ),
                    html,
                    f.line_numbers.first().copied(),
                )
            })
            .collect(),
    }
}

/// All entries, grouped by category in report order.
pub fn entries(report: &AuditReport) -> Vec<Entry> {
    FindingCategory::ALL
        .iter()
        .flat_map(|category| category_entries(report, *category))
        .collect()
}
