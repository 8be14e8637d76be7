//! Findings produced by the analyzer.

use serde::Serialize;

use crate::model::QueryMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FindingCategory {
    OrphanedFunctions,
    BrokenHandlers,
    UnusedFunctions,
    NonFunctionalElements,
    PatternIssues,
    DuplicateIds,
}

impl FindingCategory {
    pub const ALL: [FindingCategory; 6] = [
        FindingCategory::BrokenHandlers,
        FindingCategory::OrphanedFunctions,
        FindingCategory::NonFunctionalElements,
        FindingCategory::DuplicateIds,
        FindingCategory::UnusedFunctions,
        FindingCategory::PatternIssues,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            FindingCategory::OrphanedFunctions => "Orphaned Functions",
            FindingCategory::BrokenHandlers => "Broken Event Handlers",
            FindingCategory::UnusedFunctions => "Unused Functions",
            FindingCategory::NonFunctionalElements => "Non-Functional Elements",
            FindingCategory::PatternIssues => "UI Pattern Issues",
            FindingCategory::DuplicateIds => "Duplicate Element IDs",
        }
    }

    /// Severity of findings in this category. Pattern issues carry their own.
    pub fn default_severity(&self) -> Severity {
        match self {
            FindingCategory::BrokenHandlers => Severity::Critical,
            FindingCategory::OrphanedFunctions
            | FindingCategory::NonFunctionalElements
            | FindingCategory::DuplicateIds => Severity::Warning,
            FindingCategory::UnusedFunctions | FindingCategory::PatternIssues => Severity::Info,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Modal,
    Tab,
    Form,
    Navigation,
}

impl PatternKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::Modal => "modal",
            PatternKind::Tab => "tab",
            PatternKind::Form => "form",
            PatternKind::Navigation => "navigation",
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedFunction {
    pub function_name: String,
    pub file_path: String,
    pub line_number: usize,
    pub missing_element_id: String,
    pub query_method: QueryMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenHandler {
    pub element_id: Option<String>,
    pub event_type: String,
    pub missing_function: String,
    pub html_line_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedFunction {
    pub function_name: String,
    pub file_path: String,
    pub line_number: usize,
    pub call_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonFunctionalElement {
    pub element_id: Option<String>,
    pub tag_name: String,
    pub html_line_number: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternIssue {
    pub pattern: PatternKind,
    pub element_id: String,
    pub missing_components: Vec<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateId {
    pub element_id: String,
    pub line_numbers: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    OrphanedFunction(OrphanedFunction),
    BrokenHandler(BrokenHandler),
    UnusedFunction(UnusedFunction),
    NonFunctionalElement(NonFunctionalElement),
    PatternIssue(PatternIssue),
    DuplicateId(DuplicateId),
}

impl Finding {
    pub fn category(&self) -> FindingCategory {
        match self {
            Finding::OrphanedFunction(_) => FindingCategory::OrphanedFunctions,
            Finding::BrokenHandler(_) => FindingCategory::BrokenHandlers,
            Finding::UnusedFunction(_) => FindingCategory::UnusedFunctions,
            Finding::NonFunctionalElement(_) => FindingCategory::NonFunctionalElements,
            Finding::PatternIssue(_) => FindingCategory::PatternIssues,
            Finding::DuplicateId(_) => FindingCategory::DuplicateIds,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Finding::PatternIssue(issue) => issue.severity,
            other => other.category().default_severity(),
        }
    }
}

/// The findings bundle, one list per category, each in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Findings {
    pub orphaned_functions: Vec<OrphanedFunction>,
    pub broken_handlers: Vec<BrokenHandler>,
    pub unused_functions: Vec<UnusedFunction>,
    pub non_functional_elements: Vec<NonFunctionalElement>,
    pub pattern_issues: Vec<PatternIssue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub duplicate_ids: Vec<DuplicateId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub orphaned_functions: usize,
    pub broken_handlers: usize,
    pub unused_functions: usize,
    pub non_functional_elements: usize,
    pub pattern_issues: usize,
    pub duplicate_ids: usize,
    pub by_severity: SeverityCounts,
}

impl Findings {
    pub fn push(&mut self, finding: Finding) {
        match finding {
            Finding::OrphanedFunction(f) => self.orphaned_functions.push(f),
            Finding::BrokenHandler(f) => self.broken_handlers.push(f),
            Finding::UnusedFunction(f) => self.unused_functions.push(f),
            Finding::NonFunctionalElement(f) => self.non_functional_elements.push(f),
            Finding::PatternIssue(f) => self.pattern_issues.push(f),
            Finding::DuplicateId(f) => self.duplicate_ids.push(f),
        }
    }

    pub fn count(&self, category: FindingCategory) -> usize {
        match category {
            FindingCategory::OrphanedFunctions => self.orphaned_functions.len(),
            FindingCategory::BrokenHandlers => self.broken_handlers.len(),
            FindingCategory::UnusedFunctions => self.unused_functions.len(),
            FindingCategory::NonFunctionalElements => self.non_functional_elements.len(),
            FindingCategory::PatternIssues => self.pattern_issues.len(),
            FindingCategory::DuplicateIds => self.duplicate_ids.len(),
        }
    }

    pub fn total(&self) -> usize {
        FindingCategory::ALL.iter().map(|c| self.count(*c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn severity_counts(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        let mut add = |severity: Severity, n: usize| match severity {
            Severity::Critical => counts.critical += n,
            Severity::Warning => counts.warning += n,
            Severity::Info => counts.info += n,
        };

        for category in FindingCategory::ALL {
            if category != FindingCategory::PatternIssues {
                add(category.default_severity(), self.count(category));
            }
        }
        for issue in &self.pattern_issues {
            add(issue.severity, 1);
        }
        counts
    }

    pub fn has_critical(&self) -> bool {
        self.severity_counts().critical > 0
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total: self.total(),
            orphaned_functions: self.orphaned_functions.len(),
            broken_handlers: self.broken_handlers.len(),
            unused_functions: self.unused_functions.len(),
            non_functional_elements: self.non_functional_elements.len(),
            pattern_issues: self.pattern_issues.len(),
            duplicate_ids: self.duplicate_ids.len(),
            by_severity: self.severity_counts(),
        }
    }
}

impl Extend<Finding> for Findings {
    fn extend<T: IntoIterator<Item = Finding>>(&mut self, iter: T) {
        for finding in iter {
            self.push(finding);
        }
    }
}
