//! Fix derivation.
//!
//! Turns findings into edit proposals. Only fixes marked `safe` may be
//! applied without review; see [`derive_fixes`] for when that holds.

mod apply;

pub use apply::{BACKUP_DIR, Backup, FixApplier, FixOutcome, WriteFailure};

use serde::Serialize;

use crate::findings::{BrokenHandler, Findings, UnusedFunction};
use crate::model::{ElementRegistry, FunctionRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixKind {
    RemoveFunction,
    RemoveHandler,
    AddFunctionStub,
}

impl FixKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixKind::RemoveFunction => "remove-function",
            FixKind::RemoveHandler => "remove-handler",
            FixKind::AddFunctionStub => "add-function-stub",
        }
    }
}

impl std::fmt::Display for FixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fix {
    #[serde(rename = "type")]
    pub kind: FixKind,
    pub file_path: String,
    pub line_number: usize,
    pub description: String,
    pub safe: bool,
    /// Function removed, called by the removed handler, or stubbed.
    pub function_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_id: Option<String>,
}

/// Where stubs for missing functions are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubTarget {
    pub file_path: String,
    /// Line the stub will start on.
    pub line_number: usize,
}

/// Derives fixes in a fixed order: function removals in finding order, then
/// for each broken handler its removal followed by one stub per missing name.
///
/// - `remove-function` is safe unless the definition is exported, shares its
///   name with a definition in another file, is a class or object member, or
///   the name appears anywhere in script (a call from another file under
///   same-file resolution).
/// - `remove-handler` is safe only when the element has an id and no other
///   attribute for the same event sits on that line.
/// - `add-function-stub` is never safe.
pub fn derive_fixes(
    findings: &Findings,
    elements: &ElementRegistry,
    functions: &FunctionRegistry,
    html_path: &str,
    stub_target: &StubTarget,
) -> Vec<Fix> {
    let mut fixes: Vec<Fix> = findings
        .unused_functions
        .iter()
        .map(|unused| remove_function(unused, functions))
        .collect();

    let mut stubbed = Vec::new();
    for broken in &findings.broken_handlers {
        fixes.push(remove_handler(broken, elements, html_path));
        if !stubbed.contains(&broken.missing_function) {
            stubbed.push(broken.missing_function.clone());
            fixes.push(add_stub(broken, stub_target));
        }
    }
    fixes
}

fn remove_function(unused: &UnusedFunction, functions: &FunctionRegistry) -> Fix {
    let definition = functions
        .definitions_named(&unused.function_name)
        .find(|def| def.file_path == unused.file_path && def.line_number == unused.line_number);

    let collides = functions
        .definitions_named(&unused.function_name)
        .any(|def| def.file_path != unused.file_path);
    let safe = definition.is_some_and(|def| !def.is_exported && def.kind.is_standalone())
        && !collides
        && functions.call_count(&unused.function_name) == 0;

    Fix {
        kind: FixKind::RemoveFunction,
        file_path: unused.file_path.clone(),
        line_number: unused.line_number,
        description: format!(
            "Remove unused function '{}' ({}:{})",
            unused.function_name, unused.file_path, unused.line_number
        ),
        safe,
        function_name: unused.function_name.clone(),
        event_type: None,
        element_id: None,
    }
}

fn remove_handler(broken: &BrokenHandler, elements: &ElementRegistry, html_path: &str) -> Fix {
    let same_line = elements
        .event_handlers()
        .iter()
        .filter(|h| h.line_number == broken.html_line_number && h.event_type == broken.event_type)
        .count();
    let safe = broken.element_id.is_some() && same_line == 1;

    let target = match &broken.element_id {
        Some(id) => format!("#{}", id),
        None => format!("the element on line {}", broken.html_line_number),
    };

    Fix {
        kind: FixKind::RemoveHandler,
        file_path: html_path.to_string(),
        line_number: broken.html_line_number,
        description: format!(
            "Remove {} handler calling missing function '{}' from {}",
            broken.event_type, broken.missing_function, target
        ),
        safe,
        function_name: broken.missing_function.clone(),
        event_type: Some(broken.event_type.clone()),
        element_id: broken.element_id.clone(),
    }
}

fn add_stub(broken: &BrokenHandler, stub_target: &StubTarget) -> Fix {
    Fix {
        kind: FixKind::AddFunctionStub,
        file_path: stub_target.file_path.clone(),
        line_number: stub_target.line_number,
        description: format!(
            "Add a stub for missing function '{}' to {}",
            broken.missing_function, stub_target.file_path
        ),
        safe: false,
        function_name: broken.missing_function.clone(),
        event_type: None,
        element_id: None,
    }
}
