use std::collections::HashSet;

use super::{Names, any_function_present, issue};
use crate::analysis::AnalysisContext;
use crate::findings::{PatternIssue, PatternKind, Severity};

const SUBMIT_VERBS: &[&str] = &["submit", "handle", "save", "send"];
const SUBMIT_SUFFIXES: &[&str] = &["Submit", "Handler"];
const SUBMIT_GENERIC: &[&str] = &["handleSubmit", "submitForm", "onSubmit"];

/// Whether the id belongs to an actual `<form>` element.
pub(super) fn is_form_element(ctx: &AnalysisContext<'_>, id: &str) -> bool {
    ctx.elements
        .forms()
        .iter()
        .any(|form| form.element_id.as_deref() == Some(id))
}

pub(super) fn validate(
    ctx: &AnalysisContext<'_>,
    id: &str,
    keyword: Option<&str>,
) -> Option<PatternIssue> {
    let names = Names::new(id, keyword);
    let mut missing = Vec::new();

    let mut candidates = names.functions(SUBMIT_VERBS, SUBMIT_SUFFIXES, SUBMIT_GENERIC);
    candidates.push(format!("handle{}Submit", names.pascal));
    candidates.push(format!("on{}Submit", names.pascal));

    let submitted = ctx
        .elements
        .handlers_for(id)
        .any(|handler| handler.event_type == "onsubmit")
        || ctx.functions.queries_element(id)
        || any_function_present(ctx, &candidates);
    if !submitted {
        missing.push(("submit handler".to_string(), Severity::Warning));
    }

    let mut seen = HashSet::new();
    let label_targets = ctx
        .elements
        .forms()
        .iter()
        .filter(|form| form.element_id.as_deref() == Some(id))
        .flat_map(|form| form.label_targets.iter());
    for target in label_targets {
        if !ctx.elements.contains_id(target) && seen.insert(target.as_str()) {
            missing.push((format!("input for label '{}'", target), Severity::Info));
        }
    }

    issue(PatternKind::Form, id, missing)
}
