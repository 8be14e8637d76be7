use super::{Names, any_function_present, issue};
use crate::analysis::AnalysisContext;
use crate::findings::{PatternIssue, PatternKind, Severity};

const SWITCH_VERBS: &[&str] = &["switch", "select", "show", "activate", "open"];
const SWITCH_SUFFIXES: &[&str] = &["Click", "Select"];
const SWITCH_GENERIC: &[&str] = &["switchTab", "selectTab", "showTab", "openTab", "activateTab"];

pub(super) fn validate(ctx: &AnalysisContext<'_>, id: &str, keyword: &str) -> Option<PatternIssue> {
    let names = Names::new(id, Some(keyword));
    let mut missing = Vec::new();

    let switched = ctx.element_has_handler(id)
        || ctx.wired_by_script(id)
        || any_function_present(ctx, &names.functions(SWITCH_VERBS, SWITCH_SUFFIXES, SWITCH_GENERIC));
    if !switched {
        missing.push(("switch function".to_string(), Severity::Warning));
    }

    let has_panel = panel_candidates(&names)
        .iter()
        .any(|panel| panel != id && ctx.elements.contains_id(panel));
    if !has_panel {
        missing.push(("content panel".to_string(), Severity::Info));
    }

    issue(PatternKind::Tab, id, missing)
}

fn panel_candidates(names: &Names<'_>) -> Vec<String> {
    let mut candidates = Vec::new();
    if let Some(base) = &names.base {
        candidates.push(base.clone());
        candidates.push(format!("{}Content", base));
        candidates.push(format!("{}Panel", base));
        candidates.push(format!("{}-content", base));
        candidates.push(format!("{}-panel", base));
    }
    candidates.push(format!("{}Content", names.camel));
    candidates.push(format!("{}-content", names.id));
    candidates.push(format!("{}Panel", names.camel));
    candidates.push(format!("{}-panel", names.id));
    candidates
}
