use super::{Names, any_function_present, issue};
use crate::analysis::AnalysisContext;
use crate::findings::{PatternIssue, PatternKind, Severity};

const NAVIGATE_VERBS: &[&str] = &["navigate", "toggle", "handle", "open", "show"];
const NAVIGATE_SUFFIXES: &[&str] = &["Navigate", "Toggle", "Click"];
const NAVIGATE_GENERIC: &[&str] = &[
    "navigate",
    "navigateTo",
    "handleNavigation",
    "showSection",
    "showPage",
    "toggleMenu",
    "toggleNav",
];

pub(super) fn validate(ctx: &AnalysisContext<'_>, id: &str) -> Option<PatternIssue> {
    let names = Names::new(id, None);

    let wired = ctx.element_has_handler(id)
        || ctx.wired_by_script(id)
        || any_function_present(
            ctx,
            &names.functions(NAVIGATE_VERBS, NAVIGATE_SUFFIXES, NAVIGATE_GENERIC),
        );
    if wired {
        return None;
    }

    issue(
        PatternKind::Navigation,
        id,
        vec![("navigation function".to_string(), Severity::Info)],
    )
}

#[cfg(test)]
mod tests {
    use super::super::tests::issues;
    use crate::findings::{PatternKind, Severity};

    #[test]
    fn unwired_nav_is_info() {
        let found = issues(r#"<nav id="mainNav"></nav>"#, "");

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pattern, PatternKind::Navigation);
        assert_eq!(found[0].missing_components, vec!["navigation function"]);
        assert_eq!(found[0].severity, Severity::Info);
    }

    #[test]
    fn generic_navigation_function_counts() {
        let found = issues(
            r#"<div id="side-menu"></div>"#,
            "function toggleMenu() {}",
        );

        assert!(found.is_empty());
    }
}
