use super::{Names, any_function_present, issue};
use crate::analysis::AnalysisContext;
use crate::findings::{PatternIssue, PatternKind, Severity};

const OPEN_VERBS: &[&str] = &["open", "show", "display"];
const OPEN_SUFFIXES: &[&str] = &["Open", "Show"];
const OPEN_GENERIC: &[&str] = &["openModal", "showModal", "openDialog", "showDialog"];

const CLOSE_VERBS: &[&str] = &["close", "hide", "dismiss"];
const CLOSE_SUFFIXES: &[&str] = &["Close", "Hide"];
const CLOSE_GENERIC: &[&str] = &["closeModal", "hideModal", "closeDialog", "closeAllModals"];

/// A modal needs a way in and, more importantly, a way out.
pub(super) fn validate(ctx: &AnalysisContext<'_>, id: &str, keyword: &str) -> Option<PatternIssue> {
    let names = Names::new(id, Some(keyword));
    let mut missing = Vec::new();

    let opens = names.functions(OPEN_VERBS, OPEN_SUFFIXES, OPEN_GENERIC);
    if !any_function_present(ctx, &opens) && !ctx.functions.queries_element(id) {
        missing.push(("open function".to_string(), Severity::Warning));
    }

    let closes = names.functions(CLOSE_VERBS, CLOSE_SUFFIXES, CLOSE_GENERIC);
    if !any_function_present(ctx, &closes) && !has_close_control(ctx, &names) {
        missing.push(("close function".to_string(), Severity::Critical));
    }

    issue(PatternKind::Modal, id, missing)
}

/// A dedicated close element with its own handler, e.g. `settingsModalClose`.
fn has_close_control(ctx: &AnalysisContext<'_>, names: &Names<'_>) -> bool {
    let candidates = [
        format!("{}Close", names.camel),
        format!("{}CloseBtn", names.camel),
        format!("{}-close", names.id),
        format!("{}-close-btn", names.id),
        format!("close-{}", names.id),
        format!("close{}", names.pascal),
    ];
    candidates
        .iter()
        .any(|control| ctx.element_has_handler(control))
}

#[cfg(test)]
mod tests {
    use super::super::tests::issues;
    use crate::findings::{PatternKind, Severity};

    #[test]
    fn modal_without_close_is_critical() {
        let found = issues(
            r#"<div id="settingsModal"></div>"#,
            "function openSettingsModal() {}",
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pattern, PatternKind::Modal);
        assert_eq!(found[0].element_id, "settingsModal");
        assert_eq!(found[0].missing_components, vec!["close function"]);
        assert_eq!(found[0].severity, Severity::Critical);
    }

    #[test]
    fn modal_without_open_is_a_warning() {
        let found = issues(
            r#"<div id="settings-modal"></div>"#,
            "function closeSettings() {}",
        );

        assert_eq!(found[0].missing_components, vec!["open function"]);
        assert_eq!(found[0].severity, Severity::Warning);
    }

    #[test]
    fn complete_modal_has_no_issue() {
        let found = issues(
            r#"<div id="settingsModal"></div>"#,
            "function openSettingsModal() {}\nfunction hideSettingsModal() {}",
        );

        assert!(found.is_empty());
    }

    #[test]
    fn script_query_and_close_control_satisfy_the_modal() {
        let found = issues(
            r#"<div id="helpDialog">
  <button id="helpDialogClose" onclick="this.closest('dialog').close()">x</button>
</div>"#,
            "const dlg = document.getElementById('helpDialog');",
        );

        assert!(found.is_empty());
    }

    #[test]
    fn handler_calling_generic_name_counts() {
        let found = issues(
            r#"<div id="loginModal"></div><button onclick="openModal('loginModal')">Log in</button>"#,
            "function closeModal() {}",
        );

        assert!(found.is_empty());
    }
}
