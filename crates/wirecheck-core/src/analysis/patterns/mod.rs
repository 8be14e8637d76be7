//! ui-patterns check (W005): composite widgets missing a collaborating part.
//!
//! Widgets are recognized from element ids. An id is split into words and
//! matched against the keyword lists in `[patterns]`; ids containing a
//! component marker (`modalClose`, `tabContent`) name a part of a widget
//! rather than the widget itself and are skipped. The first matching
//! pattern wins, in the order modal, tab, form, navigation.

mod forms;
mod modal;
mod navigation;
mod tabs;

use crate::analysis::helpers::{camel_case, id_words, pascal_case, strip_keyword};
use crate::analysis::{AnalysisContext, Check, CheckMetadata};
use crate::declare_check;
use crate::findings::{Finding, PatternIssue, PatternKind, Severity};

declare_check!(
    UiPatterns,
    id = "W005",
    name = "ui-patterns",
    description = "Modals, tabs, forms and navigation missing an expected part",
    category = PatternIssues,
    examples = "<!-- Flagged: nothing can close the modal -->\n<div id=\"settingsModal\"></div>\n<script>function openSettingsModal() {}</script>"
);

impl Check for UiPatterns {
    fn metadata(&self) -> &CheckMetadata {
        &self.metadata
    }

    fn run(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding> {
        if !ctx.options.patterns.enabled {
            return Vec::new();
        }

        ctx.elements
            .element_ids()
            .filter_map(|id| validate(ctx, id))
            .map(Finding::PatternIssue)
            .collect()
    }
}

fn validate(ctx: &AnalysisContext<'_>, id: &str) -> Option<PatternIssue> {
    let patterns = &ctx.options.patterns;
    let words = id_words(id);
    let is_component = matching_keyword(&words, &patterns.component_markers).is_some();

    if !is_component {
        if let Some(keyword) = matching_keyword(&words, &patterns.modal_keywords) {
            return modal::validate(ctx, id, keyword);
        }
        if let Some(keyword) = matching_keyword(&words, &patterns.tab_keywords) {
            return tabs::validate(ctx, id, keyword);
        }
    }

    let form_keyword = matching_keyword(&words, &patterns.form_keywords);
    if forms::is_form_element(ctx, id) || (!is_component && form_keyword.is_some()) {
        return forms::validate(ctx, id, form_keyword);
    }

    if !is_component && matching_keyword(&words, &patterns.navigation_keywords).is_some() {
        return navigation::validate(ctx, id);
    }
    None
}

/// First keyword equal to one of the id's words.
fn matching_keyword<'k>(words: &[String], keywords: &'k [String]) -> Option<&'k str> {
    keywords
        .iter()
        .find(|kw| words.iter().any(|w| w.eq_ignore_ascii_case(kw)))
        .map(String::as_str)
}

/// Conventional names derived from a widget id.
struct Names<'a> {
    id: &'a str,
    camel: String,
    pascal: String,
    base: Option<String>,
}

impl<'a> Names<'a> {
    fn new(id: &'a str, keyword: Option<&str>) -> Self {
        Self {
            id,
            camel: camel_case(id),
            pascal: pascal_case(id),
            base: keyword.and_then(|kw| strip_keyword(id, kw)),
        }
    }

    /// `{verb}{Id}` and `{verb}{Base}` for every verb, `{id}{Suffix}` for
    /// every suffix, then the generic names.
    fn functions(&self, verbs: &[&str], suffixes: &[&str], generic: &[&str]) -> Vec<String> {
        let base_pascal = self.base.as_deref().map(pascal_case);
        let mut names = Vec::new();
        for verb in verbs {
            names.push(format!("{}{}", verb, self.pascal));
            if let Some(base) = &base_pascal {
                names.push(format!("{}{}", verb, base));
            }
        }
        for suffix in suffixes {
            names.push(format!("{}{}", self.camel, suffix));
        }
        names.extend(generic.iter().map(|g| g.to_string()));
        names
    }
}

fn any_function_present(ctx: &AnalysisContext<'_>, candidates: &[String]) -> bool {
    candidates.iter().any(|name| ctx.function_present(name))
}

fn issue(pattern: PatternKind, id: &str, missing: Vec<(String, Severity)>) -> Option<PatternIssue> {
    let severity = missing.iter().map(|(_, severity)| *severity).max()?;
    Some(PatternIssue {
        pattern,
        element_id: id.to_string(),
        missing_components: missing.into_iter().map(|(component, _)| component).collect(),
        severity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalyzerOptions;
    use crate::html::parse_document;
    use crate::js::{merge, parse_source};
    use crate::model::{ElementRegistry, FunctionRegistry};

    pub(super) fn functions_from(source: &str) -> FunctionRegistry {
        merge([parse_source("app.js", source)]).registry
    }

    pub(super) fn issues_with(
        html: &str,
        js: &str,
        options: &AnalyzerOptions,
    ) -> Vec<PatternIssue> {
        let elements: ElementRegistry = parse_document(html);
        let functions = functions_from(js);
        let ctx = AnalysisContext::new(&elements, &functions, options);

        UiPatterns::new()
            .run(&ctx)
            .into_iter()
            .filter_map(|f| match f {
                Finding::PatternIssue(issue) => Some(issue),
                _ => None,
            })
            .collect()
    }

    pub(super) fn issues(html: &str, js: &str) -> Vec<PatternIssue> {
        issues_with(html, js, &AnalyzerOptions::default())
    }

    #[test]
    fn component_ids_are_not_widgets() {
        let found = issues(
            r#"<div id="modalClose"></div><div id="tabContent"></div><ul id="navList"></ul>"#,
            "",
        );

        assert!(found.is_empty());
    }

    #[test]
    fn keywords_match_whole_words() {
        let found = issues(r#"<table id="table"></table><div id="dialogue"></div>"#, "");

        assert!(found.is_empty());
    }

    #[test]
    fn disabled_patterns_produce_nothing() {
        let mut options = AnalyzerOptions::default();
        options.patterns.enabled = false;

        let found = issues_with(r#"<div id="settingsModal"></div>"#, "", &options);
        assert!(found.is_empty());
    }

    #[test]
    fn keywords_are_configurable() {
        let mut options = AnalyzerOptions::default();
        options.patterns.modal_keywords = vec!["popup".to_string()];

        let found = issues_with(
            r#"<div id="promoPopup"></div><div id="settingsModal"></div>"#,
            "",
            &options,
        );
        let ids: Vec<_> = found.iter().map(|i| i.element_id.as_str()).collect();
        assert_eq!(ids, vec!["promoPopup"]);
    }

    #[test]
    fn names_cover_id_base_and_generic_forms() {
        let names = Names::new("settingsModal", Some("modal"));

        let functions = names.functions(&["open"], &["Open"], &["openModal"]);
        assert_eq!(
            functions,
            vec!["openSettingsModal", "openSettings", "settingsModalOpen", "openModal"]
        );
    }
}
