//! non-functional-elements check (W004): interactive elements with nothing wired to them.

use crate::analysis::{AnalysisContext, Check, CheckMetadata};
use crate::declare_check;
use crate::findings::{Finding, NonFunctionalElement};
use crate::model::InteractiveElementRecord;

declare_check!(
    NonFunctionalElements,
    id = "W004",
    name = "non-functional-elements",
    description = "Interactive elements without any event handler",
    category = NonFunctionalElements,
    examples = "<!-- Flagged -->\n<button id=\"save\">Save</button>\n\n<!-- Not flagged -->\n<button id=\"save\" onclick=\"save()\">Save</button>"
);

impl Check for NonFunctionalElements {
    fn metadata(&self) -> &CheckMetadata {
        &self.metadata
    }

    fn run(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding> {
        ctx.elements
            .interactive_elements()
            .iter()
            .filter(|el| !el.has_event_handler)
            .filter(|el| {
                !el.element_id
                    .as_deref()
                    .is_some_and(|id| ctx.wired_by_script(id))
            })
            .map(|el| {
                Finding::NonFunctionalElement(NonFunctionalElement {
                    element_id: el.element_id.clone(),
                    tag_name: el.tag_name.clone(),
                    html_line_number: el.line_number,
                    reason: reason(el),
                })
            })
            .collect()
    }
}

fn reason(element: &InteractiveElementRecord) -> String {
    if let Some(role) = &element.role {
        return format!("element with role=\"{}\" has no click handler", role);
    }
    match element.tag_name.as_str() {
        "button" => "button has no click handler".to_string(),
        "a" => "link has no click handler".to_string(),
        "input" => "input has no input or change handler".to_string(),
        "select" => "select has no change handler".to_string(),
        "textarea" => "textarea has no input handler".to_string(),
        other => format!("{} has no event handler", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalyzerOptions;
    use crate::model::{DomQueryRecord, ElementRegistry, FunctionRegistry, QueryMethod};

    fn element(id: Option<&str>, tag: &str, role: Option<&str>, wired: bool) -> InteractiveElementRecord {
        InteractiveElementRecord {
            element_id: id.map(str::to_string),
            tag_name: tag.to_string(),
            role: role.map(str::to_string),
            has_event_handler: wired,
            line_number: 1,
        }
    }

    fn run(
        elements: Vec<InteractiveElementRecord>,
        functions: FunctionRegistry,
        js_references_count_as_handlers: bool,
    ) -> Vec<NonFunctionalElement> {
        let mut builder = ElementRegistry::builder();
        builder.line_count(1);
        for el in elements {
            builder.interactive_element(el);
        }
        let elements = builder.build();
        let options = AnalyzerOptions {
            js_references_count_as_handlers,
            ..Default::default()
        };
        let ctx = AnalysisContext::new(&elements, &functions, &options);

        NonFunctionalElements::new()
            .run(&ctx)
            .into_iter()
            .filter_map(|f| match f {
                Finding::NonFunctionalElement(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn queried(id: &str) -> FunctionRegistry {
        let mut functions = FunctionRegistry::builder();
        functions.dom_query(DomQueryRecord {
            method: QueryMethod::GetById,
            selector: id.to_string(),
            file_path: "a.js".to_string(),
            line_number: 1,
            function_context: None,
        });
        functions.build()
    }

    #[test]
    fn button_without_handler_is_flagged() {
        let found = run(
            vec![element(Some("b1"), "button", None, false)],
            FunctionRegistry::default(),
            false,
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].element_id.as_deref(), Some("b1"));
        assert_eq!(found[0].tag_name, "button");
        assert!(found[0].reason.contains("no click handler"));
    }

    #[test]
    fn wired_elements_are_not_flagged() {
        let found = run(
            vec![element(Some("b1"), "button", None, true)],
            FunctionRegistry::default(),
            false,
        );

        assert!(found.is_empty());
    }

    #[test]
    fn reason_depends_on_tag_and_role() {
        let found = run(
            vec![
                element(None, "a", None, false),
                element(None, "input", None, false),
                element(None, "select", None, false),
                element(None, "textarea", None, false),
                element(None, "div", Some("tab"), false),
            ],
            FunctionRegistry::default(),
            false,
        );

        let reasons: Vec<_> = found.iter().map(|f| f.reason.as_str()).collect();
        assert_eq!(
            reasons,
            vec![
                "link has no click handler",
                "input has no input or change handler",
                "select has no change handler",
                "textarea has no input handler",
                "element with role=\"tab\" has no click handler",
            ]
        );
    }

    #[test]
    fn script_query_counts_only_when_enabled() {
        let elements = || vec![element(Some("save"), "button", None, false)];

        assert_eq!(run(elements(), queried("save"), false).len(), 1);
        assert!(run(elements(), queried("save"), true).is_empty());
    }
}
