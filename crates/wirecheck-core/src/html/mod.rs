//! HTML model builder.
//!
//! Streams the document through the html5ever tokenizer, which recovers from
//! malformed markup the way browsers do, and records ids, inline event
//! handlers, interactive elements and forms.

mod locator;
mod sink;

use std::path::Path;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{BufferQueue, Tokenizer, TokenizerOpts};
use tracing::{debug, info};

use crate::error::AuditError;
use crate::model::ElementRegistry;
use sink::ElementCollector;

/// Inline event-handler attributes that are recorded.
pub const EVENT_ATTRIBUTES: &[&str] = &[
    "onclick",
    "ondblclick",
    "onmousedown",
    "onmouseup",
    "onmouseover",
    "onmouseout",
    "onmousemove",
    "onkeydown",
    "onkeyup",
    "onkeypress",
    "onchange",
    "oninput",
    "onsubmit",
    "onfocus",
    "onblur",
    "onload",
    "onunload",
    "onresize",
    "onscroll",
    "oncontextmenu",
    "onwheel",
    "ontouchstart",
    "ontouchend",
    "ondrag",
    "ondrop",
];

/// `role` values that make any element interactive.
pub const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "tab", "menuitem", "checkbox", "switch", "option",
];

pub fn parse_document(source: &str) -> ElementRegistry {
    let mut queue = BufferQueue::new();
    queue.push_back(StrTendril::from_slice(source));

    let mut tokenizer = Tokenizer::new(ElementCollector::new(source), TokenizerOpts::default());
    let _ = tokenizer.feed(&mut queue);
    tokenizer.end();

    tokenizer.sink.finish()
}

pub fn load_document(path: &Path) -> Result<ElementRegistry, AuditError> {
    if !path.exists() {
        return Err(AuditError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_dir() {
        return Err(AuditError::InvalidArgument(format!(
            "'{}' is a directory, expected an HTML file",
            path.display()
        )));
    }

    let bytes = std::fs::read(path).map_err(|e| AuditError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let source = String::from_utf8_lossy(&bytes);

    let registry = parse_document(&source);
    for diagnostic in registry.diagnostics() {
        debug!(file = %path.display(), line = diagnostic.line_number, "{}", diagnostic.message);
    }
    info!(
        file = %path.display(),
        ids = registry.id_count(),
        handlers = registry.event_handlers().len(),
        interactive = registry.interactive_elements().len(),
        "html model built"
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_ids_handlers_and_lines() {
        let registry = parse_document(
            r#"<!DOCTYPE html>
<html>
<body>
  <div id="app">
    <button id="save" onclick="saveData(this)">Save</button>
  </div>
</body>
</html>
"#,
        );

        let ids: Vec<_> = registry.element_ids().collect();
        assert_eq!(ids, vec!["app", "save"]);

        let handler = &registry.event_handlers()[0];
        assert_eq!(handler.element_id.as_deref(), Some("save"));
        assert_eq!(handler.event_type, "onclick");
        assert_eq!(handler.function_call, "saveData(this)");
        assert_eq!(handler.line_number, 5);

        let button = &registry.interactive_elements()[0];
        assert_eq!(button.tag_name, "button");
        assert!(button.has_event_handler);
        assert_eq!(registry.line_count(), 8);
    }

    #[test]
    fn handler_without_id_is_recorded_with_null_element() {
        let registry = parse_document(r#"<div onclick="toggle()">x</div>"#);

        assert_eq!(registry.event_handlers()[0].element_id, None);
        assert!(registry.interactive_elements().is_empty());
    }

    #[test]
    fn attribute_names_are_case_insensitive() {
        let registry = parse_document(r#"<button ID="b" OnClick="go()">Go</button>"#);

        assert!(registry.contains_id("b"));
        assert_eq!(registry.event_handlers()[0].event_type, "onclick");
    }

    #[test]
    fn interactive_classification() {
        let registry = parse_document(
            r##"
<button id="plain">A</button>
<input id="name" type="text">
<input id="secret" type="hidden">
<select id="pick"></select>
<textarea id="notes"></textarea>
<a id="home" href="/home">Home</a>
<a id="fake" href="#">Menu</a>
<a id="anchor">No href</a>
<div id="custom" role="button">Custom</div>
<span id="deco">Text</span>
"##,
        );

        let tags: Vec<_> = registry
            .interactive_elements()
            .iter()
            .map(|e| e.element_id.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(
            tags,
            vec!["plain", "name", "pick", "notes", "home", "fake", "custom"]
        );
        assert_eq!(registry.interactive_elements()[4].tag_name, "a");
        assert_eq!(
            registry.interactive_elements()[6].role.as_deref(),
            Some("button")
        );
    }

    #[test]
    fn submit_controls_inside_form_are_not_candidates() {
        let registry = parse_document(
            r#"
<form id="login" onsubmit="doLogin(event)">
  <label for="user">User</label>
  <input id="user">
  <button type="submit">Go</button>
</form>
"#,
        );

        let ids: Vec<_> = registry
            .interactive_elements()
            .iter()
            .map(|e| e.tag_name.as_str())
            .collect();
        assert_eq!(ids, vec!["input"]);

        let form = &registry.forms()[0];
        assert_eq!(form.element_id.as_deref(), Some("login"));
        assert_eq!(form.label_targets, vec!["user"]);
        assert!(form.has_submit_control);
        assert_eq!(form.line_number, 2);
    }

    #[test]
    fn markup_inside_script_and_comments_is_ignored() {
        let registry = parse_document(
            r#"<script>
  const tpl = '<button id="ghost" onclick="nope()">';
</script>
<!-- <button id="commented"> -->
<style>.x { content: "<a href='#'>"; }</style>
<button id="real">Real</button>
"#,
        );

        let ids: Vec<_> = registry.element_ids().collect();
        assert_eq!(ids, vec!["real"]);
        assert!(registry.event_handlers().is_empty());
        assert_eq!(registry.interactive_elements()[0].line_number, 6);
    }

    #[test]
    fn duplicate_ids_are_kept_once_and_reported() {
        let registry = parse_document(
            "<div id=\"x\"></div>\n<span id=\"x\"></span>\n<p id=\"y\"></p>\n",
        );

        assert_eq!(registry.id_count(), 2);
        assert_eq!(registry.duplicate_ids()[0].element_id, "x");
        assert_eq!(registry.duplicate_ids()[0].line_numbers, vec![1, 2]);
    }

    #[test]
    fn malformed_markup_does_not_abort() {
        let registry = parse_document(
            "<div id=\"open\"\n<button id=\"b\" onclick=\"go()\">\n<p id=\"after\">text",
        );

        assert!(registry.contains_id("after"));
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn multi_line_tag_uses_opening_line() {
        let registry = parse_document(
            "<div>\n  <button\n    id=\"late\"\n    onclick=\"later()\"\n  >x</button>\n</div>\n",
        );

        assert_eq!(registry.event_handlers()[0].line_number, 2);
    }

    #[test]
    fn every_handler_line_is_within_the_document() {
        let registry = parse_document(
            "<a href=\"#\" onclick=\"a()\">a</a>\n<b onmouseover=\"b()\">\n<i onclick='c()'>",
        );

        for handler in registry.event_handlers() {
            assert!(handler.line_number >= 1);
            assert!(handler.line_number <= registry.line_count());
        }
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(&dir.path().join("index.html")).unwrap_err();

        assert!(matches!(err, AuditError::InputNotFound { .. }));
    }
}
