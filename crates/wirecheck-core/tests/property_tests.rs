//! Model invariants and the reference scenarios, checked through the public API.

use std::collections::HashSet;
use std::path::Path;

use insta::assert_json_snapshot;
use wirecheck_core::html::parse_document;
use wirecheck_core::js::{merge, parse_source};
use wirecheck_core::{Audit, Findings, FunctionRegistry, analyze};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn functions(files: &[(&str, &str)]) -> FunctionRegistry {
    merge(files.iter().map(|(path, src)| parse_source(path, src))).registry
}

fn run(html: &str, files: &[(&str, &str)]) -> Findings {
    analyze(&parse_document(html), &functions(files)).unwrap()
}

const DOCUMENTS: &[&str] = &[
    "",
    "<div id=\"a\"></div><div id=\"a\"></div><span id=\"b\">",
    "<button\n  id=\"multi\"\n  onclick=\"go()\"\n>Go</button>\n",
    "<p>unclosed <b id=\"x\" onclick='f()'>\n<script>var s = '<div id=\"fake\" onclick=\"no()\">';</script>\n",
    "<<<>>> <div id= onclick=\"g()\"\n<form id=\"f\" onsubmit=\"return h(event)\">",
    "<a href=\"#\" onmouseover=\"hover()\">\n\n\n<input id=\"q\" oninput=\"search()\" onchange=\"search()\">",
];

#[test]
fn element_ids_are_unique() {
    for source in DOCUMENTS {
        let registry = parse_document(source);

        let ids: Vec<&str> = registry.element_ids().collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len(), "duplicate id in set for {:?}", source);
    }
}

#[test]
fn handler_lines_are_within_the_document() {
    for source in DOCUMENTS {
        let registry = parse_document(source);

        for handler in registry.event_handlers() {
            assert!(
                handler.line_number >= 1 && handler.line_number <= registry.line_count(),
                "line {} outside 1..={} for {:?}",
                handler.line_number,
                registry.line_count(),
                source
            );
        }
    }
}

#[test]
fn script_contents_are_not_elements() {
    let registry = parse_document(DOCUMENTS[3]);

    assert!(!registry.contains_id("fake"));
    assert!(registry.event_handlers().iter().all(|h| h.function_call != "no()"));
}

#[test]
fn call_counts_never_drop_as_files_are_added() {
    let files = [
        ("a.js", "function render() { update(); }\nfunction update() {}\n"),
        ("b.js", "update();\nrender();\nnew Widget();\n"),
        ("c.js", "function update() { render(); }\nbutton.onclick = update;\n"),
        ("d.js", "class Widget { draw() { update(); } }\n"),
    ];
    let names = ["render", "update", "Widget"];

    let mut previous = vec![0; names.len()];
    for end in 1..=files.len() {
        let registry = functions(&files[..end]);
        let counts: Vec<usize> = names.iter().map(|n| registry.call_count(n)).collect();

        for (i, name) in names.iter().enumerate() {
            assert!(
                counts[i] >= previous[i],
                "call count of {} dropped from {} to {} after {} files",
                name,
                previous[i],
                counts[i],
                end
            );
        }
        previous = counts;
    }
    assert!(previous.iter().all(|&n| n > 0));
}

#[test]
fn repeated_audits_serialize_identically() {
    let root = Path::new(FIXTURES_DIR).join("dashboard");
    let audit = Audit::new(root.join("index.html"), root.join("js"));

    let first = serde_json::to_string(&audit.run().unwrap()).unwrap();
    let second = serde_json::to_string(&audit.run().unwrap()).unwrap();

    assert_eq!(first, second);
}

#[test]
fn onclick_reference_keeps_function_used() {
    let findings = run(
        r#"<button id="go" onclick="f()">Go</button>"#,
        &[("app.js", "function f() {}\n")],
    );

    assert!(findings.unused_functions.is_empty());
}

#[test]
fn onclick_reference_to_builtin_named_function_keeps_it_used() {
    let findings = run(
        r#"<button id="x" onclick="close()">Close</button>"#,
        &[("dialog.js", "function close() {\n  document.getElementById('x').hidden = true;\n}\n")],
    );

    assert!(findings.unused_functions.is_empty());
    assert!(findings.broken_handlers.is_empty());
}

#[test]
fn function_stored_in_a_value_is_not_unused() {
    let findings = run(
        "<div></div>",
        &[(
            "app.js",
            "function greet() {}\nconst fns = [greet];\nfns[0]();\nconst pick = ok ? show : hide;\nfunction show() {}\nfunction hide() {}\n",
        )],
    );

    assert!(findings.unused_functions.is_empty(), "{:?}", findings.unused_functions);
}

#[test]
fn exported_function_is_never_unused() {
    let findings = run("<div></div>", &[("lib.js", "export function g() {}\n")]);

    assert!(findings.unused_functions.is_empty());
}

#[test]
fn button_without_handler_is_non_functional() {
    let findings = run(r#"<button id="b1">Click</button>"#, &[]);

    assert_eq!(findings.non_functional_elements.len(), 1);
    let element = &findings.non_functional_elements[0];
    assert_eq!(element.element_id.as_deref(), Some("b1"));
    assert_eq!(element.tag_name, "button");
    assert!(element.reason.contains("no click handler"));
}

#[test]
fn lookup_of_missing_id_orphans_the_function() {
    let findings = run(
        "<div id=\"present\"></div>",
        &[("app.js", "function f() {\n  document.getElementById('missingX');\n}\n")],
    );

    assert_eq!(findings.orphaned_functions.len(), 1);
    let orphan = &findings.orphaned_functions[0];
    assert_eq!(orphan.function_name, "f");
    assert_eq!(orphan.missing_element_id, "missingX");
    assert_eq!(orphan.query_method.as_str(), "getElementById");
}

#[test]
fn handler_without_definition_is_broken() {
    let findings = run(r#"<div onclick="doStuff()">Go</div>"#, &[]);

    assert_eq!(findings.broken_handlers.len(), 1);
    assert_eq!(findings.broken_handlers[0].event_type, "onclick");
    assert_eq!(findings.broken_handlers[0].missing_function, "doStuff");
}

#[test]
fn colliding_definitions_share_one_call() {
    let findings = run(
        "<div></div>",
        &[
            ("a.js", "function helper() {}\n"),
            ("b.js", "function helper() {}\n"),
            ("c.js", "helper();\n"),
        ],
    );

    assert!(findings.unused_functions.is_empty());
}

#[test]
fn findings_snapshot() {
    let findings = run(
        "<div onclick=\"doStuff()\">Go</div>\n<button id=\"b1\">B</button>\n",
        &[("app.js", "function f() {\n  document.getElementById('missingX');\n}\n")],
    );

    assert_json_snapshot!(findings, @r###"
    {
      "orphanedFunctions": [
        {
          "functionName": "f",
          "filePath": "app.js",
          "lineNumber": 2,
          "missingElementId": "missingX",
          "queryMethod": "getElementById"
        }
      ],
      "brokenHandlers": [
        {
          "elementId": null,
          "eventType": "onclick",
          "missingFunction": "doStuff",
          "htmlLineNumber": 1
        }
      ],
      "unusedFunctions": [
        {
          "functionName": "f",
          "filePath": "app.js",
          "lineNumber": 1,
          "callCount": 0
        }
      ],
      "nonFunctionalElements": [
        {
          "elementId": "b1",
          "tagName": "button",
          "htmlLineNumber": 2,
          "reason": "button has no click handler"
        }
      ],
      "patternIssues": []
    }
    "###);
}
