//! Data model shared by the HTML and JavaScript builders and the analyzer.
//!
//! Both registries are write-once: a builder accumulates records during a
//! parse pass and `build()` hands out an immutable registry that the analyzer
//! only reads.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::AuditError;

/// Selector recorded for DOM queries whose argument is not a literal string.
pub const DYNAMIC_SELECTOR: &str = "<dynamic>";

/// Context name used for code that is not inside any named function.
pub const GLOBAL_CONTEXT: &str = "global";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHandlerRecord {
    pub element_id: Option<String>,
    pub event_type: String,
    pub function_call: String,
    pub line_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveElementRecord {
    pub element_id: Option<String>,
    pub tag_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub has_event_handler: bool,
    pub line_number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateIdRecord {
    pub element_id: String,
    pub line_numbers: Vec<usize>,
}

/// A `<form>` element and the parts of it the pattern validator looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    pub element_id: Option<String>,
    pub line_number: usize,
    /// `for` attributes of the labels nested in the form, in document order.
    pub label_targets: Vec<String>,
    pub has_submit_control: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlDiagnostic {
    pub line_number: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementRegistry {
    element_ids: Vec<String>,
    id_index: HashSet<String>,
    event_handlers: Vec<EventHandlerRecord>,
    interactive_elements: Vec<InteractiveElementRecord>,
    duplicate_ids: Vec<DuplicateIdRecord>,
    forms: Vec<FormRecord>,
    diagnostics: Vec<HtmlDiagnostic>,
    line_count: usize,
}

impl ElementRegistry {
    pub fn builder() -> ElementRegistryBuilder {
        ElementRegistryBuilder::default()
    }

    /// Unique element ids in the order they first appear in the document.
    pub fn element_ids(&self) -> impl Iterator<Item = &str> {
        self.element_ids.iter().map(String::as_str)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.id_index.contains(id)
    }

    pub fn id_count(&self) -> usize {
        self.element_ids.len()
    }

    pub fn event_handlers(&self) -> &[EventHandlerRecord] {
        &self.event_handlers
    }

    pub fn interactive_elements(&self) -> &[InteractiveElementRecord] {
        &self.interactive_elements
    }

    pub fn duplicate_ids(&self) -> &[DuplicateIdRecord] {
        &self.duplicate_ids
    }

    pub fn forms(&self) -> &[FormRecord] {
        &self.forms
    }

    pub fn diagnostics(&self) -> &[HtmlDiagnostic] {
        &self.diagnostics
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn handlers_for(&self, element_id: &str) -> impl Iterator<Item = &EventHandlerRecord> {
        self.event_handlers
            .iter()
            .filter(move |h| h.element_id.as_deref() == Some(element_id))
    }

    /// Checks the invariants the analyzer relies on.
    pub fn validate(&self) -> Result<(), AuditError> {
        for handler in &self.event_handlers {
            if handler.event_type.trim().is_empty() {
                return Err(AuditError::InvalidArgument(format!(
                    "event handler on line {} has an empty event type",
                    handler.line_number
                )));
            }
            self.validate_line(handler.line_number, "event handler")?;
        }

        for element in &self.interactive_elements {
            if element.tag_name.is_empty() {
                return Err(AuditError::InvalidArgument(format!(
                    "interactive element on line {} has no tag name",
                    element.line_number
                )));
            }
            self.validate_line(element.line_number, "interactive element")?;
        }

        Ok(())
    }

    fn validate_line(&self, line: usize, what: &str) -> Result<(), AuditError> {
        if line == 0 || (self.line_count > 0 && line > self.line_count) {
            return Err(AuditError::InvalidArgument(format!(
                "{} line {} is outside the document (1..={})",
                what, line, self.line_count
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ElementRegistryBuilder {
    registry: ElementRegistry,
    first_seen: HashMap<String, usize>,
}

impl ElementRegistryBuilder {
    /// Records an element id. Repeated ids are kept once and reported as duplicates.
    pub fn element_id(&mut self, id: &str, line_number: usize) -> &mut Self {
        let id = id.trim();
        if id.is_empty() {
            return self;
        }

        if let Some(&first_line) = self.first_seen.get(id) {
            let duplicates = &mut self.registry.duplicate_ids;
            match duplicates.iter_mut().find(|d| d.element_id == id) {
                Some(record) => record.line_numbers.push(line_number),
                None => duplicates.push(DuplicateIdRecord {
                    element_id: id.to_string(),
                    line_numbers: vec![first_line, line_number],
                }),
            }
            return self;
        }

        self.first_seen.insert(id.to_string(), line_number);
        self.registry.element_ids.push(id.to_string());
        self.registry.id_index.insert(id.to_string());
        self
    }

    pub fn event_handler(&mut self, record: EventHandlerRecord) -> &mut Self {
        self.registry.event_handlers.push(record);
        self
    }

    pub fn interactive_element(&mut self, record: InteractiveElementRecord) -> &mut Self {
        self.registry.interactive_elements.push(record);
        self
    }

    pub fn form(&mut self, record: FormRecord) -> &mut Self {
        self.registry.forms.push(record);
        self
    }

    pub fn diagnostic(&mut self, line_number: usize, message: impl Into<String>) -> &mut Self {
        self.registry.diagnostics.push(HtmlDiagnostic {
            line_number,
            message: message.into(),
        });
        self
    }

    pub fn line_count(&mut self, line_count: usize) -> &mut Self {
        self.registry.line_count = line_count;
        self
    }

    pub fn build(self) -> ElementRegistry {
        self.registry
    }
}

/// How a function definition was written. Drives fix safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FunctionKind {
    Declaration,
    Expression,
    Arrow,
    ClassMethod,
    ClassProperty,
    ObjectMethod,
}

impl FunctionKind {
    /// Definitions that live as a standalone statement and can be cut out whole.
    pub fn is_standalone(&self) -> bool {
        matches!(
            self,
            FunctionKind::Declaration | FunctionKind::Expression | FunctionKind::Arrow
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDef {
    pub name: String,
    pub file_path: String,
    pub line_number: usize,
    pub is_exported: bool,
    pub kind: FunctionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryMethod {
    GetById,
    QuerySelector,
    QuerySelectorAll,
    Other(String),
}

impl QueryMethod {
    /// DOM methods recorded as queries. The last three are never checked.
    pub const KNOWN: &'static [&'static str] = &[
        "getElementById",
        "querySelector",
        "querySelectorAll",
        "getElementsByClassName",
        "getElementsByTagName",
        "getElementsByName",
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "getElementById" => Some(QueryMethod::GetById),
            "querySelector" => Some(QueryMethod::QuerySelector),
            "querySelectorAll" => Some(QueryMethod::QuerySelectorAll),
            other if Self::KNOWN.contains(&other) => Some(QueryMethod::Other(other.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            QueryMethod::GetById => "getElementById",
            QueryMethod::QuerySelector => "querySelector",
            QueryMethod::QuerySelectorAll => "querySelectorAll",
            QueryMethod::Other(name) => name,
        }
    }
}

impl Serialize for QueryMethod {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl std::fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomQueryRecord {
    pub method: QueryMethod,
    pub selector: String,
    pub file_path: String,
    pub line_number: usize,
    pub function_context: Option<String>,
}

impl DomQueryRecord {
    pub fn is_dynamic(&self) -> bool {
        self.selector == DYNAMIC_SELECTOR
    }

    /// The element id this query targets, if it is an id-style query with a literal selector.
    pub fn target_id(&self) -> Option<&str> {
        if self.is_dynamic() {
            return None;
        }
        match &self.method {
            QueryMethod::GetById => {
                let id = self.selector.trim();
                (!id.is_empty()).then_some(id)
            }
            QueryMethod::QuerySelector | QueryMethod::QuerySelectorAll => {
                id_selector(&self.selector)
            }
            QueryMethod::Other(_) => None,
        }
    }

    pub fn context_name(&self) -> &str {
        self.function_context.as_deref().unwrap_or(GLOBAL_CONTEXT)
    }
}

/// Returns the id of a selector made of exactly one `#id` simple selector.
pub fn id_selector(selector: &str) -> Option<&str> {
    let id = selector.trim().strip_prefix('#')?;
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    valid.then_some(id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CallKind {
    Call,
    Construct,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSiteRecord {
    pub file_path: String,
    pub line_number: usize,
    pub context: Option<String>,
    pub kind: CallKind,
    /// True for calls written through a global object, e.g. `window.save()`.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub via_global: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionRegistry {
    definitions: Vec<FunctionDef>,
    names: Vec<String>,
    latest: HashMap<String, usize>,
    dom_queries: Vec<DomQueryRecord>,
    call_sites: HashMap<String, Vec<CallSiteRecord>>,
}

impl FunctionRegistry {
    pub fn builder() -> FunctionRegistryBuilder {
        FunctionRegistryBuilder::default()
    }

    /// One definition per name, in first-seen order; a later definition of
    /// the same name replaces the earlier one.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.names
            .iter()
            .filter_map(|name| self.latest.get(name).map(|&i| &self.definitions[i]))
    }

    /// Every definition seen, including the ones shadowed by a same-named one.
    pub fn all_definitions(&self) -> &[FunctionDef] {
        &self.definitions
    }

    pub fn definitions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FunctionDef> {
        self.definitions.iter().filter(move |d| d.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.latest.get(name).map(|&i| &self.definitions[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.latest.contains_key(name)
    }

    pub fn function_count(&self) -> usize {
        self.names.len()
    }

    pub fn dom_queries(&self) -> &[DomQueryRecord] {
        &self.dom_queries
    }

    pub fn call_sites(&self, name: &str) -> &[CallSiteRecord] {
        self.call_sites.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.call_sites(name).len()
    }

    /// Whether any JavaScript query targets the element id.
    pub fn queries_element(&self, element_id: &str) -> bool {
        self.dom_queries
            .iter()
            .any(|q| q.target_id() == Some(element_id))
    }

    pub fn validate(&self) -> Result<(), AuditError> {
        if self.latest.len() != self.names.len() {
            return Err(AuditError::InvalidArgument(format!(
                "function index holds {} names but {} are listed",
                self.latest.len(),
                self.names.len()
            )));
        }

        for (name, &index) in &self.latest {
            match self.definitions.get(index) {
                Some(def) if def.name == *name => {}
                _ => {
                    return Err(AuditError::InvalidArgument(format!(
                        "function index entry '{}' does not point at its definition",
                        name
                    )));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FunctionRegistryBuilder {
    registry: FunctionRegistry,
}

impl FunctionRegistryBuilder {
    pub fn define(&mut self, def: FunctionDef) -> &mut Self {
        let registry = &mut self.registry;
        let index = registry.definitions.len();
        if registry.latest.insert(def.name.clone(), index).is_none() {
            registry.names.push(def.name.clone());
        }
        registry.definitions.push(def);
        self
    }

    pub fn dom_query(&mut self, record: DomQueryRecord) -> &mut Self {
        self.registry.dom_queries.push(record);
        self
    }

    pub fn call_site(&mut self, name: impl Into<String>, record: CallSiteRecord) -> &mut Self {
        self.registry
            .call_sites
            .entry(name.into())
            .or_default()
            .push(record);
        self
    }

    pub fn build(self) -> FunctionRegistry {
        self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(name: &str, file: &str, line: usize) -> FunctionDef {
        FunctionDef {
            name: name.to_string(),
            file_path: file.to_string(),
            line_number: line,
            is_exported: false,
            kind: FunctionKind::Declaration,
        }
    }

    fn query(method: QueryMethod, selector: &str) -> DomQueryRecord {
        DomQueryRecord {
            method,
            selector: selector.to_string(),
            file_path: "app.js".to_string(),
            line_number: 1,
            function_context: None,
        }
    }

    #[test]
    fn element_ids_keep_first_occurrence_order() {
        let mut builder = ElementRegistry::builder();
        builder.element_id("b", 1).element_id("a", 2).element_id("b", 5);
        let registry = builder.build();

        let ids: Vec<_> = registry.element_ids().collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(registry.contains_id("a"));
        assert_eq!(registry.id_count(), 2);
    }

    #[test]
    fn repeated_ids_are_reported_with_every_line() {
        let mut builder = ElementRegistry::builder();
        builder
            .element_id("save", 3)
            .element_id("save", 8)
            .element_id("save", 12);
        let registry = builder.build();

        assert_eq!(registry.duplicate_ids().len(), 1);
        assert_eq!(registry.duplicate_ids()[0].line_numbers, vec![3, 8, 12]);
    }

    #[test]
    fn blank_ids_are_ignored() {
        let mut builder = ElementRegistry::builder();
        builder.element_id("   ", 1);
        assert_eq!(builder.build().id_count(), 0);
    }

    #[test]
    fn later_definition_wins_but_keeps_position() {
        let mut builder = FunctionRegistry::builder();
        builder
            .define(def("helper", "a.js", 1))
            .define(def("init", "a.js", 5))
            .define(def("helper", "b.js", 9));
        let registry = builder.build();

        let names: Vec<_> = registry.functions().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["helper", "init"]);
        assert_eq!(registry.get("helper").unwrap().file_path, "b.js");
        assert_eq!(registry.all_definitions().len(), 3);
        assert_eq!(registry.definitions_named("helper").count(), 2);
    }

    #[test]
    fn call_sites_accumulate_per_name() {
        let mut builder = FunctionRegistry::builder();
        for line in [1, 2] {
            builder.call_site(
                "render",
                CallSiteRecord {
                    file_path: "a.js".to_string(),
                    line_number: line,
                    context: None,
                    kind: CallKind::Call,
                    via_global: false,
                },
            );
        }
        let registry = builder.build();

        assert_eq!(registry.call_count("render"), 2);
        assert_eq!(registry.call_count("missing"), 0);
    }

    #[test]
    fn target_id_for_id_style_queries() {
        assert_eq!(query(QueryMethod::GetById, "menu").target_id(), Some("menu"));
        assert_eq!(
            query(QueryMethod::QuerySelector, "#menu").target_id(),
            Some("menu")
        );
        assert_eq!(
            query(QueryMethod::QuerySelectorAll, "#menu-item_2").target_id(),
            Some("menu-item_2")
        );
        assert_eq!(query(QueryMethod::QuerySelector, ".menu").target_id(), None);
        assert_eq!(
            query(QueryMethod::QuerySelector, "#menu .item").target_id(),
            None
        );
        assert_eq!(
            query(QueryMethod::GetById, DYNAMIC_SELECTOR).target_id(),
            None
        );
        assert_eq!(
            query(
                QueryMethod::Other("getElementsByClassName".into()),
                "menu"
            )
            .target_id(),
            None
        );
    }

    #[test]
    fn query_method_round_trips_known_names() {
        for name in QueryMethod::KNOWN {
            let method = QueryMethod::from_name(name).unwrap();
            assert_eq!(method.as_str(), *name);
        }
        assert_eq!(QueryMethod::from_name("createElement"), None);
    }

    #[test]
    fn validate_rejects_handler_outside_document() {
        let mut builder = ElementRegistry::builder();
        builder.line_count(3).event_handler(EventHandlerRecord {
            element_id: None,
            event_type: "onclick".to_string(),
            function_call: "go()".to_string(),
            line_number: 7,
        });

        let err = builder.build().validate().unwrap_err();
        assert!(matches!(err, AuditError::InvalidArgument(_)));
    }

    #[test]
    fn validate_accepts_built_function_registry() {
        let mut builder = FunctionRegistry::builder();
        builder.define(def("a", "a.js", 1)).define(def("a", "b.js", 1));
        assert!(builder.build().validate().is_ok());
    }
}
