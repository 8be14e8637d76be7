//! Cross-reference analysis between the HTML and JavaScript models.
//!
//! Each finding category is produced by a registered [`Check`]. The analyzer
//! runs every enabled check over the two read-only registries and collects
//! their output into one [`Findings`] bundle.

pub mod broken_handlers;
pub mod duplicate_ids;
pub mod helpers;
pub mod non_functional_elements;
pub mod orphaned_functions;
pub mod patterns;
pub mod unused_functions;

use std::collections::HashSet;

use tracing::debug;

use crate::config::{ChecksConfig, Config, PatternConfig, ResolutionMode};
use crate::error::AuditError;
use crate::findings::{Finding, FindingCategory, Findings};
use crate::model::{ElementRegistry, EventHandlerRecord, FunctionRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: FindingCategory,
    pub examples: Option<&'static str>,
}

pub trait Check: Send + Sync {
    fn metadata(&self) -> &CheckMetadata;
    fn run(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzerOptions {
    pub resolution: ResolutionMode,
    pub js_references_count_as_handlers: bool,
    pub patterns: PatternConfig,
}

impl AnalyzerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            resolution: config.checks.resolution,
            js_references_count_as_handlers: config.checks.js_references_count_as_handlers,
            patterns: config.patterns.clone(),
        }
    }
}

/// What every check sees: both registries plus lookups derived from them.
pub struct AnalysisContext<'a> {
    pub elements: &'a ElementRegistry,
    pub functions: &'a FunctionRegistry,
    pub options: &'a AnalyzerOptions,
    html_references: HashSet<&'a str>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        elements: &'a ElementRegistry,
        functions: &'a FunctionRegistry,
        options: &'a AnalyzerOptions,
    ) -> Self {
        let html_references = elements
            .event_handlers()
            .iter()
            .filter_map(|record| handler_function(record, functions))
            .collect();

        Self {
            elements,
            functions,
            options,
            html_references,
        }
    }

    /// Whether an inline handler attribute calls `name`.
    pub fn is_referenced_by_html(&self, name: &str) -> bool {
        self.html_references.contains(name)
    }

    /// Whether `name` is defined in JavaScript or called from markup.
    pub fn function_present(&self, name: &str) -> bool {
        self.functions.contains(name) || self.is_referenced_by_html(name)
    }

    pub fn element_has_handler(&self, element_id: &str) -> bool {
        self.elements.handlers_for(element_id).next().is_some()
    }

    /// Whether script queries the element and that is configured to count as wiring.
    pub fn wired_by_script(&self, element_id: &str) -> bool {
        self.options.js_references_count_as_handlers && self.functions.queries_element(element_id)
    }
}

/// Function name an event-handler record resolves to.
///
/// A builtin name like `close` only counts when a script defines it.
pub fn handler_function<'r>(
    record: &'r EventHandlerRecord,
    functions: &FunctionRegistry,
) -> Option<&'r str> {
    helpers::handler_callees(&record.function_call)
        .find(|name| functions.contains(name) || !helpers::is_builtin_callee(name))
}

pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
    disabled_checks: HashSet<String>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            disabled_checks: HashSet::new(),
        }
    }

    pub fn with_default_checks() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(orphaned_functions::OrphanedFunctions::new()));
        registry.register(Box::new(broken_handlers::BrokenHandlers::new()));
        registry.register(Box::new(unused_functions::UnusedFunctions::new()));
        registry.register(Box::new(non_functional_elements::NonFunctionalElements::new()));
        registry.register(Box::new(patterns::UiPatterns::new()));
        registry.register(Box::new(duplicate_ids::DuplicateIds::new()));
        registry
    }

    pub fn register(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    pub fn configure(&mut self, config: &ChecksConfig) {
        self.disabled_checks.clear();
        for check_ref in &config.disabled {
            self.disabled_checks.insert(check_ref.clone());
        }
    }

    pub fn checks(&self) -> impl Iterator<Item = &dyn Check> {
        self.checks.iter().map(|c| c.as_ref())
    }

    pub fn run_all(&self, ctx: &AnalysisContext<'_>) -> Findings {
        let mut findings = Findings::default();
        for check in self.checks.iter().filter(|c| self.should_run(c.as_ref())) {
            let produced = check.run(ctx);
            debug!(check = check.metadata().id, count = produced.len(), "check finished");
            findings.extend(produced);
        }
        findings
    }

    fn should_run(&self, check: &dyn Check) -> bool {
        let metadata = check.metadata();
        !(self.disabled_checks.contains(metadata.id) || self.disabled_checks.contains(metadata.name))
    }

    pub fn is_check_enabled(&self, id_or_name: &str) -> bool {
        self.get_check(id_or_name)
            .or_else(|| self.get_check_by_name(id_or_name))
            .is_some_and(|check| self.should_run(check))
    }

    pub fn get_check(&self, id: &str) -> Option<&dyn Check> {
        self.checks
            .iter()
            .find(|c| c.metadata().id == id)
            .map(|c| c.as_ref())
    }

    pub fn get_check_by_name(&self, name: &str) -> Option<&dyn Check> {
        self.checks
            .iter()
            .find(|c| c.metadata().name == name)
            .map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Analyzer {
    registry: CheckRegistry,
    options: AnalyzerOptions,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            registry: CheckRegistry::with_default_checks(),
            options: AnalyzerOptions::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut registry = CheckRegistry::with_default_checks();
        registry.configure(&config.checks);
        Self {
            registry,
            options: AnalyzerOptions::from_config(config),
        }
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Runs every enabled check. Fails only when a registry breaks its own invariants.
    pub fn analyze(
        &self,
        elements: &ElementRegistry,
        functions: &FunctionRegistry,
    ) -> Result<Findings, AuditError> {
        elements.validate()?;
        functions.validate()?;

        let ctx = AnalysisContext::new(elements, functions, &self.options);
        Ok(self.registry.run_all(&ctx))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Analyzes the two models with every check enabled and default options.
pub fn analyze(
    elements: &ElementRegistry,
    functions: &FunctionRegistry,
) -> Result<Findings, AuditError> {
    Analyzer::new().analyze(elements, functions)
}

#[macro_export]
macro_rules! declare_check {
    (
        $name:ident,
        id = $id:literal,
        name = $check_name:literal,
        description = $desc:literal,
        category = $cat:ident
        $(, examples = $examples:literal)?
    ) => {
        pub struct $name {
            metadata: $crate::analysis::CheckMetadata,
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    metadata: $crate::analysis::CheckMetadata {
                        id: $id,
                        name: $check_name,
                        description: $desc,
                        category: $crate::findings::FindingCategory::$cat,
                        examples: declare_check!(@examples $($examples)?),
                    },
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
    (@examples $examples:literal) => { Some($examples) };
    (@examples) => { None };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::{BrokenHandler, UnusedFunction};
    use crate::model::{CallKind, CallSiteRecord, FunctionDef, FunctionKind};

    struct TestCheck {
        metadata: CheckMetadata,
        produce: usize,
    }

    impl TestCheck {
        fn new(id: &'static str, name: &'static str, produce: usize) -> Self {
            Self {
                metadata: CheckMetadata {
                    id,
                    name,
                    description: "A test check",
                    category: FindingCategory::BrokenHandlers,
                    examples: None,
                },
                produce,
            }
        }
    }

    impl Check for TestCheck {
        fn metadata(&self) -> &CheckMetadata {
            &self.metadata
        }

        fn run(&self, _ctx: &AnalysisContext<'_>) -> Vec<Finding> {
            (0..self.produce)
                .map(|i| {
                    Finding::BrokenHandler(BrokenHandler {
                        element_id: None,
                        event_type: "onclick".to_string(),
                        missing_function: format!("f{}", i),
                        html_line_number: 1,
                    })
                })
                .collect()
        }
    }

    fn handler(call: &str) -> EventHandlerRecord {
        EventHandlerRecord {
            element_id: Some("b".to_string()),
            event_type: "onclick".to_string(),
            function_call: call.to_string(),
            line_number: 1,
        }
    }

    #[test]
    fn default_registry_holds_every_check() {
        let registry = CheckRegistry::with_default_checks();

        let ids: Vec<_> = registry.checks().map(|c| c.metadata().id).collect();
        assert_eq!(ids, vec!["W001", "W002", "W003", "W004", "W005", "W006"]);
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn disabled_checks_by_id_or_name_do_not_run() {
        let mut registry = CheckRegistry::new();
        registry.register(Box::new(TestCheck::new("T001", "first", 2)));
        registry.register(Box::new(TestCheck::new("T002", "second", 3)));
        registry.configure(&ChecksConfig {
            disabled: vec!["second".to_string()],
            ..Default::default()
        });

        let elements = ElementRegistry::default();
        let functions = FunctionRegistry::default();
        let options = AnalyzerOptions::default();
        let ctx = AnalysisContext::new(&elements, &functions, &options);

        assert_eq!(registry.run_all(&ctx).broken_handlers.len(), 2);
        assert!(registry.is_check_enabled("T001"));
        assert!(!registry.is_check_enabled("T002"));
        assert!(!registry.is_check_enabled("unknown"));
    }

    #[test]
    fn get_check_by_id_and_name() {
        let registry = CheckRegistry::with_default_checks();

        assert_eq!(
            registry.get_check("W003").unwrap().metadata().name,
            "unused-functions"
        );
        assert_eq!(
            registry.get_check_by_name("duplicate-ids").unwrap().metadata().id,
            "W006"
        );
        assert!(registry.get_check("W999").is_none());
    }

    #[test]
    fn context_collects_html_references() {
        let mut builder = ElementRegistry::builder();
        builder
            .line_count(1)
            .event_handler(handler("openMenu(this)"))
            .event_handler(handler("this.blur()"));
        let elements = builder.build();
        let functions = FunctionRegistry::default();
        let options = AnalyzerOptions::default();

        let ctx = AnalysisContext::new(&elements, &functions, &options);

        assert!(ctx.is_referenced_by_html("openMenu"));
        assert!(!ctx.is_referenced_by_html("blur"));
        assert!(ctx.element_has_handler("b"));
    }

    #[test]
    fn analyze_rejects_invalid_models() {
        let mut builder = ElementRegistry::builder();
        builder.line_count(1).event_handler(EventHandlerRecord {
            line_number: 0,
            ..handler("go()")
        });

        let err = analyze(&builder.build(), &FunctionRegistry::default()).unwrap_err();
        assert!(matches!(err, AuditError::InvalidArgument(_)));
    }

    #[test]
    fn analyzer_from_config_honors_disabled_checks() {
        let mut config = Config::default();
        config.checks.disabled = vec!["W003".to_string()];

        let mut functions = FunctionRegistry::builder();
        functions.define(FunctionDef {
            name: "idle".to_string(),
            file_path: "a.js".to_string(),
            line_number: 1,
            is_exported: false,
            kind: FunctionKind::Declaration,
        });
        let functions = functions.build();
        let elements = ElementRegistry::default();

        let default_findings = analyze(&elements, &functions).unwrap();
        assert_eq!(
            default_findings.unused_functions,
            vec![UnusedFunction {
                function_name: "idle".to_string(),
                file_path: "a.js".to_string(),
                line_number: 1,
                call_count: 0,
            }]
        );

        let configured = Analyzer::from_config(&config)
            .analyze(&elements, &functions)
            .unwrap();
        assert!(configured.unused_functions.is_empty());
    }

    #[test]
    fn analysis_is_deterministic() {
        let mut builder = ElementRegistry::builder();
        builder
            .line_count(3)
            .element_id("a", 1)
            .event_handler(handler("missing()"));
        let elements = builder.build();

        let mut functions = FunctionRegistry::builder();
        functions.call_site(
            "x",
            CallSiteRecord {
                file_path: "a.js".to_string(),
                line_number: 1,
                context: None,
                kind: CallKind::Call,
                via_global: false,
            },
        );
        let functions = functions.build();

        let first = serde_json::to_string(&analyze(&elements, &functions).unwrap()).unwrap();
        let second = serde_json::to_string(&analyze(&elements, &functions).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
