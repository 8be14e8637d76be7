//! orphaned-functions check (W001): DOM lookups of ids the document never defines.

use crate::analysis::{AnalysisContext, Check, CheckMetadata};
use crate::declare_check;
use crate::findings::{Finding, OrphanedFunction};

declare_check!(
    OrphanedFunctions,
    id = "W001",
    name = "orphaned-functions",
    description = "Functions that look up an element id missing from the HTML",
    category = OrphanedFunctions,
    examples = "<!-- index.html has no #sidebar -->\nfunction toggle() {\n  document.getElementById('sidebar').hidden ^= true;\n}"
);

impl Check for OrphanedFunctions {
    fn metadata(&self) -> &CheckMetadata {
        &self.metadata
    }

    fn run(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding> {
        ctx.functions
            .dom_queries()
            .iter()
            .filter_map(|query| {
                let id = query.target_id()?;
                if ctx.elements.contains_id(id) {
                    return None;
                }
                Some(Finding::OrphanedFunction(OrphanedFunction {
                    function_name: query.context_name().to_string(),
                    file_path: query.file_path.clone(),
                    line_number: query.line_number,
                    missing_element_id: id.to_string(),
                    query_method: query.method.clone(),
                }))
            })
            .collect()
    }
}
