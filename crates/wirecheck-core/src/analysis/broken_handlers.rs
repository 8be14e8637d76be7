//! broken-handlers check (W002): inline handlers calling functions nobody defines.

use crate::analysis::{AnalysisContext, Check, CheckMetadata, handler_function};
use crate::declare_check;
use crate::findings::{BrokenHandler, Finding};

declare_check!(
    BrokenHandlers,
    id = "W002",
    name = "broken-handlers",
    description = "Inline event handlers that call a function no script defines",
    category = BrokenHandlers,
    examples = "<!-- Bad: no script defines doStuff -->\n<div onclick=\"doStuff()\">Go</div>"
);

impl Check for BrokenHandlers {
    fn metadata(&self) -> &CheckMetadata {
        &self.metadata
    }

    fn run(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding> {
        ctx.elements
            .event_handlers()
            .iter()
            .filter_map(|record| {
                let name = handler_function(record, ctx.functions)?;
                if ctx.functions.contains(name) {
                    return None;
                }
                Some(Finding::BrokenHandler(BrokenHandler {
                    element_id: record.element_id.clone(),
                    event_type: record.event_type.clone(),
                    missing_function: name.to_string(),
                    html_line_number: record.line_number,
                }))
            })
            .collect()
    }
}
