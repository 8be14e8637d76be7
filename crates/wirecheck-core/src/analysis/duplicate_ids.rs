//! duplicate-ids check (W006)

use crate::analysis::{AnalysisContext, Check, CheckMetadata};
use crate::declare_check;
use crate::findings::{DuplicateId, Finding};

declare_check!(
    DuplicateIds,
    id = "W006",
    name = "duplicate-ids",
    description = "Element ids used by more than one element",
    category = DuplicateIds,
    examples = "<!-- getElementById('status') only ever finds the first one -->\n<span id=\"status\"></span>\n<div id=\"status\"></div>"
);

impl Check for DuplicateIds {
    fn metadata(&self) -> &CheckMetadata {
        &self.metadata
    }

    fn run(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding> {
        ctx.elements
            .duplicate_ids()
            .iter()
            .map(|dup| {
                Finding::DuplicateId(DuplicateId {
                    element_id: dup.element_id.clone(),
                    line_numbers: dup.line_numbers.clone(),
                })
            })
            .collect()
    }
}
