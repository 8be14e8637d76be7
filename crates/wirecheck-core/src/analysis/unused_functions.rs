//! unused-functions check (W003): non-exported functions nothing calls.
//!
//! In `any-file` resolution a call anywhere to a name counts for that name,
//! and only the last definition of each name is evaluated. In
//! `same-file-or-exported` resolution every definition is evaluated and only
//! calls from its own file, or through a global object, count.

use crate::analysis::{AnalysisContext, Check, CheckMetadata};
use crate::config::ResolutionMode;
use crate::declare_check;
use crate::findings::{Finding, UnusedFunction};
use crate::model::FunctionDef;

declare_check!(
    UnusedFunctions,
    id = "W003",
    name = "unused-functions",
    description = "Non-exported functions with no call site in script or markup",
    category = UnusedFunctions,
    examples = "// Flagged: never called, not exported, not used by an onclick\nfunction legacyInit() {}\n\n// Not flagged\nexport function publicApi() {}"
);

impl Check for UnusedFunctions {
    fn metadata(&self) -> &CheckMetadata {
        &self.metadata
    }

    fn run(&self, ctx: &AnalysisContext<'_>) -> Vec<Finding> {
        match ctx.options.resolution {
            ResolutionMode::AnyFile => ctx
                .functions
                .functions()
                .filter(|def| is_candidate(ctx, def))
                .filter(|def| ctx.functions.call_count(&def.name) == 0)
                .map(unused)
                .collect(),
            ResolutionMode::SameFileOrExported => ctx
                .functions
                .all_definitions()
                .iter()
                .filter(|def| is_candidate(ctx, def))
                .filter(|def| local_call_count(ctx, def) == 0)
                .map(unused)
                .collect(),
        }
    }
}

fn is_candidate(ctx: &AnalysisContext<'_>, def: &FunctionDef) -> bool {
    !def.is_exported && !ctx.is_referenced_by_html(&def.name)
}

fn local_call_count(ctx: &AnalysisContext<'_>, def: &FunctionDef) -> usize {
    ctx.functions
        .call_sites(&def.name)
        .iter()
        .filter(|site| site.via_global || site.file_path == def.file_path)
        .count()
}

fn unused(def: &FunctionDef) -> Finding {
    Finding::UnusedFunction(UnusedFunction {
        function_name: def.name.clone(),
        file_path: def.file_path.clone(),
        line_number: def.line_number,
        call_count: 0,
    })
}
