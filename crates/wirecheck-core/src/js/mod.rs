//! JavaScript model builder.
//!
//! Discovers script files under a root, parses each one on the rayon pool and
//! merges the per-file results into a [`FunctionRegistry`] in discovery order.

mod collector;
mod discovery;
pub mod parser;

pub use collector::{FileModel, collect};
pub(crate) use collector::unwrap_paren;
pub use discovery::{Discovery, EXCLUDED_DIRS};
pub use parser::{ParseError, ParsedFile, Parser};

use std::path::Path;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{Config, ConfigError};
use crate::error::{AuditError, FileDiagnostic};
use crate::model::FunctionRegistry;

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub discovery: Discovery,
    /// Files not started before this much time has passed are skipped.
    pub deadline: Option<Duration>,
}

impl ScanOptions {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            discovery: Discovery::from_config(config)?,
            deadline: config.deadline_ms.map(Duration::from_millis),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsScan {
    pub registry: FunctionRegistry,
    pub diagnostics: Vec<FileDiagnostic>,
    pub files_scanned: usize,
}

/// Per-file outcome: the file's model, or why it produced none.
pub type FileResult = Result<FileModel, FileDiagnostic>;

pub fn scan_directory(root: &Path, options: &ScanOptions) -> Result<JsScan, AuditError> {
    let files = options.discovery.discover(root)?;
    debug!(root = %root.display(), count = files.len(), "discovered script files");

    let started = Instant::now();
    let results: Vec<FileResult> = files
        .par_iter()
        .map(|path| {
            let label = path.to_string_lossy();
            if let Some(deadline) = options.deadline {
                if started.elapsed() >= deadline {
                    return Err(FileDiagnostic::skipped(
                        &label,
                        format!("deadline of {}ms reached before parsing", deadline.as_millis()),
                    ));
                }
            }
            parse_file(path)
        })
        .collect();

    let scan = merge(results);
    info!(
        files = scan.files_scanned,
        functions = scan.registry.function_count(),
        queries = scan.registry.dom_queries().len(),
        diagnostics = scan.diagnostics.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "javascript model built"
    );
    Ok(scan)
}

pub fn parse_file(path: &Path) -> FileResult {
    let label = path.to_string_lossy();
    let source = std::fs::read_to_string(path)
        .map_err(|e| FileDiagnostic::unreadable(&label, e.to_string()))?;
    parse_source(&label, &source)
}

pub fn parse_source(file_path: &str, source: &str) -> FileResult {
    let parsed = ParsedFile::from_source(file_path, source);
    if parsed.module().is_none() {
        let (message, line) = parsed
            .errors()
            .last()
            .map(|e| (e.message.clone(), Some(e.line)))
            .unwrap_or_else(|| ("file could not be parsed".to_string(), None));
        return Err(FileDiagnostic::parse_failed(file_path, message, line));
    }
    Ok(collect(&parsed, file_path))
}

/// Folds per-file results into one registry. Later files win name collisions.
pub fn merge(results: impl IntoIterator<Item = FileResult>) -> JsScan {
    let mut builder = FunctionRegistry::builder();
    let mut diagnostics = Vec::new();
    let mut files_scanned = 0;

    for result in results {
        let model = match result {
            Ok(model) => model,
            Err(diagnostic) => {
                warn!(file = %diagnostic.file_path, kind = ?diagnostic.kind, "{}", diagnostic.message);
                diagnostics.push(diagnostic);
                continue;
            }
        };

        files_scanned += 1;
        for error in &model.recovered_errors {
            debug!(file = %model.file_path, line = error.line, "recovered parse error: {}", error.message);
            diagnostics.push(FileDiagnostic::parse_failed(
                &model.file_path,
                error.message.clone(),
                Some(error.line),
            ));
        }
        for def in model.definitions {
            builder.define(def);
        }
        for query in model.dom_queries {
            builder.dom_query(query);
        }
        for (name, site) in model.call_sites {
            builder.call_site(name, site);
        }
    }

    JsScan {
        registry: builder.build(),
        diagnostics,
        files_scanned,
    }
}
