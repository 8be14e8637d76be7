//! The full pipeline: build both models, analyze, derive fixes.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::error::{AuditError, FileDiagnostic};
use crate::findings::{Findings, Summary};
use crate::fixes::{Fix, StubTarget, derive_fixes};
use crate::html::load_document;
use crate::js::{ScanOptions, scan_directory};
use crate::model::{FunctionRegistry, HtmlDiagnostic};

/// File stubs go to when the script root holds no scripts.
pub const STUB_FILENAME: &str = "wirecheck-stubs.js";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    pub html_lines: usize,
    pub element_ids: usize,
    pub event_handlers: usize,
    pub interactive_elements: usize,
    pub js_files: usize,
    pub functions: usize,
    pub dom_queries: usize,
    #[serde(skip)]
    pub elapsed_ms: u64,
}

/// Everything one run produces. Serializes with the finding lists at the top level.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub html_file: String,
    pub js_root: String,
    #[serde(flatten)]
    pub findings: Findings,
    pub summary: Summary,
    pub fixes: Vec<Fix>,
    pub diagnostics: Vec<FileDiagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub html_diagnostics: Vec<HtmlDiagnostic>,
    pub stats: AuditStats,
}

#[derive(Debug, Clone)]
pub struct Audit {
    html_path: PathBuf,
    js_root: PathBuf,
    config: Config,
}

impl Audit {
    pub fn new(html_path: impl Into<PathBuf>, js_root: impl Into<PathBuf>) -> Self {
        Self {
            html_path: html_path.into(),
            js_root: js_root.into(),
            config: Config::default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Runs the pipeline. Missing inputs and bad configuration fail before any parsing.
    pub fn run(&self) -> Result<AuditReport, AuditError> {
        let started = Instant::now();

        for path in [&self.html_path, &self.js_root] {
            if !path.exists() {
                return Err(AuditError::InputNotFound { path: path.clone() });
            }
        }
        let scan_options = ScanOptions::from_config(&self.config)?;
        let analyzer = Analyzer::from_config(&self.config);

        let (elements, scan) = rayon::join(
            || load_document(&self.html_path),
            || scan_directory(&self.js_root, &scan_options),
        );
        let elements = elements?;
        let scan = scan?;
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "models built");

        let findings = analyzer.analyze(&elements, &scan.registry)?;
        let html_file = self.html_path.to_string_lossy().into_owned();
        let stub_target = self.stub_target(&scan.registry);
        let fixes = derive_fixes(
            &findings,
            &elements,
            &scan.registry,
            &html_file,
            &stub_target,
        );

        let stats = AuditStats {
            html_lines: elements.line_count(),
            element_ids: elements.id_count(),
            event_handlers: elements.event_handlers().len(),
            interactive_elements: elements.interactive_elements().len(),
            js_files: scan.files_scanned,
            functions: scan.registry.function_count(),
            dom_queries: scan.registry.dom_queries().len(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            findings = findings.total(),
            fixes = fixes.len(),
            diagnostics = scan.diagnostics.len(),
            elapsed_ms = stats.elapsed_ms,
            "audit finished"
        );

        Ok(AuditReport {
            html_file,
            js_root: self.js_root.to_string_lossy().into_owned(),
            summary: findings.summary(),
            findings,
            fixes,
            diagnostics: scan.diagnostics,
            html_diagnostics: elements.diagnostics().to_vec(),
            stats,
        })
    }

    /// The first scanned script, or a new file under the script root.
    fn stub_target(&self, functions: &FunctionRegistry) -> StubTarget {
        let first_file = functions
            .all_definitions()
            .iter()
            .map(|def| def.file_path.as_str())
            .chain(functions.dom_queries().iter().map(|q| q.file_path.as_str()))
            .min();

        match first_file {
            Some(file) => StubTarget {
                file_path: file.to_string(),
                line_number: next_line(Path::new(file)),
            },
            None => {
                let root = if self.js_root.is_dir() {
                    self.js_root.clone()
                } else {
                    self.js_root.parent().map(Path::to_path_buf).unwrap_or_default()
                };
                StubTarget {
                    file_path: root.join(STUB_FILENAME).to_string_lossy().into_owned(),
                    line_number: 1,
                }
            }
        }
    }
}

fn next_line(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .map(|source| source.lines().count() + 2)
        .unwrap_or(1)
}

/// Audits with the given configuration.
pub fn run_audit(html_path: &Path, js_root: &Path, config: &Config) -> Result<AuditReport, AuditError> {
    Audit::new(html_path, js_root)
        .with_config(config.clone())
        .run()
}
