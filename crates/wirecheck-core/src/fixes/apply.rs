//! Writes fixes to disk.
//!
//! Each touched file is copied into the backup directory before it is
//! rewritten. A failed write restores the file from that copy.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use serde::Serialize;
use swc_common::{Span, Spanned};
use swc_ecma_ast::{Decl, Expr, Pat, Stmt};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::{debug, info, warn};

use super::{Fix, FixKind};
use crate::js::{ParsedFile, unwrap_paren};

pub const BACKUP_DIR: &str = ".wirecheck-backups";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteFailure {
    pub path: PathBuf,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub original: PathBuf,
    pub backup: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixOutcome {
    pub applied: Vec<Fix>,
    pub failed: Vec<WriteFailure>,
    pub backups: Vec<Backup>,
}

impl FixOutcome {
    /// Copies every backup over its original. Returns the files that could not be restored.
    pub fn rollback(&self) -> Vec<WriteFailure> {
        let mut failures = Vec::new();
        for backup in &self.backups {
            match std::fs::copy(&backup.backup, &backup.original) {
                Ok(_) => debug!(file = %backup.original.display(), "restored from backup"),
                Err(e) => failures.push(WriteFailure {
                    path: backup.original.clone(),
                    message: format!("restore from {} failed: {}", backup.backup.display(), e),
                    fix: None,
                }),
            }
        }
        failures
    }
}

#[derive(Debug, Clone)]
pub struct FixApplier {
    backup_dir: PathBuf,
    safe_only: bool,
}

impl FixApplier {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
            safe_only: true,
        }
    }

    /// Backups go to `<root>/.wirecheck-backups`.
    pub fn for_root(root: &Path) -> Self {
        Self::new(root.join(BACKUP_DIR))
    }

    pub fn safe_only(mut self, safe_only: bool) -> Self {
        self.safe_only = safe_only;
        self
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn apply(&self, fixes: &[Fix]) -> FixOutcome {
        let mut by_file: BTreeMap<&str, Vec<&Fix>> = BTreeMap::new();
        for fix in fixes.iter().filter(|f| f.safe || !self.safe_only) {
            by_file.entry(fix.file_path.as_str()).or_default().push(fix);
        }

        let mut outcome = FixOutcome::default();
        for (file, mut file_fixes) in by_file {
            file_fixes.sort_by(|a, b| b.line_number.cmp(&a.line_number));
            self.apply_file(Path::new(file), &file_fixes, &mut outcome);
        }

        info!(
            applied = outcome.applied.len(),
            failed = outcome.failed.len(),
            "fixes applied"
        );
        outcome
    }

    fn apply_file(&self, path: &Path, fixes: &[&Fix], outcome: &mut FixOutcome) {
        let fail_all = |outcome: &mut FixOutcome, message: &str| {
            for fix in fixes {
                outcome.failed.push(failure(path, message.to_string(), fix));
            }
        };

        let only_stubs = fixes.iter().all(|f| f.kind == FixKind::AddFunctionStub);
        let original = match std::fs::read_to_string(path) {
            Ok(source) => source,
            // Stubs may create their target file.
            Err(e) if e.kind() == ErrorKind::NotFound && only_stubs => String::new(),
            Err(e) => return fail_all(outcome, &format!("read failed: {}", e)),
        };

        let mut source = original.clone();
        let mut applied = Vec::new();
        for fix in fixes {
            match edit(&source, fix) {
                Ok(edited) => {
                    source = edited;
                    applied.push((*fix).clone());
                }
                Err(message) => {
                    warn!(file = %path.display(), line = fix.line_number, "{}", message);
                    outcome.failed.push(failure(path, message, fix));
                }
            }
        }
        if applied.is_empty() || source == original {
            return;
        }

        let backup = if path.exists() {
            match self.backup(path) {
                Ok(backup) => Some(backup),
                Err(message) => {
                    for fix in &applied {
                        outcome.failed.push(failure(path, message.clone(), fix));
                    }
                    return;
                }
            }
        } else {
            None
        };

        if let Err(e) = std::fs::write(path, &source) {
            let mut message = format!("write failed: {}", e);
            if let Some(backup) = &backup {
                if let Err(restore) = std::fs::copy(&backup.backup, path) {
                    message.push_str(&format!("; restore failed: {}", restore));
                }
            }
            for fix in &applied {
                outcome.failed.push(failure(path, message.clone(), fix));
            }
            outcome.backups.extend(backup);
            return;
        }

        debug!(file = %path.display(), count = applied.len(), "file rewritten");
        outcome.applied.extend(applied);
        outcome.backups.extend(backup);
    }

    fn backup(&self, path: &Path) -> Result<Backup, String> {
        std::fs::create_dir_all(&self.backup_dir).map_err(|e| {
            format!(
                "cannot create backup directory {}: {}",
                self.backup_dir.display(),
                e
            )
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        let mut backup = self.backup_dir.join(format!("{}.{}.backup", name, timestamp));
        let mut n = 1;
        while backup.exists() {
            backup = self
                .backup_dir
                .join(format!("{}.{}-{}.backup", name, timestamp, n));
            n += 1;
        }

        std::fs::copy(path, &backup)
            .map_err(|e| format!("backup of {} failed: {}", path.display(), e))?;
        Ok(Backup {
            original: path.to_path_buf(),
            backup,
        })
    }
}

fn failure(path: &Path, message: String, fix: &Fix) -> WriteFailure {
    WriteFailure {
        path: path.to_path_buf(),
        message,
        fix: Some(fix.clone()),
    }
}

/// Applies one fix to the file contents.
fn edit(source: &str, fix: &Fix) -> Result<String, String> {
    match fix.kind {
        FixKind::RemoveFunction => remove_function(source, fix),
        FixKind::RemoveHandler => remove_handler(source, fix),
        FixKind::AddFunctionStub => Ok(append_stub(source, &fix.function_name)),
    }
}

fn remove_function(source: &str, fix: &Fix) -> Result<String, String> {
    let file = ParsedFile::from_source(&fix.file_path, source);
    let module = file
        .module()
        .ok_or_else(|| format!("{} no longer parses", fix.file_path))?;

    let mut finder = DeclarationFinder {
        file: &file,
        name: &fix.function_name,
        line: fix.line_number,
        found: None,
    };
    module.visit_with(&mut finder);
    let span = finder.found.ok_or_else(|| {
        format!(
            "no standalone declaration of '{}' on line {}",
            fix.function_name, fix.line_number
        )
    })?;

    let mut range = file.span_range(span);
    if source[range.end..].starts_with(';') {
        range.end += 1;
    }
    let range = whole_lines(source, range);

    let mut edited = String::with_capacity(source.len());
    edited.push_str(&source[..range.start]);
    edited.push_str(&source[range.end..]);
    Ok(edited)
}

/// Widens `range` to full lines when nothing else shares them.
fn whole_lines(source: &str, range: Range<usize>) -> Range<usize> {
    let line_start = source[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[range.end..]
        .find('\n')
        .map_or(source.len(), |i| range.end + i + 1);

    let prefix_blank = source[line_start..range.start].trim().is_empty();
    let suffix_blank = source[range.end..line_end].trim().is_empty();
    if prefix_blank && suffix_blank {
        line_start..line_end
    } else {
        range
    }
}

struct DeclarationFinder<'f> {
    file: &'f ParsedFile,
    name: &'f str,
    line: usize,
    found: Option<Span>,
}

impl DeclarationFinder<'_> {
    fn declares(&self, decl: &Decl) -> bool {
        match decl {
            Decl::Fn(f) => {
                f.ident.sym.as_ref() == self.name && self.file.line_of(f.ident.span) == self.line
            }
            Decl::Var(var) => match var.decls.as_slice() {
                [single] => {
                    let Pat::Ident(binding) = &single.name else {
                        return false;
                    };
                    let is_function = single
                        .init
                        .as_deref()
                        .is_some_and(|init| matches!(unwrap_paren(init), Expr::Fn(_) | Expr::Arrow(_)));
                    is_function
                        && binding.id.sym.as_ref() == self.name
                        && self.file.line_of(binding.id.span) == self.line
                }
                _ => false,
            },
            _ => false,
        }
    }
}

impl Visit for DeclarationFinder<'_> {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        if self.found.is_some() {
            return;
        }
        if let Stmt::Decl(decl) = stmt {
            if self.declares(decl) {
                self.found = Some(stmt.span());
                return;
            }
        }
        stmt.visit_children_with(self);
    }
}

fn remove_handler(source: &str, fix: &Fix) -> Result<String, String> {
    let event = fix
        .event_type
        .as_deref()
        .ok_or_else(|| "handler fix without an event type".to_string())?;
    let pattern = Regex::new(&format!(
        r#"(?i)\s+{}\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#,
        regex::escape(event)
    ))
    .map_err(|e| e.to_string())?;

    let line_start = line_offset(source, fix.line_number)
        .ok_or_else(|| format!("line {} is past the end of the file", fix.line_number))?;

    let attribute = pattern
        .find_iter(&source[line_start..])
        .find(|m| m.as_str().contains(fix.function_name.as_str()))
        .ok_or_else(|| {
            format!(
                "no {} attribute calling '{}' at line {}",
                event, fix.function_name, fix.line_number
            )
        })?;

    let range = line_start + attribute.start()..line_start + attribute.end();
    let mut edited = String::with_capacity(source.len());
    edited.push_str(&source[..range.start]);
    edited.push_str(&source[range.end..]);
    Ok(edited)
}

fn line_offset(source: &str, line: usize) -> Option<usize> {
    if line <= 1 {
        return Some(0);
    }
    source
        .match_indices('\n')
        .nth(line - 2)
        .map(|(i, _)| i + 1)
}

fn append_stub(source: &str, name: &str) -> String {
    let mut edited = source.to_string();
    if !edited.is_empty() && !edited.ends_with('\n') {
        edited.push('\n');
    }
    edited.push_str(&format!(
        "\nfunction {name}() {{\n  console.warn('{name} is not implemented yet');\n}}\n"
    ));
    edited
}
