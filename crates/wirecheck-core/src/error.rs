use std::path::PathBuf;

use serde::Serialize;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Input not found: '{}'", path.display())]
    InputNotFound { path: PathBuf },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    ParseFailed,
    Unreadable,
    Skipped,
}

/// A per-file problem met while building the JavaScript model. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiagnostic {
    pub file_path: String,
    pub kind: DiagnosticKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl FileDiagnostic {
    pub fn parse_failed(file_path: &str, message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            file_path: file_path.to_string(),
            kind: DiagnosticKind::ParseFailed,
            message: message.into(),
            line,
        }
    }

    pub fn unreadable(file_path: &str, message: impl Into<String>) -> Self {
        Self {
            file_path: file_path.to_string(),
            kind: DiagnosticKind::Unreadable,
            message: message.into(),
            line: None,
        }
    }

    pub fn skipped(file_path: &str, message: impl Into<String>) -> Self {
        Self {
            file_path: file_path.to_string(),
            kind: DiagnosticKind::Skipped,
            message: message.into(),
            line: None,
        }
    }
}

impl std::fmt::Display for FileDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}", self.file_path, line, self.message),
            None => write!(f, "{}: {}", self.file_path, self.message),
        }
    }
}
