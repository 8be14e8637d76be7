use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::config::{Config, ConfigError, DEFAULT_EXTENSIONS};
use crate::error::AuditError;

/// Directories never descended into, on top of hidden ones.
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", "dist", "build", "coverage"];

#[derive(Debug, Clone)]
pub struct Discovery {
    extensions: Vec<String>,
    exclude: Option<GlobSet>,
}

impl Default for Discovery {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            exclude: None,
        }
    }
}

impl Discovery {
    pub fn new(extensions: &[String], exclude: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
            exclude: build_globset(exclude)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(&config.extensions, &config.exclude)
    }

    /// Files under `root` in lexicographic path order.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, AuditError> {
        if !root.exists() {
            return Err(AuditError::InputNotFound {
                path: root.to_path_buf(),
            });
        }

        if root.is_file() {
            return Ok(if self.is_supported_file(root) {
                vec![root.to_path_buf()]
            } else {
                vec![]
            });
        }

        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_excluded_dir(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.is_supported_file(e.path()))
            .filter(|e| !self.is_excluded(root, e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        Ok(files)
    }

    fn is_supported_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let Some(exclude) = &self.exclude else {
            return false;
        };
        let relative = path.strip_prefix(root).unwrap_or(path);
        exclude.is_match(relative)
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    let mut added = false;
    for pattern in patterns {
        if pattern.trim().is_empty() {
            continue;
        }
        let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidValue {
            key: "exclude".to_string(),
            message: e.to_string(),
        })?;
        builder.add(glob);
        added = true;
    }

    if !added {
        return Ok(None);
    }

    builder
        .build()
        .map(Some)
        .map_err(|e| ConfigError::InvalidValue {
            key: "exclude".to_string(),
            message: e.to_string(),
        })
}

fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.') || EXCLUDED_DIRS.contains(&name))
        .unwrap_or(false)
}
