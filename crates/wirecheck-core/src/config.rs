//! Configuration loading and parsing for wirecheck
//!
//! Provides functionality to load and parse `wirecheck.toml` configuration files.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "wirecheck.toml";

const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["exclude", "extensions", "deadline_ms", "checks", "patterns"];
const KNOWN_CHECKS_KEYS: &[&str] = &["disabled", "resolution", "js_references_count_as_handlers"];
const KNOWN_PATTERNS_KEYS: &[&str] = &[
    "enabled",
    "modal_keywords",
    "tab_keywords",
    "form_keywords",
    "navigation_keywords",
    "component_markers",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid TOML in '{path}': {message}")]
    ParseError { path: PathBuf, message: String },
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigResult {
    pub config: Config,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub exclude: Vec<String>,
    pub extensions: Vec<String>,
    pub deadline_ms: Option<u64>,
    pub checks: ChecksConfig,
    pub patterns: PatternConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            deadline_ms: None,
            checks: ChecksConfig::default(),
            patterns: PatternConfig::default(),
        }
    }
}

pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx"];

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChecksConfig {
    pub disabled: Vec<String>,
    pub resolution: ResolutionMode,
    pub js_references_count_as_handlers: bool,
}

/// How a function name referenced from one place is matched to definitions.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionMode {
    /// A definition anywhere satisfies every reference.
    #[default]
    AnyFile,
    /// A JS call counts for a definition only from the same file, or when the
    /// definition is exported, or when the call goes through a global object.
    SameFileOrExported,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatternConfig {
    pub enabled: bool,
    pub modal_keywords: Vec<String>,
    pub tab_keywords: Vec<String>,
    pub form_keywords: Vec<String>,
    pub navigation_keywords: Vec<String>,
    pub component_markers: Vec<String>,
}

impl Default for PatternConfig {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|s| s.to_string()).collect()
        }

        Self {
            enabled: true,
            modal_keywords: owned(&["modal", "dialog"]),
            tab_keywords: owned(&["tab"]),
            form_keywords: owned(&["form"]),
            navigation_keywords: owned(&["nav", "navbar", "navigation", "menu"]),
            component_markers: owned(&[
                "btn", "button", "close", "open", "content", "panel", "body", "header", "footer",
                "title", "overlay", "backdrop", "container", "wrapper", "list", "bar", "icon",
                "label", "text", "input", "link", "item", "toggle", "trigger", "error", "message",
                "status",
            ]),
        }
    }
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_config_with_warnings(path).map(|result| result.config)
}

pub fn load_config_with_warnings(path: &Path) -> Result<ConfigResult, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    validate(&config)?;
    let warnings = detect_unknown_keys(&content);

    Ok(ConfigResult { config, warnings })
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.extensions.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "extensions".to_string(),
            message: "at least one extension is required".to_string(),
        });
    }

    if let Some(ext) = config
        .extensions
        .iter()
        .find(|ext| ext.is_empty() || ext.starts_with('.'))
    {
        return Err(ConfigError::InvalidValue {
            key: "extensions".to_string(),
            message: format!("'{}' must be a bare extension such as \"js\"", ext),
        });
    }

    for pattern in &config.exclude {
        if let Err(e) = globset::Glob::new(pattern) {
            return Err(ConfigError::InvalidValue {
                key: "exclude".to_string(),
                message: e.to_string(),
            });
        }
    }

    Ok(())
}

fn detect_unknown_keys(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(_) => return warnings,
    };

    let known_top: HashSet<&str> = KNOWN_TOP_LEVEL_KEYS.iter().copied().collect();
    for key in table.keys() {
        if !known_top.contains(key.as_str()) {
            warnings.push(format!("Unknown config option: '{}'", key));
        }
    }

    for (section, known) in [("checks", KNOWN_CHECKS_KEYS), ("patterns", KNOWN_PATTERNS_KEYS)] {
        if let Some(toml::Value::Table(values)) = table.get(section) {
            for key in values.keys() {
                if !known.contains(&key.as_str()) {
                    warnings.push(format!("Unknown config option in [{}]: '{}'", section, key));
                }
            }
        }
    }

    warnings
}

pub fn load_config_or_default(start_dir: &Path) -> Config {
    find_config_file(start_dir)
        .and_then(|path| load_config(&path).ok())
        .unwrap_or_default()
}

pub fn load_config_or_default_with_warnings(start_dir: &Path) -> ConfigResult {
    match find_config_file(start_dir) {
        Some(path) => load_config_with_warnings(&path).unwrap_or_default(),
        None => ConfigResult::default(),
    }
}

/// Contents written by `wirecheck init`.
pub fn default_config_template() -> String {
    let patterns = PatternConfig::default();
    let list = |words: &[String]| {
        words
            .iter()
            .map(|w| format!("\"{}\"", w))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        r#"# wirecheck configuration

# Extra glob patterns excluded from JavaScript discovery.
# node_modules, dist, build, coverage and hidden directories are always skipped.
exclude = []

extensions = [{extensions}]

# Stop starting new files after this many milliseconds.
# deadline_ms = 30000

[checks]
disabled = []
resolution = "any-file"
js_references_count_as_handlers = false

[patterns]
enabled = true
modal_keywords = [{modal}]
tab_keywords = [{tab}]
form_keywords = [{form}]
navigation_keywords = [{nav}]
component_markers = [{markers}]
"#,
        extensions = list(&Config::default().extensions),
        modal = list(&patterns.modal_keywords),
        tab = list(&patterns.tab_keywords),
        form = list(&patterns.form_keywords),
        nav = list(&patterns.navigation_keywords),
        markers = list(&patterns.component_markers),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn create_temp_dir() -> tempfile::TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    #[test]
    fn load_config_from_file() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &config_path,
            r#"
exclude = ["**/vendor/**"]
extensions = ["js"]
deadline_ms = 500

[checks]
disabled = ["unused-functions"]
resolution = "same-file-or-exported"

[patterns]
tab_keywords = ["tab", "pane"]
"#,
        )
        .unwrap();

        let config = load_config(&config_path).unwrap();

        assert_eq!(config.exclude, vec!["**/vendor/**"]);
        assert_eq!(config.extensions, vec!["js"]);
        assert_eq!(config.deadline_ms, Some(500));
        assert_eq!(config.checks.disabled, vec!["unused-functions"]);
        assert_eq!(config.checks.resolution, ResolutionMode::SameFileOrExported);
        assert!(!config.checks.js_references_count_as_handlers);
        assert_eq!(config.patterns.tab_keywords, vec!["tab", "pane"]);
        assert_eq!(
            config.patterns.modal_keywords,
            PatternConfig::default().modal_keywords
        );
    }

    #[test]
    fn default_config_when_missing() {
        let dir = create_temp_dir();
        let config = load_config_or_default(dir.path());

        assert_eq!(config, Config::default());
        assert!(config.exclude.is_empty());
        assert_eq!(config.checks.resolution, ResolutionMode::AnyFile);
        assert!(config.patterns.enabled);
    }

    #[test]
    fn error_on_invalid_toml() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "this is not valid { toml }").unwrap();

        let result = load_config(&config_path);

        match result.unwrap_err() {
            ConfigError::ParseError { path, message } => {
                assert_eq!(path, config_path);
                assert!(!message.is_empty());
            }
            other => panic!("Expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn error_on_unknown_resolution_mode() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "[checks]\nresolution = \"nearest\"\n").unwrap();

        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn error_on_invalid_exclude_glob() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "exclude = [\"src/[\"]\n").unwrap();

        match load_config(&config_path) {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "exclude"),
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn error_on_dotted_extension() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "extensions = [\".js\"]\n").unwrap();

        assert!(matches!(
            load_config(&config_path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn find_config_file_in_parent_directory() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(&config_path, "").unwrap();

        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_config_file(&nested), Some(config_path));
    }

    #[test]
    fn unknown_keys_produce_warnings() {
        let dir = create_temp_dir();
        let config_path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &config_path,
            r#"
colour = true

[checks]
strict = true

[patterns]
carousel_keywords = ["slide"]
"#,
        )
        .unwrap();

        let result = load_config_with_warnings(&config_path).unwrap();

        assert_eq!(result.warnings.len(), 3);
        assert!(result.warnings[0].contains("colour"));
        assert!(result.warnings[1].contains("[checks]"));
        assert!(result.warnings[2].contains("carousel_keywords"));
    }

    #[test]
    fn default_template_parses_back_to_defaults() {
        let config: Config = toml::from_str(&default_config_template()).unwrap();
        assert_eq!(config, Config::default());
    }
}
