//! Audit command - cross-checks one HTML file against a script directory

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use tracing::info;
use wirecheck_core::config::{
    Config, ResolutionMode, find_config_file, load_config_with_warnings,
};
use wirecheck_core::{Audit, AuditReport, FixApplier, FixOutcome};

use crate::output::json::JsonFormatter;
use crate::output::markdown::MarkdownFormatter;
use crate::output::pretty::PrettyFormatter;

pub const JSON_REPORT: &str = "wirecheck-report.json";
pub const MARKDOWN_REPORT: &str = "wirecheck-report.md";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Pretty,
    /// JSON and Markdown report files
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Resolution {
    AnyFile,
    SameFileOrExported,
}

impl From<Resolution> for ResolutionMode {
    fn from(value: Resolution) -> Self {
        match value {
            Resolution::AnyFile => ResolutionMode::AnyFile,
            Resolution::SameFileOrExported => ResolutionMode::SameFileOrExported,
        }
    }
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// HTML document to check
    #[arg(value_name = "HTML_FILE")]
    pub html: PathBuf,

    /// Directory (or single file) holding the page's JavaScript
    #[arg(value_name = "JS_DIR")]
    pub js_root: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Directory to write wirecheck-report.json / wirecheck-report.md into
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Configuration file (default: nearest wirecheck.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How unused-function resolution treats same-named functions
    #[arg(long, value_enum)]
    pub resolution: Option<Resolution>,

    /// Disable a check by id or name (repeatable)
    #[arg(long = "disable", value_name = "CHECK")]
    pub disabled: Vec<String>,

    /// Exit with code 1 when any finding is reported
    #[arg(long)]
    pub fail_on_findings: bool,

    /// Apply the fixes marked safe
    #[arg(long)]
    pub fix: bool,

    /// With --fix, also apply fixes that need review
    #[arg(long, requires = "fix")]
    pub unsafe_fixes: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl AuditArgs {
    pub fn run(&self) -> Result<ExitCode> {
        self.configure_colors();

        let config = self.load_config()?;
        let report = Audit::new(&self.html, &self.js_root)
            .with_config(config)
            .run()?;

        let outcome = self.fix.then(|| self.apply_fixes(&report)).transpose()?;
        self.emit(&report, outcome.as_ref())?;

        let findings = &report.findings;
        let failed = findings.has_critical() || (self.fail_on_findings && !findings.is_empty());
        Ok(if failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }

    fn configure_colors(&self) {
        let no_color_env = env::var("NO_COLOR").is_ok();
        if self.no_color || no_color_env {
            colored::control::set_override(false);
        }
    }

    /// Loads the explicit or discovered config and applies command-line overrides.
    pub fn load_config(&self) -> Result<Config> {
        let path = match &self.config {
            Some(path) => Some(path.clone()),
            None => find_config_file(&env::current_dir()?),
        };

        let mut config = match path {
            Some(path) => {
                let result = load_config_with_warnings(&path)?;
                for warning in &result.warnings {
                    eprintln!("{} {}", "warning:".yellow().bold(), warning);
                }
                info!(config = %path.display(), "configuration loaded");
                result.config
            }
            None => Config::default(),
        };

        if let Some(resolution) = self.resolution {
            config.checks.resolution = resolution.into();
        }
        config.checks.disabled.extend(self.disabled.iter().cloned());
        Ok(config)
    }

    fn apply_fixes(&self, report: &AuditReport) -> Result<FixOutcome> {
        let applier = FixApplier::for_root(&env::current_dir()?).safe_only(!self.unsafe_fixes);
        let outcome = applier.apply(&report.fixes);
        for failure in &outcome.failed {
            eprintln!(
                "{} {}: {}",
                "fix failed:".red().bold(),
                failure.path.display(),
                failure.message
            );
        }
        Ok(outcome)
    }

    fn emit(&self, report: &AuditReport, outcome: Option<&FixOutcome>) -> Result<()> {
        let json = || JsonFormatter::new().format(report, outcome);
        let markdown = || MarkdownFormatter::new().format(report, outcome);

        match (self.format, &self.output) {
            (OutputFormat::Json, None) => println!("{}", json()),
            (OutputFormat::Markdown, None) => print!("{}", markdown()),
            (OutputFormat::Pretty, None) => print!("{}", PrettyFormatter::new().format(report, outcome)),
            (OutputFormat::Json, Some(dir)) => write_report(dir, JSON_REPORT, &json())?,
            (OutputFormat::Markdown, Some(dir)) => write_report(dir, MARKDOWN_REPORT, &markdown())?,
            (OutputFormat::Both, dir) => {
                let dir = dir.clone().unwrap_or_else(|| PathBuf::from("."));
                write_report(&dir, JSON_REPORT, &json())?;
                write_report(&dir, MARKDOWN_REPORT, &markdown())?;
            }
            (OutputFormat::Pretty, Some(dir)) => {
                print!("{}", PrettyFormatter::new().format(report, outcome));
                write_report(dir, JSON_REPORT, &json())?;
                write_report(dir, MARKDOWN_REPORT, &markdown())?;
            }
        }
        Ok(())
    }
}

fn write_report(dir: &Path, name: &str, contents: &str) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create output directory {}", dir.display()))?;
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("cannot write {}", path.display()))?;
    eprintln!("{} Wrote {}", "✓".green().bold(), path.display().to_string().cyan());
    Ok(())
}
