//! Explain command - describes one check

use std::env;
use std::process::ExitCode;

use clap::Args;
use colored::Colorize;
use wirecheck_core::config::load_config_or_default_with_warnings;
use wirecheck_core::{Analyzer, Check, CheckRegistry, Severity};

#[derive(Args, Debug)]
pub struct ExplainArgs {
    #[arg(
        value_name = "CHECK_ID",
        help = "Check ID or name to explain (e.g., \"W002\", \"broken-handlers\")"
    )]
    pub check_id: String,
}

impl ExplainArgs {
    pub fn run(&self) -> anyhow::Result<ExitCode> {
        let cwd = env::current_dir()?;
        let config = load_config_or_default_with_warnings(&cwd).config;
        let analyzer = Analyzer::from_config(&config);
        let registry = analyzer.registry();

        match lookup(registry, &self.check_id) {
            Some(check) => {
                let metadata = check.metadata();
                let severity = metadata.category.default_severity();

                println!();
                println!("{}", format!("Check {}", metadata.id).bold());
                println!();
                println!("  {}: {}", "Name".cyan(), metadata.name);
                println!("  {}: {}", "Description".cyan(), metadata.description);
                println!("  {}: {}", "Category".cyan(), metadata.category.title());
                println!("  {}: {}", "Severity".cyan(), format_severity(severity));

                if let Some(examples) = metadata.examples {
                    println!();
                    println!("  {}:", "Examples".cyan());
                    for line in examples.lines() {
                        println!("    {}", line);
                    }
                }

                println!();
                let status = if registry.is_check_enabled(&self.check_id) {
                    "enabled".green()
                } else {
                    "disabled".red()
                };
                println!("  {}: {}", "Status".cyan(), status);
                println!();

                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!(
                    "{} unknown check '{}'",
                    "error:".red().bold(),
                    self.check_id
                );
                eprintln!();
                eprintln!("Available checks:");
                for check in registry.checks() {
                    let meta = check.metadata();
                    eprintln!("  {} ({})", meta.id, meta.name);
                }

                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn lookup<'a>(registry: &'a CheckRegistry, id_or_name: &str) -> Option<&'a dyn Check> {
    registry
        .get_check(id_or_name)
        .or_else(|| registry.get_check_by_name(id_or_name))
}

fn format_severity(severity: Severity) -> String {
    match severity {
        Severity::Critical => "critical".red().to_string(),
        Severity::Warning => "warning".yellow().to_string(),
        Severity::Info => "info".blue().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirecheck_core::FindingCategory;

    #[test]
    fn explain_known_check_returns_metadata() {
        let registry = CheckRegistry::with_default_checks();

        let check = lookup(&registry, "W002").expect("W002 should exist");

        let metadata = check.metadata();
        assert_eq!(metadata.name, "broken-handlers");
        assert_eq!(metadata.category, FindingCategory::BrokenHandlers);
        assert!(!metadata.description.is_empty());
    }

    #[test]
    fn explain_check_by_name() {
        let registry = CheckRegistry::with_default_checks();

        let check = lookup(&registry, "orphaned-functions").expect("check should exist");
        assert_eq!(check.metadata().id, "W001");
    }

    #[test]
    fn explain_unknown_check_returns_none() {
        let registry = CheckRegistry::with_default_checks();
        assert!(lookup(&registry, "W999").is_none());
    }

    #[test]
    fn every_default_check_has_examples() {
        let registry = CheckRegistry::with_default_checks();
        for check in registry.checks() {
            assert!(
                check.metadata().examples.is_some(),
                "{} should have examples",
                check.metadata().id
            );
        }
    }
}
