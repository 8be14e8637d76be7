//! Init command - writes a default wirecheck.toml

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use wirecheck_core::config::{CONFIG_FILENAME, default_config_template};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(&self) -> Result<ExitCode> {
        let config_path = self.write_config(&env::current_dir()?)?;
        println!(
            "{} Created {} configuration file",
            "✓".green().bold(),
            config_path.display().to_string().cyan()
        );
        Ok(ExitCode::SUCCESS)
    }

    fn write_config(&self, dir: &Path) -> Result<PathBuf> {
        let config_path = dir.join(CONFIG_FILENAME);

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Config file '{}' already exists. Use --force to overwrite.",
                CONFIG_FILENAME
            );
        }

        fs::write(&config_path, default_config_template())?;
        Ok(config_path)
    }
}
