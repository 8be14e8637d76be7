//! wirecheck CLI - cross-reference checks between an HTML page and its scripts
//!
//! Finds inline handlers calling missing functions, DOM lookups of ids the
//! page never defines, unused functions and unwired interactive elements.

mod commands;
mod logging;
mod output;

use std::process::ExitCode;

use clap::Parser;
use commands::Commands;
use logging::LoggingArgs;

#[derive(Parser, Debug)]
#[command(
    name = "wirecheck",
    author,
    version,
    about = "Static cross-reference checker for HTML pages and their JavaScript",
    long_about = "wirecheck reads one HTML document and a directory of JavaScript and reports\n\
                  where the two disagree: broken inline handlers, lookups of missing ids,\n\
                  unused functions, unwired controls and incomplete UI patterns."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(&cli.logging);

    match cli.command {
        Commands::Audit(args) => args.run(),
        Commands::Init(args) => args.run(),
        Commands::Explain(args) => args.run(),
    }
}
