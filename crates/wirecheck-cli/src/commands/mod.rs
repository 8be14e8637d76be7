//! CLI command implementations

pub mod audit;
pub mod explain;
pub mod init;

pub use audit::AuditArgs;
pub use explain::ExplainArgs;
pub use init::InitArgs;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cross-check an HTML file against a directory of JavaScript
    Audit(AuditArgs),

    /// Create a wirecheck.toml in the current directory
    Init(InitArgs),

    /// Show what a check looks for
    Explain(ExplainArgs),
}
