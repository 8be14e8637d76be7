//! Static cross-reference checks between an HTML document and the
//! JavaScript that drives it.
//!
//! The HTML builder ([`html`]) and the JavaScript builder ([`js`]) each
//! produce an immutable registry ([`model`]). The [`analysis`] checks read
//! both and report [`findings`], from which [`fixes`] are derived.

pub mod analysis;
pub mod audit;
pub mod config;
pub mod error;
pub mod findings;
pub mod fixes;
pub mod html;
pub mod js;
pub mod model;

pub use analysis::{Analyzer, Check, CheckMetadata, CheckRegistry, analyze};
pub use audit::{Audit, AuditReport, AuditStats, run_audit};
pub use config::{Config, ConfigError, ResolutionMode};
pub use error::{AuditError, DiagnosticKind, FileDiagnostic};
pub use findings::{Finding, FindingCategory, Findings, Severity};
pub use fixes::{Fix, FixApplier, FixKind, FixOutcome, derive_fixes};
pub use model::{ElementRegistry, FunctionRegistry};
