//! po-quality library
//!
//! Data-quality validation for procurement extracts.
//!
//! This library loads four CSV tables (suppliers, parts, purchase orders and
//! purchase order lines), evaluates a fixed catalog of 27 checks against them
//! and produces:
//! - An ordered list of check results with sampled violating rows
//! - A summary with pass/fail counts
//! - A JSON and a CSV report artifact
//! - A process outcome: success, critical failure or execution error
//!
//! # Example
//!
//! ```no_run
//! use po_quality::{run_checks, QualityConfig};
//!
//! let config = QualityConfig::default();
//! let report = run_checks(&config).expect("validation could not run");
//! println!("Checks passed: {}", report.summary().passed);
//! ```

pub mod checks;
pub mod cli;
pub mod data;
pub mod engine;
pub mod version;

use checks::create_catalog;
use cli::args::CheckArgs;
use data::{load_tables, TableSet};
use engine::orchestrator::{CheckOrchestrator, OrchestratorConfig};
use engine::result::{RunSummary, ValidationReport};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

// Re-exports for public API
pub use engine::orchestrator::CheckOrchestrator as Orchestrator;
pub use engine::result::{
    CheckResult, ExitStatus, ResultSummary, Severity, ValidationReport as Report,
};

/// Errors that stop a validation run as a whole.
///
/// Individual check failures are never errors; they are reported as
/// [`CheckResult`] data.
#[derive(Debug, Error)]
pub enum QualityError {
    /// An input table file does not exist
    #[error("missing input file: {}", .path.display())]
    MissingInput { path: PathBuf },

    /// Reading or writing a file failed
    #[error("I/O error {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// An input table is malformed
    #[error("parse error in {table} at line {line}: {message}")]
    Parse {
        table: String,
        line: usize,
        message: String,
    },

    /// A report artifact could not be rendered
    #[error("report error in {context}: {message}")]
    Report { context: String, message: String },
}

/// Configuration for a validation run.
#[derive(Debug, Clone)]
pub struct QualityConfig {
    /// Directory holding the four input CSV files
    pub data_dir: PathBuf,
    /// Directory receiving the report artifacts
    pub out_dir: PathBuf,
    /// Evaluate checks on worker threads
    pub parallel: bool,
}

impl Default for QualityConfig {
    fn default() -> Self {
        QualityConfig {
            data_dir: PathBuf::from("data"),
            out_dir: PathBuf::from("reports"),
            parallel: false,
        }
    }
}

impl QualityConfig {
    /// Create configuration from command line arguments
    pub fn from_args(args: &CheckArgs) -> Self {
        QualityConfig {
            data_dir: args.data_dir.clone(),
            out_dir: args.out_dir.clone(),
            parallel: args.parallel,
        }
    }
}

/// Evaluate the full catalog against already loaded tables.
///
/// Tables that are absent from `tables` make the checks that need them fail;
/// they do not abort the run.
pub fn validate_tables(tables: &TableSet, parallel: bool) -> ValidationReport {
    let mut orchestrator = CheckOrchestrator::new(OrchestratorConfig {
        parallel,
        ..Default::default()
    });
    orchestrator.register_rules(create_catalog());
    orchestrator.run_all(tables)
}

/// Load the input tables and evaluate every check.
///
/// # Errors
///
/// Returns a [`QualityError`] when an input file is missing, unreadable or
/// malformed.
pub fn run_checks(config: &QualityConfig) -> Result<ValidationReport, QualityError> {
    info!(data_dir = %config.data_dir.display(), "loading tables");
    let tables = load_tables(&config.data_dir)?;
    info!(tables = tables.len(), parallel = config.parallel, "running checks");
    Ok(validate_tables(&tables, config.parallel))
}

/// Run the checks and write both report artifacts.
///
/// This is the main entry point used by the binary.
///
/// # Example
///
/// ```no_run
/// use po_quality::{run_validation, QualityConfig};
///
/// let config = QualityConfig {
///     data_dir: "extracts/2024-06".into(),
///     ..Default::default()
/// };
///
/// match run_validation(&config) {
///     Ok((report, run)) => {
///         println!("critical failures: {}", run.summary.critical_failed);
///         std::process::exit(report.exit_status().code() as i32);
///     }
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_validation(
    config: &QualityConfig,
) -> Result<(ValidationReport, RunSummary), QualityError> {
    let report = run_checks(config)?;
    let run = cli::output::write_reports(&report, &config.out_dir)?;
    Ok((report, run))
}
