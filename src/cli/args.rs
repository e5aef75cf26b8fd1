//! Command line arguments for po-quality.
//!
//! `check` is the default command, so `po-quality --data-dir extracts` and
//! `po-quality check --data-dir extracts` are equivalent.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "po-quality")]
#[command(about = "Data-quality checks for procurement CSV extracts", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub check: CheckArgs,
}

impl Cli {
    /// The command to run, with `check` filled in when none was given.
    pub fn resolved_command(self) -> Command {
        match self.command {
            Some(command) => command,
            None => Command::Check(self.check),
        }
    }
}

/// Command to execute
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Validate the input tables and write the reports (default)
    Check(CheckArgs),
    /// List every check in catalog order
    List,
    /// Print version information
    Version,
}

/// Summary format on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output
    Text,
    /// The run summary as JSON
    #[default]
    Json,
}

#[derive(Debug, Clone, PartialEq, Args)]
pub struct CheckArgs {
    /// Directory holding suppliers.csv, parts.csv, purchase_orders.csv and po_lines.csv.
    #[arg(long, value_name = "DIR", env = "PO_QUALITY_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory receiving validation_report.json and validation_report.csv.
    #[arg(long, value_name = "DIR", env = "PO_QUALITY_OUT_DIR", default_value = "reports")]
    pub out_dir: PathBuf,

    /// Directory receiving validation.log.
    #[arg(long, value_name = "DIR", env = "PO_QUALITY_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    /// Summary format on stdout.
    #[arg(long, value_enum, env = "PO_QUALITY_FORMAT", default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Evaluate checks on worker threads.
    #[arg(long)]
    pub parallel: bool,

    /// Enable verbose (info-level) logging.
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Enable debug-level logging.
    #[arg(long)]
    pub debug: bool,

    /// Disable colored terminal output.
    #[arg(long)]
    pub no_color: bool,
}

impl Default for CheckArgs {
    fn default() -> Self {
        CheckArgs {
            data_dir: PathBuf::from("data"),
            out_dir: PathBuf::from("reports"),
            log_dir: PathBuf::from("logs"),
            format: OutputFormat::Json,
            parallel: false,
            verbose: false,
            debug: false,
            no_color: false,
        }
    }
}
