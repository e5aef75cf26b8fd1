//! po-quality - data-quality validation for procurement CSV extracts
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use po_quality::checks::create_catalog;
use po_quality::cli::args::{CheckArgs, Cli, Command, OutputFormat};
use po_quality::cli::output::{OutputFormatter, TerminalFormatter};
use po_quality::engine::result::ValidationReport;
use po_quality::version::get_build_info;
use po_quality::{run_validation, ExitStatus, QualityConfig};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{debug, error, warn};

/// File inside `--log-dir` receiving a plain copy of the log
const LOG_FILE: &str = "validation.log";

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.resolved_command() {
        Command::Version => {
            println!("{}", get_build_info());
            ExitCode::SUCCESS
        }
        Command::List => {
            print_check_list();
            ExitCode::SUCCESS
        }
        Command::Check(args) => cmd_check(&args).into(),
    }
}

fn print_check_list() {
    let catalog = create_catalog();
    println!("Available checks ({}):", catalog.len());
    println!();
    for rule in &catalog {
        println!(
            "  {:<16} {:<8} {}",
            rule.table.as_str(),
            rule.severity.as_str(),
            rule.check_name()
        );
    }
}

fn cmd_check(args: &CheckArgs) -> ExitStatus {
    init_logging(args.verbose, args.debug, Some(&args.log_dir));

    let outcome = run(args).map(|report| report.summary());
    if let Err(err) = &outcome {
        error!("{:#}", err);
        eprintln!("Error: {:#}", err);
    }
    ExitStatus::decide(&outcome)
}

fn run(args: &CheckArgs) -> Result<ValidationReport> {
    let config = QualityConfig::from_args(args);
    let (report, run) = run_validation(&config).context("validation run failed")?;

    match args.format {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&run).context("render run summary")?;
            println!("{}", rendered);
        }
        OutputFormat::Text => {
            let color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
            let formatter = TerminalFormatter::new(color, args.verbose);
            println!("{}", formatter.format(&report)?);
            println!("Reports: {}, {}", run.json_report, run.csv_report);
        }
    }

    Ok(report)
}

fn init_logging(verbose: bool, debug: bool, log_dir: Option<&Path>) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut file_error = None;
    let file_layer = log_dir.and_then(|dir| match open_log_file(dir) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            file_error = Some(e);
            None
        }
    });

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .try_init();

    if let Some(e) = file_error {
        warn!("file logging disabled: {:#}", e);
    }
    debug!("Logging initialized at level: {}", level);
}

fn open_log_file(dir: &Path) -> Result<fs::File> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))
}
