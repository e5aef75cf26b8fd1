//! Report writing and terminal output.
//!
//! Provides the JSON and CSV report formatters plus a terminal summary.
//!
//! Both artifacts are rendered from the same [`ValidationReport`], so they
//! always describe the same results in the same order. In the CSV artifact the
//! `sample_failures` column holds the samples as compact JSON text; that cell
//! is meant for spreadsheet review, not for re-parsing the samples.
//!
//! All formatters produce valid output for any report, including an empty one.

use crate::engine::result::{CheckResult, RunSummary, ValidationReport};
use crate::QualityError;
use std::fs;
use std::path::Path;
use tracing::info;

/// File name of the structured report
pub const JSON_REPORT_FILE: &str = "validation_report.json";

/// File name of the flattened report
pub const CSV_REPORT_FILE: &str = "validation_report.csv";

/// CSV header row.
const CSV_HEADER: &str = "check_name,table,severity,passed,failed_count,sample_failures";

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a validation report into a string
    fn format(&self, report: &ValidationReport) -> Result<String, QualityError>;
}

/// JSON formatter: an array of check result objects.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        JsonFormatter { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String, QualityError> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&report.results)
        } else {
            serde_json::to_string(&report.results)
        };
        rendered.map_err(|e| QualityError::Report {
            context: "json report".to_string(),
            message: e.to_string(),
        })
    }
}

/// CSV formatter: one row per check result (RFC 4180 quoting).
pub struct CsvFormatter;

impl CsvFormatter {
    fn render_row(result: &CheckResult) -> Result<String, QualityError> {
        let samples = serde_json::to_string(&result.sample_failures).map_err(|e| {
            QualityError::Report {
                context: "csv report".to_string(),
                message: e.to_string(),
            }
        })?;

        Ok(format!(
            "{},{},{},{},{},{}\n",
            escape_csv_field(&result.check_name),
            result.table.as_str(),
            result.severity.as_str(),
            result.passed,
            result.failed_count,
            escape_csv_field(&samples)
        ))
    }
}

impl OutputFormatter for CsvFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String, QualityError> {
        let mut out = String::new();
        out.push_str(CSV_HEADER);
        out.push('\n');

        for result in &report.results {
            out.push_str(&Self::render_row(result)?);
        }

        Ok(out)
    }
}

/// Escapes a field for CSV according to RFC 4180.
///
/// Fields containing commas, double quotes, or newlines are quoted.
/// Double quotes within the field are escaped by doubling them.
pub fn escape_csv_field(s: &str) -> String {
    let needs_quoting = s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r');

    if needs_quoting {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Terminal (human-readable) formatter
pub struct TerminalFormatter {
    color: bool,
    verbose: bool,
}

impl TerminalFormatter {
    pub fn new(color: bool, verbose: bool) -> Self {
        TerminalFormatter { color, verbose }
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        } else {
            text.to_string()
        }
    }

    fn status(&self, result: &CheckResult) -> String {
        if result.passed {
            self.colorize("[PASS]", "32")
        } else if result.is_critical_failure() {
            self.colorize("[FAIL]", "31")
        } else {
            self.colorize("[WARN]", "33")
        }
    }
}

impl OutputFormatter for TerminalFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String, QualityError> {
        let rule = "-".repeat(80);
        let mut output = String::new();

        output.push_str(&rule);
        output.push_str("\npo-quality validation report\n");
        output.push_str(&rule);
        output.push_str("\n\n");

        for result in &report.results {
            let target = format!("{}.{}", result.table, result.check_name);
            if result.passed {
                output.push_str(&format!("  {} {}\n", self.status(result), target));
            } else {
                output.push_str(&format!(
                    "  {} {} ({} {})\n",
                    self.status(result),
                    target,
                    result.failed_count,
                    if result.failed_count == 1 { "row" } else { "rows" }
                ));
            }

            if self.verbose && !result.sample_failures.is_empty() {
                for sample in &result.sample_failures {
                    let fields: Vec<String> =
                        sample.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                    output.push_str(&format!("         {}\n", fields.join(", ")));
                }
            }
        }

        let summary = report.summary();
        let status = report.exit_status();
        output.push('\n');
        output.push_str(&rule);
        output.push('\n');
        output.push_str(&format!(
            "SUMMARY: {} checks, {} passed, {} failed, {} critical\n",
            summary.total_checks, summary.passed, summary.failed, summary.critical_failed
        ));
        output.push_str(&format!(
            "Total time: {:.3}s\n",
            report.total_duration_ms as f64 / 1000.0
        ));
        output.push_str(&format!(
            "Exit code: {} ({})\n",
            status.code(),
            status.description()
        ));
        output.push_str(&rule);

        Ok(output)
    }
}

/// Write both report artifacts into `out_dir`, creating it if needed.
pub fn write_reports(report: &ValidationReport, out_dir: &Path) -> Result<RunSummary, QualityError> {
    fs::create_dir_all(out_dir).map_err(|source| QualityError::Io {
        context: format!("creating {}", out_dir.display()),
        source,
    })?;

    let json_path = out_dir.join(JSON_REPORT_FILE);
    let csv_path = out_dir.join(CSV_REPORT_FILE);

    let json = JsonFormatter::new(true).format(report)?;
    let csv = CsvFormatter.format(report)?;

    for (path, contents) in [(&json_path, json), (&csv_path, csv)] {
        fs::write(path, contents).map_err(|source| QualityError::Io {
            context: format!("writing {}", path.display()),
            source,
        })?;
        info!(path = %path.display(), "wrote report");
    }

    Ok(RunSummary {
        summary: report.summary(),
        json_report: json_path.display().to_string(),
        csv_report: csv_path.display().to_string(),
    })
}
