//! Result aggregation and reporting.
//!
//! Collects check results, derives summaries, and maps a run to its exit status.

use crate::data::{TableName, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on sample rows attached to one result
pub const MAX_SAMPLE_FAILURES: usize = 5;

/// One violating row reduced to its diagnostic columns, in column order.
pub type SampleRow = IndexMap<String, Value>;

/// Check severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Failure blocks overall success
    Critical,
    /// Reported but does not block success
    Warn,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warn => "WARN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one catalog entry.
///
/// Field order here is the field order of both report artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub check_name: String,
    pub table: TableName,
    pub severity: Severity,
    pub passed: bool,
    pub failed_count: u64,
    pub sample_failures: Vec<SampleRow>,
}

impl CheckResult {
    /// Row-level result; passes iff no row violated the rule.
    pub fn from_violations(
        check_name: impl Into<String>,
        table: TableName,
        severity: Severity,
        failed_count: u64,
        mut sample_failures: Vec<SampleRow>,
    ) -> Self {
        sample_failures.truncate(MAX_SAMPLE_FAILURES.min(failed_count as usize));
        CheckResult {
            check_name: check_name.into(),
            table,
            severity,
            passed: failed_count == 0,
            failed_count,
            sample_failures,
        }
    }

    /// Table-level result with no per-row count or samples.
    pub fn structural(
        check_name: impl Into<String>,
        table: TableName,
        severity: Severity,
        passed: bool,
    ) -> Self {
        CheckResult {
            check_name: check_name.into(),
            table,
            severity,
            passed,
            failed_count: 0,
            sample_failures: Vec::new(),
        }
    }

    /// A check that could not be evaluated: one failure carrying the reason.
    pub fn unavailable(
        check_name: impl Into<String>,
        table: TableName,
        severity: Severity,
        reason: impl Into<String>,
    ) -> Self {
        let mut sample = SampleRow::new();
        sample.insert("error".to_string(), Value::Text(reason.into()));
        CheckResult {
            check_name: check_name.into(),
            table,
            severity,
            passed: false,
            failed_count: 1,
            sample_failures: vec![sample],
        }
    }

    /// Failed with CRITICAL severity
    pub fn is_critical_failure(&self) -> bool {
        !self.passed && self.severity == Severity::Critical
    }
}

/// Result summary statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total_checks: u32,
    pub passed: u32,
    pub failed: u32,
    pub critical_failed: u32,
}

impl ResultSummary {
    /// Linear scan over a result sequence.
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut summary = ResultSummary::default();

        for result in results {
            summary.total_checks += 1;
            if result.passed {
                summary.passed += 1;
            } else {
                summary.failed += 1;
                if result.severity == Severity::Critical {
                    summary.critical_failed += 1;
                }
            }
        }

        summary
    }
}

/// Summary handed back to the invoking process, including artifact paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub summary: ResultSummary,
    pub json_report: String,
    pub csv_report: String,
}

/// Validation report containing all check results in catalog order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub results: Vec<CheckResult>,
    pub total_duration_ms: u64,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary counts, recomputed from the results on every call
    pub fn summary(&self) -> ResultSummary {
        ResultSummary::from_results(&self.results)
    }

    pub fn exit_status(&self) -> ExitStatus {
        ExitStatus::from_summary(&self.summary())
    }
}

/// Result aggregator for collecting check results
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Vec<CheckResult>,
    total_duration_ms: u64,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_duration(&mut self, total_duration_ms: u64) {
        self.total_duration_ms = total_duration_ms;
    }

    /// Add a completed check result
    pub fn add_result(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    pub fn get_summary(&self) -> ResultSummary {
        ResultSummary::from_results(&self.results)
    }

    /// Create final validation report
    pub fn into_report(self) -> ValidationReport {
        ValidationReport {
            results: self.results,
            total_duration_ms: self.total_duration_ms,
        }
    }
}

/// Process outcome, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// No CRITICAL failures (WARN failures allowed)
    Success,
    /// At least one CRITICAL check failed
    CriticalFailure,
    /// The run could not execute
    ExecutionError,
}

impl ExitStatus {
    pub fn from_summary(summary: &ResultSummary) -> Self {
        if summary.critical_failed > 0 {
            ExitStatus::CriticalFailure
        } else {
            ExitStatus::Success
        }
    }

    /// Decide the outcome of a run that may not have produced results.
    pub fn decide<E>(outcome: &Result<ResultSummary, E>) -> Self {
        match outcome {
            Err(_) => ExitStatus::ExecutionError,
            Ok(summary) => Self::from_summary(summary),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::CriticalFailure => 1,
            ExitStatus::ExecutionError => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ExitStatus::Success => "no critical failures",
            ExitStatus::CriticalFailure => "critical failures detected",
            ExitStatus::ExecutionError => "run could not execute",
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}
