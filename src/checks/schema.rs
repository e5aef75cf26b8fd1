//! Structural checks.

use super::catalog::RuleSpec;
use crate::data::Table;
use crate::engine::result::CheckResult;
use tracing::debug;

/// Pass iff every required column is present. Failure is table-level, so the
/// result never carries a row count or samples.
pub fn required_columns(spec: &RuleSpec, table: &Table, columns: &[&str]) -> CheckResult {
    let missing = table.missing_columns(columns);
    if !missing.is_empty() {
        debug!(table = %table.name(), missing = ?missing, "required columns absent");
    }
    CheckResult::structural(spec.check_name(), spec.table, spec.severity, missing.is_empty())
}
