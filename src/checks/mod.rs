//! Check evaluation.
//!
//! [`evaluate`] interprets one [`RuleSpec`] against the loaded tables and always
//! returns a [`CheckResult`]. Evaluators are grouped by what they look at:
//! - schema: required column sets
//! - keys: primary keys, nulls, foreign keys
//! - values: allowed value sets, numeric lower bounds
//! - amounts: line arithmetic and order total reconciliation
//!
//! # Graceful Degradation
//!
//! - Table not loaded: failed CRITICAL result naming the table
//! - Column absent: failed result at the rule's own severity naming the column
//! - Null or non-numeric operands in arithmetic checks: row skipped
//!
//! No evaluator panics on missing data; the orchestrator still guards each call.

pub mod amounts;
pub mod catalog;
pub mod keys;
pub mod schema;
pub mod values;

use crate::data::{Column, Mask, Table, TableName, TableSet};
use crate::engine::result::{CheckResult, SampleRow, Severity, MAX_SAMPLE_FAILURES};
use catalog::{RuleKind, RuleSpec};
use std::fmt;

pub use catalog::create_catalog;

/// Why a rule could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    Table(TableName),
    Column { table: TableName, column: String },
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Table(table) => write!(f, "table not loaded: {}", table),
            Unavailable::Column { table, column } => {
                write!(f, "column missing: {}.{}", table, column)
            }
        }
    }
}

/// Evaluation outcome before unavailability is folded into a result.
pub type Evaluation = Result<CheckResult, Unavailable>;

/// Evaluate one rule against the loaded tables.
pub fn evaluate(spec: &RuleSpec, tables: &TableSet) -> CheckResult {
    match dispatch(spec, tables) {
        Ok(result) => result,
        Err(reason) => {
            let severity = match reason {
                Unavailable::Table(_) => Severity::Critical,
                Unavailable::Column { .. } => spec.severity,
            };
            CheckResult::unavailable(spec.check_name(), spec.table, severity, reason.to_string())
        }
    }
}

fn dispatch(spec: &RuleSpec, tables: &TableSet) -> Evaluation {
    let table = require_table(tables, spec.table)?;

    match &spec.kind {
        RuleKind::RequiredColumns { columns } => Ok(schema::required_columns(spec, table, columns)),
        RuleKind::PrimaryKeyUnique { column } => keys::primary_key_unique(spec, table, column),
        RuleKind::NotNull { column } => keys::not_null(spec, table, column),
        RuleKind::ForeignKeyExists {
            column,
            parent,
            parent_column,
        } => {
            let parent = require_table(tables, *parent)?;
            keys::fk_exists(spec, table, column, parent, parent_column)
        }
        RuleKind::AllowedValues { column, allowed } => {
            values::allowed_values(spec, table, column, allowed)
        }
        RuleKind::NumericMin {
            column,
            threshold,
            bound,
        } => values::numeric_min(spec, table, column, *threshold, *bound),
        RuleKind::LineAmountMath => amounts::line_amount_math(spec, table),
        RuleKind::PoTotalsReconcile => {
            let lines = require_table(tables, TableName::PoLines)?;
            amounts::po_totals_reconcile(spec, table, lines)
        }
    }
}

fn require_table(tables: &TableSet, name: TableName) -> Result<&Table, Unavailable> {
    tables.get(name).ok_or(Unavailable::Table(name))
}

pub(crate) fn require_column<'t>(table: &'t Table, column: &str) -> Result<Column<'t>, Unavailable> {
    table.column(column).ok_or_else(|| Unavailable::Column {
        table: table.name(),
        column: column.to_string(),
    })
}

/// Row-level result: count the mask and project the first violating rows.
pub(crate) fn from_mask<F>(spec: &RuleSpec, mask: &Mask, mut project: F) -> CheckResult
where
    F: FnMut(usize) -> SampleRow,
{
    let samples = mask
        .indices()
        .take(MAX_SAMPLE_FAILURES)
        .map(&mut project)
        .collect();
    CheckResult::from_violations(
        spec.check_name(),
        spec.table,
        spec.severity,
        mask.count() as u64,
        samples,
    )
}
