//! Amount checks: line arithmetic and order total reconciliation.

use super::catalog::RuleSpec;
use super::{from_mask, require_column, Evaluation};
use crate::data::{Table, Value, ValueKey};
use crate::engine::result::SampleRow;
use std::collections::HashMap;

/// Absolute tolerance for amount comparisons. A difference equal to the
/// tolerance passes.
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// Representation error allowed on top of the tolerance, in units of the
/// larger operand's magnitude. 1000.00 - 999.99 is 0.0100000000000477 in
/// binary floating point, and the error grows with the amounts.
const FLOAT_SLACK_ULPS: f64 = 8.0;

/// True when two amounts differ by more than [`AMOUNT_TOLERANCE`].
pub fn exceeds_tolerance(a: f64, b: f64) -> bool {
    let magnitude = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() - AMOUNT_TOLERANCE > f64::EPSILON * magnitude * FLOAT_SLACK_ULPS
}

// sample values are rounded to hide float noise
fn rounded(v: f64) -> Value {
    Value::Decimal((v * 10_000.0).round() / 10_000.0)
}

/// `abs(qty * unit_price - line_amount) > tolerance` is a violation. Rows with
/// a null or non-numeric operand are left to `not_null` and `numeric_min`.
pub fn line_amount_math(spec: &RuleSpec, lines: &Table) -> Evaluation {
    let qty = require_column(lines, "qty")?;
    let unit_price = require_column(lines, "unit_price")?;
    let line_amount = require_column(lines, "line_amount")?;

    let expected_and_actual = |row: usize| -> Option<(f64, f64)> {
        let expected = qty.get(row).as_f64()? * unit_price.get(row).as_f64()?;
        Some((expected, line_amount.get(row).as_f64()?))
    };

    let mask = lines.mask(|row| {
        expected_and_actual(row).is_some_and(|(expected, actual)| exceeds_tolerance(actual, expected))
    });

    Ok(from_mask(spec, &mask, |row| {
        let mut sample = lines.project(row, &["po_line_id", "qty", "unit_price", "line_amount"]);
        if let Some((expected, actual)) = expected_and_actual(row) {
            sample.insert("expected".to_string(), rounded(expected));
            sample.insert("diff".to_string(), rounded((actual - expected).abs()));
        }
        sample
    }))
}

/// Each order's `total_amount` must match the sum of its lines' `line_amount`.
/// An order with no lines reconciles against zero.
pub fn po_totals_reconcile(spec: &RuleSpec, orders: &Table, lines: &Table) -> Evaluation {
    let po_id = require_column(orders, "po_id")?;
    let total_amount = require_column(orders, "total_amount")?;
    let line_po_id = require_column(lines, "po_id")?;
    let line_amount = require_column(lines, "line_amount")?;

    // grouped once, not per order
    let mut line_totals: HashMap<ValueKey, f64> = HashMap::new();
    for row in 0..lines.row_count() {
        if let (Some(key), Some(amount)) = (line_po_id.get(row).key(), line_amount.get(row).as_f64()) {
            *line_totals.entry(key).or_insert(0.0) += amount;
        }
    }

    let lines_total = |row: usize| -> f64 {
        po_id
            .get(row)
            .key()
            .and_then(|k| line_totals.get(&k).copied())
            .unwrap_or(0.0)
    };

    let mask = orders.mask(|row| {
        total_amount
            .get(row)
            .as_f64()
            .is_some_and(|total| exceeds_tolerance(total, lines_total(row)))
    });

    Ok(from_mask(spec, &mask, |row| {
        let mut sample: SampleRow = orders.project(row, &["po_id", "total_amount"]);
        let sum = lines_total(row);
        sample.insert("lines_total".to_string(), rounded(sum));
        if let Some(total) = total_amount.get(row).as_f64() {
            sample.insert("diff".to_string(), rounded((total - sum).abs()));
        }
        sample
    }))
}
