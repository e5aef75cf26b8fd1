//! Value checks: allowed value sets and numeric lower bounds.

use super::catalog::{Bound, RuleSpec};
use super::{from_mask, require_column, Evaluation};
use crate::data::{Table, Value, ValueKey};
use std::collections::HashSet;

/// A non-null value outside the allowed set is a violation. Membership is by
/// canonical value, so a stored `1.0` matches an allowed `1`.
pub fn allowed_values(
    spec: &RuleSpec,
    table: &Table,
    column: &str,
    allowed: &[&str],
) -> Evaluation {
    let values = require_column(table, column)?;

    let allowed: HashSet<ValueKey> = allowed.iter().filter_map(|a| Value::parse(a).key()).collect();

    let mask = table.mask(|row| {
        values
            .get(row)
            .key()
            .is_some_and(|k| !allowed.contains(&k))
    });

    Ok(from_mask(spec, &mask, |row| table.project(row, &[column])))
}

/// A numeric value on the wrong side of the threshold is a violation. Null
/// cells and cells that cannot be read as a number are not checked.
pub fn numeric_min(
    spec: &RuleSpec,
    table: &Table,
    column: &str,
    threshold: f64,
    bound: Bound,
) -> Evaluation {
    let values = require_column(table, column)?;

    let mask = table.mask(|row| {
        values
            .get(row)
            .as_f64()
            .is_some_and(|v| bound.violated_by(v, threshold))
    });

    Ok(from_mask(spec, &mask, |row| table.project(row, &[column])))
}
