//! Key checks: primary key uniqueness, required identifiers, foreign keys.

use super::catalog::RuleSpec;
use super::{from_mask, require_column, Evaluation};
use crate::data::{Table, ValueKey};
use std::collections::{HashMap, HashSet};

/// Every row whose non-null key value occurs more than once is a violation,
/// including the first occurrence.
pub fn primary_key_unique(spec: &RuleSpec, table: &Table, column: &str) -> Evaluation {
    let key = require_column(table, column)?;

    let mut occurrences: HashMap<ValueKey, usize> = HashMap::new();
    for value in key.values() {
        if let Some(k) = value.key() {
            *occurrences.entry(k).or_insert(0) += 1;
        }
    }

    let mask = table.mask(|row| {
        key.get(row)
            .key()
            .is_some_and(|k| occurrences.get(&k).copied().unwrap_or(0) > 1)
    });

    Ok(from_mask(spec, &mask, |row| table.project(row, &[column])))
}

/// Null, missing, and empty values are violations.
pub fn not_null(spec: &RuleSpec, table: &Table, column: &str) -> Evaluation {
    let values = require_column(table, column)?;
    let mask = table.mask(|row| values.get(row).is_null());
    Ok(from_mask(spec, &mask, |row| table.project(row, &[column])))
}

/// A non-null child value must appear among the parent's key values.
/// Null child values are exempt; `not_null` reports those.
pub fn fk_exists(
    spec: &RuleSpec,
    child: &Table,
    column: &str,
    parent: &Table,
    parent_column: &str,
) -> Evaluation {
    let foreign = require_column(child, column)?;
    let referenced = require_column(parent, parent_column)?;

    let parent_keys: HashSet<ValueKey> = referenced.values().filter_map(|v| v.key()).collect();

    let mask = child.mask(|row| {
        foreign
            .get(row)
            .key()
            .is_some_and(|k| !parent_keys.contains(&k))
    });

    Ok(from_mask(spec, &mask, |row| child.project(row, &[column])))
}
