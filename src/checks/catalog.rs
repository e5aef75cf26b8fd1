//! The fixed check catalog.
//!
//! Every rule is a declarative [`RuleSpec`]; the evaluators in the sibling
//! modules interpret them. Allowed-value sets and thresholds are fixed here.

use crate::data::TableName;
use crate::engine::result::Severity;

/// Supplier status values
pub const SUPPLIER_STATUSES: &[&str] = &["ACTIVE", "INACTIVE", "BLOCKED"];

/// Part active flags
pub const PART_ACTIVE_FLAGS: &[&str] = &["0", "1"];

/// Purchase order status values
pub const PO_STATUSES: &[&str] = &["OPEN", "APPROVED", "CLOSED", "CANCELLED"];

/// Purchase order currencies
pub const CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "CAD", "JPY", "INR", "AUD"];

pub const SUPPLIER_COLUMNS: &[&str] = &["supplier_id", "supplier_name", "status", "country"];
pub const PART_COLUMNS: &[&str] = &["part_id", "part_name", "part_type", "uom", "is_active"];
pub const PURCHASE_ORDER_COLUMNS: &[&str] = &[
    "po_id",
    "supplier_id",
    "po_date",
    "currency",
    "total_amount",
    "status",
];
pub const PO_LINE_COLUMNS: &[&str] = &[
    "po_line_id",
    "po_id",
    "part_id",
    "qty",
    "unit_price",
    "line_amount",
];

/// Whether a numeric threshold itself is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Value must be strictly greater than the threshold
    Exclusive,
    /// Value may equal the threshold
    Inclusive,
}

impl Bound {
    /// True when `value` is on the wrong side of `threshold`.
    pub fn violated_by(&self, value: f64, threshold: f64) -> bool {
        match self {
            Bound::Exclusive => value <= threshold,
            Bound::Inclusive => value < threshold,
        }
    }
}

/// Rule kind and its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    RequiredColumns {
        columns: &'static [&'static str],
    },
    PrimaryKeyUnique {
        column: &'static str,
    },
    NotNull {
        column: &'static str,
    },
    ForeignKeyExists {
        column: &'static str,
        parent: TableName,
        parent_column: &'static str,
    },
    AllowedValues {
        column: &'static str,
        allowed: &'static [&'static str],
    },
    NumericMin {
        column: &'static str,
        threshold: f64,
        bound: Bound,
    },
    LineAmountMath,
    PoTotalsReconcile,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpec {
    /// Table the result is reported against
    pub table: TableName,
    pub severity: Severity,
    pub kind: RuleKind,
}

impl RuleSpec {
    pub fn new(table: TableName, severity: Severity, kind: RuleKind) -> Self {
        RuleSpec {
            table,
            severity,
            kind,
        }
    }

    /// Stable identifier, parameterized by column where the kind has one.
    pub fn check_name(&self) -> String {
        match &self.kind {
            RuleKind::RequiredColumns { .. } => "required_columns".to_string(),
            RuleKind::PrimaryKeyUnique { .. } => "primary_key_unique".to_string(),
            RuleKind::NotNull { column } => format!("not_null:{}", column),
            RuleKind::ForeignKeyExists {
                column,
                parent_column,
                ..
            } => format!("fk_exists:{}->{}", column, parent_column),
            RuleKind::AllowedValues { column, .. } => format!("allowed_values:{}", column),
            RuleKind::NumericMin { column, .. } => format!("numeric_min:{}", column),
            RuleKind::LineAmountMath => "line_amount_math".to_string(),
            RuleKind::PoTotalsReconcile => "po_totals_reconcile".to_string(),
        }
    }

    /// Every table the rule reads, reported table first.
    pub fn tables(&self) -> Vec<TableName> {
        match &self.kind {
            RuleKind::ForeignKeyExists { parent, .. } => vec![self.table, *parent],
            RuleKind::PoTotalsReconcile => vec![self.table, TableName::PoLines],
            _ => vec![self.table],
        }
    }
}

fn required(table: TableName, columns: &'static [&'static str]) -> RuleSpec {
    RuleSpec::new(table, Severity::Critical, RuleKind::RequiredColumns { columns })
}

fn primary_key(table: TableName, column: &'static str) -> RuleSpec {
    RuleSpec::new(table, Severity::Critical, RuleKind::PrimaryKeyUnique { column })
}

fn not_null(table: TableName, column: &'static str) -> RuleSpec {
    RuleSpec::new(table, Severity::Critical, RuleKind::NotNull { column })
}

fn allowed(table: TableName, column: &'static str, allowed: &'static [&'static str]) -> RuleSpec {
    RuleSpec::new(table, Severity::Warn, RuleKind::AllowedValues { column, allowed })
}

fn numeric_min(
    table: TableName,
    column: &'static str,
    bound: Bound,
    severity: Severity,
) -> RuleSpec {
    RuleSpec::new(
        table,
        severity,
        RuleKind::NumericMin {
            column,
            threshold: 0.0,
            bound,
        },
    )
}

fn foreign_key(
    table: TableName,
    column: &'static str,
    parent: TableName,
    parent_column: &'static str,
) -> RuleSpec {
    RuleSpec::new(
        table,
        Severity::Critical,
        RuleKind::ForeignKeyExists {
            column,
            parent,
            parent_column,
        },
    )
}

/// Build the 27-entry catalog in report order.
pub fn create_catalog() -> Vec<RuleSpec> {
    use TableName::*;

    vec![
        // Schema
        required(Suppliers, SUPPLIER_COLUMNS),
        required(Parts, PART_COLUMNS),
        required(PurchaseOrders, PURCHASE_ORDER_COLUMNS),
        required(PoLines, PO_LINE_COLUMNS),
        // Primary keys
        primary_key(Suppliers, "supplier_id"),
        primary_key(Parts, "part_id"),
        primary_key(PurchaseOrders, "po_id"),
        primary_key(PoLines, "po_line_id"),
        // Identifiers present
        not_null(Suppliers, "supplier_id"),
        not_null(Parts, "part_id"),
        not_null(PurchaseOrders, "po_id"),
        not_null(PoLines, "po_line_id"),
        not_null(PurchaseOrders, "supplier_id"),
        not_null(PoLines, "po_id"),
        not_null(PoLines, "part_id"),
        // Allowed values
        allowed(Suppliers, "status", SUPPLIER_STATUSES),
        allowed(Parts, "is_active", PART_ACTIVE_FLAGS),
        allowed(PurchaseOrders, "status", PO_STATUSES),
        allowed(PurchaseOrders, "currency", CURRENCIES),
        // Numeric bounds
        numeric_min(PoLines, "qty", Bound::Exclusive, Severity::Critical),
        numeric_min(PoLines, "unit_price", Bound::Inclusive, Severity::Critical),
        numeric_min(PurchaseOrders, "total_amount", Bound::Inclusive, Severity::Warn),
        // Referential integrity
        foreign_key(PurchaseOrders, "supplier_id", Suppliers, "supplier_id"),
        foreign_key(PoLines, "po_id", PurchaseOrders, "po_id"),
        foreign_key(PoLines, "part_id", Parts, "part_id"),
        // Amounts
        RuleSpec::new(PoLines, Severity::Critical, RuleKind::LineAmountMath),
        RuleSpec::new(PurchaseOrders, Severity::Warn, RuleKind::PoTotalsReconcile),
    ]
}
