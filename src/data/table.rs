//! In-memory table model.
//!
//! A [`Table`] is an immutable, ordered set of rows sharing one declared column
//! list. Checks read it through [`Column`] accessors and describe violations
//! with a boolean [`Mask`] over the rows.

use super::value::Value;
use crate::QualityError;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The four procurement datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Suppliers,
    Parts,
    PurchaseOrders,
    PoLines,
}

impl TableName {
    /// All datasets in load order
    pub const ALL: [TableName; 4] = [
        TableName::Suppliers,
        TableName::Parts,
        TableName::PurchaseOrders,
        TableName::PoLines,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Suppliers => "suppliers",
            TableName::Parts => "parts",
            TableName::PurchaseOrders => "purchase_orders",
            TableName::PoLines => "po_lines",
        }
    }

    /// File name of the dataset inside the data directory
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.as_str())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One loaded dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: TableName,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table, rejecting rows whose width differs from the header.
    pub fn new(
        name: TableName,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, QualityError> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(QualityError::Parse {
                    table: name.to_string(),
                    line: 1,
                    message: format!("duplicate column '{}'", column),
                });
            }
        }

        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(QualityError::Parse {
                table: name.to_string(),
                // header is line 1
                line: idx + 2,
                message: format!("expected {} fields, found {}", columns.len(), row.len()),
            });
        }

        Ok(Table {
            name,
            columns,
            rows,
        })
    }

    pub fn name(&self) -> TableName {
        self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Required columns absent from this table, in the order given.
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|c| !self.has_column(c))
            .collect()
    }

    /// Accessor for a named column.
    pub fn column(&self, column: &str) -> Option<Column<'_>> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|index| Column {
                table: self,
                index,
            })
    }

    /// Mark every row for which `violates` returns true.
    pub fn mask<F>(&self, mut violates: F) -> Mask
    where
        F: FnMut(usize) -> bool,
    {
        Mask((0..self.rows.len()).map(|row| violates(row)).collect())
    }

    /// Copy the named columns of one row, skipping columns the table lacks.
    pub fn project(&self, row: usize, columns: &[&str]) -> IndexMap<String, Value> {
        columns
            .iter()
            .filter_map(|name| {
                self.column(name)
                    .map(|col| (name.to_string(), col.get(row).clone()))
            })
            .collect()
    }
}

/// Borrowed view of one column.
#[derive(Debug, Clone, Copy)]
pub struct Column<'t> {
    table: &'t Table,
    index: usize,
}

impl<'t> Column<'t> {
    /// Value at `row`. Callers index rows produced by the same table.
    pub fn get(&self, row: usize) -> &'t Value {
        &self.table.rows[row][self.index]
    }

    pub fn values(&self) -> impl Iterator<Item = &'t Value> + 't {
        let index = self.index;
        self.table.rows.iter().map(move |row| &row[index])
    }
}

/// Boolean row mask; `true` marks a violating row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mask(Vec<bool>);

impl Mask {
    pub fn count(&self) -> usize {
        self.0.iter().filter(|v| **v).count()
    }

    /// Indices of marked rows in encounter order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, v)| if *v { Some(i) } else { None })
    }
}

/// The loaded datasets for one run, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    tables: BTreeMap<TableName, Table>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any previous table of the same name.
    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name(), table);
    }

    pub fn get(&self, name: TableName) -> Option<&Table> {
        self.tables.get(&name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<Table> for TableSet {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut set = TableSet::new();
        for table in iter {
            set.insert(table);
        }
        set
    }
}
