//! Data module for po-quality
//!
//! Contains the cell value type, the in-memory table model, and the CSV loader
//! that supplies the four procurement datasets.

pub mod loader;
pub mod table;
pub mod value;

pub use loader::{load_table, load_tables, parse_table};
pub use table::{Column, Mask, Table, TableName, TableSet};
pub use value::{Value, ValueKey};
