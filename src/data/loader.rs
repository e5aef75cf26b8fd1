//! CSV loading for the four input datasets.
//!
//! The reader follows RFC 4180: comma separated, optional double-quoted fields,
//! doubled quotes inside quoted fields, CRLF or LF record ends, and newlines
//! allowed inside quotes. A leading UTF-8 byte order mark is ignored and blank
//! lines are skipped.
//!
//! Loading is all-or-nothing: a missing file or a malformed record is a
//! [`QualityError`] and no checks run.

use super::table::{Table, TableName, TableSet};
use super::value::Value;
use crate::QualityError;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// A raw CSV record with the line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Low-level CSV syntax error.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvError {
    pub line: usize,
    pub message: String,
}

/// Split CSV text into records.
pub fn parse_csv(text: &str) -> Result<Vec<Record>, CsvError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();

    let mut line = 1;
    let mut record_line = 1;
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut after_quote = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => {
                    in_quotes = false;
                    after_quote = true;
                }
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            ',' => {
                fields.push(std::mem::take(&mut field));
                field_was_quoted = false;
                after_quote = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {
                // consumed together with the following '\n'
            }
            '\n' | '\r' => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, &mut fields, record_line, field_was_quoted);
                line += 1;
                record_line = line;
                field_was_quoted = false;
                after_quote = false;
            }
            '"' if field.is_empty() && !after_quote => {
                in_quotes = true;
                field_was_quoted = true;
            }
            _ if after_quote => {
                return Err(CsvError {
                    line,
                    message: format!("unexpected character '{}' after closing quote", c),
                });
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CsvError {
            line: record_line,
            message: "unterminated quoted field".to_string(),
        });
    }

    if !field.is_empty() || !fields.is_empty() || field_was_quoted {
        fields.push(field);
        push_record(&mut records, &mut fields, record_line, field_was_quoted);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<Record>, fields: &mut Vec<String>, line: usize, quoted: bool) {
    let record = std::mem::take(fields);
    // a blank line yields one empty, unquoted field
    if record.len() == 1 && record[0].is_empty() && !quoted {
        return;
    }
    records.push(Record {
        line,
        fields: record,
    });
}

/// Parse CSV text into a table. The first record is the header.
pub fn parse_table(name: TableName, text: &str) -> Result<Table, QualityError> {
    let records = parse_csv(text).map_err(|e| QualityError::Parse {
        table: name.to_string(),
        line: e.line,
        message: e.message,
    })?;

    let mut records = records.into_iter();
    let header = records.next().ok_or_else(|| QualityError::Parse {
        table: name.to_string(),
        line: 1,
        message: "missing header row".to_string(),
    })?;

    let columns: Vec<String> = header.fields.iter().map(|f| f.trim().to_string()).collect();

    let mut rows = Vec::new();
    for record in records {
        if record.fields.len() != columns.len() {
            return Err(QualityError::Parse {
                table: name.to_string(),
                line: record.line,
                message: format!(
                    "expected {} fields, found {}",
                    columns.len(),
                    record.fields.len()
                ),
            });
        }
        rows.push(record.fields.iter().map(|f| Value::parse(f)).collect());
    }

    Table::new(name, columns, rows)
}

/// Load one dataset from `<dir>/<name>.csv`.
pub fn load_table(dir: &Path, name: TableName) -> Result<Table, QualityError> {
    let path = dir.join(name.file_name());
    if !path.is_file() {
        return Err(QualityError::MissingInput { path });
    }

    let text = fs::read_to_string(&path).map_err(|source| QualityError::Io {
        context: format!("reading {}", path.display()),
        source,
    })?;

    let table = parse_table(name, &text)?;
    debug!(table = %name, columns = ?table.columns(), "parsed header");
    info!(
        table = %name,
        rows = table.row_count(),
        columns = table.columns().len(),
        "loaded table"
    );
    Ok(table)
}

/// Load all four datasets from a data directory.
pub fn load_tables(dir: &Path) -> Result<TableSet, QualityError> {
    TableName::ALL
        .iter()
        .map(|name| load_table(dir, *name))
        .collect::<Result<Vec<_>, _>>()
        .map(|tables| tables.into_iter().collect())
}
