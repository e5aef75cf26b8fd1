//! Cell values.
//!
//! Every field of a loaded dataset becomes a [`Value`]. Types are inferred per
//! cell (integer, then decimal, then boolean, else text) so a column that mixes
//! `1` and `invalid` still loads and the bad cell is left for a check to flag.

use serde::{Serialize, Serializer};
use std::fmt;

/// A single typed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Decimal(f64),
    Text(String),
    Boolean(bool),
}

/// Hashable identity of a non-null value, used for key and membership tests.
///
/// Integral decimals collapse onto integers so `1.0` and `1` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Integer(i64),
    Decimal(u64),
    Text(String),
    Boolean(bool),
}

impl Value {
    /// Infer a value from a raw field. Empty and whitespace-only fields are null.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Value::Null;
        }

        if let Ok(i) = raw.parse::<i64>() {
            return Value::Integer(i);
        }

        // f64 parsing accepts "nan" and "inf"; those stay text
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return Value::Decimal(f);
            }
        }

        if raw.eq_ignore_ascii_case("true") {
            return Value::Boolean(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Value::Boolean(false);
        }

        Value::Text(raw.to_string())
    }

    /// True for null and for empty text.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric reading of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Decimal(f) => Some(*f),
            _ => None,
        }
    }

    /// Comparison key; `None` for null values.
    pub fn key(&self) -> Option<ValueKey> {
        if self.is_null() {
            return None;
        }

        let key = match self {
            Value::Integer(i) => ValueKey::Integer(*i),
            Value::Decimal(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    ValueKey::Integer(*f as i64)
                } else {
                    ValueKey::Decimal(f.to_bits())
                }
            }
            Value::Text(s) => ValueKey::Text(s.trim().to_string()),
            Value::Boolean(b) => ValueKey::Boolean(*b),
            Value::Null => return None,
        };

        Some(key)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Decimal(f)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Decimal(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}
