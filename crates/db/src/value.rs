//! Parameter and row value types shared by every statement the store runs.

use std::str::FromStr;
use std::sync::Arc;

use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rust_decimal::Decimal;

use crate::error::DbError;

/// A value bound to a statement parameter or read back from a result column.
///
/// Decimals are bound as their canonical text form so that fixed-point
/// amounts survive the round trip through SQLite without float conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Decimal(Decimal),
}

impl SqlValue {
    fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Integer(_) => "integer",
            SqlValue::Real(_) => "real",
            SqlValue::Text(_) => "text",
            SqlValue::Blob(_) => "blob",
            SqlValue::Decimal(_) => "decimal",
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<Decimal> for SqlValue {
    fn from(value: Decimal) -> Self {
        SqlValue::Decimal(value)
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(f) => SqlValue::Real(f),
            ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            SqlValue::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlValue::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_slice())),
            SqlValue::Decimal(d) => ToSqlOutput::Owned(Value::Text(d.to_string())),
        })
    }
}

/// A single result row with named columns.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Column names in select order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Borrow the raw value of a column by name.
    pub fn get(&self, column: &str) -> Result<&SqlValue, DbError> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|idx| self.values.get(idx))
            .ok_or_else(|| DbError::MissingColumn {
                column: column.to_string(),
            })
    }

    pub fn get_i64(&self, column: &str) -> Result<i64, DbError> {
        match self.get(column)? {
            SqlValue::Integer(i) => Ok(*i),
            other => Err(decode_error(column, other, "integer")),
        }
    }

    pub fn get_opt_i64(&self, column: &str) -> Result<Option<i64>, DbError> {
        match self.get(column)? {
            SqlValue::Null => Ok(None),
            _ => self.get_i64(column).map(Some),
        }
    }

    pub fn get_text(&self, column: &str) -> Result<String, DbError> {
        match self.get(column)? {
            SqlValue::Text(s) => Ok(s.clone()),
            other => Err(decode_error(column, other, "text")),
        }
    }

    pub fn get_opt_text(&self, column: &str) -> Result<Option<String>, DbError> {
        match self.get(column)? {
            SqlValue::Null => Ok(None),
            _ => self.get_text(column).map(Some),
        }
    }

    /// Decode a fixed-point amount.
    ///
    /// Amounts are normally stored as text; integer and real storage classes
    /// are accepted as well since SQLite may coerce values written by other
    /// tools.
    pub fn get_decimal(&self, column: &str) -> Result<Decimal, DbError> {
        match self.get(column)? {
            SqlValue::Decimal(d) => Ok(*d),
            SqlValue::Text(s) => Decimal::from_str(s.trim()).map_err(|err| DbError::Decode {
                column: column.to_string(),
                message: err.to_string(),
            }),
            SqlValue::Integer(i) => Ok(Decimal::from(*i)),
            SqlValue::Real(f) => Decimal::try_from(*f).map_err(|err| DbError::Decode {
                column: column.to_string(),
                message: err.to_string(),
            }),
            other => Err(decode_error(column, other, "decimal")),
        }
    }
}

fn decode_error(column: &str, found: &SqlValue, expected: &str) -> DbError {
    DbError::Decode {
        column: column.to_string(),
        message: format!("expected {expected}, found {}", found.type_name()),
    }
}
