//! Raw result rows as returned by the [`Gateway`](crate::gateway::Gateway).
//!
//! Typed getters apply the column normalizations the domain layer relies
//! on: booleans accept either `BOOL` or `0/1` integers, timestamps become
//! whole Unix seconds, dates render as `YYYY-MM-DD`.

use flock_core::error::CoreError;
use flock_core::types::{DbId, UnixSeconds};
use flock_core::validation::{DATETIME_FORMAT, DATE_FORMAT};

use crate::gateway::SqlValue;
use crate::mappers;

/// One result row: ordered `(column, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for assembling rows in tests.
    pub fn with(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.insert(column, value.into());
        self
    }

    /// Insert or replace a column value.
    pub fn insert(&mut self, column: &str, value: SqlValue) {
        match self.columns.iter_mut().find(|(name, _)| name == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Value of a column that is NULL-able. Absent columns read as NULL.
    fn nullable(&self, column: &str) -> Option<&SqlValue> {
        match self.get(column) {
            None | Some(SqlValue::Null) => None,
            Some(value) => Some(value),
        }
    }

    fn required(&self, column: &str) -> Result<&SqlValue, CoreError> {
        self.nullable(column)
            .ok_or_else(|| CoreError::Internal(format!("Column {column} is missing or NULL")))
    }

    // -- integers --

    pub fn int(&self, column: &str) -> Result<i64, CoreError> {
        as_int(column, self.required(column)?)
    }

    pub fn opt_int(&self, column: &str) -> Result<Option<i64>, CoreError> {
        self.nullable(column).map(|v| as_int(column, v)).transpose()
    }

    pub fn id(&self, column: &str) -> Result<DbId, CoreError> {
        self.int(column)
    }

    pub fn opt_id(&self, column: &str) -> Result<Option<DbId>, CoreError> {
        self.opt_int(column)
    }

    // -- text --

    pub fn text(&self, column: &str) -> Result<String, CoreError> {
        as_text(column, self.required(column)?)
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>, CoreError> {
        self.nullable(column).map(|v| as_text(column, v)).transpose()
    }

    // -- booleans --

    pub fn flag(&self, column: &str) -> Result<bool, CoreError> {
        match self.required(column)? {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Int(n) => Ok(mappers::int_to_bool(*n)),
            other => Err(type_mismatch(column, "boolean", other)),
        }
    }

    // -- time --

    pub fn unix_seconds(&self, column: &str) -> Result<UnixSeconds, CoreError> {
        as_unix_seconds(column, self.required(column)?)
    }

    pub fn opt_unix_seconds(&self, column: &str) -> Result<Option<UnixSeconds>, CoreError> {
        self.nullable(column)
            .map(|v| as_unix_seconds(column, v))
            .transpose()
    }

    /// Date column rendered as `YYYY-MM-DD`.
    pub fn date(&self, column: &str) -> Result<String, CoreError> {
        match self.required(column)? {
            SqlValue::Date(d) => Ok(d.format(DATE_FORMAT).to_string()),
            SqlValue::DateTime(dt) => Ok(dt.date().format(DATE_FORMAT).to_string()),
            SqlValue::Text(s) => Ok(s.clone()),
            other => Err(type_mismatch(column, "date", other)),
        }
    }

    /// Date-time column rendered as `YYYY-MM-DD HH:mm`.
    pub fn datetime(&self, column: &str) -> Result<String, CoreError> {
        match self.required(column)? {
            SqlValue::DateTime(dt) => Ok(dt.format(DATETIME_FORMAT).to_string()),
            SqlValue::Timestamp(ts) => Ok(ts.naive_utc().format(DATETIME_FORMAT).to_string()),
            SqlValue::Text(s) => Ok(s.clone()),
            other => Err(type_mismatch(column, "datetime", other)),
        }
    }
}

fn as_int(column: &str, value: &SqlValue) -> Result<i64, CoreError> {
    match value {
        SqlValue::Int(n) => Ok(*n),
        other => Err(type_mismatch(column, "integer", other)),
    }
}

fn as_text(column: &str, value: &SqlValue) -> Result<String, CoreError> {
    match value {
        SqlValue::Text(s) => Ok(s.clone()),
        other => Err(type_mismatch(column, "text", other)),
    }
}

fn as_unix_seconds(column: &str, value: &SqlValue) -> Result<UnixSeconds, CoreError> {
    match value {
        SqlValue::Timestamp(ts) => Ok(mappers::to_unix_seconds(*ts)),
        SqlValue::DateTime(dt) => Ok(dt.and_utc().timestamp()),
        SqlValue::Int(n) => Ok(*n),
        other => Err(type_mismatch(column, "timestamp", other)),
    }
}

fn type_mismatch(column: &str, expected: &str, got: &SqlValue) -> CoreError {
    CoreError::Internal(format!("Column {column}: expected {expected}, got {got:?}"))
}
