//! Execution gateway: the only path from entity code to the database.
//!
//! Entity modules build a statement plus a positional parameter list and
//! hand both to a [`Gateway`]. The production implementation,
//! [`PgGateway`], runs them on a pooled Postgres connection and normalizes
//! failures: unique-key violations become [`CoreError::DuplicateEntry`],
//! anything else becomes [`CoreError::Query`] carrying the engine message.
//! A connection is checked out per statement and returned immediately, so
//! multi-statement operations are never atomic.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use flock_core::error::CoreError;
use flock_core::types::Timestamp;
use serde::Serialize;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo};

use crate::row::Row;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// A bound parameter or a decoded column value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(Timestamp),
    IntList(Vec<i64>),
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        SqlValue::Text(v.clone())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::DateTime(v)
    }
}

impl From<Timestamp> for SqlValue {
    fn from(v: Timestamp) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl From<Vec<i64>> for SqlValue {
    fn from(v: Vec<i64>) -> Self {
        SqlValue::IntList(v)
    }
}

impl From<&[i64]> for SqlValue {
    fn from(v: &[i64]) -> Self {
        SqlValue::IntList(v.to_vec())
    }
}

/// Result of one statement.
///
/// Row-returning statements fill `rows` and report the row count as
/// `rows_affected`; other statements leave `rows` empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub rows: Vec<Row>,
    pub rows_affected: u64,
}

impl QueryOutput {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let rows_affected = rows.len() as u64;
        Self {
            rows,
            rows_affected,
        }
    }

    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows: Vec::new(),
            rows_affected,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }
}

/// Executes one parameterized statement.
///
/// `statement` uses Postgres `$n` placeholders; `params[n - 1]` binds to
/// `$n`. Values are always bound, never interpolated.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn query(&self, statement: &str, params: &[SqlValue]) -> Result<QueryOutput, CoreError>;
}

/// [`Gateway`] backed by a sqlx Postgres pool.
#[derive(Debug, Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn query(&self, statement: &str, params: &[SqlValue]) -> Result<QueryOutput, CoreError> {
        tracing::debug!(statement, params = params.len(), "Executing statement");

        let mut query = sqlx::query(statement);
        for value in params {
            query = bind_value(query, value);
        }

        if returns_rows(statement) {
            let rows = query.fetch_all(&self.pool).await.map_err(normalize_error)?;
            let rows = rows.iter().map(decode_row).collect::<Result<Vec<_>, _>>()?;
            Ok(QueryOutput::from_rows(rows))
        } else {
            let done = query.execute(&self.pool).await.map_err(normalize_error)?;
            Ok(QueryOutput::affected(done.rows_affected()))
        }
    }
}

/// `true` for statements whose result set must be fetched.
fn returns_rows(statement: &str) -> bool {
    let upper = statement.trim_start().to_ascii_uppercase();
    upper.starts_with("SELECT") || upper.starts_with("WITH") || upper.contains(" RETURNING ")
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Float(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Date(v) => query.bind(*v),
        SqlValue::DateTime(v) => query.bind(*v),
        SqlValue::Timestamp(v) => query.bind(*v),
        SqlValue::IntList(v) => query.bind(v.clone()),
    }
}

/// Decode a Postgres row into a [`Row`] keyed by column name.
fn decode_row(row: &PgRow) -> Result<Row, CoreError> {
    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let value = match column.type_info().name() {
            "BOOL" => row
                .try_get::<Option<bool>, _>(idx)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::Bool)),
            "INT2" => row
                .try_get::<Option<i16>, _>(idx)
                .map(|v| v.map_or(SqlValue::Null, |n| SqlValue::Int(i64::from(n)))),
            "INT4" => row
                .try_get::<Option<i32>, _>(idx)
                .map(|v| v.map_or(SqlValue::Null, |n| SqlValue::Int(i64::from(n)))),
            "INT8" => row
                .try_get::<Option<i64>, _>(idx)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::Int)),
            "FLOAT4" => row
                .try_get::<Option<f32>, _>(idx)
                .map(|v| v.map_or(SqlValue::Null, |n| SqlValue::Float(f64::from(n)))),
            "FLOAT8" => row
                .try_get::<Option<f64>, _>(idx)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::Float)),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(idx)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::Date)),
            "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(idx)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::DateTime)),
            "TIMESTAMPTZ" => row
                .try_get::<Option<Timestamp>, _>(idx)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::Timestamp)),
            "INT8[]" => row
                .try_get::<Option<Vec<i64>>, _>(idx)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::IntList)),
            _ => row
                .try_get::<Option<String>, _>(idx)
                .map(|v| v.map_or(SqlValue::Null, SqlValue::Text)),
        }
        .map_err(|e| CoreError::Query(format!("Failed to decode column {name}: {e}")))?;
        out.insert(name, value);
    }
    Ok(out)
}

/// Map a sqlx failure onto the gateway's error contract.
fn normalize_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let what = db_err
                .constraint()
                .map(|c| format!("value violates unique constraint {c}"))
                .unwrap_or_else(|| db_err.message().to_string());
            return CoreError::DuplicateEntry(what);
        }
    }
    tracing::error!(error = %err, "Statement failed");
    CoreError::Query(err.to_string())
}
