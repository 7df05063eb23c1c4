//! Shared fixtures for entity-module tests.
//!
//! [`ScriptedGateway`] answers each statement through a closure and records
//! everything it was asked to run, so tests can assert which writes did or
//! did not happen without a live database.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use flock_core::auth::password::CredentialHasher;
use flock_core::error::CoreError;
use flock_core::types::DbId;
use flock_db::gateway::{Gateway, QueryOutput, SqlValue};
use flock_db::models::record::RecordTable;
use flock_db::record_change::RecordChangeLogger;
use flock_db::row::Row;

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

type Responder = dyn Fn(&str, &[SqlValue]) -> Result<QueryOutput, CoreError> + Send + Sync;

pub struct ScriptedGateway {
    responder: Box<Responder>,
    calls: Mutex<Vec<(String, Vec<SqlValue>)>>,
}

impl ScriptedGateway {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &[SqlValue]) -> Result<QueryOutput, CoreError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Gateway that fails every statement.
    pub fn failing() -> Self {
        Self::new(|_, _| Err(CoreError::Query("connection refused".into())))
    }

    pub fn calls(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.calls().into_iter().map(|(sql, _)| sql).collect()
    }

    /// Statements that modify data.
    pub fn writes(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|sql| is_write(sql))
            .collect()
    }
}

pub fn is_write(sql: &str) -> bool {
    let upper = sql.trim_start().to_ascii_uppercase();
    upper.starts_with("INSERT") || upper.starts_with("UPDATE") || upper.starts_with("DELETE")
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn query(&self, statement: &str, params: &[SqlValue]) -> Result<QueryOutput, CoreError> {
        self.calls
            .lock()
            .unwrap()
            .push((statement.to_string(), params.to_vec()));
        (self.responder)(statement, params)
    }
}

// ---------------------------------------------------------------------------
// Logger and hasher
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(RecordTable, DbId, DbId)>>,
}

impl RecordingLogger {
    pub fn entries(&self) -> Vec<(RecordTable, DbId, DbId)> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordChangeLogger for RecordingLogger {
    async fn log_record_change(&self, table: RecordTable, id: DbId, actor: DbId) {
        self.entries.lock().unwrap().push((table, id, actor));
    }
}

/// Hasher whose "hash" of `pw` is `hashed:pw`, counting calls.
#[derive(Default)]
pub struct CountingHasher {
    pub hashes: AtomicUsize,
    pub verifications: AtomicUsize,
}

impl CountingHasher {
    pub fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

impl CredentialHasher for CountingHasher {
    fn hash(&self, password: &str) -> Result<String, CoreError> {
        self.hashes.fetch_add(1, Ordering::SeqCst);
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CoreError> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        Ok(hash == format!("hashed:{password}"))
    }
}

// ---------------------------------------------------------------------------
// Row builders
// ---------------------------------------------------------------------------

pub const ACTOR: DbId = 1;

fn with_record(row: Row, id: DbId) -> Row {
    row.with("id", id)
        .with("created_by", ACTOR)
        .with("modified_by", SqlValue::Null)
        .with(
            "creation_timestamp",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .with("modification_timestamp", SqlValue::Null)
        .with("archived", false)
}

pub fn household_row(id: DbId, head_id: Option<DbId>) -> Row {
    with_record(Row::new(), id)
        .with("name", "Smith Family")
        .with("address_line1", "1 Main St")
        .with("address_line2", SqlValue::Null)
        .with("city", "Springfield")
        .with("state", "IL")
        .with("postal_code", "62701")
        .with("country", "US")
        .with("head_id", head_id.map_or(SqlValue::Null, SqlValue::Int))
}

pub fn person_row(id: DbId, household_id: DbId) -> Row {
    with_record(Row::new(), id)
        .with("first_name", "Ann")
        .with("last_name", "Smith")
        .with("gender", "female")
        .with("birth_date", NaiveDate::from_ymd_opt(1980, 4, 2).unwrap())
        .with("phone", SqlValue::Null)
        .with("email", SqlValue::Null)
        .with("title", SqlValue::Null)
        .with("household_id", household_id)
}

pub fn campaign_row(id: DbId, start: NaiveDate, end: NaiveDate) -> Row {
    with_record(Row::new(), id)
        .with("name", "Building Fund")
        .with("start_date", start)
        .with("end_date", end)
        .with("notes", SqlValue::Null)
}

pub fn donation_row(id: DbId, on: &str, campaign: Option<DbId>) -> Row {
    with_record(Row::new(), id)
        .with("date", date(on))
        .with("amount", "25.00")
        .with("household_id", 10_i64)
        .with("notes", SqlValue::Null)
        .with(
            "donation_campaign_id",
            campaign.map_or(SqlValue::Null, SqlValue::Int),
        )
}

pub fn event_row(id: DbId) -> Row {
    let at = NaiveDate::from_ymd_opt(2024, 12, 24)
        .unwrap()
        .and_hms_opt(23, 0, 0)
        .unwrap();
    with_record(Row::new(), id)
        .with("name", "Midnight Mass")
        .with("datetime", at)
        .with("location", SqlValue::Null)
}

pub fn ministry_row(id: DbId, color: i64) -> Row {
    with_record(Row::new(), id)
        .with("name", "Choir")
        .with("color", color)
}

pub fn milestone_row(id: DbId, person_id: DbId) -> Row {
    with_record(Row::new(), id)
        .with("milestone_type", "baptism")
        .with("date", NaiveDate::from_ymd_opt(2001, 6, 3).unwrap())
        .with("notes", SqlValue::Null)
        .with("person_id", person_id)
}

pub fn credentials_row(id: DbId, email: &str, password: &str, active: bool) -> Row {
    Row::new()
        .with("id", id)
        .with("email", email)
        .with("password_hash", format!("hashed:{password}"))
        .with("scope", "admin")
        .with("active", active)
}

pub fn id_row(id: DbId) -> QueryOutput {
    QueryOutput::from_rows(vec![Row::new().with("id", id)])
}

pub fn count_row(count: i64) -> QueryOutput {
    QueryOutput::from_rows(vec![Row::new().with("count", count)])
}

pub fn rows(rows: Vec<Row>) -> QueryOutput {
    QueryOutput::from_rows(rows)
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}
