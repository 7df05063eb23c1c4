/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Whole seconds since the Unix epoch, as surfaced to API consumers.
pub type UnixSeconds = i64;
