//! Event attendance: join of an event and a person.

use flock_core::error::CoreError;
use flock_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::mappers::MapRow;
use crate::models::record::{Attribution, EntityRef};
use crate::row::Row;

/// A row from the `event_attendance` table, keyed by `(event, person)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendance {
    pub event: EntityRef,
    pub person: EntityRef,
    pub attended: bool,
    /// `YYYY-MM-DD`
    pub date_registered: String,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl MapRow for EventAttendance {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            event: EntityRef {
                id: row.id("event_id")?,
            },
            person: EntityRef {
                id: row.id("person_id")?,
            },
            attended: row.flag("attended")?,
            date_registered: row.date("date_registered")?,
            attribution: Attribution::map_row(row)?,
        })
    }
}

/// Upsert input. Absent fields keep their stored (or default) values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAttendance {
    pub event_id: DbId,
    pub person_id: DbId,
    pub attended: Option<bool>,
    pub date_registered: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttendanceFilter {
    pub event_ids: Option<Vec<DbId>>,
    pub person_ids: Option<Vec<DbId>>,
}
