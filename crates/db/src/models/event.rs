//! Event entity model and DTOs.

use flock_core::error::CoreError;
use flock_core::patch::Patch;
use flock_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::mappers::MapRow;
use crate::models::record::RecordMeta;
use crate::query_builder::{Pagination, SortKey};
use crate::row::Row;

/// A row from the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(flatten)]
    pub record: RecordMeta,
    pub name: String,
    /// `YYYY-MM-DD HH:mm`
    pub datetime: String,
    pub location: Option<String>,
}

impl MapRow for Event {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            record: RecordMeta::map_row(row)?,
            name: row.text("name")?,
            datetime: row.datetime("datetime")?,
            location: row.opt_text("location")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub name: String,
    pub datetime: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    pub id: DbId,
    pub name: Option<String>,
    pub datetime: Option<String>,
    #[serde(default)]
    pub location: Patch<String>,
}

impl EventUpdate {
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.datetime.is_some() || self.location.is_set()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventSortKey {
    Id,
    Name,
    Datetime,
}

impl SortKey for EventSortKey {
    fn column(&self) -> &'static str {
        match self {
            EventSortKey::Id => "id",
            EventSortKey::Name => "name",
            EventSortKey::Datetime => "datetime",
        }
    }
}

/// Event list filter. `from`/`to` bound the event date (`YYYY-MM-DD`,
/// inclusive).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    pub ids: Option<Vec<DbId>>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub archived: bool,
    pub pagination: Option<Pagination<EventSortKey>>,
}

impl EventFilter {
    pub fn by_id(id: DbId) -> Self {
        Self {
            ids: Some(vec![id]),
            ..Self::default()
        }
    }
}
