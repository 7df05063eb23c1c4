//! Ministry entity model and DTOs.

use flock_core::error::CoreError;
use flock_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::mappers::{color_to_hex, MapRow};
use crate::models::record::RecordMeta;
use crate::query_builder::{Pagination, SortKey};
use crate::row::Row;

/// Color given to a ministry created without one.
pub const DEFAULT_MINISTRY_COLOR: &str = "#B3BFB8";

/// A row from the `ministries` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ministry {
    #[serde(flatten)]
    pub record: RecordMeta,
    pub name: String,
    /// Uppercase `#RRGGBB`.
    pub color: String,
}

impl MapRow for Ministry {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            record: RecordMeta::map_row(row)?,
            name: row.text("name")?,
            color: color_to_hex(row.int("color")?),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMinistry {
    pub name: String,
    /// Defaults to [`DEFAULT_MINISTRY_COLOR`].
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinistryUpdate {
    pub id: DbId,
    pub name: Option<String>,
    pub color: Option<String>,
}

impl MinistryUpdate {
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.color.is_some()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MinistrySortKey {
    Id,
    Name,
}

impl SortKey for MinistrySortKey {
    fn column(&self) -> &'static str {
        match self {
            MinistrySortKey::Id => "id",
            MinistrySortKey::Name => "name",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinistryFilter {
    pub ids: Option<Vec<DbId>>,
    #[serde(default)]
    pub archived: bool,
    pub pagination: Option<Pagination<MinistrySortKey>>,
}

impl MinistryFilter {
    pub fn by_id(id: DbId) -> Self {
        Self {
            ids: Some(vec![id]),
            ..Self::default()
        }
    }
}
