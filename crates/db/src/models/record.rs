//! The Record shape shared by every persisted entity.

use flock_core::error::CoreError;
use flock_core::types::{DbId, UnixSeconds};
use serde::Serialize;

use crate::mappers::{reference, MapRow};
use crate::row::Row;

/// Attribution and archive columns present on every entity table. Appended to
/// each entity's own column list.
pub const RECORD_COLUMNS: &str =
    "created_by, modified_by, creation_timestamp, modification_timestamp, archived";

/// Attribution columns of join tables, which carry no archive flag.
pub const ATTRIBUTION_COLUMNS: &str =
    "created_by, modified_by, creation_timestamp, modification_timestamp";

/// Reference to another entity by id. Nested objects are resolved on read by
/// the API layer, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityRef {
    pub id: DbId,
}

/// Who created/last modified a row and when.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    pub created_by: Option<EntityRef>,
    pub modified_by: Option<EntityRef>,
    pub creation_timestamp: UnixSeconds,
    pub modification_timestamp: Option<UnixSeconds>,
}

impl MapRow for Attribution {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            created_by: reference(row.opt_id("created_by")?),
            modified_by: reference(row.opt_id("modified_by")?),
            creation_timestamp: row.unix_seconds("creation_timestamp")?,
            modification_timestamp: row.opt_unix_seconds("modification_timestamp")?,
        })
    }
}

/// Id, attribution and soft-delete flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    pub id: DbId,
    #[serde(flatten)]
    pub attribution: Attribution,
    pub archived: bool,
}

impl MapRow for RecordMeta {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            id: row.id("id")?,
            attribution: Attribution::map_row(row)?,
            archived: row.flag("archived")?,
        })
    }
}

/// Tables carrying the Record shape, as passed to the record-change logger
/// and the archive helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTable {
    Clients,
    Households,
    People,
    Donations,
    DonationCampaigns,
    Events,
    Ministries,
    Milestones,
}

impl RecordTable {
    pub fn table_name(self) -> &'static str {
        match self {
            RecordTable::Clients => "clients",
            RecordTable::Households => "households",
            RecordTable::People => "people",
            RecordTable::Donations => "donations",
            RecordTable::DonationCampaigns => "donation_campaigns",
            RecordTable::Events => "events",
            RecordTable::Ministries => "ministries",
            RecordTable::Milestones => "milestones",
        }
    }

    /// Entity name used in error messages.
    pub fn entity_name(self) -> &'static str {
        match self {
            RecordTable::Clients => "Client",
            RecordTable::Households => "Household",
            RecordTable::People => "Person",
            RecordTable::Donations => "Donation",
            RecordTable::DonationCampaigns => "DonationCampaign",
            RecordTable::Events => "Event",
            RecordTable::Ministries => "Ministry",
            RecordTable::Milestones => "Milestone",
        }
    }
}
