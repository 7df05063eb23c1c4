//! Milestone entity model and DTOs.

use flock_core::error::CoreError;
use flock_core::patch::Patch;
use flock_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::mappers::MapRow;
use crate::models::record::{EntityRef, RecordMeta};
use crate::query_builder::{Pagination, SortKey};
use crate::row::Row;

/// Kind of life event recorded for a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneType {
    Baptism,
    Confirmation,
    FirstCommunion,
    Marriage,
    Membership,
    Death,
}

impl MilestoneType {
    pub fn as_str(self) -> &'static str {
        match self {
            MilestoneType::Baptism => "baptism",
            MilestoneType::Confirmation => "confirmation",
            MilestoneType::FirstCommunion => "first_communion",
            MilestoneType::Marriage => "marriage",
            MilestoneType::Membership => "membership",
            MilestoneType::Death => "death",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "baptism" => Ok(MilestoneType::Baptism),
            "confirmation" => Ok(MilestoneType::Confirmation),
            "first_communion" => Ok(MilestoneType::FirstCommunion),
            "marriage" => Ok(MilestoneType::Marriage),
            "membership" => Ok(MilestoneType::Membership),
            "death" => Ok(MilestoneType::Death),
            other => Err(CoreError::Internal(format!(
                "Unknown milestone type '{other}'"
            ))),
        }
    }
}

/// A row from the `milestones` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(flatten)]
    pub record: RecordMeta,
    pub milestone_type: MilestoneType,
    /// `YYYY-MM-DD`
    pub date: String,
    pub notes: Option<String>,
    pub person: EntityRef,
}

impl MapRow for Milestone {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            record: RecordMeta::map_row(row)?,
            milestone_type: MilestoneType::parse(&row.text("milestone_type")?)?,
            date: row.date("date")?,
            notes: row.opt_text("notes")?,
            person: EntityRef {
                id: row.id("person_id")?,
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMilestone {
    pub milestone_type: MilestoneType,
    pub date: String,
    pub notes: Option<String>,
    pub person_id: DbId,
}

/// DTO for updating a milestone. The person it belongs to cannot change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneUpdate {
    pub id: DbId,
    pub milestone_type: Option<MilestoneType>,
    pub date: Option<String>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl MilestoneUpdate {
    pub fn has_changes(&self) -> bool {
        self.milestone_type.is_some() || self.date.is_some() || self.notes.is_set()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MilestoneSortKey {
    Id,
    Date,
}

impl SortKey for MilestoneSortKey {
    fn column(&self) -> &'static str {
        match self {
            MilestoneSortKey::Id => "id",
            MilestoneSortKey::Date => "date",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneFilter {
    pub ids: Option<Vec<DbId>>,
    pub person_ids: Option<Vec<DbId>>,
    #[serde(default)]
    pub archived: bool,
    pub pagination: Option<Pagination<MilestoneSortKey>>,
}

impl MilestoneFilter {
    pub fn by_id(id: DbId) -> Self {
        Self {
            ids: Some(vec![id]),
            ..Self::default()
        }
    }
}
