//! Donation campaign entity model and DTOs.

use flock_core::error::CoreError;
use flock_core::patch::Patch;
use flock_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::mappers::MapRow;
use crate::models::record::RecordMeta;
use crate::query_builder::{Pagination, SortKey};
use crate::row::Row;

/// A row from the `donation_campaigns` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationCampaign {
    #[serde(flatten)]
    pub record: RecordMeta,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub notes: Option<String>,
}

impl MapRow for DonationCampaign {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            record: RecordMeta::map_row(row)?,
            name: row.text("name")?,
            start_date: row.date("start_date")?,
            end_date: row.date("end_date")?,
            notes: row.opt_text("notes")?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonationCampaign {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationCampaignUpdate {
    pub id: DbId,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl DonationCampaignUpdate {
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.notes.is_set()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DonationCampaignSortKey {
    Id,
    Name,
    StartDate,
    EndDate,
}

impl SortKey for DonationCampaignSortKey {
    fn column(&self) -> &'static str {
        match self {
            DonationCampaignSortKey::Id => "id",
            DonationCampaignSortKey::Name => "name",
            DonationCampaignSortKey::StartDate => "start_date",
            DonationCampaignSortKey::EndDate => "end_date",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationCampaignFilter {
    pub ids: Option<Vec<DbId>>,
    #[serde(default)]
    pub archived: bool,
    pub pagination: Option<Pagination<DonationCampaignSortKey>>,
}

impl DonationCampaignFilter {
    pub fn by_id(id: DbId) -> Self {
        Self {
            ids: Some(vec![id]),
            ..Self::default()
        }
    }
}
