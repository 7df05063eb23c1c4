//! Donation entity model and DTOs.

use flock_core::error::CoreError;
use flock_core::patch::Patch;
use flock_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::mappers::{reference, MapRow};
use crate::models::record::{EntityRef, RecordMeta};
use crate::query_builder::{Pagination, SortKey};
use crate::row::Row;

/// A row from the `donations` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    #[serde(flatten)]
    pub record: RecordMeta,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Decimal string with two fractional digits.
    pub amount: String,
    pub household: EntityRef,
    pub notes: Option<String>,
    pub donation_campaign: Option<EntityRef>,
}

impl MapRow for Donation {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            record: RecordMeta::map_row(row)?,
            date: row.date("date")?,
            amount: row.text("amount")?,
            household: EntityRef {
                id: row.id("household_id")?,
            },
            notes: row.opt_text("notes")?,
            donation_campaign: reference(row.opt_id("donation_campaign_id")?),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    pub date: String,
    pub amount: String,
    pub household_id: DbId,
    pub notes: Option<String>,
    pub donation_campaign_id: Option<DbId>,
}

/// DTO for updating a donation. The household is fixed at creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationUpdate {
    pub id: DbId,
    pub date: Option<String>,
    pub amount: Option<String>,
    #[serde(default)]
    pub notes: Patch<String>,
    #[serde(default)]
    pub donation_campaign_id: Patch<DbId>,
}

impl DonationUpdate {
    pub fn has_changes(&self) -> bool {
        self.date.is_some()
            || self.amount.is_some()
            || self.notes.is_set()
            || self.donation_campaign_id.is_set()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DonationSortKey {
    Id,
    Date,
    Amount,
}

impl SortKey for DonationSortKey {
    fn column(&self) -> &'static str {
        match self {
            DonationSortKey::Id => "id",
            DonationSortKey::Date => "date",
            // Qualified so ORDER BY reads the NUMERIC column, not the text alias.
            DonationSortKey::Amount => "donations.amount",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationFilter {
    pub ids: Option<Vec<DbId>>,
    pub household_ids: Option<Vec<DbId>>,
    pub donation_campaign_ids: Option<Vec<DbId>>,
    #[serde(default)]
    pub archived: bool,
    pub pagination: Option<Pagination<DonationSortKey>>,
}

impl DonationFilter {
    pub fn by_id(id: DbId) -> Self {
        Self {
            ids: Some(vec![id]),
            ..Self::default()
        }
    }
}
