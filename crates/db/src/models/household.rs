//! Household entity model and DTOs.

use flock_core::error::CoreError;
use flock_core::patch::Patch;
use flock_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::mappers::{reference, MapRow};
use crate::models::record::{EntityRef, RecordMeta};
use crate::query_builder::{Pagination, SortKey};
use crate::row::Row;

/// Postal address of a household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// A row from the `households` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    #[serde(flatten)]
    pub record: RecordMeta,
    pub name: String,
    pub address: Address,
    pub head: Option<EntityRef>,
}

impl MapRow for Household {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            record: RecordMeta::map_row(row)?,
            name: row.text("name")?,
            address: Address {
                line1: row.text("address_line1")?,
                line2: row.opt_text("address_line2")?,
                city: row.text("city")?,
                state: row.text("state")?,
                postal_code: row.text("postal_code")?,
                country: row.text("country")?,
            },
            head: reference(row.opt_id("head_id")?),
        })
    }
}

/// DTO for creating a household. A head can only be assigned once the
/// household has members, so it is not accepted here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHousehold {
    pub name: String,
    pub address: Address,
}

/// DTO for updating a household. `address_line2` and `head_id` are
/// clearable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdUpdate {
    pub id: DbId,
    pub name: Option<String>,
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Patch<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub head_id: Patch<DbId>,
}

impl HouseholdUpdate {
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.address_line1.is_some()
            || self.address_line2.is_set()
            || self.city.is_some()
            || self.state.is_some()
            || self.postal_code.is_some()
            || self.country.is_some()
            || self.head_id.is_set()
    }

    pub fn touches_address(&self) -> bool {
        self.address_line1.is_some()
            || self.city.is_some()
            || self.state.is_some()
            || self.postal_code.is_some()
            || self.country.is_some()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HouseholdSortKey {
    Id,
    Name,
    CreationTimestamp,
}

impl SortKey for HouseholdSortKey {
    fn column(&self) -> &'static str {
        match self {
            HouseholdSortKey::Id => "id",
            HouseholdSortKey::Name => "name",
            HouseholdSortKey::CreationTimestamp => "creation_timestamp",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdFilter {
    pub ids: Option<Vec<DbId>>,
    /// Households headed by any of these people.
    pub head_ids: Option<Vec<DbId>>,
    #[serde(default)]
    pub archived: bool,
    pub pagination: Option<Pagination<HouseholdSortKey>>,
}

impl HouseholdFilter {
    pub fn by_id(id: DbId) -> Self {
        Self {
            ids: Some(vec![id]),
            ..Self::default()
        }
    }
}
