//! Person entity model and DTOs.

use flock_core::error::CoreError;
use flock_core::patch::Patch;
use flock_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::mappers::MapRow;
use crate::models::record::{EntityRef, RecordMeta};
use crate::query_builder::{Pagination, SortKey};
use crate::row::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(CoreError::Internal(format!("Unknown gender '{other}'"))),
        }
    }
}

/// A row from the `people` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(flatten)]
    pub record: RecordMeta,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    pub household: EntityRef,
}

impl MapRow for Person {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            record: RecordMeta::map_row(row)?,
            first_name: row.text("first_name")?,
            last_name: row.text("last_name")?,
            gender: Gender::parse(&row.text("gender")?)?,
            birth_date: row.date("birth_date")?,
            phone: row.opt_text("phone")?,
            email: row.opt_text("email")?,
            title: row.opt_text("title")?,
            household: EntityRef {
                id: row.id("household_id")?,
            },
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    pub household_id: DbId,
}

/// DTO for updating a person. Contact fields and title are clearable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonUpdate {
    pub id: DbId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<String>,
    #[serde(default)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub title: Patch<String>,
    pub household_id: Option<DbId>,
}

impl PersonUpdate {
    pub fn has_changes(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.gender.is_some()
            || self.birth_date.is_some()
            || self.phone.is_set()
            || self.email.is_set()
            || self.title.is_set()
            || self.household_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonSortKey {
    Id,
    FirstName,
    LastName,
    BirthDate,
}

impl SortKey for PersonSortKey {
    fn column(&self) -> &'static str {
        match self {
            PersonSortKey::Id => "id",
            PersonSortKey::FirstName => "first_name",
            PersonSortKey::LastName => "last_name",
            PersonSortKey::BirthDate => "birth_date",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonFilter {
    pub ids: Option<Vec<DbId>>,
    pub household_ids: Option<Vec<DbId>>,
    #[serde(default)]
    pub archived: bool,
    pub pagination: Option<Pagination<PersonSortKey>>,
}

impl PersonFilter {
    pub fn by_id(id: DbId) -> Self {
        Self {
            ids: Some(vec![id]),
            ..Self::default()
        }
    }
}
