//! Ministry membership: join of a ministry and a person.

use flock_core::error::CoreError;
use flock_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::mappers::MapRow;
use crate::models::record::{Attribution, EntityRef};
use crate::row::Row;

/// A row from the `ministry_delegations` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinistryDelegation {
    pub ministry: EntityRef,
    pub person: EntityRef,
    #[serde(flatten)]
    pub attribution: Attribution,
}

impl MapRow for MinistryDelegation {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            ministry: EntityRef {
                id: row.id("ministry_id")?,
            },
            person: EntityRef {
                id: row.id("person_id")?,
            },
            attribution: Attribution::map_row(row)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationKey {
    pub ministry_id: DbId,
    pub person_id: DbId,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinistryDelegationFilter {
    pub ministry_ids: Option<Vec<DbId>>,
    pub person_ids: Option<Vec<DbId>>,
}
