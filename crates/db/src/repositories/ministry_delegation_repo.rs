//! Repository for the `ministry_delegations` join table.

use flock_core::error::CoreError;
use flock_core::types::DbId;

use crate::gateway::Gateway;
use crate::mappers::map_rows;
use crate::models::ministry_delegation::{
    DelegationKey, MinistryDelegation, MinistryDelegationFilter,
};
use crate::models::record::{RecordTable, ATTRIBUTION_COLUMNS};
use crate::query_builder::{insert_clause, where_clause, Fragment, InsertColumn, Joiner, Statement};
use crate::repositories::common::{ensure_affected, missing_reference};
use crate::repositories::{MinistryRepo, PersonRepo};

pub struct MinistryDelegationRepo;

impl MinistryDelegationRepo {
    pub async fn get_delegations(
        gw: &dyn Gateway,
        filter: &MinistryDelegationFilter,
    ) -> Result<Vec<MinistryDelegation>, CoreError> {
        let output = Statement::new(format!(
            "SELECT ministry_id, person_id, {ATTRIBUTION_COLUMNS} FROM ministry_delegations"
        ))
        .clause(where_clause(
            vec![
                Fragment::any_id("ministry_id", filter.ministry_ids.as_deref()),
                Fragment::any_id("person_id", filter.person_ids.as_deref()),
            ],
            Joiner::And,
        ))
        .push(" ORDER BY ministry_id, person_id")
        .run(gw)
        .await?;
        map_rows(&output.rows)
    }

    /// Delegate a person to a ministry. Both must exist and be non-archived;
    /// an existing delegation surfaces as a duplicate entry.
    pub async fn add_delegation(
        gw: &dyn Gateway,
        key: DelegationKey,
        actor: DbId,
    ) -> Result<(), CoreError> {
        if MinistryRepo::find_by_id(gw, key.ministry_id).await?.is_none() {
            return Err(missing_reference(RecordTable::Ministries, key.ministry_id));
        }
        if PersonRepo::find_by_id(gw, key.person_id).await?.is_none() {
            return Err(missing_reference(RecordTable::People, key.person_id));
        }

        let output = Statement::new("INSERT INTO ministry_delegations ")
            .clause(insert_clause(vec![
                InsertColumn::new("ministry_id", key.ministry_id),
                InsertColumn::new("person_id", key.person_id),
                InsertColumn::new("created_by", actor),
                InsertColumn::new("modified_by", actor),
            ]))
            .run(gw)
            .await?;
        ensure_affected(&output, "Adding delegation")?;

        tracing::info!(
            ministry_id = key.ministry_id,
            person_id = key.person_id,
            actor,
            "Delegation added"
        );
        Ok(())
    }

    /// Hard-delete one delegation.
    pub async fn remove_delegation(gw: &dyn Gateway, key: DelegationKey) -> Result<(), CoreError> {
        let output = Statement::new(
            "DELETE FROM ministry_delegations WHERE ministry_id = ? AND person_id = ?",
        )
        .bind(key.ministry_id)
        .bind(key.person_id)
        .run(gw)
        .await?;
        ensure_affected(&output, "Removing delegation")
    }

    /// Hard-delete every delegation of a ministry, returning how many went.
    pub async fn remove_all_for_ministry(
        gw: &dyn Gateway,
        ministry_id: DbId,
    ) -> Result<u64, CoreError> {
        let output = Statement::new("DELETE FROM ministry_delegations WHERE ministry_id = ?")
            .bind(ministry_id)
            .run(gw)
            .await?;
        Ok(output.rows_affected)
    }
}
