//! Repository for the `households` table.

use flock_core::error::CoreError;
use flock_core::patch::Patch;
use flock_core::types::DbId;
use flock_core::validation::is_valid_address;

use crate::gateway::Gateway;
use crate::mappers::map_rows;
use crate::models::household::{Household, HouseholdFilter, HouseholdUpdate, NewHousehold};
use crate::models::record::{RecordTable, RECORD_COLUMNS};
use crate::query_builder::{
    insert_clause, pagination_clause, set_clause, where_clause, Fragment, InsertColumn, Joiner,
    Statement,
};
use crate::record_change::RecordChangeLogger;
use crate::repositories::common::{
    archive_filter, archive_record, ensure_affected, ensure_changes, inserted_id,
    missing_reference, not_found, require_name,
};
use crate::repositories::PersonRepo;

const COLUMNS: &str =
    "id, name, address_line1, address_line2, city, state, postal_code, country, head_id";

const TABLE: RecordTable = RecordTable::Households;

/// Households, their address and head-of-household pointer.
pub struct HouseholdRepo;

impl HouseholdRepo {
    /// List households matching `filter`. Archived rows are excluded unless
    /// requested.
    pub async fn get_households(
        gw: &dyn Gateway,
        filter: &HouseholdFilter,
    ) -> Result<Vec<Household>, CoreError> {
        let output = Statement::new(format!("SELECT {COLUMNS}, {RECORD_COLUMNS} FROM households"))
            .clause(where_clause(
                vec![
                    Fragment::any_id("id", filter.ids.as_deref()),
                    Fragment::any_id("head_id", filter.head_ids.as_deref()),
                    archive_filter(filter.archived),
                ],
                Joiner::And,
            ))
            .push(&pagination_clause(filter.pagination.as_ref()))
            .run(gw)
            .await?;
        map_rows(&output.rows)
    }

    /// Find a non-archived household by id.
    pub async fn find_by_id(gw: &dyn Gateway, id: DbId) -> Result<Option<Household>, CoreError> {
        let mut rows = Self::get_households(gw, &HouseholdFilter::by_id(id)).await?;
        Ok(rows.pop())
    }

    /// Insert a household, returning its generated id. `address.line2` is
    /// only written when present.
    pub async fn add_household(
        gw: &dyn Gateway,
        input: &NewHousehold,
        actor: DbId,
    ) -> Result<DbId, CoreError> {
        require_name("name", &input.name)?;
        let address = &input.address;
        if !is_valid_address(
            &address.line1,
            &address.city,
            &address.state,
            &address.postal_code,
            &address.country,
        ) {
            return Err(CoreError::validation("Address is incomplete"));
        }

        let output = Statement::new("INSERT INTO households ")
            .clause(insert_clause(vec![
                InsertColumn::new("name", &input.name),
                InsertColumn::new("address_line1", &address.line1),
                InsertColumn::optional("address_line2", address.line2.as_ref()),
                InsertColumn::new("city", &address.city),
                InsertColumn::new("state", &address.state),
                InsertColumn::new("postal_code", &address.postal_code),
                InsertColumn::new("country", &address.country),
                InsertColumn::new("created_by", actor),
                InsertColumn::new("modified_by", actor),
            ]))
            .push(" RETURNING id")
            .run(gw)
            .await?;

        let id = inserted_id(&output, TABLE.entity_name())?;
        tracing::info!(household_id = id, actor, "Household created");
        Ok(id)
    }

    /// Apply a partial update.
    ///
    /// A new head must be an existing, non-archived member of this household.
    pub async fn update_household(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        input: &HouseholdUpdate,
        actor: DbId,
    ) -> Result<(), CoreError> {
        let existing = Self::find_by_id(gw, input.id)
            .await?
            .ok_or_else(|| not_found(TABLE, input.id))?;
        ensure_changes(input.has_changes())?;

        if let Some(name) = &input.name {
            require_name("name", name)?;
        }
        if input.touches_address() {
            let current = &existing.address;
            let pick =
                |new: &Option<String>, old: &String| new.clone().unwrap_or_else(|| old.clone());
            if !is_valid_address(
                &pick(&input.address_line1, &current.line1),
                &pick(&input.city, &current.city),
                &pick(&input.state, &current.state),
                &pick(&input.postal_code, &current.postal_code),
                &pick(&input.country, &current.country),
            ) {
                return Err(CoreError::validation("Address is incomplete"));
            }
        }

        if let Patch::Value(head_id) = input.head_id {
            let person = PersonRepo::find_by_id(gw, head_id)
                .await?
                .ok_or_else(|| missing_reference(RecordTable::People, head_id))?;
            if person.household.id != input.id {
                return Err(CoreError::validation(format!(
                    "Person {head_id} is not a member of household {}",
                    input.id
                )));
            }
        }

        let output = Statement::new("UPDATE households")
            .clause(set_clause(vec![
                Fragment::optional("name = ?", input.name.as_ref()),
                Fragment::optional("address_line1 = ?", input.address_line1.as_ref()),
                Fragment::patch("address_line2", &input.address_line2),
                Fragment::optional("city = ?", input.city.as_ref()),
                Fragment::optional("state = ?", input.state.as_ref()),
                Fragment::optional("postal_code = ?", input.postal_code.as_ref()),
                Fragment::optional("country = ?", input.country.as_ref()),
                Fragment::patch("head_id", &input.head_id),
                Fragment::bind("modified_by = ?", actor),
            ]))
            .push(" WHERE id = ?")
            .bind(input.id)
            .run(gw)
            .await?;
        ensure_affected(&output, "Household update")?;

        logger.log_record_change(TABLE, input.id, actor).await;
        Ok(())
    }

    /// Soft-delete a household. Refused while it still has current members.
    pub async fn archive_household(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        id: DbId,
        actor: DbId,
    ) -> Result<(), CoreError> {
        let members = PersonRepo::count_in_household(gw, id).await?;
        if members > 0 {
            return Err(CoreError::validation(format!(
                "Household {id} still has {members} member(s)"
            )));
        }

        archive_record(gw, TABLE, id, actor).await?;
        tracing::info!(household_id = id, actor, "Household archived");

        logger.log_record_change(TABLE, id, actor).await;
        Ok(())
    }

    /// Clear the head pointer of `household_id` only if it points at
    /// `person_id`.
    pub async fn clear_head_if(
        gw: &dyn Gateway,
        household_id: DbId,
        person_id: DbId,
    ) -> Result<u64, CoreError> {
        let output =
            Statement::new("UPDATE households SET head_id = NULL WHERE id = ? AND head_id = ?")
                .bind(household_id)
                .bind(person_id)
                .run(gw)
                .await?;
        Ok(output.rows_affected)
    }

    /// Clear every head pointer referencing `person_id`.
    pub async fn clear_head_for_person(
        gw: &dyn Gateway,
        person_id: DbId,
    ) -> Result<u64, CoreError> {
        let output = Statement::new("UPDATE households SET head_id = NULL WHERE head_id = ?")
            .bind(person_id)
            .run(gw)
            .await?;
        Ok(output.rows_affected)
    }
}
