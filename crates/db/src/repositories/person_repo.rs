//! Repository for the `people` table.

use flock_core::error::CoreError;
use flock_core::patch::Patch;
use flock_core::types::DbId;

use crate::gateway::Gateway;
use crate::mappers::map_rows;
use crate::models::person::{NewPerson, Person, PersonFilter, PersonUpdate};
use crate::models::record::{RecordTable, RECORD_COLUMNS};
use crate::query_builder::{
    insert_clause, pagination_clause, set_clause, where_clause, Fragment, InsertColumn, Joiner,
    Statement,
};
use crate::record_change::RecordChangeLogger;
use crate::repositories::common::{
    archive_filter, archive_record, ensure_affected, ensure_changes, inserted_id,
    missing_reference, not_found, require_date, require_email, require_non_blank,
};
use crate::repositories::HouseholdRepo;

const COLUMNS: &str =
    "id, first_name, last_name, gender, birth_date, phone, email, title, household_id";

const TABLE: RecordTable = RecordTable::People;

pub struct PersonRepo;

impl PersonRepo {
    pub async fn get_people(
        gw: &dyn Gateway,
        filter: &PersonFilter,
    ) -> Result<Vec<Person>, CoreError> {
        let output = Statement::new(format!("SELECT {COLUMNS}, {RECORD_COLUMNS} FROM people"))
            .clause(where_clause(
                vec![
                    Fragment::any_id("id", filter.ids.as_deref()),
                    Fragment::any_id("household_id", filter.household_ids.as_deref()),
                    archive_filter(filter.archived),
                ],
                Joiner::And,
            ))
            .push(&pagination_clause(filter.pagination.as_ref()))
            .run(gw)
            .await?;
        map_rows(&output.rows)
    }

    /// Find a non-archived person by id.
    pub async fn find_by_id(gw: &dyn Gateway, id: DbId) -> Result<Option<Person>, CoreError> {
        let mut rows = Self::get_people(gw, &PersonFilter::by_id(id)).await?;
        Ok(rows.pop())
    }

    /// Number of non-archived people in a household.
    pub async fn count_in_household(
        gw: &dyn Gateway,
        household_id: DbId,
    ) -> Result<i64, CoreError> {
        let output = Statement::new(
            "SELECT COUNT(*) AS count FROM people WHERE household_id = ? AND archived = FALSE",
        )
        .bind(household_id)
        .run(gw)
        .await?;
        match output.first() {
            Some(row) => row.int("count"),
            None => Ok(0),
        }
    }

    pub async fn add_person(
        gw: &dyn Gateway,
        input: &NewPerson,
        actor: DbId,
    ) -> Result<DbId, CoreError> {
        require_non_blank("firstName", &input.first_name)?;
        require_non_blank("lastName", &input.last_name)?;
        let birth_date = require_date("birthDate", &input.birth_date)?;
        if let Some(email) = &input.email {
            require_email(email)?;
        }

        if HouseholdRepo::find_by_id(gw, input.household_id)
            .await?
            .is_none()
        {
            return Err(missing_reference(RecordTable::Households, input.household_id));
        }

        let output = Statement::new("INSERT INTO people ")
            .clause(insert_clause(vec![
                InsertColumn::new("first_name", &input.first_name),
                InsertColumn::new("last_name", &input.last_name),
                InsertColumn::new("gender", input.gender.as_str()),
                InsertColumn::new("birth_date", birth_date),
                InsertColumn::optional("phone", input.phone.as_ref()),
                InsertColumn::optional("email", input.email.as_ref()),
                InsertColumn::optional("title", input.title.as_ref()),
                InsertColumn::new("household_id", input.household_id),
                InsertColumn::new("created_by", actor),
                InsertColumn::new("modified_by", actor),
            ]))
            .push(" RETURNING id")
            .run(gw)
            .await?;

        let id = inserted_id(&output, TABLE.entity_name())?;
        tracing::info!(
            person_id = id,
            household_id = input.household_id,
            actor,
            "Person created"
        );
        Ok(id)
    }

    /// Apply a partial update.
    ///
    /// Moving a person to another household clears the previous household's
    /// head pointer if it pointed at this person. The new household's head is
    /// left untouched.
    pub async fn update_person(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        input: &PersonUpdate,
        actor: DbId,
    ) -> Result<(), CoreError> {
        let existing = Self::find_by_id(gw, input.id)
            .await?
            .ok_or_else(|| not_found(TABLE, input.id))?;
        ensure_changes(input.has_changes())?;

        if let Some(first_name) = &input.first_name {
            require_non_blank("firstName", first_name)?;
        }
        if let Some(last_name) = &input.last_name {
            require_non_blank("lastName", last_name)?;
        }
        let birth_date = input
            .birth_date
            .as_deref()
            .map(|d| require_date("birthDate", d))
            .transpose()?;
        if let Patch::Value(email) = &input.email {
            require_email(email)?;
        }

        let previous_household = existing.household.id;
        let moved_to = input.household_id.filter(|&h| h != previous_household);
        if let Some(household_id) = moved_to {
            if HouseholdRepo::find_by_id(gw, household_id).await?.is_none() {
                return Err(missing_reference(RecordTable::Households, household_id));
            }
        }

        let output = Statement::new("UPDATE people")
            .clause(set_clause(vec![
                Fragment::optional("first_name = ?", input.first_name.as_ref()),
                Fragment::optional("last_name = ?", input.last_name.as_ref()),
                Fragment::optional("gender = ?", input.gender.map(|g| g.as_str())),
                Fragment::optional("birth_date = ?", birth_date),
                Fragment::patch("phone", &input.phone),
                Fragment::patch("email", &input.email),
                Fragment::patch("title", &input.title),
                Fragment::optional("household_id = ?", input.household_id),
                Fragment::bind("modified_by = ?", actor),
            ]))
            .push(" WHERE id = ?")
            .bind(input.id)
            .run(gw)
            .await?;
        ensure_affected(&output, "Person update")?;

        logger.log_record_change(TABLE, input.id, actor).await;

        if moved_to.is_some() {
            let cleared = HouseholdRepo::clear_head_if(gw, previous_household, input.id).await?;
            if cleared > 0 {
                tracing::info!(
                    person_id = input.id,
                    household_id = previous_household,
                    "Cleared head of previous household"
                );
            }
        }
        Ok(())
    }

    /// Soft-delete a person and clear any head pointer referencing them.
    pub async fn archive_person(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        id: DbId,
        actor: DbId,
    ) -> Result<(), CoreError> {
        archive_record(gw, TABLE, id, actor).await?;
        HouseholdRepo::clear_head_for_person(gw, id).await?;
        tracing::info!(person_id = id, actor, "Person archived");

        logger.log_record_change(TABLE, id, actor).await;
        Ok(())
    }
}
