//! Repository for the `milestones` table.

use flock_core::error::CoreError;
use flock_core::types::DbId;

use crate::gateway::Gateway;
use crate::mappers::map_rows;
use crate::models::milestone::{Milestone, MilestoneFilter, MilestoneUpdate, NewMilestone};
use crate::models::record::{RecordTable, RECORD_COLUMNS};
use crate::query_builder::{
    insert_clause, pagination_clause, set_clause, where_clause, Fragment, InsertColumn, Joiner,
    Statement,
};
use crate::record_change::RecordChangeLogger;
use crate::repositories::common::{
    archive_filter, archive_record, ensure_affected, ensure_changes, inserted_id,
    missing_reference, not_found, require_date,
};
use crate::repositories::PersonRepo;

const COLUMNS: &str = "id, milestone_type, date, notes, person_id";

const TABLE: RecordTable = RecordTable::Milestones;

pub struct MilestoneRepo;

impl MilestoneRepo {
    pub async fn get_milestones(
        gw: &dyn Gateway,
        filter: &MilestoneFilter,
    ) -> Result<Vec<Milestone>, CoreError> {
        let output = Statement::new(format!("SELECT {COLUMNS}, {RECORD_COLUMNS} FROM milestones"))
            .clause(where_clause(
                vec![
                    Fragment::any_id("id", filter.ids.as_deref()),
                    Fragment::any_id("person_id", filter.person_ids.as_deref()),
                    archive_filter(filter.archived),
                ],
                Joiner::And,
            ))
            .push(&pagination_clause(filter.pagination.as_ref()))
            .run(gw)
            .await?;
        map_rows(&output.rows)
    }

    pub async fn find_by_id(gw: &dyn Gateway, id: DbId) -> Result<Option<Milestone>, CoreError> {
        let mut rows = Self::get_milestones(gw, &MilestoneFilter::by_id(id)).await?;
        Ok(rows.pop())
    }

    pub async fn add_milestone(
        gw: &dyn Gateway,
        input: &NewMilestone,
        actor: DbId,
    ) -> Result<DbId, CoreError> {
        let date = require_date("date", &input.date)?;

        if PersonRepo::find_by_id(gw, input.person_id).await?.is_none() {
            return Err(missing_reference(RecordTable::People, input.person_id));
        }

        let output = Statement::new("INSERT INTO milestones ")
            .clause(insert_clause(vec![
                InsertColumn::new("milestone_type", input.milestone_type.as_str()),
                InsertColumn::new("date", date),
                InsertColumn::optional("notes", input.notes.as_ref()),
                InsertColumn::new("person_id", input.person_id),
                InsertColumn::new("created_by", actor),
                InsertColumn::new("modified_by", actor),
            ]))
            .push(" RETURNING id")
            .run(gw)
            .await?;

        let id = inserted_id(&output, TABLE.entity_name())?;
        tracing::info!(milestone_id = id, person_id = input.person_id, actor, "Milestone created");
        Ok(id)
    }

    pub async fn update_milestone(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        input: &MilestoneUpdate,
        actor: DbId,
    ) -> Result<(), CoreError> {
        Self::find_by_id(gw, input.id)
            .await?
            .ok_or_else(|| not_found(TABLE, input.id))?;
        ensure_changes(input.has_changes())?;

        let date = input
            .date
            .as_deref()
            .map(|d| require_date("date", d))
            .transpose()?;

        let output = Statement::new("UPDATE milestones")
            .clause(set_clause(vec![
                Fragment::optional(
                    "milestone_type = ?",
                    input.milestone_type.map(|t| t.as_str()),
                ),
                Fragment::optional("date = ?", date),
                Fragment::patch("notes", &input.notes),
                Fragment::bind("modified_by = ?", actor),
            ]))
            .push(" WHERE id = ?")
            .bind(input.id)
            .run(gw)
            .await?;
        ensure_affected(&output, "Milestone update")?;

        logger.log_record_change(TABLE, input.id, actor).await;
        Ok(())
    }

    pub async fn archive_milestone(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        id: DbId,
        actor: DbId,
    ) -> Result<(), CoreError> {
        archive_record(gw, TABLE, id, actor).await?;
        tracing::info!(milestone_id = id, actor, "Milestone archived");

        logger.log_record_change(TABLE, id, actor).await;
        Ok(())
    }
}
