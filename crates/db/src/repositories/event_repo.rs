//! Repository for the `events` table.

use flock_core::error::CoreError;
use flock_core::types::DbId;

use crate::gateway::Gateway;
use crate::mappers::map_rows;
use crate::models::event::{Event, EventFilter, EventUpdate, NewEvent};
use crate::models::record::{RecordTable, RECORD_COLUMNS};
use crate::query_builder::{
    insert_clause, pagination_clause, set_clause, where_clause, Fragment, InsertColumn, Joiner,
    Statement,
};
use crate::record_change::RecordChangeLogger;
use crate::repositories::common::{
    archive_filter, archive_record, ensure_affected, ensure_changes, inserted_id, not_found,
    require_date, require_datetime, require_name,
};

const COLUMNS: &str = "id, name, datetime, location";

const TABLE: RecordTable = RecordTable::Events;

pub struct EventRepo;

impl EventRepo {
    /// List events. `filter.from`/`filter.to` restrict the event date,
    /// inclusive on both ends.
    pub async fn get_events(
        gw: &dyn Gateway,
        filter: &EventFilter,
    ) -> Result<Vec<Event>, CoreError> {
        let from = filter
            .from
            .as_deref()
            .map(|d| require_date("from", d))
            .transpose()?;
        let to = filter
            .to
            .as_deref()
            .map(|d| require_date("to", d))
            .transpose()?;

        let output = Statement::new(format!("SELECT {COLUMNS}, {RECORD_COLUMNS} FROM events"))
            .clause(where_clause(
                vec![
                    Fragment::any_id("id", filter.ids.as_deref()),
                    Fragment::optional("datetime::DATE >= ?", from),
                    Fragment::optional("datetime::DATE <= ?", to),
                    archive_filter(filter.archived),
                ],
                Joiner::And,
            ))
            .push(&pagination_clause(filter.pagination.as_ref()))
            .run(gw)
            .await?;
        map_rows(&output.rows)
    }

    pub async fn find_by_id(gw: &dyn Gateway, id: DbId) -> Result<Option<Event>, CoreError> {
        let mut rows = Self::get_events(gw, &EventFilter::by_id(id)).await?;
        Ok(rows.pop())
    }

    pub async fn add_event(
        gw: &dyn Gateway,
        input: &NewEvent,
        actor: DbId,
    ) -> Result<DbId, CoreError> {
        require_name("name", &input.name)?;
        let datetime = require_datetime("datetime", &input.datetime)?;

        let output = Statement::new("INSERT INTO events ")
            .clause(insert_clause(vec![
                InsertColumn::new("name", &input.name),
                InsertColumn::new("datetime", datetime),
                InsertColumn::optional("location", input.location.as_ref()),
                InsertColumn::new("created_by", actor),
                InsertColumn::new("modified_by", actor),
            ]))
            .push(" RETURNING id")
            .run(gw)
            .await?;

        let id = inserted_id(&output, TABLE.entity_name())?;
        tracing::info!(event_id = id, actor, "Event created");
        Ok(id)
    }

    pub async fn update_event(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        input: &EventUpdate,
        actor: DbId,
    ) -> Result<(), CoreError> {
        Self::find_by_id(gw, input.id)
            .await?
            .ok_or_else(|| not_found(TABLE, input.id))?;
        ensure_changes(input.has_changes())?;

        if let Some(name) = &input.name {
            require_name("name", name)?;
        }
        let datetime = input
            .datetime
            .as_deref()
            .map(|d| require_datetime("datetime", d))
            .transpose()?;

        let output = Statement::new("UPDATE events")
            .clause(set_clause(vec![
                Fragment::optional("name = ?", input.name.as_ref()),
                Fragment::optional("datetime = ?", datetime),
                Fragment::patch("location", &input.location),
                Fragment::bind("modified_by = ?", actor),
            ]))
            .push(" WHERE id = ?")
            .bind(input.id)
            .run(gw)
            .await?;
        ensure_affected(&output, "Event update")?;

        logger.log_record_change(TABLE, input.id, actor).await;
        Ok(())
    }

    pub async fn archive_event(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        id: DbId,
        actor: DbId,
    ) -> Result<(), CoreError> {
        archive_record(gw, TABLE, id, actor).await?;
        tracing::info!(event_id = id, actor, "Event archived");

        logger.log_record_change(TABLE, id, actor).await;
        Ok(())
    }
}
