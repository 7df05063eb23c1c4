//! Repository for the `ministries` table.

use flock_core::error::CoreError;
use flock_core::types::DbId;

use crate::cache::QueryCache;
use crate::gateway::Gateway;
use crate::mappers::{hex_to_color, map_rows};
use crate::models::ministry::{
    Ministry, MinistryFilter, MinistryUpdate, NewMinistry, DEFAULT_MINISTRY_COLOR,
};
use crate::models::record::{RecordTable, RECORD_COLUMNS};
use crate::query_builder::{
    insert_clause, pagination_clause, set_clause, where_clause, Fragment, InsertColumn, Joiner,
    Statement,
};
use crate::record_change::RecordChangeLogger;
use crate::repositories::common::{
    archive_filter, archive_record, ensure_affected, ensure_changes, inserted_id, not_found,
    require_name,
};
use crate::repositories::MinistryDelegationRepo;

const COLUMNS: &str = "id, name, color";

const TABLE: RecordTable = RecordTable::Ministries;

pub struct MinistryRepo;

impl MinistryRepo {
    fn list_statement(filter: &MinistryFilter) -> Statement {
        Statement::new(format!("SELECT {COLUMNS}, {RECORD_COLUMNS} FROM ministries"))
            .clause(where_clause(
                vec![
                    Fragment::any_id("id", filter.ids.as_deref()),
                    archive_filter(filter.archived),
                ],
                Joiner::And,
            ))
            .push(&pagination_clause(filter.pagination.as_ref()))
    }

    pub async fn get_ministries(
        gw: &dyn Gateway,
        filter: &MinistryFilter,
    ) -> Result<Vec<Ministry>, CoreError> {
        let output = Self::list_statement(filter).run(gw).await?;
        map_rows(&output.rows)
    }

    /// Same as [`MinistryRepo::get_ministries`], answered from `cache` for up
    /// to its TTL.
    pub async fn get_ministries_cached(
        gw: &dyn Gateway,
        cache: &QueryCache,
        filter: &MinistryFilter,
    ) -> Result<Vec<Ministry>, CoreError> {
        let output = Self::list_statement(filter).run_cached(gw, cache).await?;
        map_rows(&output.rows)
    }

    pub async fn find_by_id(gw: &dyn Gateway, id: DbId) -> Result<Option<Ministry>, CoreError> {
        let mut rows = Self::get_ministries(gw, &MinistryFilter::by_id(id)).await?;
        Ok(rows.pop())
    }

    pub async fn add_ministry(
        gw: &dyn Gateway,
        input: &NewMinistry,
        actor: DbId,
    ) -> Result<DbId, CoreError> {
        require_name("name", &input.name)?;
        let color = parse_color(input.color.as_deref().unwrap_or(DEFAULT_MINISTRY_COLOR))?;

        let output = Statement::new("INSERT INTO ministries ")
            .clause(insert_clause(vec![
                InsertColumn::new("name", &input.name),
                InsertColumn::new("color", color),
                InsertColumn::new("created_by", actor),
                InsertColumn::new("modified_by", actor),
            ]))
            .push(" RETURNING id")
            .run(gw)
            .await?;

        let id = inserted_id(&output, TABLE.entity_name())?;
        tracing::info!(ministry_id = id, actor, "Ministry created");
        Ok(id)
    }

    pub async fn update_ministry(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        input: &MinistryUpdate,
        actor: DbId,
    ) -> Result<(), CoreError> {
        Self::find_by_id(gw, input.id)
            .await?
            .ok_or_else(|| not_found(TABLE, input.id))?;
        ensure_changes(input.has_changes())?;

        if let Some(name) = &input.name {
            require_name("name", name)?;
        }
        let color = input.color.as_deref().map(parse_color).transpose()?;

        let output = Statement::new("UPDATE ministries")
            .clause(set_clause(vec![
                Fragment::optional("name = ?", input.name.as_ref()),
                Fragment::optional("color = ?", color),
                Fragment::bind("modified_by = ?", actor),
            ]))
            .push(" WHERE id = ?")
            .bind(input.id)
            .run(gw)
            .await?;
        ensure_affected(&output, "Ministry update")?;

        logger.log_record_change(TABLE, input.id, actor).await;
        Ok(())
    }

    /// Soft-delete a ministry and drop all of its delegations.
    pub async fn archive_ministry(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        id: DbId,
        actor: DbId,
    ) -> Result<(), CoreError> {
        archive_record(gw, TABLE, id, actor).await?;
        let removed = MinistryDelegationRepo::remove_all_for_ministry(gw, id).await?;
        tracing::info!(ministry_id = id, actor, delegations_removed = removed, "Ministry archived");

        logger.log_record_change(TABLE, id, actor).await;
        Ok(())
    }
}

fn parse_color(hex: &str) -> Result<i64, CoreError> {
    hex_to_color(hex).ok_or_else(|| {
        CoreError::validation(format!("Invalid color '{hex}': expected uppercase #RRGGBB"))
    })
}
