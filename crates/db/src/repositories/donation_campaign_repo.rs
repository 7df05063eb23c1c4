//! Repository for the `donation_campaigns` table.

use flock_core::error::CoreError;
use flock_core::types::DbId;
use flock_core::validation::is_valid_date_range;

use crate::gateway::Gateway;
use crate::mappers::map_rows;
use crate::models::donation_campaign::{
    DonationCampaign, DonationCampaignFilter, DonationCampaignUpdate, NewDonationCampaign,
};
use crate::models::record::{RecordTable, RECORD_COLUMNS};
use crate::query_builder::{
    insert_clause, pagination_clause, set_clause, where_clause, Fragment, InsertColumn, Joiner,
    Statement,
};
use crate::record_change::RecordChangeLogger;
use crate::repositories::common::{
    archive_filter, archive_record, ensure_affected, ensure_changes, inserted_id, not_found,
    require_date, require_name,
};
use crate::repositories::DonationRepo;

const COLUMNS: &str = "id, name, start_date, end_date, notes";

const TABLE: RecordTable = RecordTable::DonationCampaigns;

pub struct DonationCampaignRepo;

impl DonationCampaignRepo {
    pub async fn get_campaigns(
        gw: &dyn Gateway,
        filter: &DonationCampaignFilter,
    ) -> Result<Vec<DonationCampaign>, CoreError> {
        let sql = format!("SELECT {COLUMNS}, {RECORD_COLUMNS} FROM donation_campaigns");
        let output = Statement::new(sql)
            .clause(where_clause(
                vec![
                    Fragment::any_id("id", filter.ids.as_deref()),
                    archive_filter(filter.archived),
                ],
                Joiner::And,
            ))
            .push(&pagination_clause(filter.pagination.as_ref()))
            .run(gw)
            .await?;
        map_rows(&output.rows)
    }

    pub async fn find_by_id(
        gw: &dyn Gateway,
        id: DbId,
    ) -> Result<Option<DonationCampaign>, CoreError> {
        let mut rows = Self::get_campaigns(gw, &DonationCampaignFilter::by_id(id)).await?;
        Ok(rows.pop())
    }

    pub async fn add_campaign(
        gw: &dyn Gateway,
        input: &NewDonationCampaign,
        actor: DbId,
    ) -> Result<DbId, CoreError> {
        require_name("name", &input.name)?;
        let start = require_date("startDate", &input.start_date)?;
        let end = require_date("endDate", &input.end_date)?;
        validate_range(&input.start_date, &input.end_date)?;

        let output = Statement::new("INSERT INTO donation_campaigns ")
            .clause(insert_clause(vec![
                InsertColumn::new("name", &input.name),
                InsertColumn::new("start_date", start),
                InsertColumn::new("end_date", end),
                InsertColumn::optional("notes", input.notes.as_ref()),
                InsertColumn::new("created_by", actor),
                InsertColumn::new("modified_by", actor),
            ]))
            .push(" RETURNING id")
            .run(gw)
            .await?;

        let id = inserted_id(&output, TABLE.entity_name())?;
        tracing::info!(campaign_id = id, actor, "Donation campaign created");
        Ok(id)
    }

    /// Apply a partial update.
    ///
    /// A changed date range must still contain every donation of the
    /// campaign that the old range contained, compared by count.
    pub async fn update_campaign(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        input: &DonationCampaignUpdate,
        actor: DbId,
    ) -> Result<(), CoreError> {
        let existing = Self::find_by_id(gw, input.id)
            .await?
            .ok_or_else(|| not_found(TABLE, input.id))?;
        ensure_changes(input.has_changes())?;

        if let Some(name) = &input.name {
            require_name("name", name)?;
        }

        let new_start = input.start_date.as_ref().unwrap_or(&existing.start_date);
        let new_end = input.end_date.as_ref().unwrap_or(&existing.end_date);
        let range_changed = *new_start != existing.start_date || *new_end != existing.end_date;

        let start = input
            .start_date
            .as_deref()
            .map(|d| require_date("startDate", d))
            .transpose()?;
        let end = input
            .end_date
            .as_deref()
            .map(|d| require_date("endDate", d))
            .transpose()?;

        if range_changed {
            validate_range(new_start, new_end)?;

            let old_start = require_date("startDate", &existing.start_date)?;
            let old_end = require_date("endDate", &existing.end_date)?;
            let covered_before =
                DonationRepo::count_in_campaign_range(gw, input.id, old_start, old_end).await?;
            let covered_after = DonationRepo::count_in_campaign_range(
                gw,
                input.id,
                require_date("startDate", new_start)?,
                require_date("endDate", new_end)?,
            )
            .await?;
            if covered_after < covered_before {
                return Err(CoreError::validation(
                    "New date range does not cover existing donations",
                ));
            }
        }

        let output = Statement::new("UPDATE donation_campaigns")
            .clause(set_clause(vec![
                Fragment::optional("name = ?", input.name.as_ref()),
                Fragment::optional("start_date = ?", start),
                Fragment::optional("end_date = ?", end),
                Fragment::patch("notes", &input.notes),
                Fragment::bind("modified_by = ?", actor),
            ]))
            .push(" WHERE id = ?")
            .bind(input.id)
            .run(gw)
            .await?;
        ensure_affected(&output, "Donation campaign update")?;

        logger.log_record_change(TABLE, input.id, actor).await;
        Ok(())
    }

    pub async fn archive_campaign(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        id: DbId,
        actor: DbId,
    ) -> Result<(), CoreError> {
        archive_record(gw, TABLE, id, actor).await?;
        tracing::info!(campaign_id = id, actor, "Donation campaign archived");

        logger.log_record_change(TABLE, id, actor).await;
        Ok(())
    }
}

fn validate_range(start: &str, end: &str) -> Result<(), CoreError> {
    if is_valid_date_range(start, end) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "Invalid date range {start} to {end}: end must be after start"
        )))
    }
}
