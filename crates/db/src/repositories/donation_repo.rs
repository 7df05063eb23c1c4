//! Repository for the `donations` table.

use chrono::NaiveDate;
use flock_core::error::CoreError;
use flock_core::types::DbId;
use flock_core::validation::{is_date_in_range, is_valid_currency_amount};

use crate::gateway::Gateway;
use crate::mappers::map_rows;
use crate::models::donation::{Donation, DonationFilter, DonationUpdate, NewDonation};
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
use crate::repositories::{DonationCampaignRepo, HouseholdRepo};

/// Amounts are read back as text so they never pass through a float.
const COLUMNS: &str =
    "id, date, amount::TEXT AS amount, household_id, notes, donation_campaign_id";

const TABLE: RecordTable = RecordTable::Donations;

pub struct DonationRepo;

impl DonationRepo {
    pub async fn get_donations(
        gw: &dyn Gateway,
        filter: &DonationFilter,
    ) -> Result<Vec<Donation>, CoreError> {
        let output = Statement::new(format!("SELECT {COLUMNS}, {RECORD_COLUMNS} FROM donations"))
            .clause(where_clause(
                vec![
                    Fragment::any_id("id", filter.ids.as_deref()),
                    Fragment::any_id("household_id", filter.household_ids.as_deref()),
                    Fragment::any_id(
                        "donation_campaign_id",
                        filter.donation_campaign_ids.as_deref(),
                    ),
                    archive_filter(filter.archived),
                ],
                Joiner::And,
            ))
            .push(&pagination_clause(filter.pagination.as_ref()))
            .run(gw)
            .await?;
        map_rows(&output.rows)
    }

    pub async fn find_by_id(gw: &dyn Gateway, id: DbId) -> Result<Option<Donation>, CoreError> {
        let mut rows = Self::get_donations(gw, &DonationFilter::by_id(id)).await?;
        Ok(rows.pop())
    }

    /// Number of non-archived donations of a campaign dated within
    /// `[start, end]`.
    pub async fn count_in_campaign_range(
        gw: &dyn Gateway,
        campaign_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64, CoreError> {
        let output = Statement::new(
            "SELECT COUNT(*) AS count FROM donations \
             WHERE donation_campaign_id = ? AND date BETWEEN ? AND ? AND archived = FALSE",
        )
        .bind(campaign_id)
        .bind(start)
        .bind(end)
        .run(gw)
        .await?;
        match output.first() {
            Some(row) => row.int("count"),
            None => Ok(0),
        }
    }

    pub async fn add_donation(
        gw: &dyn Gateway,
        input: &NewDonation,
        actor: DbId,
    ) -> Result<DbId, CoreError> {
        let date = require_date("date", &input.date)?;
        validate_amount(&input.amount)?;

        if HouseholdRepo::find_by_id(gw, input.household_id)
            .await?
            .is_none()
        {
            return Err(missing_reference(RecordTable::Households, input.household_id));
        }
        if let Some(campaign_id) = input.donation_campaign_id {
            check_campaign(gw, campaign_id, &input.date).await?;
        }

        let output = Statement::new("INSERT INTO donations ")
            .clause(insert_clause(vec![
                InsertColumn::new("date", date),
                InsertColumn::new("amount", &input.amount).placeholder("?::NUMERIC"),
                InsertColumn::new("household_id", input.household_id),
                InsertColumn::optional("notes", input.notes.as_ref()),
                InsertColumn::optional("donation_campaign_id", input.donation_campaign_id),
                InsertColumn::new("created_by", actor),
                InsertColumn::new("modified_by", actor),
            ]))
            .push(" RETURNING id")
            .run(gw)
            .await?;

        let id = inserted_id(&output, TABLE.entity_name())?;
        tracing::info!(
            donation_id = id,
            household_id = input.household_id,
            actor,
            "Donation created"
        );
        Ok(id)
    }

    /// Apply a partial update. The resulting date must fall within the
    /// resulting campaign's range.
    pub async fn update_donation(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        input: &DonationUpdate,
        actor: DbId,
    ) -> Result<(), CoreError> {
        let existing = Self::find_by_id(gw, input.id)
            .await?
            .ok_or_else(|| not_found(TABLE, input.id))?;
        ensure_changes(input.has_changes())?;

        let date = input
            .date
            .as_deref()
            .map(|d| require_date("date", d))
            .transpose()?;
        if let Some(amount) = &input.amount {
            validate_amount(amount)?;
        }

        if input.date.is_some() || input.donation_campaign_id.is_set() {
            let campaign_id = input
                .donation_campaign_id
                .clone()
                .resolve(existing.donation_campaign.map(|c| c.id));
            if let Some(campaign_id) = campaign_id {
                let effective_date = input.date.as_ref().unwrap_or(&existing.date);
                check_campaign(gw, campaign_id, effective_date).await?;
            }
        }

        let output = Statement::new("UPDATE donations")
            .clause(set_clause(vec![
                Fragment::optional("date = ?", date),
                Fragment::optional("amount = ?::NUMERIC", input.amount.as_ref()),
                Fragment::patch("notes", &input.notes),
                Fragment::patch("donation_campaign_id", &input.donation_campaign_id),
                Fragment::bind("modified_by = ?", actor),
            ]))
            .push(" WHERE id = ?")
            .bind(input.id)
            .run(gw)
            .await?;
        ensure_affected(&output, "Donation update")?;

        logger.log_record_change(TABLE, input.id, actor).await;
        Ok(())
    }

    /// Soft-delete a donation. Household heads are not touched.
    pub async fn archive_donation(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        id: DbId,
        actor: DbId,
    ) -> Result<(), CoreError> {
        archive_record(gw, TABLE, id, actor).await?;
        tracing::info!(donation_id = id, actor, "Donation archived");

        logger.log_record_change(TABLE, id, actor).await;
        Ok(())
    }
}

fn validate_amount(amount: &str) -> Result<(), CoreError> {
    if is_valid_currency_amount(amount) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "Invalid amount '{amount}': expected a decimal with two fractional digits"
        )))
    }
}

/// The campaign must exist and its range must contain `date`.
async fn check_campaign(gw: &dyn Gateway, campaign_id: DbId, date: &str) -> Result<(), CoreError> {
    let campaign = DonationCampaignRepo::find_by_id(gw, campaign_id)
        .await?
        .ok_or_else(|| missing_reference(RecordTable::DonationCampaigns, campaign_id))?;
    if !is_date_in_range(date, &campaign.start_date, &campaign.end_date) {
        return Err(CoreError::validation(format!(
            "Donation date {date} is outside campaign range {} to {}",
            campaign.start_date, campaign.end_date
        )));
    }
    Ok(())
}
