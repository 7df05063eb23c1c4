//! Donations and donation campaigns: amount format, campaign range checks
//! and range-coverage on campaign updates.

mod common;

use assert_matches::assert_matches;
use common::*;
use flock_core::error::CoreError;
use flock_core::patch::Patch;
use flock_db::gateway::{QueryOutput, SqlValue};
use flock_db::models::donation::{DonationFilter, DonationSortKey, DonationUpdate, NewDonation};
use flock_db::models::donation_campaign::{DonationCampaignUpdate, NewDonationCampaign};
use flock_db::models::record::RecordTable;
use flock_db::query_builder::{Pagination, SortOrder};
use flock_db::repositories::{DonationCampaignRepo, DonationRepo};

/// Campaign 3 runs 2024-01-01..2024-12-31 and holds donations dated
/// 2024-02-10 and 2024-11-20. Household 10 exists.
fn world(update_rows: u64) -> ScriptedGateway {
    let donation_dates = [date("2024-02-10"), date("2024-11-20")];
    ScriptedGateway::new(move |sql, params| {
        if sql.starts_with("SELECT COUNT(*) AS count FROM donations") {
            let (start, end) = match (&params[1], &params[2]) {
                (SqlValue::Date(s), SqlValue::Date(e)) => (*s, *e),
                _ => panic!("range bound must be a date"),
            };
            let n = donation_dates.iter().filter(|d| start <= **d && **d <= end).count();
            return Ok(count_row(n as i64));
        }
        if sql.contains("FROM donation_campaigns") {
            return Ok(match params.first() {
                Some(SqlValue::IntList(ids)) if ids == &vec![3] => {
                    rows(vec![campaign_row(3, date("2024-01-01"), date("2024-12-31"))])
                }
                _ => QueryOutput::default(),
            });
        }
        if sql.contains("FROM households") {
            return Ok(match params.first() {
                Some(SqlValue::IntList(ids)) if ids == &vec![10] => {
                    rows(vec![household_row(10, None)])
                }
                _ => QueryOutput::default(),
            });
        }
        if sql.contains("FROM donations") {
            return Ok(rows(vec![donation_row(7, "2024-02-10", Some(3))]));
        }
        if sql.starts_with("INSERT") {
            return Ok(id_row(50));
        }
        Ok(QueryOutput::affected(update_rows))
    })
}

fn new_donation(on: &str, amount: &str, campaign: Option<i64>) -> NewDonation {
    NewDonation {
        date: on.into(),
        amount: amount.into(),
        household_id: 10,
        notes: None,
        donation_campaign_id: campaign,
    }
}

// ---------------------------------------------------------------------------
// Donations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_donation_casts_amount_to_numeric() {
    let gw = world(1);

    let id = DonationRepo::add_donation(&gw, &new_donation("2024-03-01", "100.50", Some(3)), ACTOR)
        .await
        .unwrap();
    assert_eq!(id, 50);

    let insert = gw.writes().pop().unwrap();
    assert_eq!(
        insert,
        "INSERT INTO donations (date, amount, household_id, donation_campaign_id, created_by, \
         modified_by) VALUES ($1, $2::NUMERIC, $3, $4, $5, $6) RETURNING id"
    );
}

#[tokio::test]
async fn amount_needs_two_fractional_digits() {
    let gw = world(1);

    for amount in ["100", "100.5", "1e3", "-5.00"] {
        let err = DonationRepo::add_donation(&gw, &new_donation("2024-03-01", amount, None), ACTOR)
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(_), "amount {amount}");
    }
    assert!(gw.statements().is_empty());
}

#[tokio::test]
async fn donation_outside_campaign_range_is_rejected() {
    let gw = world(1);

    let err = DonationRepo::add_donation(&gw, &new_donation("2025-01-01", "10.00", Some(3)), ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(msg) if msg.contains("outside campaign range"));
    assert!(gw.writes().is_empty());
}

#[tokio::test]
async fn donation_for_missing_household_is_rejected() {
    let gw = world(1);
    let mut input = new_donation("2024-03-01", "10.00", None);
    input.household_id = 404;

    let err = DonationRepo::add_donation(&gw, &input, ACTOR).await.unwrap_err();
    assert_matches!(err, CoreError::Validation(msg) if msg == "Household 404 does not exist");
    assert!(gw.writes().is_empty());
}

#[tokio::test]
async fn moving_donation_date_out_of_its_campaign_is_rejected() {
    let gw = world(1);
    let logger = RecordingLogger::default();
    let input = DonationUpdate {
        id: 7,
        date: Some("2023-12-31".into()),
        ..DonationUpdate::default()
    };

    let err = DonationRepo::update_donation(&gw, &logger, &input, ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
    assert!(gw.writes().is_empty());
}

#[tokio::test]
async fn detaching_donation_from_campaign_skips_range_check() {
    let gw = world(1);
    let logger = RecordingLogger::default();
    let input = DonationUpdate {
        id: 7,
        date: Some("2023-12-31".into()),
        donation_campaign_id: Patch::Null,
        ..DonationUpdate::default()
    };

    DonationRepo::update_donation(&gw, &logger, &input, ACTOR)
        .await
        .unwrap();
    assert_eq!(
        gw.writes(),
        vec![
            "UPDATE donations SET date = $1, donation_campaign_id = NULL, modified_by = $2 \
             WHERE id = $3"
                .to_string()
        ]
    );
    assert_eq!(logger.entries(), vec![(RecordTable::Donations, 7, ACTOR)]);
}

#[tokio::test]
async fn donation_filters_combine_household_and_campaign() {
    let gw = world(1);
    let filter = DonationFilter {
        household_ids: Some(vec![10]),
        donation_campaign_ids: Some(vec![3]),
        ..DonationFilter::default()
    };

    let list = DonationRepo::get_donations(&gw, &filter).await.unwrap();
    assert_eq!(list[0].amount, "25.00");
    assert_eq!(list[0].donation_campaign.map(|c| c.id), Some(3));
    assert!(gw.statements()[0].ends_with(
        "FROM donations WHERE household_id = ANY($1) AND donation_campaign_id = ANY($2) \
         AND archived = FALSE"
    ));
}

#[tokio::test]
async fn sorting_by_amount_orders_the_numeric_column() {
    let gw = world(1);
    let filter = DonationFilter {
        pagination: Some(Pagination {
            sort_key: DonationSortKey::Amount,
            sort_order: SortOrder::Desc,
            limit: 10,
            offset: 0,
        }),
        ..DonationFilter::default()
    };

    DonationRepo::get_donations(&gw, &filter).await.unwrap();

    let statements = gw.statements();
    let sql = &statements[0];
    assert!(sql.starts_with(
        "SELECT id, date, amount::TEXT AS amount, household_id, notes, donation_campaign_id, \
         created_by, modified_by, creation_timestamp, modification_timestamp, archived FROM"
    ));
    assert!(sql.ends_with(
        "FROM donations WHERE archived = FALSE \
         ORDER BY donations.amount DESC LIMIT 10 OFFSET 0"
    ));
}

#[tokio::test]
async fn archiving_donation_touches_only_the_donation() {
    let gw = world(1);
    let logger = RecordingLogger::default();

    DonationRepo::archive_donation(&gw, &logger, 7, ACTOR)
        .await
        .unwrap();

    let writes = gw.writes();
    assert_eq!(writes.len(), 1);
    assert!(writes[0].starts_with("UPDATE donations SET archived = TRUE"));
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

#[tokio::test]
async fn campaign_range_must_end_after_start() {
    let gw = world(1);
    let input = NewDonationCampaign {
        name: "Lent Appeal".into(),
        start_date: "2024-03-01".into(),
        end_date: "2024-03-01".into(),
        notes: None,
    };

    let err = DonationCampaignRepo::add_campaign(&gw, &input, ACTOR)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
    assert!(gw.statements().is_empty());
}

#[tokio::test]
async fn shrinking_range_below_existing_donations_is_rejected() {
    let gw = world(1);
    let logger = RecordingLogger::default();
    let input = DonationCampaignUpdate {
        id: 3,
        end_date: Some("2024-06-30".into()),
        ..DonationCampaignUpdate::default()
    };

    let err = DonationCampaignRepo::update_campaign(&gw, &logger, &input, ACTOR)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        CoreError::Validation(msg) if msg == "New date range does not cover existing donations"
    );
    assert!(gw.writes().is_empty());
    assert!(logger.entries().is_empty());
}

#[tokio::test]
async fn range_still_covering_donations_is_accepted() {
    let gw = world(1);
    let logger = RecordingLogger::default();
    let input = DonationCampaignUpdate {
        id: 3,
        start_date: Some("2024-02-01".into()),
        end_date: Some("2024-11-30".into()),
        ..DonationCampaignUpdate::default()
    };

    DonationCampaignRepo::update_campaign(&gw, &logger, &input, ACTOR)
        .await
        .unwrap();

    let counts = gw
        .statements()
        .into_iter()
        .filter(|s| s.starts_with("SELECT COUNT(*)"))
        .count();
    assert_eq!(counts, 2);
    assert_eq!(
        gw.writes(),
        vec![
            "UPDATE donation_campaigns SET start_date = $1, end_date = $2, modified_by = $3 \
             WHERE id = $4"
                .to_string()
        ]
    );
    assert_eq!(logger.entries(), vec![(RecordTable::DonationCampaigns, 3, ACTOR)]);
}

#[tokio::test]
async fn renaming_campaign_skips_coverage_check() {
    let gw = world(1);
    let logger = RecordingLogger::default();
    let input = DonationCampaignUpdate {
        id: 3,
        name: Some("Roof Fund".into()),
        ..DonationCampaignUpdate::default()
    };

    DonationCampaignRepo::update_campaign(&gw, &logger, &input, ACTOR)
        .await
        .unwrap();
    assert!(!gw
        .statements()
        .iter()
        .any(|s| s.starts_with("SELECT COUNT(*)")));
}
