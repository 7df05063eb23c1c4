//! Helpers shared by the entity modules.

use chrono::{NaiveDate, NaiveDateTime};
use flock_core::error::CoreError;
use flock_core::types::DbId;
use flock_core::validation::{
    is_valid_email, is_valid_name, parse_date, parse_datetime, MIN_NAME_LENGTH,
};

use crate::gateway::{Gateway, QueryOutput};
use crate::models::record::RecordTable;
use crate::query_builder::{Fragment, Statement};

/// `archived = FALSE`, dropped when the caller asks for archived rows too.
pub(crate) fn archive_filter(include_archived: bool) -> Fragment {
    Fragment::raw("archived = FALSE").when(!include_archived)
}

pub(crate) fn ensure_changes(has_changes: bool) -> Result<(), CoreError> {
    if has_changes {
        Ok(())
    } else {
        Err(CoreError::validation("Nothing to update"))
    }
}

/// A write that touched no rows is reported as [`CoreError::Database`].
pub(crate) fn ensure_affected(output: &QueryOutput, action: &str) -> Result<(), CoreError> {
    if output.rows_affected == 0 {
        return Err(CoreError::database(format!("{action} affected no rows")));
    }
    Ok(())
}

/// Id of the row produced by an `INSERT ... RETURNING id`.
pub(crate) fn inserted_id(output: &QueryOutput, entity: &str) -> Result<DbId, CoreError> {
    output
        .first()
        .ok_or_else(|| CoreError::database(format!("Failed to insert {entity}")))?
        .id("id")
}

/// Soft-delete one row. Already-archived rows are not matched, so archiving
/// twice reports [`CoreError::Database`].
pub(crate) async fn archive_record(
    gw: &dyn Gateway,
    table: RecordTable,
    id: DbId,
    actor: DbId,
) -> Result<(), CoreError> {
    let output = Statement::new(format!(
        "UPDATE {} SET archived = TRUE, modified_by = ? WHERE id = ? AND archived = FALSE",
        table.table_name()
    ))
    .bind(actor)
    .bind(id)
    .run(gw)
    .await?;
    ensure_affected(&output, &format!("Archiving {} {id}", table.entity_name()))
}

pub(crate) fn not_found(table: RecordTable, id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: table.entity_name(),
        id,
    }
}

pub(crate) fn missing_reference(table: RecordTable, id: DbId) -> CoreError {
    CoreError::validation(format!("{} {id} does not exist", table.entity_name()))
}

// -- field validation --

pub(crate) fn require_name(field: &str, value: &str) -> Result<(), CoreError> {
    if is_valid_name(value) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "{field} must be at least {MIN_NAME_LENGTH} characters"
        )))
    }
}

pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        Err(CoreError::validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

pub(crate) fn require_email(email: &str) -> Result<(), CoreError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(CoreError::validation(format!("Invalid email address '{email}'")))
    }
}

pub(crate) fn require_date(field: &str, value: &str) -> Result<NaiveDate, CoreError> {
    parse_date(value)
        .ok_or_else(|| CoreError::validation(format!("{field} must be a valid YYYY-MM-DD date")))
}

pub(crate) fn require_datetime(field: &str, value: &str) -> Result<NaiveDateTime, CoreError> {
    parse_datetime(value).ok_or_else(|| {
        CoreError::validation(format!("{field} must be a valid YYYY-MM-DD HH:mm date and time"))
    })
}
