//! Repository for the `event_attendance` join table.

use flock_core::error::CoreError;
use flock_core::types::DbId;

use crate::gateway::Gateway;
use crate::mappers::map_rows;
use crate::models::event_attendance::{EventAttendance, EventAttendanceFilter, SetAttendance};
use crate::models::record::{RecordTable, ATTRIBUTION_COLUMNS};
use crate::query_builder::{insert_clause, where_clause, Fragment, InsertColumn, Joiner, Statement};
use crate::repositories::common::{ensure_affected, missing_reference, require_date};
use crate::repositories::{EventRepo, PersonRepo};

pub struct EventAttendanceRepo;

impl EventAttendanceRepo {
    pub async fn get_attendance(
        gw: &dyn Gateway,
        filter: &EventAttendanceFilter,
    ) -> Result<Vec<EventAttendance>, CoreError> {
        let output = Statement::new(format!(
            "SELECT event_id, person_id, attended, date_registered, {ATTRIBUTION_COLUMNS} \
             FROM event_attendance"
        ))
        .clause(where_clause(
            vec![
                Fragment::any_id("event_id", filter.event_ids.as_deref()),
                Fragment::any_id("person_id", filter.person_ids.as_deref()),
            ],
            Joiner::And,
        ))
        .push(" ORDER BY event_id, person_id")
        .run(gw)
        .await?;
        map_rows(&output.rows)
    }

    /// Insert or update the attendance of one person at one event.
    ///
    /// On conflict only the supplied fields are overwritten; the
    /// modification stamp is always refreshed. Both sides must exist and be
    /// non-archived.
    pub async fn set_attendance(
        gw: &dyn Gateway,
        input: &SetAttendance,
        actor: DbId,
    ) -> Result<(), CoreError> {
        let date_registered = input
            .date_registered
            .as_deref()
            .map(|d| require_date("dateRegistered", d))
            .transpose()?;

        if EventRepo::find_by_id(gw, input.event_id).await?.is_none() {
            return Err(missing_reference(RecordTable::Events, input.event_id));
        }
        if PersonRepo::find_by_id(gw, input.person_id).await?.is_none() {
            return Err(missing_reference(RecordTable::People, input.person_id));
        }

        // Conflicting rows take the supplied values through EXCLUDED.
        let mut on_conflict = Vec::new();
        if input.attended.is_some() {
            on_conflict.push("attended = EXCLUDED.attended");
        }
        if date_registered.is_some() {
            on_conflict.push("date_registered = EXCLUDED.date_registered");
        }
        on_conflict.push("modified_by = EXCLUDED.modified_by");
        on_conflict.push("modification_timestamp = NOW()");

        let output = Statement::new("INSERT INTO event_attendance ")
            .clause(insert_clause(vec![
                InsertColumn::new("event_id", input.event_id),
                InsertColumn::new("person_id", input.person_id),
                InsertColumn::optional("attended", input.attended),
                InsertColumn::optional("date_registered", date_registered),
                InsertColumn::new("created_by", actor),
                InsertColumn::new("modified_by", actor),
            ]))
            .push(" ON CONFLICT (event_id, person_id) DO UPDATE SET ")
            .push(&on_conflict.join(", "))
            .run(gw)
            .await?;
        ensure_affected(&output, "Setting attendance")?;

        tracing::info!(
            event_id = input.event_id,
            person_id = input.person_id,
            actor,
            "Attendance set"
        );
        Ok(())
    }

    /// Hard-delete one attendance row.
    pub async fn remove_attendance(
        gw: &dyn Gateway,
        event_id: DbId,
        person_id: DbId,
    ) -> Result<(), CoreError> {
        let output =
            Statement::new("DELETE FROM event_attendance WHERE event_id = ? AND person_id = ?")
                .bind(event_id)
                .bind(person_id)
                .run(gw)
                .await?;
        ensure_affected(&output, "Removing attendance")
    }
}
