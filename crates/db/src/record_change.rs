//! Attribution stamping after successful mutations.
//!
//! Entity modules call the logger once a write has been accepted. Failures
//! are reported through `tracing` and never reach the caller.

use async_trait::async_trait;
use flock_core::types::DbId;

use crate::gateway::{Gateway, SqlValue};
use crate::models::record::RecordTable;

#[async_trait]
pub trait RecordChangeLogger: Send + Sync {
    /// Stamp `modified_by`/`modification_timestamp` on one row. Best-effort.
    async fn log_record_change(&self, table: RecordTable, id: DbId, actor: DbId);
}

/// Logger that writes the stamp through a [`Gateway`].
pub struct GatewayChangeLogger<G> {
    gateway: G,
}

impl<G> GatewayChangeLogger<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<G: Gateway> RecordChangeLogger for GatewayChangeLogger<G> {
    async fn log_record_change(&self, table: RecordTable, id: DbId, actor: DbId) {
        let statement = format!(
            "UPDATE {} SET modified_by = $1, modification_timestamp = NOW() WHERE id = $2",
            table.table_name()
        );
        let params = [SqlValue::Int(actor), SqlValue::Int(id)];

        match self.gateway.query(&statement, &params).await {
            Ok(_) => tracing::debug!(table = table.table_name(), id, actor, "Record change logged"),
            Err(e) => tracing::error!(
                table = table.table_name(),
                id,
                actor,
                error = %e,
                "Failed to log record change"
            ),
        }
    }
}
