use crate::types::DbId;

/// Error taxonomy shared by every entity operation.
///
/// Input-class errors (`Validation`, `NotFound*`, `Forbidden`,
/// `DuplicateEntry`) are raised before any write statement runs. `Database`
/// is reserved for writes that executed but changed nothing; `Query` carries
/// transport or engine failures reported by the execution gateway.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Entity not found: {entity} matching {key}")]
    NotFoundBy { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    /// Shorthand for [`CoreError::Database`].
    pub fn database(msg: impl Into<String>) -> Self {
        CoreError::Database(msg.into())
    }

    /// `true` when the error was caused by the caller's input rather than by
    /// the persistence layer. Client errors are logged as warnings; the rest
    /// are logged as errors.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_)
                | CoreError::NotFound { .. }
                | CoreError::NotFoundBy { .. }
                | CoreError::Forbidden(_)
                | CoreError::DuplicateEntry(_)
        )
    }
}
