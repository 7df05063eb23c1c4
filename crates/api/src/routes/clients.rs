//! Route definitions for the `/clients` resource.

use axum::routing::{patch, post};
use axum::Router;

use crate::handlers::clients;
use crate::state::AppState;

/// Routes mounted at `/clients`.
///
/// ```text
/// POST  /      -> create (admin)
/// PATCH /{id}  -> update (admin or own id)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(clients::create))
        .route("/{id}", patch(clients::update))
}
