//! Handlers for the `/clients` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use flock_core::auth::authorize::{authorize, AuthOptions};
use flock_core::error::CoreError;
use flock_core::types::DbId;
use flock_db::models::client::{ClientUpdate, NewClient};
use flock_db::repositories::ClientRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::MaybeClaims;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: DbId,
}

/// POST /api/v1/clients
///
/// Sign up a new client. Admin only.
pub async fn create(
    State(state): State<AppState>,
    claims: MaybeClaims,
    Json(input): Json<NewClient>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    authorize(claims.claims(), &AuthOptions::default())?;
    let actor = actor_id(&claims)?;

    let id = ClientRepo::add_client(state.gateway.as_ref(), state.hasher.as_ref(), &input, actor)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PATCH /api/v1/clients/{id}
///
/// Update a client. Admins may update anyone; other clients only
/// themselves.
pub async fn update(
    State(state): State<AppState>,
    claims: MaybeClaims,
    Path(id): Path<DbId>,
    Json(mut input): Json<ClientUpdate>,
) -> AppResult<StatusCode> {
    authorize(claims.claims(), &AuthOptions::own(id))?;
    let actor = actor_id(&claims)?;
    input.id = id;

    ClientRepo::update_client(
        state.gateway.as_ref(),
        state.change_logger.as_ref(),
        state.hasher.as_ref(),
        &input,
        actor,
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn actor_id(claims: &MaybeClaims) -> Result<DbId, CoreError> {
    claims
        .claims()
        .map(|c| c.sub)
        .ok_or_else(|| CoreError::Forbidden("Authentication required".into()))
}
