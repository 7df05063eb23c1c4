//! Handler for the `/auth` resource.

use axum::extract::State;
use axum::Json;
use flock_db::repositories::ClientRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

/// Request body for `POST /auth/token`.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/v1/auth/token
///
/// Exchange email and password for a signed access token.
pub async fn token(
    State(state): State<AppState>,
    Json(input): Json<TokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = ClientRepo::get_token(
        state.gateway.as_ref(),
        state.log_gateway.as_ref(),
        state.hasher.as_ref(),
        &state.config.jwt,
        &input.email,
        &input.password,
    )
    .await?;

    Ok(Json(TokenResponse { token }))
}
