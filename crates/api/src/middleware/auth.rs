//! Bearer-token extraction for Axum handlers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use flock_core::auth::jwt::{validate_token, Claims};

use crate::state::AppState;

/// Claims of the caller's `Authorization: Bearer <token>`, if any.
///
/// A missing header, a malformed header and an invalid or expired token all
/// yield `None`; whether that is acceptable is decided per operation by
/// [`flock_core::auth::authorize::authorize`].
#[derive(Debug, Clone)]
pub struct MaybeClaims(pub Option<Claims>);

impl MaybeClaims {
    pub fn claims(&self) -> Option<&Claims> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for MaybeClaims {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let claims = token.and_then(|token| match validate_token(token, &state.config.jwt) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid bearer token");
                None
            }
        });

        Ok(MaybeClaims(claims))
    }
}
