//! Access-token issuance and validation.
//!
//! Tokens are HS256-signed JWTs carrying a [`Claims`] payload: the client's
//! id, email and permission scope. Production tokens live for one hour;
//! other environments get a longer default so local sessions survive.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::roles::PermissionScope;
use crate::types::DbId;

/// Token lifetime in production (1 hour).
pub const PRODUCTION_EXPIRY_SECS: i64 = 60 * 60;

/// Token lifetime everywhere else (7 days).
pub const DEVELOPMENT_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject -- the client's internal database id.
    pub sub: DbId,
    pub email: String,
    pub scope: PermissionScope,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier.
    pub jti: String,
}

/// Configuration for token signing and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Token lifetime in seconds.
    pub expiry_secs: i64,
}

impl JwtConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var           | Required | Default                          |
    /// |-------------------|----------|----------------------------------|
    /// | `JWT_SECRET`      | **yes**  | --                               |
    /// | `JWT_EXPIRY_SECS` | no       | `3600` in production, else 7 days |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty, or if
    /// `JWT_EXPIRY_SECS` is not an integer.
    pub fn from_env(production: bool) -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let default_expiry = if production {
            PRODUCTION_EXPIRY_SECS
        } else {
            DEVELOPMENT_EXPIRY_SECS
        };
        let expiry_secs: i64 = std::env::var("JWT_EXPIRY_SECS")
            .map(|v| v.parse().expect("JWT_EXPIRY_SECS must be a valid i64"))
            .unwrap_or(default_expiry);

        Self {
            secret,
            expiry_secs,
        }
    }
}

/// Issue a signed token for the given client.
pub fn issue_token(
    client_id: DbId,
    email: &str,
    scope: PermissionScope,
    config: &JwtConfig,
) -> Result<String, CoreError> {
    let now = chrono::Utc::now().timestamp();

    let claims = Claims {
        sub: client_id,
        email: email.to_string(),
        scope,
        exp: now + config.expiry_secs,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| CoreError::Internal(format!("Token generation error: {e}")))
}

/// Validate and decode a token, returning the embedded [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_secs: PRODUCTION_EXPIRY_SECS,
        }
    }

    #[test]
    fn test_issue_and_validate_token() {
        let config = test_config();
        let token = issue_token(42, "pastor@church.org", PermissionScope::Admin, &config)
            .expect("token generation should succeed");

        let claims = validate_token(&token, &config).expect("token validation should succeed");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "pastor@church.org");
        assert_eq!(claims.scope, PermissionScope::Admin);
        assert_eq!(claims.exp - claims.iat, PRODUCTION_EXPIRY_SECS);
    }

    #[test]
    fn test_expired_token_fails() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            email: "a@b.co".to_string(),
            scope: PermissionScope::Admin,
            exp: now - 300, // well past the default 60-second leeway
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .expect("encoding should succeed");

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn test_different_secrets_fail() {
        let config_a = JwtConfig {
            secret: "secret-alpha".to_string(),
            expiry_secs: 60,
        };
        let config_b = JwtConfig {
            secret: "secret-bravo".to_string(),
            expiry_secs: 60,
        };

        let token = issue_token(1, "a@b.co", PermissionScope::Admin, &config_a).unwrap();
        assert!(validate_token(&token, &config_b).is_err());
    }
}
