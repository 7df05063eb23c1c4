//! Per-operation access check.

use crate::auth::jwt::Claims;
use crate::error::CoreError;
use crate::roles::PermissionScope;
use crate::types::DbId;

/// What an operation accepts as proof of access.
#[derive(Debug, Clone, Default)]
pub struct AuthOptions {
    /// Anyone may call the operation, with or without a token.
    pub is_public: bool,
    /// Scopes granting access. `None` means `[admin]`.
    pub scopes: Option<Vec<PermissionScope>>,
    /// The client whose own record is being touched; a token whose subject
    /// matches passes regardless of scope.
    pub own_id: Option<DbId>,
}

impl AuthOptions {
    pub fn public() -> Self {
        Self {
            is_public: true,
            ..Self::default()
        }
    }

    pub fn own(id: DbId) -> Self {
        Self {
            own_id: Some(id),
            ..Self::default()
        }
    }
}

/// Check `claims` against `options`. A missing token fails closed unless the
/// operation is public.
pub fn authorize(claims: Option<&Claims>, options: &AuthOptions) -> Result<(), CoreError> {
    if options.is_public {
        return Ok(());
    }

    let claims = claims.ok_or_else(|| CoreError::Forbidden("Authentication required".into()))?;

    if options.own_id == Some(claims.sub) {
        return Ok(());
    }

    let allowed = match &options.scopes {
        Some(scopes) => scopes.contains(&claims.scope),
        None => claims.scope == PermissionScope::Admin,
    };

    if allowed {
        Ok(())
    } else {
        Err(CoreError::Forbidden("Insufficient permissions".into()))
    }
}
