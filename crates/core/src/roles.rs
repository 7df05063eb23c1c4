//! Permission scopes carried by client accounts and access tokens.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const SCOPE_ADMIN: &str = "admin";

/// Scope granted to a client. Stored as text in `clients.scope`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionScope {
    Admin,
}

impl PermissionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionScope::Admin => SCOPE_ADMIN,
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            SCOPE_ADMIN => Ok(PermissionScope::Admin),
            other => Err(CoreError::Internal(format!(
                "Unknown permission scope '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_round_trips_through_text() {
        let scope = PermissionScope::parse("admin").unwrap();
        assert_eq!(scope, PermissionScope::Admin);
        assert_eq!(scope.as_str(), "admin");
    }

    #[test]
    fn unknown_scope_is_rejected() {
        assert!(PermissionScope::parse("superuser").is_err());
    }
}
