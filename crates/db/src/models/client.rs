//! Client (administrative user) model and DTOs.

use flock_core::error::CoreError;
use flock_core::roles::PermissionScope;
use flock_core::types::{DbId, UnixSeconds};
use serde::{Deserialize, Serialize};

use crate::mappers::MapRow;
use crate::models::record::RecordMeta;
use crate::row::Row;

/// A row from the `clients` table, without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(flatten)]
    pub record: RecordMeta,
    pub email: String,
    pub scope: PermissionScope,
    pub active: bool,
    pub last_login: Option<UnixSeconds>,
}

impl MapRow for Client {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            record: RecordMeta::map_row(row)?,
            email: row.text("email")?,
            scope: PermissionScope::parse(&row.text("scope")?)?,
            active: row.flag("active")?,
            last_login: row.opt_unix_seconds("last_login")?,
        })
    }
}

/// Client plus stored hash, used only by the authentication path.
///
/// Has no `Serialize` impl.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub scope: PermissionScope,
    pub active: bool,
}

impl MapRow for ClientCredentials {
    fn map_row(row: &Row) -> Result<Self, CoreError> {
        Ok(Self {
            id: row.id("id")?,
            email: row.text("email")?,
            password_hash: row.text("password_hash")?,
            scope: PermissionScope::parse(&row.text("scope")?)?,
            active: row.flag("active")?,
        })
    }
}

/// Sign-up input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub email: String,
    pub password: String,
    pub scope: Option<PermissionScope>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdate {
    #[serde(default)]
    pub id: DbId,
    pub email: Option<String>,
    pub password: Option<String>,
    pub active: Option<bool>,
    pub scope: Option<PermissionScope>,
}

impl ClientUpdate {
    pub fn has_changes(&self) -> bool {
        self.email.is_some()
            || self.password.is_some()
            || self.active.is_some()
            || self.scope.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientFilter {
    pub ids: Option<Vec<DbId>>,
    pub email: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl ClientFilter {
    pub fn by_id(id: DbId) -> Self {
        Self {
            ids: Some(vec![id]),
            ..Self::default()
        }
    }
}
