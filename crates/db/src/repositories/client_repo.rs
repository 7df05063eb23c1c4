//! Repository for the `clients` table and the token exchange.

use flock_core::auth::jwt::{issue_token, JwtConfig};
use flock_core::auth::password::CredentialHasher;
use flock_core::error::CoreError;
use flock_core::roles::PermissionScope;
use flock_core::types::DbId;
use flock_core::validation::{is_valid_password, MIN_PASSWORD_LENGTH};

use crate::gateway::Gateway;
use crate::mappers::{map_rows, MapRow};
use crate::models::client::{Client, ClientCredentials, ClientFilter, ClientUpdate, NewClient};
use crate::models::record::{RecordTable, RECORD_COLUMNS};
use crate::query_builder::{
    insert_clause, set_clause, where_clause, Fragment, InsertColumn, Joiner, Statement,
};
use crate::record_change::RecordChangeLogger;
use crate::repositories::common::{
    archive_filter, ensure_affected, ensure_changes, inserted_id, not_found, require_email,
};

/// Public columns. `password_hash` is only ever selected by
/// [`ClientRepo::find_credentials`].
const COLUMNS: &str = "id, email, scope, active, last_login";

const TABLE: RecordTable = RecordTable::Clients;

pub struct ClientRepo;

impl ClientRepo {
    pub async fn get_clients(
        gw: &dyn Gateway,
        filter: &ClientFilter,
    ) -> Result<Vec<Client>, CoreError> {
        let output = Statement::new(format!("SELECT {COLUMNS}, {RECORD_COLUMNS} FROM clients"))
            .clause(where_clause(
                vec![
                    Fragment::any_id("id", filter.ids.as_deref()),
                    Fragment::optional("email = ?", filter.email.as_ref()),
                    archive_filter(filter.archived),
                ],
                Joiner::And,
            ))
            .push(" ORDER BY id ASC")
            .run(gw)
            .await?;
        map_rows(&output.rows)
    }

    pub async fn find_by_id(gw: &dyn Gateway, id: DbId) -> Result<Option<Client>, CoreError> {
        let mut rows = Self::get_clients(gw, &ClientFilter::by_id(id)).await?;
        Ok(rows.pop())
    }

    /// Look up the stored hash for an exact email match.
    pub async fn find_credentials(
        gw: &dyn Gateway,
        email: &str,
    ) -> Result<Option<ClientCredentials>, CoreError> {
        let output = Statement::new(
            "SELECT id, email, password_hash, scope, active FROM clients \
             WHERE email = ? AND archived = FALSE",
        )
        .bind(email)
        .run(gw)
        .await?;
        output.first().map(ClientCredentials::map_row).transpose()
    }

    /// Sign up a new client, returning its id. Taken emails surface as
    /// [`CoreError::DuplicateEntry`] from the unique constraint.
    pub async fn add_client(
        gw: &dyn Gateway,
        hasher: &dyn CredentialHasher,
        input: &NewClient,
        actor: DbId,
    ) -> Result<DbId, CoreError> {
        require_email(&input.email)?;
        validate_password(&input.password)?;
        let password_hash = hasher.hash(&input.password)?;
        let scope = input.scope.unwrap_or(PermissionScope::Admin);

        let output = Statement::new("INSERT INTO clients ")
            .clause(insert_clause(vec![
                InsertColumn::new("email", &input.email),
                InsertColumn::new("password_hash", password_hash),
                InsertColumn::new("scope", scope.as_str()),
                InsertColumn::new("created_by", actor),
                InsertColumn::new("modified_by", actor),
            ]))
            .push(" RETURNING id")
            .run(gw)
            .await?;

        let id = inserted_id(&output, TABLE.entity_name())?;
        tracing::info!(client_id = id, actor, "Client created");
        Ok(id)
    }

    /// Change email, password, scope or active status.
    pub async fn update_client(
        gw: &dyn Gateway,
        logger: &dyn RecordChangeLogger,
        hasher: &dyn CredentialHasher,
        input: &ClientUpdate,
        actor: DbId,
    ) -> Result<(), CoreError> {
        Self::find_by_id(gw, input.id)
            .await?
            .ok_or_else(|| not_found(TABLE, input.id))?;
        ensure_changes(input.has_changes())?;

        if let Some(email) = &input.email {
            require_email(email)?;
        }
        let password_hash = match &input.password {
            Some(password) => {
                validate_password(password)?;
                Some(hasher.hash(password)?)
            }
            None => None,
        };

        let output = Statement::new("UPDATE clients")
            .clause(set_clause(vec![
                Fragment::optional("email = ?", input.email.as_ref()),
                Fragment::optional("password_hash = ?", password_hash),
                Fragment::optional("active = ?", input.active),
                Fragment::optional("scope = ?", input.scope.map(|s| s.as_str())),
                Fragment::bind("modified_by = ?", actor),
            ]))
            .push(" WHERE id = ?")
            .bind(input.id)
            .run(gw)
            .await?;
        ensure_affected(&output, "Client update")?;

        logger.log_record_change(TABLE, input.id, actor).await;
        Ok(())
    }

    /// Stamp `last_login`. Best-effort: failures are logged, never returned.
    pub async fn log_connection(gw: &dyn Gateway, client_id: DbId) {
        let result = Statement::new("UPDATE clients SET last_login = NOW() WHERE id = ?")
            .bind(client_id)
            .run(gw)
            .await;
        if let Err(e) = result {
            tracing::error!(client_id, error = %e, "Failed to log client connection");
        }
    }

    /// Exchange email and password for a signed access token.
    ///
    /// The password is checked before the active flag. A mismatch fails
    /// with [`CoreError::Forbidden`] without issuing any further statement.
    /// On success the connection is stamped through `log_gw`.
    pub async fn get_token(
        gw: &dyn Gateway,
        log_gw: &dyn Gateway,
        hasher: &dyn CredentialHasher,
        jwt: &JwtConfig,
        email: &str,
        password: &str,
    ) -> Result<String, CoreError> {
        let credentials = Self::find_credentials(gw, email)
            .await?
            .ok_or_else(|| CoreError::NotFoundBy {
                entity: TABLE.entity_name(),
                key: email.to_string(),
            })?;

        if !hasher.verify(password, &credentials.password_hash)? {
            tracing::warn!(client_id = credentials.id, "Rejected token request: bad password");
            return Err(CoreError::Forbidden("Invalid credentials".into()));
        }
        if !credentials.active {
            tracing::warn!(client_id = credentials.id, "Rejected token request: inactive");
            return Err(CoreError::Forbidden("Account is deactivated".into()));
        }

        Self::log_connection(log_gw, credentials.id).await;
        issue_token(credentials.id, &credentials.email, credentials.scope, jwt)
    }
}

fn validate_password(password: &str) -> Result<(), CoreError> {
    if is_valid_password(password) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )))
    }
}
