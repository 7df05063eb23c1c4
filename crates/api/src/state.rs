use std::sync::Arc;

use flock_core::auth::password::{Argon2Hasher, CredentialHasher};
use flock_db::cache::QueryCache;
use flock_db::gateway::{Gateway, PgGateway};
use flock_db::record_change::{GatewayChangeLogger, RecordChangeLogger};
use flock_db::DbPool;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already a shared
/// handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Gateway used by entity operations.
    pub gateway: Arc<dyn Gateway>,
    /// Gateway for best-effort bookkeeping writes (connection stamps).
    pub log_gateway: Arc<dyn Gateway>,
    pub change_logger: Arc<dyn RecordChangeLogger>,
    pub cache: QueryCache,
    pub hasher: Arc<dyn CredentialHasher>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wire the production collaborators around `pool`.
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        let gateway = PgGateway::new(pool.clone());
        Self {
            gateway: Arc::new(gateway.clone()),
            log_gateway: Arc::new(PgGateway::new(pool.clone())),
            change_logger: Arc::new(GatewayChangeLogger::new(gateway)),
            cache: QueryCache::new(config.query_cache()),
            hasher: Arc::new(Argon2Hasher),
            config: Arc::new(config),
            pool,
        }
    }
}
