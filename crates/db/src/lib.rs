//! Data-access and domain-validation layer.
//!
//! Entity modules live in [`repositories`]; they reach the database only
//! through a [`gateway::Gateway`] handle supplied by the caller.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub mod cache;
pub mod gateway;
pub mod loaders;
pub mod mappers;
pub mod models;
pub mod query_builder;
pub mod record_change;
pub mod repositories;
pub mod row;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Round-trip a trivial statement to confirm the pool can reach the server.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending schema migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
