//! TTL cache for read-heavy reference lookups.
//!
//! Keys are the SHA-256 of the exact statement text plus its JSON-encoded
//! parameters. Writes never invalidate entries; staleness up to the TTL is
//! accepted for the lookups routed through here.

use std::time::Duration;

use flock_core::error::CoreError;
use moka::future::Cache;
use sha2::{Digest, Sha256};

use crate::gateway::{Gateway, QueryOutput, SqlValue};

/// Query cache configuration.
#[derive(Debug, Clone)]
pub struct QueryCacheConfig {
    /// Maximum number of cached statements.
    pub max_entries: u64,
    /// Time to live for a cached result.
    pub ttl: Duration,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_000,
            ttl: Duration::from_secs(60),
        }
    }
}

/// Process-wide statement result cache. Cheap to clone; clones share
/// entries.
#[derive(Clone)]
pub struct QueryCache {
    results: Cache<String, QueryOutput>,
}

impl QueryCache {
    #[must_use]
    pub fn new(config: QueryCacheConfig) -> Self {
        let results = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self { results }
    }

    /// Answer from the cache, or execute on `gateway` and remember the result
    /// if it is non-empty.
    pub async fn cache_query(
        &self,
        gateway: &dyn Gateway,
        statement: &str,
        params: &[SqlValue],
    ) -> Result<QueryOutput, CoreError> {
        let key = cache_key(statement, params)?;

        if let Some(hit) = self.results.get(&key).await {
            tracing::debug!(key = %key, "Query cache hit");
            return Ok(hit);
        }

        let output = gateway.query(statement, params).await?;
        if !output.is_empty() {
            self.results.insert(key, output.clone()).await;
        }
        Ok(output)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(QueryCacheConfig::default())
    }
}

/// Deterministic key for one statement and its parameter list.
pub fn cache_key(statement: &str, params: &[SqlValue]) -> Result<String, CoreError> {
    let encoded = serde_json::to_string(params)
        .map_err(|e| CoreError::Internal(format!("Failed to encode cache key: {e}")))?;
    let mut hasher = Sha256::new();
    hasher.update(statement.as_bytes());
    hasher.update(encoded.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
