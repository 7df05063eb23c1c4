use std::time::Duration;

use flock_core::auth::jwt::JwtConfig;
use flock_db::cache::QueryCacheConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the database URL and the token secret have defaults
/// suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Postgres connection string.
    pub database_url: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Connection pool size (default: `10`).
    pub db_max_connections: u32,
    /// Lifetime of cached reference lookups in seconds (default: `60`).
    pub query_cache_ttl_secs: u64,
    /// `APP_ENV=production`.
    pub production: bool,
    /// Token signing configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `DATABASE_URL`         | required                   |
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `4000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DB_MAX_CONNECTIONS`   | `10`                       |
    /// | `QUERY_CACHE_TTL_SECS` | `60`                       |
    /// | `APP_ENV`              | `development`              |
    ///
    /// Token settings are read by [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on a missing `DATABASE_URL` or an unparsable numeric value.
    /// Misconfiguration should stop the server at startup.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "4000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let db_max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("DB_MAX_CONNECTIONS must be a valid u32");

        let query_cache_ttl_secs: u64 = std::env::var("QUERY_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("QUERY_CACHE_TTL_SECS must be a valid u64");

        let production = is_production(&std::env::var("APP_ENV").unwrap_or_default());
        let jwt = JwtConfig::from_env(production);

        Self {
            database_url,
            host,
            port,
            cors_origins,
            request_timeout_secs,
            db_max_connections,
            query_cache_ttl_secs,
            production,
            jwt,
        }
    }

    pub fn query_cache(&self) -> QueryCacheConfig {
        QueryCacheConfig {
            ttl: Duration::from_secs(self.query_cache_ttl_secs),
            ..QueryCacheConfig::default()
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn is_production(app_env: &str) -> bool {
    app_env.trim().eq_ignore_ascii_case("production")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" http://a.test ,, http://b.test"),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn only_production_app_env_counts() {
        assert!(is_production("production"));
        assert!(is_production("Production "));
        assert!(!is_production("staging"));
        assert!(!is_production(""));
    }
}
