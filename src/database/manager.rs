use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

use super::postgres::PostgresStore;
use super::sqlite::SqliteStore;
use super::store::StudentStore;
use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Unsupported database scheme: {0}")]
    UnsupportedScheme(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Backends selectable through the `DATABASE_URL` scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

/// Builds the connection pool and the matching student store
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect to the configured database and prepare the `students` table
    pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn StudentStore>, DatabaseError> {
        let backend = Self::backend(&config.url)?;
        let timeout = Duration::from_secs(config.connection_timeout);

        info!("Connecting to {:?} database at {}", backend, Self::redact_url(&config.url));

        let store: Arc<dyn StudentStore> = match backend {
            Backend::Sqlite => {
                let pool = Self::sqlite_pool(&config.url, config.max_connections, timeout).await?;
                Arc::new(SqliteStore::new(pool).await?)
            }
            Backend::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(timeout)
                    .connect(&config.url)
                    .await?;
                Arc::new(PostgresStore::new(pool).await?)
            }
        };

        Ok(store)
    }

    /// Open a SQLite pool, creating the database file when missing.
    ///
    /// In-memory databases live inside a single connection, so the pool is
    /// pinned to exactly one connection that is never recycled.
    pub async fn sqlite_pool(
        url: &str,
        max_connections: u32,
        timeout: Duration,
    ) -> Result<SqlitePool, DatabaseError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool_options = if Self::is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };

        Ok(pool_options.acquire_timeout(timeout).connect_with(options).await?)
    }

    pub fn backend(database_url: &str) -> Result<Backend, DatabaseError> {
        if database_url.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let scheme = database_url
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .ok_or(DatabaseError::InvalidDatabaseUrl)?;

        match scheme.as_str() {
            "sqlite" => Ok(Backend::Sqlite),
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            other => Err(DatabaseError::UnsupportedScheme(other.to_string())),
        }
    }

    fn is_in_memory(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }

    /// Mask the password component of a database URL for logging
    pub fn redact_url(database_url: &str) -> String {
        match url::Url::parse(database_url) {
            Ok(mut url) if url.password().is_some() => {
                let _ = url.set_password(Some("****"));
                url.to_string()
            }
            _ => database_url.to_string(),
        }
    }
}
