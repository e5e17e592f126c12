//! PostgreSQL connection pool with lazy fallback and schema bootstrap.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::DatabaseConfig;

use super::schema::SCHEMA_STATEMENTS;

/// Errors that can occur with the PostgreSQL pool.
#[derive(Debug, Error)]
pub enum PostgresPoolError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Schema bootstrap failed: {0}")]
    Schema(String),
}

/// PostgreSQL connection pool.
#[derive(Clone)]
pub struct PostgresPool {
    /// The underlying connection pool
    pool: PgPool,

    /// Database URL (for logging purposes)
    database_url: String,

    /// Set once the schema bootstrap has succeeded; shared by all clones
    schema_ready: Arc<OnceCell<()>>,
}

impl PostgresPool {
    fn options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds as u64))
    }

    /// Create a new PostgreSQL pool, failing if the database is unreachable.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, PostgresPoolError> {
        let pool = Self::options(config).connect(&config.url).await?;

        tracing::info!(
            pool_size = config.pool_size,
            url = %mask_url(&config.url),
            "PostgreSQL connection pool created"
        );

        Ok(Self::from_parts(pool, &config.url))
    }

    fn from_parts(pool: PgPool, database_url: &str) -> Self {
        Self {
            pool,
            database_url: database_url.to_string(),
            schema_ready: Arc::new(OnceCell::new()),
        }
    }

    /// Create a pool, falling back to lazy connections when the database is down.
    ///
    /// Requests made while the database is unreachable fail individually.
    /// Only an unparseable URL is an error.
    pub async fn connect_or_lazy(config: &DatabaseConfig) -> Result<Self, PostgresPoolError> {
        match Self::connect(config).await {
            Ok(pool) => Ok(pool),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    url = %mask_url(&config.url),
                    "PostgreSQL connection failed, continuing with lazy pool"
                );
                let pool = Self::options(config).connect_lazy(&config.url)?;
                Ok(Self::from_parts(pool, &config.url))
            }
        }
    }

    /// Create tables and indexes if they do not exist.
    ///
    /// Runs the bootstrap at most once successfully. A failed attempt leaves
    /// the pool unbootstrapped so the next call tries again.
    pub async fn ensure_schema(&self) -> Result<(), PostgresPoolError> {
        self.schema_ready
            .get_or_try_init(|| async {
                for statement in SCHEMA_STATEMENTS {
                    sqlx::query(statement)
                        .execute(&self.pool)
                        .await
                        .map_err(|e| PostgresPoolError::Schema(e.to_string()))?;
                }

                tracing::info!("PostgreSQL schema ready");
                Ok::<(), PostgresPoolError>(())
            })
            .await?;

        Ok(())
    }

    /// Whether the schema bootstrap has completed.
    pub fn is_schema_ready(&self) -> bool {
        self.schema_ready.initialized()
    }

    /// The underlying pool, after making sure the schema exists.
    pub async fn ready(&self) -> Result<&PgPool, PostgresPoolError> {
        self.ensure_schema().await?;
        Ok(&self.pool)
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the database URL (masked for logging).
    pub fn database_url_masked(&self) -> String {
        mask_url(&self.database_url)
    }

    /// Close the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL connection pool closed");
    }
}

/// Mask the password in a connection URL for safe logging.
pub fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            // Skip the scheme separator in "postgres://host@..."
            if !url[colon_pos..].starts_with("://") {
                let prefix = &url[..colon_pos + 1];
                let suffix = &url[at_pos..];
                return format!("{}***{}", prefix, suffix);
            }
        }
    }
    url.to_string()
}
