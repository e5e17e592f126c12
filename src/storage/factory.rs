//! Store factory

use std::sync::Arc;

use crate::blob::{BlobStore, MemoryBlobStore, PostgresBlobStore};
use crate::config::Settings;
use crate::infrastructure::postgres::{PostgresPool, PostgresPoolError};
use crate::repository::{MemoryTemplateRepository, PostgresTemplateRepository, TemplateRepository};

/// The two stores every handler depends on.
#[derive(Clone)]
pub struct Stores {
    pub templates: Arc<dyn TemplateRepository>,
    pub blobs: Arc<dyn BlobStore>,

    /// Shared connection pool when PostgreSQL-backed
    pub pool: Option<PostgresPool>,
}

impl Stores {
    /// Fresh in-memory stores.
    pub fn memory(chunk_size: usize) -> Self {
        Self {
            templates: Arc::new(MemoryTemplateRepository::new()),
            blobs: Arc::new(MemoryBlobStore::new(chunk_size)),
            pool: None,
        }
    }

    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: &PostgresPool, chunk_size: usize) -> Self {
        Self {
            templates: Arc::new(PostgresTemplateRepository::new(pool.clone())),
            blobs: Arc::new(PostgresBlobStore::new(pool.clone(), chunk_size)),
            pool: Some(pool.clone()),
        }
    }

    /// Release database connections. No-op for memory stores.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

/// Create stores based on configuration.
///
/// Returns the appropriate backends based on the `database.backend` setting:
/// - `"memory"`: in-process stores, lost on restart
/// - `"postgres"` (default): PostgreSQL stores
///
/// An unreachable database is logged and tolerated; requests then fail
/// individually until it comes back, and the schema is bootstrapped on the
/// first request that reaches it. Only an invalid database URL is an error.
pub async fn create_stores(settings: &Settings) -> Result<Stores, PostgresPoolError> {
    let chunk_size = settings.storage.chunk_size;

    match settings.database.backend.as_str() {
        "memory" => {
            tracing::info!(backend = "memory", "Creating memory stores");
            Ok(Stores::memory(chunk_size))
        }
        other => {
            if other != "postgres" {
                tracing::warn!(
                    backend = %other,
                    "Unknown storage backend requested, using PostgreSQL"
                );
            }

            let pool = PostgresPool::connect_or_lazy(&settings.database).await?;
            if let Err(e) = pool.ensure_schema().await {
                tracing::error!(error = %e, "PostgreSQL schema bootstrap failed, retrying on first use");
            }

            tracing::info!(
                backend = "postgres",
                url = %pool.database_url_masked(),
                chunk_size,
                "Creating PostgreSQL stores"
            );
            Ok(Stores::postgres(&pool, chunk_size))
        }
    }
}
