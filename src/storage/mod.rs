//! Storage backends shared by the template repository and the blob store.
//!
//! - `StoreError`: failure type for every persistence operation
//! - `create_stores`: builds both stores for the configured backend

mod factory;

pub use factory::{create_stores, Stores};

use thiserror::Error;
use uuid::Uuid;

use crate::infrastructure::postgres::PostgresPoolError;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// PostgreSQL operation failed
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// Pool could not provide a bootstrapped database
    #[error("PostgreSQL pool error: {0}")]
    Pool(#[from] PostgresPoolError),

    /// Stored blob is missing chunks or has inconsistent metadata
    #[error("Blob {id} is corrupt: {reason}")]
    Corrupt { id: Uuid, reason: String },

    /// Backend cannot serve requests
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
