//! PostgreSQL persistence module.
//!
//! Provides connection pooling and schema bootstrap for the PostgreSQL backend.

pub mod pool;
mod schema;

pub use pool::{mask_url, PostgresPool, PostgresPoolError};
