//! Infrastructure layer modules
//!
//! - `postgres`: PostgreSQL connection pool and schema bootstrap

pub mod postgres;
