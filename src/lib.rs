// Infrastructure layer (shared components)
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod metrics;
pub mod telemetry;

// Re-export infrastructure modules
pub use infrastructure::postgres;

// Domain layer
pub mod blob;
pub mod repository;
pub mod storage;
pub mod template;

// Application layer
pub mod api;
pub mod server;
