//! Template repository abstraction.
//!
//! Templates are append-only: the repository assigns identity and creation
//! time on insert and never updates or deletes a record. "Latest" means the
//! greatest `created_at`, ties broken by insertion order.

mod memory;
mod postgres;

pub use memory::MemoryTemplateRepository;
pub use postgres::PostgresTemplateRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::storage::StoreError;
use crate::template::{NewTemplate, Template};

/// Storage for saved email layout configurations.
///
/// Implementations must be thread-safe (`Send + Sync`) as they are shared
/// by every request handler.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Latest template whose `html` is present.
    async fn find_latest_with_html(&self) -> Result<Option<Template>, StoreError>;

    /// Latest template regardless of content.
    async fn find_latest(&self) -> Result<Option<Template>, StoreError>;

    /// Persist a new template and return its assigned id.
    async fn insert(&self, template: NewTemplate) -> Result<Uuid, StoreError>;
}
