//! In-memory template repository.
//!
//! Records are lost on restart. Used for local development and tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::TemplateRepository;
use crate::storage::StoreError;
use crate::template::{NewTemplate, Template};

/// Append-only vector of templates in insertion order.
#[derive(Default)]
pub struct MemoryTemplateRepository {
    records: RwLock<Vec<Template>>,
}

impl MemoryTemplateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fully-formed record, keeping the given id and timestamp.
    pub async fn insert_record(&self, template: Template) {
        self.records.write().await.push(template);
    }

    /// Number of stored templates.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn latest_matching<F>(&self, predicate: F) -> Option<Template>
    where
        F: Fn(&Template) -> bool,
    {
        let records = self.records.read().await;
        records
            .iter()
            .enumerate()
            .filter(|(_, t)| predicate(t))
            // Position breaks created_at ties in favour of the later insert
            .max_by_key(|(position, t)| (t.created_at, *position))
            .map(|(_, t)| t.clone())
    }
}

#[async_trait]
impl TemplateRepository for MemoryTemplateRepository {
    async fn find_latest_with_html(&self) -> Result<Option<Template>, StoreError> {
        Ok(self.latest_matching(|t| t.html.is_some()).await)
    }

    async fn find_latest(&self) -> Result<Option<Template>, StoreError> {
        Ok(self.latest_matching(|_| true).await)
    }

    async fn insert(&self, template: NewTemplate) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.insert_record(template.into_template(id, Utc::now()))
            .await;

        tracing::debug!(template_id = %id, "Template stored in memory");

        Ok(id)
    }
}
