//! PostgreSQL-based template repository.
//!
//! Table structure:
//! - `email_templates` - one row per saved configuration, `seq` preserves insert order
//!
//! Every operation first makes sure the schema exists, so a database that was
//! down at startup is bootstrapped once it becomes reachable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::TemplateRepository;
use crate::infrastructure::postgres::PostgresPool;
use crate::storage::StoreError;
use crate::template::{NewTemplate, Template};

type TemplateRow = (
    Uuid,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    DateTime<Utc>,
);

const SELECT_COLUMNS: &str = "id, title, content, image_id, footer, html, created_at";

pub struct PostgresTemplateRepository {
    pool: PostgresPool,
}

impl PostgresTemplateRepository {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    async fn fetch_latest(&self, filter: &str) -> Result<Option<Template>, StoreError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM email_templates {filter} \
             ORDER BY created_at DESC, seq DESC LIMIT 1"
        );

        let pool = self.pool.ready().await?;
        let row: Option<TemplateRow> = sqlx::query_as(&sql)
            .fetch_optional(pool)
            .await
            .map_err(StoreError::Postgres)?;

        Ok(row.map(from_row))
    }
}

fn from_row(row: TemplateRow) -> Template {
    let (id, title, content, image_id, footer, html, created_at) = row;
    Template {
        id,
        title,
        content,
        image_id,
        footer,
        html,
        created_at,
    }
}

#[async_trait]
impl TemplateRepository for PostgresTemplateRepository {
    async fn find_latest_with_html(&self) -> Result<Option<Template>, StoreError> {
        self.fetch_latest("WHERE html IS NOT NULL").await
    }

    async fn find_latest(&self) -> Result<Option<Template>, StoreError> {
        self.fetch_latest("").await
    }

    async fn insert(&self, template: NewTemplate) -> Result<Uuid, StoreError> {
        let pool = self.pool.ready().await?;
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO email_templates (id, title, content, image_id, footer, html, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(&template.title)
        .bind(&template.content)
        .bind(&template.image_id)
        .bind(&template.footer)
        .bind(&template.html)
        .bind(created_at)
        .execute(pool)
        .await
        .map_err(StoreError::Postgres)?;

        tracing::trace!(template_id = %id, "Template inserted into PostgreSQL");

        Ok(id)
    }
}
