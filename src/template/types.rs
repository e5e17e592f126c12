//! Template record types and template errors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Malformed template, detected when it is compiled or rendered.
///
/// Messages come from the template engine and include line and column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateSyntaxError {
    #[error("Template failed to compile: {0}")]
    Compile(String),

    #[error("Template failed to render: {0}")]
    Render(String),
}

/// A saved email layout configuration.
///
/// Records are immutable once inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Identifier assigned by the repository
    pub id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Body content, may contain markup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Reference to an uploaded blob, not checked for existence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,

    /// Full HTML layout in effect when the record was saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Fields of a template record before the repository assigns `id` and `created_at`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTemplate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_id: Option<String>,
    pub footer: Option<String>,
    pub html: Option<String>,
}

impl NewTemplate {
    /// Materialize the record with repository-assigned identity.
    pub fn into_template(self, id: Uuid, created_at: DateTime<Utc>) -> Template {
        Template {
            id,
            title: self.title,
            content: self.content,
            image_id: self.image_id,
            footer: self.footer,
            html: self.html,
            created_at,
        }
    }
}

/// Body of `POST /api/uploadEmailConfig`.
///
/// Unknown fields are ignored. A client-supplied `html` is never read.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveConfigRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub content: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub image_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub footer: Option<String>,
}

impl SaveConfigRequest {
    /// Build the record to persist, pinning `html` to the given layout.
    pub fn into_new_template(self, html: &str) -> NewTemplate {
        NewTemplate {
            title: self.title,
            content: self.content,
            image_id: self.image_id,
            footer: self.footer,
            html: Some(html.to_string()),
        }
    }
}

/// Response of `POST /api/uploadEmailConfig`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveConfigResponse {
    pub success: bool,
    pub template_id: Uuid,
}

/// Accept strings, numbers and booleans as text; null means absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        serde_json::Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a string, found {}",
            match other {
                serde_json::Value::Array(_) => "an array",
                _ => "an object",
            }
        ))),
    }
}
