//! Layout endpoints: fetch the raw layout, save a configuration, render for download.

use axum::{extract::State, response::Html, Json};
use serde_json::Value;

use crate::error::{ApiError, AppError};
use crate::metrics::TemplateMetrics;
use crate::server::AppState;
use crate::template::{
    CompiledTemplate, SaveConfigRequest, SaveConfigResponse, DEFAULT_TEMPLATE,
};

use super::store_failure;

const READ_ERROR: &str = "Error reading template";
const SAVE_ERROR: &str = "Error saving template";
const RENDER_ERROR: &str = "Error rendering template";

/// GET /api/getEmailLayout - Raw layout of the latest template that has one
///
/// Placeholders are returned unresolved.
#[tracing::instrument(name = "http.get_email_layout", skip(state))]
pub async fn get_email_layout(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let latest = state
        .templates
        .find_latest_with_html()
        .await
        .map_err(store_failure("find_latest_with_html", READ_ERROR))?;

    let html = match latest.and_then(|t| t.html) {
        Some(html) => html,
        None => {
            tracing::debug!("No stored layout, serving default");
            DEFAULT_TEMPLATE.to_string()
        }
    };

    Ok(Html(html))
}

/// POST /api/uploadEmailConfig - Save a new immutable configuration
///
/// The stored `html` is always the built-in default layout, whatever the
/// currently active layout is.
#[tracing::instrument(name = "http.upload_email_config", skip(state, request))]
pub async fn upload_email_config(
    State(state): State<AppState>,
    Json(request): Json<SaveConfigRequest>,
) -> Result<Json<SaveConfigResponse>, ApiError> {
    let record = request.into_new_template(DEFAULT_TEMPLATE);

    let template_id = state
        .templates
        .insert(record)
        .await
        .map_err(store_failure("insert_template", SAVE_ERROR))?;

    TemplateMetrics::record_saved();
    tracing::info!(template_id = %template_id, "Email configuration saved");

    Ok(Json(SaveConfigResponse {
        success: true,
        template_id,
    }))
}

/// POST /api/renderAndDownloadTemplate - Render the latest layout with the request body
#[tracing::instrument(name = "http.render_and_download_template", skip(state, data))]
pub async fn render_and_download_template(
    State(state): State<AppState>,
    Json(data): Json<Value>,
) -> Result<Html<String>, ApiError> {
    let latest = state
        .templates
        .find_latest()
        .await
        .map_err(store_failure("find_latest", RENDER_ERROR))?;

    let template_id = latest.as_ref().map(|t| t.id);
    let stored_html = latest.and_then(|t| t.html);
    let source = stored_html.as_deref().unwrap_or(DEFAULT_TEMPLATE);

    let html = CompiledTemplate::compile(source)
        .and_then(|compiled| compiled.render(&data))
        .map_err(|e| {
            TemplateMetrics::record_render_failure();
            AppError::from(e).with_context(RENDER_ERROR)
        })?;
    TemplateMetrics::record_rendered();

    tracing::debug!(
        template_id = ?template_id,
        output_bytes = html.len(),
        "Layout rendered"
    );

    Ok(Html(html))
}
