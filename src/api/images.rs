//! Image upload and retrieval endpoints.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::blob::{unique_filename, NewBlob};
use crate::error::{ApiError, AppError};
use crate::metrics::ImageMetrics;
use crate::server::AppState;

use super::store_failure;

const UPLOAD_ERROR: &str = "Error uploading image";
const SERVE_ERROR: &str = "Error serving image";

/// Multipart field carrying the image file
const IMAGE_FIELD: &str = "image";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub image_id: Uuid,
    pub image_url: String,
}

/// Retrieval path for a stored image
pub fn image_url(id: Uuid) -> String {
    format!("/api/images/{}", id)
}

struct ImageUpload {
    file_name: String,
    content_type: String,
    data: Bytes,
}

fn invalid_upload(message: String) -> ApiError {
    AppError::Validation(message).with_context(UPLOAD_ERROR)
}

/// Keep the body-limit rejection distinct from malformed forms.
fn multipart_failure(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text()).with_context(UPLOAD_ERROR)
    } else {
        invalid_upload(e.body_text())
    }
}

/// Pull the single `image` file part out of the form.
///
/// Parts without a filename are plain form fields and are ignored.
async fn read_image_field(multipart: &mut Multipart) -> Result<Option<ImageUpload>, ApiError> {
    let mut upload: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_failure)?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let name = field.name().unwrap_or_default().to_string();

        if name != IMAGE_FIELD || upload.is_some() {
            return Err(invalid_upload(format!("Unexpected file field `{}`", name)));
        }

        let content_type = field
            .content_type()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(multipart_failure)?;

        upload = Some(ImageUpload {
            file_name,
            content_type,
            data,
        });
    }

    Ok(upload)
}

/// POST /api/uploadImage - Store an uploaded image
#[tracing::instrument(name = "http.upload_image", skip(state, multipart))]
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, ApiError> {
    let upload = read_image_field(&mut multipart)
        .await?
        .ok_or_else(|| invalid_upload("No image uploaded".to_string()))?;

    let blob = NewBlob {
        filename: unique_filename(&upload.file_name, Utc::now()),
        content_type: upload.content_type,
        data: upload.data,
    };

    let info = state
        .blobs
        .put(blob)
        .await
        .map_err(store_failure("blob_put", UPLOAD_ERROR))?;

    ImageMetrics::record_uploaded(info.length);
    tracing::info!(
        image_id = %info.id,
        filename = %info.filename,
        content_type = %info.content_type,
        length = info.length,
        "Image uploaded"
    );

    Ok(Json(UploadImageResponse {
        image_id: info.id,
        image_url: image_url(info.id),
    }))
}

/// GET /api/images/{id} - Stream a stored image with its content type
#[tracing::instrument(name = "http.serve_image", skip(state))]
pub async fn serve_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let not_found = || AppError::NotFound("Image not found".to_string()).with_context(SERVE_ERROR);

    // Ids that can never have been issued are simply unknown
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let download = state
        .blobs
        .get(id)
        .await
        .map_err(store_failure("blob_get", SERVE_ERROR))?
        .ok_or_else(not_found)?;

    let content_type = HeaderValue::from_str(&download.info.content_type).unwrap_or_else(|_| {
        tracing::warn!(
            image_id = %id,
            content_type = %download.info.content_type,
            "Stored content type is not a valid header value"
        );
        HeaderValue::from_static(FALLBACK_CONTENT_TYPE)
    });

    ImageMetrics::record_served();

    let mut response = Body::from_stream(download.stream).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(download.info.length));

    Ok(response)
}
