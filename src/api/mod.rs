//! API layer - HTTP endpoint handlers.

mod health;
mod images;
mod layout;
mod metrics;
mod routes;

pub use health::health;
pub use images::{image_url, serve_image, upload_image, UploadImageResponse};
pub use layout::{get_email_layout, render_and_download_template, upload_email_config};
pub use metrics::prometheus_metrics;
pub use routes::api_routes;

use crate::error::{ApiError, AppError};
use crate::metrics::StoreMetrics;
use crate::storage::StoreError;

/// Map a store failure to a 500 with the endpoint's generic message.
pub(crate) fn store_failure(
    operation: &'static str,
    client_message: &'static str,
) -> impl FnOnce(StoreError) -> ApiError {
    move |e| {
        StoreMetrics::record_error(operation);
        AppError::from(e).with_context(client_message)
    }
}
