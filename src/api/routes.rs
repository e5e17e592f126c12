use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::server::AppState;

use super::health::health;
use super::images::{serve_image, upload_image};
use super::layout::{get_email_layout, render_and_download_template, upload_email_config};
use super::metrics::prometheus_metrics;

pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // Health & Metrics
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .nest(
            "/api",
            Router::new()
                // Layout
                .route("/getEmailLayout", get(get_email_layout))
                .route("/uploadEmailConfig", post(upload_email_config))
                .route(
                    "/renderAndDownloadTemplate",
                    post(render_and_download_template),
                )
                // Images
                .route(
                    "/uploadImage",
                    post(upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
                )
                .route("/images/{id}", get(serve_image)),
        )
}
