//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    IMAGES_SERVED_TOTAL, IMAGES_UPLOADED_TOTAL, IMAGE_UPLOAD_BYTES_TOTAL, RENDER_FAILURES_TOTAL,
    STORE_ERRORS_TOTAL, TEMPLATES_RENDERED_TOTAL, TEMPLATES_SAVED_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording template metrics
pub struct TemplateMetrics;

impl TemplateMetrics {
    pub fn record_saved() {
        TEMPLATES_SAVED_TOTAL.inc();
    }

    pub fn record_rendered() {
        TEMPLATES_RENDERED_TOTAL.inc();
    }

    pub fn record_render_failure() {
        RENDER_FAILURES_TOTAL.inc();
    }
}

/// Helper struct for recording image metrics
pub struct ImageMetrics;

impl ImageMetrics {
    /// Record a completed upload of `bytes` bytes
    pub fn record_uploaded(bytes: u64) {
        IMAGES_UPLOADED_TOTAL.inc();
        IMAGE_UPLOAD_BYTES_TOTAL.inc_by(bytes);
    }

    pub fn record_served() {
        IMAGES_SERVED_TOTAL.inc();
    }
}

/// Helper struct for recording store failures
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record a failed store operation, e.g. "find_latest" or "blob_put"
    pub fn record_error(operation: &str) {
        STORE_ERRORS_TOTAL.with_label_values(&[operation]).inc();
    }
}
