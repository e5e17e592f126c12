//! Prometheus metrics for the email layout service.
//!
//! - Template metrics (configurations saved, layouts rendered, render failures)
//! - Image metrics (uploads, uploaded bytes, downloads)
//! - Store error counts by operation

mod helpers;

pub use helpers::{encode_metrics, ImageMetrics, StoreMetrics, TemplateMetrics};

use lazy_static::lazy_static;
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "email_layout";

lazy_static! {
    // ============================================================================
    // Template Metrics
    // ============================================================================

    /// Total template configurations saved
    pub static ref TEMPLATES_SAVED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_templates_saved_total", METRIC_PREFIX),
        "Total template configurations saved"
    ).unwrap();

    /// Total layouts rendered for download
    pub static ref TEMPLATES_RENDERED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_templates_rendered_total", METRIC_PREFIX),
        "Total layouts rendered"
    ).unwrap();

    /// Renders rejected because the stored layout failed to compile
    pub static ref RENDER_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_render_failures_total", METRIC_PREFIX),
        "Total renders that failed to compile the layout"
    ).unwrap();

    // ============================================================================
    // Image Metrics
    // ============================================================================

    pub static ref IMAGES_UPLOADED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_images_uploaded_total", METRIC_PREFIX),
        "Total images uploaded"
    ).unwrap();

    pub static ref IMAGE_UPLOAD_BYTES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_image_upload_bytes_total", METRIC_PREFIX),
        "Total bytes of uploaded images"
    ).unwrap();

    pub static ref IMAGES_SERVED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_images_served_total", METRIC_PREFIX),
        "Total image downloads started"
    ).unwrap();

    // ============================================================================
    // Store Metrics
    // ============================================================================

    /// Store failures by operation
    pub static ref STORE_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_store_errors_total", METRIC_PREFIX),
        "Total store operation failures",
        &["operation"]
    ).unwrap();
}
