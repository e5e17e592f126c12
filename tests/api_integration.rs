//! HTTP integration tests
//!
//! These tests drive the full router with in-memory stores, so they need
//! neither PostgreSQL nor a listening socket.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use email_layout_service::blob::{BlobDownload, BlobInfo, BlobStore, MemoryBlobStore, NewBlob};
use email_layout_service::config::Settings;
use email_layout_service::repository::{MemoryTemplateRepository, TemplateRepository};
use email_layout_service::server::{create_app, AppState};
use email_layout_service::storage::{StoreError, Stores};
use email_layout_service::template::{NewTemplate, Template, DEFAULT_TEMPLATE};

const BOUNDARY: &str = "----email-layout-test-boundary";

/// Router plus handles on the concrete memory stores
struct TestEnvironment {
    app: Router,
    templates: Arc<MemoryTemplateRepository>,
    blobs: Arc<MemoryBlobStore>,
}

fn memory_settings() -> Settings {
    let mut settings = Settings::default();
    settings.database.backend = "memory".to_string();
    settings
}

fn create_test_environment() -> TestEnvironment {
    create_test_environment_with(memory_settings())
}

fn create_test_environment_with(settings: Settings) -> TestEnvironment {
    let templates = Arc::new(MemoryTemplateRepository::new());
    // Tiny chunks so downloads span several stream items
    let blobs = Arc::new(MemoryBlobStore::new(4));

    let stores = Stores {
        templates: templates.clone(),
        blobs: blobs.clone(),
        pool: None,
    };

    TestEnvironment {
        app: create_app(AppState::new(settings, stores)),
        templates,
        blobs,
    }
}

fn stored_template(html: Option<&str>, offset_seconds: i64) -> Template {
    NewTemplate {
        title: Some(format!("t{}", offset_seconds)),
        html: html.map(str::to_string),
        ..Default::default()
    }
    .into_template(
        Uuid::new_v4(),
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(offset_seconds),
    )
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One multipart part: (field name, optional filename, content type, payload)
type Part<'a> = (&'a str, Option<&'a str>, &'a str, &'a [u8]);

fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/uploadImage")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

// =============================================================================
// Layout Tests
// =============================================================================

mod layout_tests {
    use super::*;

    #[tokio::test]
    async fn test_default_layout_when_empty() {
        let env = create_test_environment();

        let response = send(&env.app, get("/api/getEmailLayout")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        assert_eq!(body_text(response).await, DEFAULT_TEMPLATE);
    }

    #[tokio::test]
    async fn test_latest_layout_selected_by_created_at() {
        let env = create_test_environment();
        env.templates
            .insert_record(stored_template(Some("<p>t1</p>"), 1))
            .await;
        env.templates
            .insert_record(stored_template(Some("<p>t3</p>"), 3))
            .await;
        env.templates
            .insert_record(stored_template(Some("<p>t2</p>"), 2))
            .await;

        let response = send(&env.app, get("/api/getEmailLayout")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<p>t3</p>");
    }

    #[tokio::test]
    async fn test_layout_skips_records_without_html() {
        let env = create_test_environment();
        env.templates
            .insert_record(stored_template(Some("<p>has html</p>"), 1))
            .await;
        env.templates.insert_record(stored_template(None, 2)).await;

        let response = send(&env.app, get("/api/getEmailLayout")).await;

        assert_eq!(body_text(response).await, "<p>has html</p>");
    }

    #[tokio::test]
    async fn test_layout_placeholders_are_not_resolved() {
        let env = create_test_environment();
        env.templates
            .insert_record(stored_template(Some("<h1>{{title}}</h1>"), 1))
            .await;

        let response = send(&env.app, get("/api/getEmailLayout")).await;

        assert_eq!(body_text(response).await, "<h1>{{title}}</h1>");
    }
}

// =============================================================================
// Save Config Tests
// =============================================================================

mod save_config_tests {
    use super::*;

    #[tokio::test]
    async fn test_save_config_returns_template_id() {
        let env = create_test_environment();

        let response = send(
            &env.app,
            post_json(
                "/api/uploadEmailConfig",
                json!({
                    "title": "Spring sale",
                    "content": "<p>Everything must go</p>",
                    "footer": "Unsubscribe",
                    "imageId": "not-checked"
                }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["success"], true);

        let id: Uuid = body["templateId"].as_str().unwrap().parse().unwrap();
        let stored = env.templates.find_latest().await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.title.as_deref(), Some("Spring sale"));
        assert_eq!(stored.image_id.as_deref(), Some("not-checked"));
    }

    #[tokio::test]
    async fn test_save_config_pins_html_to_default_layout() {
        // Current behavior: a custom layout is never carried forward by a
        // save, even when the client sends one.
        let env = create_test_environment();
        env.templates
            .insert_record(stored_template(Some("<p>custom</p>"), 1))
            .await;

        let response = send(
            &env.app,
            post_json(
                "/api/uploadEmailConfig",
                json!({ "title": "x", "html": "<p>client html</p>" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let stored = env.templates.find_latest().await.unwrap().unwrap();
        assert_eq!(stored.html.as_deref(), Some(DEFAULT_TEMPLATE));

        let response = send(&env.app, get("/api/getEmailLayout")).await;
        assert_eq!(body_text(response).await, DEFAULT_TEMPLATE);
    }

    #[tokio::test]
    async fn test_each_save_creates_new_record() {
        let env = create_test_environment();

        for title in ["first", "second"] {
            let response = send(
                &env.app,
                post_json("/api/uploadEmailConfig", json!({ "title": title })),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        assert_eq!(env.templates.len().await, 2);
        let latest = env.templates.find_latest().await.unwrap().unwrap();
        assert_eq!(latest.title.as_deref(), Some("second"));
    }
}

// =============================================================================
// Render Tests
// =============================================================================

mod render_tests {
    use super::*;

    #[tokio::test]
    async fn test_render_default_layout() {
        let env = create_test_environment();

        let response = send(
            &env.app,
            post_json(
                "/api/renderAndDownloadTemplate",
                json!({
                    "title": "<Sale>",
                    "content": "<p>Hi</p>",
                    "footer": "<b>Bye</b>"
                }),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
        let html = body_text(response).await;
        assert!(html.contains("<title>&lt;Sale&gt;</title>"));
        assert!(html.contains("<p>Hi</p>"));
        assert!(html.contains("<b>Bye</b>"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("{{"));
    }

    #[tokio::test]
    async fn test_render_includes_image_when_url_given() {
        let env = create_test_environment();

        let response = send(
            &env.app,
            post_json(
                "/api/renderAndDownloadTemplate",
                json!({ "imageUrl": "/api/images/abc" }),
            ),
        )
        .await;

        let html = body_text(response).await;
        assert!(html.contains(r#"<img src="/api/images/abc" alt="Email Image" class="image">"#));
    }

    #[tokio::test]
    async fn test_render_uses_latest_template() {
        let env = create_test_environment();
        env.templates
            .insert_record(stored_template(Some("old {{name}}"), 1))
            .await;
        env.templates
            .insert_record(stored_template(Some("A{{#if y}}B{{/if}}C {{name}}"), 2))
            .await;

        let response = send(
            &env.app,
            post_json(
                "/api/renderAndDownloadTemplate",
                json!({ "name": "Ada" }),
            ),
        )
        .await;

        assert_eq!(body_text(response).await, "AC Ada");
    }

    #[tokio::test]
    async fn test_render_is_repeatable() {
        let env = create_test_environment();
        let data = json!({ "title": "Same", "content": "<i>same</i>", "imageUrl": "x" });

        let first = body_text(
            send(
                &env.app,
                post_json("/api/renderAndDownloadTemplate", data.clone()),
            )
            .await,
        )
        .await;
        let second = body_text(
            send(&env.app, post_json("/api/renderAndDownloadTemplate", data)).await,
        )
        .await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_render_malformed_template_is_500() {
        let env = create_test_environment();
        env.templates
            .insert_record(stored_template(Some("{{#if open}}never closed"), 1))
            .await;

        let response = send(
            &env.app,
            post_json("/api/renderAndDownloadTemplate", json!({})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "Error rendering template");
    }
}

// =============================================================================
// Image Tests
// =============================================================================

mod image_tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR-fake-image";

    #[tokio::test]
    async fn test_upload_and_retrieve_round_trip() {
        let env = create_test_environment();

        let response = send(
            &env.app,
            multipart_request(&[("image", Some("logo.png"), "image/png", PNG)]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        let image_id = body["imageId"].as_str().unwrap().to_string();
        let image_url = body["imageUrl"].as_str().unwrap().to_string();
        assert_eq!(image_url, format!("/api/images/{}", image_id));

        let response = send(&env.app, get(&image_url)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_LENGTH).unwrap(),
            &PNG.len().to_string()
        );
        assert_eq!(body_bytes(response).await, PNG);
    }

    #[tokio::test]
    async fn test_stored_filename_is_timestamp_prefixed() {
        let env = create_test_environment();

        let response = send(
            &env.app,
            multipart_request(&[("image", Some("logo.png"), "image/png", PNG)]),
        )
        .await;
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        let id: Uuid = body["imageId"].as_str().unwrap().parse().unwrap();

        let download = env.blobs.get(id).await.unwrap().unwrap();
        let (millis, original) = download.info.filename.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(original, "logo.png");
    }

    #[tokio::test]
    async fn test_upload_without_image_is_400() {
        let env = create_test_environment();

        let response = send(
            &env.app,
            multipart_request(&[("caption", None, "text/plain", &b"hello"[..])]),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "No image uploaded");
        assert!(env.blobs.is_empty());
    }

    #[tokio::test]
    async fn test_image_field_without_filename_is_not_a_file() {
        let env = create_test_environment();

        let response = send(
            &env.app,
            multipart_request(&[("image", None, "text/plain", &b"just text"[..])]),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(env.blobs.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_upload_is_413() {
        let mut settings = memory_settings();
        settings.server.max_upload_bytes = 1024;
        let env = create_test_environment_with(settings);

        let big = vec![0u8; 4096];
        let response = send(
            &env.app,
            multipart_request(&[("image", Some("big.png"), "image/png", &big[..])]),
        )
        .await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(env.blobs.is_empty());
    }

    #[tokio::test]
    async fn test_upload_within_limit_is_accepted() {
        let mut settings = memory_settings();
        settings.server.max_upload_bytes = 1024;
        let env = create_test_environment_with(settings);

        let response = send(
            &env.app,
            multipart_request(&[("image", Some("small.png"), "image/png", PNG)]),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(env.blobs.len(), 1);
    }

    #[tokio::test]
    async fn test_second_file_is_rejected() {
        let env = create_test_environment();

        let response = send(
            &env.app,
            multipart_request(&[
                ("image", Some("a.png"), "image/png", PNG),
                ("other", Some("b.png"), "image/png", PNG),
            ]),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(env.blobs.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_image_is_404() {
        let env = create_test_environment();

        let response = send(&env.app, get(&format!("/api/images/{}", Uuid::new_v4()))).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "Image not found");
    }

    #[tokio::test]
    async fn test_malformed_image_id_is_404() {
        let env = create_test_environment();

        let response = send(&env.app, get("/api/images/not-an-id")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

// =============================================================================
// Store Failure Tests
// =============================================================================

mod store_failure_tests {
    use super::*;

    /// Store whose every operation fails as if the database were down
    struct UnavailableStore;

    fn unavailable() -> StoreError {
        StoreError::Unavailable("connection refused (postgres://user:secret@db)".to_string())
    }

    #[async_trait]
    impl TemplateRepository for UnavailableStore {
        async fn find_latest_with_html(&self) -> Result<Option<Template>, StoreError> {
            Err(unavailable())
        }

        async fn find_latest(&self) -> Result<Option<Template>, StoreError> {
            Err(unavailable())
        }

        async fn insert(&self, _template: NewTemplate) -> Result<Uuid, StoreError> {
            Err(unavailable())
        }
    }

    #[async_trait]
    impl BlobStore for UnavailableStore {
        async fn put(&self, _blob: NewBlob) -> Result<BlobInfo, StoreError> {
            Err(unavailable())
        }

        async fn get(&self, _id: Uuid) -> Result<Option<BlobDownload>, StoreError> {
            Err(unavailable())
        }
    }

    fn failing_app() -> Router {
        let store = Arc::new(UnavailableStore);
        let stores = Stores {
            templates: store.clone(),
            blobs: store,
            pool: None,
        };
        create_app(AppState::new(Settings::default(), stores))
    }

    async fn assert_generic_500(response: Response<Body>, message: &str) {
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let text = body_text(response).await;
        assert_eq!(text, message);
        assert!(!text.contains("secret"));
    }

    #[tokio::test]
    async fn test_every_endpoint_fails_individually() {
        let app = failing_app();

        assert_generic_500(
            send(&app, get("/api/getEmailLayout")).await,
            "Error reading template",
        )
        .await;
        assert_generic_500(
            send(&app, post_json("/api/uploadEmailConfig", json!({ "title": "x" }))).await,
            "Error saving template",
        )
        .await;
        assert_generic_500(
            send(&app, post_json("/api/renderAndDownloadTemplate", json!({}))).await,
            "Error rendering template",
        )
        .await;
        assert_generic_500(
            send(
                &app,
                multipart_request(&[("image", Some("a.png"), "image/png", &b"png"[..])]),
            )
            .await,
            "Error uploading image",
        )
        .await;
        assert_generic_500(
            send(&app, get(&format!("/api/images/{}", Uuid::new_v4()))).await,
            "Error serving image",
        )
        .await;
    }

    #[tokio::test]
    async fn test_missing_file_still_400_when_store_is_down() {
        let app = failing_app();

        let response = send(
            &app,
            multipart_request(&[("caption", None, "text/plain", &b"hello"[..])]),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Operational Endpoint Tests
// =============================================================================

mod operational_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let env = create_test_environment();

        let response = send(&env.app, get("/health")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_metrics_exposes_counters() {
        let env = create_test_environment();
        send(
            &env.app,
            post_json("/api/uploadEmailConfig", json!({ "title": "x" })),
        )
        .await;

        let response = send(&env.app, get("/metrics")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response)
            .await
            .contains("email_layout_templates_saved_total"));
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let env = create_test_environment();

        let request = Request::builder()
            .uri("/api/getEmailLayout")
            .header(header::ORIGIN, "https://builder.example.com")
            .body(Body::empty())
            .unwrap();
        let response = send(&env.app, request).await;

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }
}
