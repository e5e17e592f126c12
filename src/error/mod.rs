use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::storage::StoreError;
use crate::template::TemplateSyntaxError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Template syntax error: {0}")]
    TemplateSyntax(#[from] TemplateSyntaxError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Config(_) | AppError::Store(_) | AppError::TemplateSyntax(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::Store(_) => "STORE_ERROR",
            AppError::TemplateSyntax(_) => "TEMPLATE_SYNTAX_ERROR",
        }
    }

    /// Attach the generic text shown to clients for server-side failures.
    pub fn with_context(self, client_message: &'static str) -> ApiError {
        ApiError {
            error: self,
            client_message,
        }
    }
}

/// An [`AppError`] paired with the endpoint-specific text sent to the client.
///
/// Validation and not-found messages are safe to expose and are passed
/// through; every 5xx response carries only `client_message`.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    client_message: &'static str,
}

impl ApiError {
    pub fn error(&self) -> &AppError {
        &self.error
    }

    pub fn client_message(&self) -> String {
        match &self.error {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
            _ => self.client_message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let body = self.client_message();

        // Always log the detailed error server-side
        if status.is_server_error() {
            tracing::error!(
                code = %self.error.code(),
                status = %status.as_u16(),
                message = %self.error,
                "API error"
            );
        } else {
            tracing::warn!(
                code = %self.error.code(),
                status = %status.as_u16(),
                message = %self.error,
                "API request rejected"
            );
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}
