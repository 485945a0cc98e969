//! Error types for the HTTP endpoints.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Database(err) = &self;
        tracing::error!(error = %err, "Database error");

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

/// Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
