//! Error types for the CRM web server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use crm_core::{CoreError, ValidationError};
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while handling a request.
#[derive(Debug, Error)]
pub enum WebError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Malformed filter, sort or assignment input.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Form input rejected before reaching the backend.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            WebError::Database(DatabaseError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            WebError::Database(DatabaseError::Rejected(err)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            WebError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            WebError::Core(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            WebError::Validation(err) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            WebError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for request handlers.
pub type Result<T> = std::result::Result<T, WebError>;
