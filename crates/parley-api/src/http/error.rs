//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use parley_types::error::SessionError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session and event errors from the service.
    Session(SessionError),
    /// Validation error.
    Validation(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Session(err @ SessionError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND", err.to_string())
            }
            AppError::Session(SessionError::Storage(msg)) => {
                tracing::error!(error = %msg, "Storage failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Internal storage error".to_string(),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        };

        let body = ApiResponse::error(code, &message, Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}
