//! API error types and JSON error response formatting.
//!
//! ApiError provides a consistent JSON error response format across all
//! endpoints, mapping internal errors to appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 401 Unauthorized - missing or invalid credentials.
    Unauthorized(String),
    /// 403 Forbidden - authenticated but not permitted.
    Forbidden(String),
    /// 404 Not Found - resource does not exist or is not the caller's.
    NotFound(String),
    /// 409 Conflict - the write collides with existing state.
    Conflict(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<querypad_core::QuerypadError> for ApiError {
    fn from(err: querypad_core::QuerypadError) -> Self {
        match &err {
            querypad_core::QuerypadError::Validation(msg) => ApiError::BadRequest(msg.clone()),
            querypad_core::QuerypadError::Serialization(msg) => ApiError::BadRequest(msg.clone()),
            querypad_core::QuerypadError::Storage(msg) => ApiError::Internal(msg.clone()),
            querypad_core::QuerypadError::Remote(msg) => ApiError::Internal(msg.clone()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
