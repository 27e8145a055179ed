//! HTTP error responses for the API.
//!
//! Errors render as `{ "error": <message>, "code": <machine code> }` with a
//! matching status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::scheduler::SchedulerError;
use crate::store::StoreError;

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is malformed or semantically invalid.
    #[error("{0}")]
    BadRequest(String),

    /// No task with the requested identifier.
    #[error("task not found: {0}")]
    NotFound(String),

    /// Persisting the task table failed.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// The scheduler no longer accepts tasks (shutdown in progress).
    #[error(transparent)]
    Unavailable(#[from] SchedulerError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage_error",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            code: self.error_code(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
