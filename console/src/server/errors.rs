//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::blob::BlobError;
use crate::errors::ConsoleError;

/// Error body returned by every API route
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl ConsoleError {
    /// Status code and short error kind for an API response
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ConsoleError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation"),
            ConsoleError::NotFound(_) | ConsoleError::Blob(BlobError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            ConsoleError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ConsoleError::Blob(BlobError::Access(_))
            | ConsoleError::ApiError { .. }
            | ConsoleError::HttpError(_)
            | ConsoleError::AuthError(_) => (StatusCode::BAD_GATEWAY, "storage"),
            ConsoleError::Blob(BlobError::Parse { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "parse")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            error: kind,
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
