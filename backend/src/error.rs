//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use crate::executor::ExecutionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body is well-formed JSON but its values are unacceptable
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// File or directory was not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Path is invalid or escapes the workspace
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Permission denied for the requested operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Path exists but is not a directory
    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    /// Error occurred while running a command
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// The assistant failed to produce a reply
    #[error("Chat failed: {0}")]
    ChatFailed(String),

    /// Error occurred during settings persistence
    #[error("Persistence error: {0}")]
    Persistence(#[from] crate::state::PersistenceError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::FileNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::NotADirectory(_) => StatusCode::BAD_REQUEST,
            AppError::Execution(ExecutionError::Timeout(_)) => StatusCode::REQUEST_TIMEOUT,
            AppError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ChatFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
