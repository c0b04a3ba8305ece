//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use crate::chat::SessionId;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// Storage and lookup failures propagate to the caller. Provider failures
/// never reach this type; the conversation controller reports them as a
/// turn outcome.
#[derive(Error, Debug)]
pub enum AppError {
    /// Chat session with the given ID does not exist
    #[error("Chat session not found: {0}")]
    SessionNotFound(SessionId),

    /// Request input failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reading or writing the chat database failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error occurred while writing the session sidecar file
    #[error("Persistence error: {0}")]
    Persistence(#[from] crate::state::PersistenceError),
}

impl AppError {
    /// Build a storage error from a database failure with some context
    pub fn storage(context: &str, err: sqlx::Error) -> Self {
        AppError::Storage(format!("{}: {}", context, err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
