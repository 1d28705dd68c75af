//! Error types for `coopwatch`.
//!
//! - [`ApiError`] is what HTTP handlers return; it renders itself as a JSON
//!   body with a stable `code`.
//! - [`StorageError`] wraps failures of the reading store.
//! - [`EngineError`] marks broken internal invariants in the anomaly engine.
//!   Insufficient data is *not* an error and never produces one.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::SensorKind;

// ---

/// One rejected field of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        // ---
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database driver error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Lock poisoned in the in-memory store
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Internal invariant violations raised by the anomaly engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A payload reached the engine without a scoreable value.
    #[error("{0} reading has no observation to score")]
    EmptyPayload(SensorKind),

    /// A thread panicked while holding engine state.
    #[error("{0} lock poisoned")]
    Poisoned(&'static str),
}

/// API-specific errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed input validation
    #[error("Validation error")]
    Validation(Vec<FieldError>),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Engine invariant violation
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
            ApiError::Engine(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        // Internal details stay in the log, not in the response
        let body = match self {
            ApiError::Validation(details) => ErrorResponse {
                error: "Validation error".to_string(),
                code,
                details,
            },
            other => {
                tracing::error!("Request failed: {}", other);
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    code,
                    details: Vec::new(),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(details: Vec<FieldError>) -> Self {
        ApiError::Validation(details)
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;
