//! Error handling module for the Student Opinion backend.
//!
//! Domain operations return [`AppError`]; the mapping to HTTP status codes and the
//! `{"detail": ...}` body happens only when a handler turns the error into a response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Public detail for a missing PDF. Malformed identifiers answer with the same
/// text so callers cannot tell the two apart.
pub const PDF_NOT_FOUND: &str = "PDF not found";

/// Public detail for paths no route or static file matches.
pub const ROUTE_NOT_FOUND: &str = "Not Found";

/// Public detail for a known path requested with the wrong method.
pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";

/// Public detail for unclassified faults.
pub const INTERNAL_DETAIL: &str = "Internal server error";

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Caller-supplied identifier is not a well-formed key (carries the raw input)
    InvalidIdentifier(String),
    /// Valid identifier, nothing stored under it
    NotFound(String),
    /// Document or blob store could not be reached or failed
    StoreUnavailable(String),
    /// Any other fault
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidIdentifier(_) => StatusCode::NOT_FOUND,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message, including internal context. Used for logging.
    pub fn message(&self) -> String {
        match self {
            AppError::InvalidIdentifier(raw) => format!("Invalid identifier: {:?}", raw),
            AppError::NotFound(msg) => msg.clone(),
            AppError::StoreUnavailable(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }

    /// Get the message exposed to HTTP callers.
    pub fn detail(&self) -> String {
        match self {
            AppError::InvalidIdentifier(_) => PDF_NOT_FOUND.to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::StoreUnavailable(msg) => msg.clone(),
            AppError::Internal(_) => INTERNAL_DETAIL.to_string(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            detail: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}
