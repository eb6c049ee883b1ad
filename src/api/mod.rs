//! REST API module.
//!
//! One handler per operation; each is registered under every path in its alias list.

mod articles;
mod pdf;

pub use articles::*;
pub use pdf::*;

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::errors::{ErrorResponse, METHOD_NOT_ALLOWED, ROUTE_NOT_FOUND};

/// Paths serving the approved-article list.
pub const ARTICLE_ROUTES: &[&str] = &["/api/articles", "/articles"];

/// Paths serving a PDF by identifier. The bare prefixes carry an empty
/// identifier and answer like any other malformed one.
pub const PDF_ROUTES: &[&str] = &["/api/pdf/{id}", "/pdf/{id}", "/api/pdf/", "/pdf/"];

/// Informational payload for `GET /`.
#[derive(Debug, Serialize)]
pub struct RootMessage {
    pub message: &'static str,
}

/// GET / - Describe the API.
pub async fn root() -> Json<RootMessage> {
    Json(RootMessage {
        message: "The Student Opinion API - use /articles to list articles",
    })
}

/// Fallback for paths nothing else serves.
pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            detail: ROUTE_NOT_FOUND.to_string(),
        }),
    )
}

/// Fallback for a routed path requested with an unsupported method.
pub async fn method_not_allowed() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            detail: METHOD_NOT_ALLOWED.to_string(),
        }),
    )
}
