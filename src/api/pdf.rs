//! PDF API endpoints.

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::{header, StatusCode},
    response::Response,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::errors::AppError;
use crate::ids;
use crate::AppState;

/// Filename sent when the stored one is empty.
pub const DEFAULT_PDF_FILENAME: &str = "article.pdf";

/// RFC 5987 `attr-char`: everything else in an extended parameter is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// GET /api/pdf/:id - Stream a PDF inline.
pub async fn get_pdf(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    // Malformed ids answer exactly like missing ones, including segments
    // that do not even decode to UTF-8.
    let id = match path {
        Ok(Path(id)) => id,
        Err(rejection) => {
            tracing::debug!(route = "pdf", error = %rejection, "Rejected identifier");
            return Err(AppError::InvalidIdentifier(rejection.body_text()));
        }
    };

    let key = ids::parse(&id).map_err(|e| {
        tracing::debug!(route = "pdf", id = %id, error = %e, "Rejected identifier");
        e
    })?;

    let handle = state.streamer.open_download(key).await.map_err(|e| {
        match &e {
            AppError::NotFound(_) => {
                tracing::debug!(route = "pdf", id = %id, "PDF not found")
            }
            _ => tracing::error!(route = "pdf", id = %id, error = %e, "Failed to open PDF"),
        }
        e
    })?;

    tracing::debug!(route = "pdf", id = %handle.key, filename = %handle.filename, "Streaming PDF");

    let disposition = content_disposition(&handle.filename);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(handle.content))
        .map_err(|e| {
            tracing::error!(route = "pdf", id = %id, error = %e, "Failed to build PDF response");
            AppError::Internal(format!("Error retrieving PDF: {}", e))
        })
}

/// Filename safe to place inside a quoted header parameter.
fn disposition_filename(stored: &str) -> String {
    let cleaned: String = stored
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && *c != '"' && *c != '\\')
        .collect();

    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        DEFAULT_PDF_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// `inline` disposition with an ASCII `filename` and, when the stored name has
/// characters that had to be dropped, an RFC 5987 `filename*` carrying the original.
fn content_disposition(stored: &str) -> String {
    let fallback = disposition_filename(stored);
    let original = stored.trim();

    if original.is_ascii() {
        format!("inline; filename=\"{}\"", fallback)
    } else {
        format!(
            "inline; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            utf8_percent_encode(original, ATTR_CHAR)
        )
    }
}
