//! Article wire model and the projection from stored documents.

use chrono::SecondsFormat;
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// Prefix of the download path built for articles with an attached PDF.
pub const PDF_URL_PREFIX: &str = "/api/pdf/";

/// strftime pattern for `created_at_display`, e.g. `Jan 15, 2024 10:30 UTC`.
pub const DISPLAY_FORMAT: &str = "%b %d, %Y %H:%M UTC";

/// Article as sent to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleView {
    pub id: String,
    pub title: String,
    pub author: String,
    pub r#abstract: String,
    pub approved: bool,
    /// ISO-8601 timestamp, or the stored value verbatim when it is not a date-time
    pub created_at: String,
    pub created_at_display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl ArticleView {
    /// Project a stored article document. Never fails: missing fields get defaults.
    pub fn from_document(doc: &Document) -> Self {
        let (created_at, created_at_display) = timestamp_fields(doc.get("created_at"));

        let pdf_file_id = match doc.get("pdf_file_id") {
            None | Some(Bson::Null) | Some(Bson::Undefined) => None,
            Some(value) => Some(bson_to_text(value)).filter(|id| !id.is_empty()),
        };
        let pdf_url = pdf_file_id
            .as_ref()
            .map(|id| format!("{}{}", PDF_URL_PREFIX, id));

        Self {
            id: text_field(doc, "_id"),
            title: text_field(doc, "title"),
            author: text_field(doc, "author"),
            r#abstract: text_field(doc, "abstract"),
            approved: doc.get_bool("approved").unwrap_or(false),
            created_at,
            created_at_display,
            pdf_file_id,
            pdf_url,
        }
    }
}

fn text_field(doc: &Document, key: &str) -> String {
    doc.get(key).map(bson_to_text).unwrap_or_default()
}

/// ISO and display forms of `created_at`.
///
/// Only a BSON date-time is reformatted. Any other value is coerced to text once and
/// used for both fields; an absent value yields two empty strings.
fn timestamp_fields(value: Option<&Bson>) -> (String, String) {
    match value {
        Some(Bson::DateTime(dt)) => {
            match chrono::DateTime::<chrono::Utc>::from_timestamp_millis(dt.timestamp_millis()) {
                Some(utc) => (
                    utc.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                    utc.format(DISPLAY_FORMAT).to_string(),
                ),
                None => {
                    let raw = dt.to_string();
                    (raw.clone(), raw)
                }
            }
        }
        Some(other) => {
            let raw = bson_to_text(other);
            (raw.clone(), raw)
        }
        None => (String::new(), String::new()),
    }
}

/// Plain string form of a scalar BSON value.
fn bson_to_text(value: &Bson) -> String {
    match value {
        Bson::String(s) => s.clone(),
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::Null | Bson::Undefined => String::new(),
        Bson::Boolean(b) => b.to_string(),
        Bson::Int32(n) => n.to_string(),
        Bson::Int64(n) => n.to_string(),
        Bson::Double(n) => n.to_string(),
        other => other.to_string(),
    }
}
