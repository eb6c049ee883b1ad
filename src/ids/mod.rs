//! Identifier codec.
//!
//! External identifiers are the 24-character hex form of a 12-byte ObjectId, the key
//! format shared by the article collection and the PDF bucket.

use mongodb::bson::oid::ObjectId;

use crate::errors::AppError;

/// Length of the hex form of an ObjectId.
pub const HEX_KEY_LEN: usize = 24;

/// Parse a path segment into a binary key.
///
/// Fails with [`AppError::InvalidIdentifier`] for anything that is not exactly 24 ASCII
/// hex digits. Never touches a store.
pub fn parse(raw: &str) -> Result<ObjectId, AppError> {
    if raw.len() != HEX_KEY_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AppError::InvalidIdentifier(raw.to_string()));
    }

    ObjectId::parse_str(raw).map_err(|_| AppError::InvalidIdentifier(raw.to_string()))
}
