//! Identity resolution for document writes
//!
//! An update must name its target through exactly one of `_id` or `id`.
//! `id` is renamed to `_id`. On both create and update, identities in
//! ObjectId form are converted so a document saved later matches the one
//! stored at creation.

use flangio_common::{FlangioError, Result};
use serde_json::{json, Map, Value as JsonValue};

pub const ID_FIELD: &str = "_id";
pub const ID_ALIAS: &str = "id";

pub const BOTH_IDS_MESSAGE: &str = "Updates cannot contain both id and _id";
pub const MISSING_ID_MESSAGE: &str = "Updates must include either id or _id.";

/// Checks if a string has ObjectId format (24 hex characters)
pub fn is_object_id_hex(value: &str) -> bool {
    value.len() == 24 && value.chars().all(|c| c.is_ascii_hexdigit())
}

/// Rewrites `doc` in place so it carries a single canonical `_id`
pub fn normalize_update_identity(doc: &mut Map<String, JsonValue>) -> Result<()> {
    let has_id = doc.contains_key(ID_FIELD);
    let has_alias = doc.contains_key(ID_ALIAS);

    let identity = match (has_id, has_alias) {
        (false, false) => return Err(FlangioError::Identity(MISSING_ID_MESSAGE.to_string())),
        (true, true) => return Err(FlangioError::Identity(BOTH_IDS_MESSAGE.to_string())),
        (true, false) => doc.remove(ID_FIELD),
        (false, true) => doc.remove(ID_ALIAS),
    };

    doc.insert(ID_FIELD.to_string(), identity.map_or(JsonValue::Null, canonical_identity));
    Ok(())
}

/// Converts an `_id` given as a 24-hex string into an ObjectId; no-op otherwise
pub fn normalize_create_identity(doc: &mut Map<String, JsonValue>) {
    if let Some(identity) = doc.remove(ID_FIELD) {
        doc.insert(ID_FIELD.to_string(), canonical_identity(identity));
    }
}

fn canonical_identity(identity: JsonValue) -> JsonValue {
    match identity {
        JsonValue::String(s) if is_object_id_hex(&s) => json!({ "$oid": s }),
        other => other,
    }
}
