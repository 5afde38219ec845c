//! JSON ↔ BSON conversion for documents crossing the HTTP boundary
//!
//! Incoming JSON is read as MongoDB extended JSON, so `{"$oid": "..."}` and
//! `{"$date": ...}` become native BSON values. Outgoing documents are
//! rendered as relaxed extended JSON.

use bson::{Bson, Document as BsonDocument};
use flangio_common::{FlangioError, Result};
use serde_json::{Map, Value as JsonValue};

/// Convert a JSON object into a BSON document
pub fn json_to_document(object: Map<String, JsonValue>) -> Result<BsonDocument> {
    match Bson::try_from(JsonValue::Object(object))? {
        Bson::Document(doc) => Ok(doc),
        // An object made only of an extended JSON key (e.g. {"$oid": ...})
        other => Err(FlangioError::Validation(format!(
            "Expected a document, got a {:?} value",
            other.element_type()
        ))),
    }
}

/// Render a BSON document as relaxed extended JSON
pub fn document_to_json(doc: BsonDocument) -> JsonValue {
    Bson::Document(doc).into_relaxed_extjson()
}

/// Render any BSON value as relaxed extended JSON
pub fn bson_to_json(value: Bson) -> JsonValue {
    value.into_relaxed_extjson()
}

/// Compare two BSON values, treating the numeric types as one domain.
///
/// JSON numbers can arrive as Int32, Int64 or Double depending on their
/// magnitude, so `{"x": 1}` must match a stored `x: 1` of any width.
pub fn bson_values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => match (a, b) {
            (Bson::Document(x), Bson::Document(y)) => {
                x.len() == y.len()
                    && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| bson_values_equal(v, w)))
            }
            (Bson::Array(x), Bson::Array(y)) => {
                x.len() == y.len() && x.iter().zip(y).all(|(v, w)| bson_values_equal(v, w))
            }
            _ => a == b,
        },
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(*i as f64),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}
