//! JSON validation gate
//!
//! The only sanitisation applied to document content: the payload must parse
//! as JSON and the value must be an object. Nothing here touches the store.

use flangio_common::{FlangioError, Result};
use serde_json::{Map, Value as JsonValue};

/// What the raw payload is meant to be; only changes the error wording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Query,
    Document,
}

impl Payload {
    pub fn label(self) -> &'static str {
        match self {
            Payload::Query => "query",
            Payload::Document => "document",
        }
    }

    /// Fixed validation-failure message for this payload kind
    pub fn invalid_message(self) -> String {
        format!(
            "Your {} was not valid JSON or not a dictionary (i.e.{{}}).",
            self.label()
        )
    }
}

/// Parse `raw` as a single JSON object
pub fn parse_object(raw: &str, payload: Payload) -> Result<Map<String, JsonValue>> {
    match serde_json::from_str::<JsonValue>(raw) {
        Ok(JsonValue::Object(map)) => Ok(map),
        Ok(other) => {
            tracing::debug!(payload = payload.label(), kind = json_kind(&other), "rejected non-object payload");
            Err(FlangioError::Validation(payload.invalid_message()))
        }
        Err(e) => {
            tracing::debug!(payload = payload.label(), error = %e, "rejected unparsable payload");
            Err(FlangioError::Validation(payload.invalid_message()))
        }
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_objects() {
        let map = parse_object(r#"{"foo": "bar"}"#, Payload::Document).unwrap();
        assert_eq!(map["foo"], "bar");
        assert!(parse_object("{}", Payload::Query).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_objects() {
        for raw in ["[]", "[{\"a\": 1}]", "1", "\"text\"", "null", "true"] {
            let err = parse_object(raw, Payload::Query).unwrap_err();
            assert!(matches!(err, FlangioError::Validation(_)), "{raw}");
        }
    }

    #[test]
    fn test_rejects_malformed_json() {
        for raw in ["", "{", "{'a': 1}", "{\"a\": }", "not json"] {
            assert!(parse_object(raw, Payload::Document).is_err(), "{raw}");
        }
    }

    #[test]
    fn test_fixed_messages() {
        let err = parse_object("nope", Payload::Query).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Your query was not valid JSON or not a dictionary (i.e.{})."
        );
        assert_eq!(err.status_code(), 400);

        let err = parse_object("[]", Payload::Document).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Your document was not valid JSON or not a dictionary (i.e.{})."
        );
    }
}
