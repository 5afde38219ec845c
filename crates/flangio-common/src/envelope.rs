//! The response envelope every admin operation returns.
//!
//! `code` always reflects the outcome and doubles as the HTTP status of the
//! response that carries the envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::FlangioError;
use crate::http::HttpStatus;

/// Category written to `type` on failures
pub const ERROR_TYPE: &str = "Error";

/// Field name used for errors that do not belong to a single form field
pub const GLOBAL_FIELD: &str = "global";

/// A (field, description) pair produced by form validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
        }
    }

    /// An error not tied to a specific field
    pub fn global(description: impl Into<String>) -> Self {
        Self::new(GLOBAL_FIELD, description)
    }
}

/// Uniform `{code, message, type?, errors?, results?}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: u16,
    pub message: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<JsonValue>,
}

impl Envelope {
    pub fn new(status: HttpStatus, message: impl Into<String>) -> Self {
        Self {
            code: status.code(),
            message: message.into(),
            kind: None,
            errors: None,
            results: None,
        }
    }

    /// 200 envelope with a message
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(HttpStatus::OK, message)
    }

    /// Failure envelope with `type: "Error"`
    pub fn error(status: HttpStatus, message: impl Into<String>) -> Self {
        Self::new(status, message).with_type(ERROR_TYPE)
    }

    /// 400 envelope listing per-field problems
    pub fn field_errors(message: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self::error(HttpStatus::BAD_REQUEST, message).with_errors(errors)
    }

    /// Classifies an error into an envelope; the message is the error text
    pub fn from_error(err: &FlangioError) -> Self {
        Self::error(err.status(), err.to_string())
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_results(mut self, results: JsonValue) -> Self {
        self.results = Some(results);
        self
    }

    pub fn status(&self) -> HttpStatus {
        HttpStatus(self.code)
    }

    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Serializes with 4-space indentation and the declared field order
    pub fn to_pretty_json(&self) -> String {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        match self.serialize(&mut ser) {
            Ok(()) => String::from_utf8(buf).unwrap_or_default(),
            // Only reachable with a non-string map key inside `results`
            Err(e) => format!(
                "{{\n    \"code\": 500,\n    \"message\": \"{}\",\n    \"type\": \"{}\"\n}}",
                e.to_string().replace('"', "'"),
                ERROR_TYPE
            ),
        }
    }
}

impl From<FlangioError> for Envelope {
    fn from(err: FlangioError) -> Self {
        Envelope::from_error(&err)
    }
}
