//! Error types for flangio

use thiserror::Error;

use crate::http::HttpStatus;

/// Result type alias for flangio operations
pub type Result<T> = std::result::Result<T, FlangioError>;

/// Unified error type for all flangio operations
#[derive(Error, Debug, Clone)]
pub enum FlangioError {
    /// Malformed request payload (bad JSON, non-object JSON, bad form field)
    #[error("{0}")]
    Validation(String),

    /// Update payload with a missing or duplicated `_id`/`id`
    #[error("{0}")]
    Identity(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Caller lacks a capability required by the operation
    #[error("{0}")]
    Forbidden(String),

    #[error("MongoDB error: {0}")]
    MongoDB(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    /// The store did not answer within the configured bound
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FlangioError {
    /// HTTP-style status carried by the envelope built from this error
    pub fn status(&self) -> HttpStatus {
        match self {
            FlangioError::Validation(_) | FlangioError::Identity(_) => HttpStatus::BAD_REQUEST,
            FlangioError::Unauthorized(_) => HttpStatus::UNAUTHORIZED,
            FlangioError::Forbidden(_) => HttpStatus::FORBIDDEN,
            FlangioError::NotFound(_) => HttpStatus::NOT_FOUND,
            FlangioError::Timeout(_) => HttpStatus::SERVICE_UNAVAILABLE,
            FlangioError::MongoDB(_)
            | FlangioError::Database(_)
            | FlangioError::Connection(_)
            | FlangioError::Serialization(_)
            | FlangioError::Internal(_) => HttpStatus::INTERNAL_SERVER_ERROR,
        }
    }

    /// Numeric form of [`FlangioError::status`]
    pub fn status_code(&self) -> u16 {
        self.status().code()
    }

    /// Returns true if the failure happened while talking to the store
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            FlangioError::MongoDB(_)
                | FlangioError::Database(_)
                | FlangioError::Connection(_)
                | FlangioError::Timeout(_)
        )
    }

    /// Prefix the message, keeping the variant and therefore the status
    pub fn context(self, prefix: impl std::fmt::Display) -> Self {
        let wrap = |message: String| format!("{}: {}", prefix, message);
        match self {
            FlangioError::Validation(m) => FlangioError::Validation(wrap(m)),
            FlangioError::Identity(m) => FlangioError::Identity(wrap(m)),
            FlangioError::NotFound(m) => FlangioError::NotFound(wrap(m)),
            FlangioError::Unauthorized(m) => FlangioError::Unauthorized(wrap(m)),
            FlangioError::Forbidden(m) => FlangioError::Forbidden(wrap(m)),
            FlangioError::MongoDB(m) => FlangioError::MongoDB(wrap(m)),
            FlangioError::Database(m) => FlangioError::Database(wrap(m)),
            FlangioError::Connection(m) => FlangioError::Connection(wrap(m)),
            FlangioError::Timeout(m) => FlangioError::Timeout(wrap(m)),
            FlangioError::Serialization(m) => FlangioError::Serialization(wrap(m)),
            FlangioError::Internal(m) => FlangioError::Internal(wrap(m)),
        }
    }
}

impl From<serde_json::Error> for FlangioError {
    fn from(err: serde_json::Error) -> Self {
        FlangioError::Serialization(err.to_string())
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for FlangioError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;
        match *err.kind {
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) | ErrorKind::ConnectionPoolCleared { .. } => {
                FlangioError::Connection(err.to_string())
            }
            _ => FlangioError::MongoDB(err.to_string()),
        }
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for FlangioError {
    fn from(err: bson::ser::Error) -> Self {
        FlangioError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for FlangioError {
    fn from(err: bson::de::Error) -> Self {
        FlangioError::Serialization(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::extjson::de::Error> for FlangioError {
    fn from(err: bson::extjson::de::Error) -> Self {
        FlangioError::Validation(format!("Invalid extended JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_passthrough() {
        let err = FlangioError::Validation("field required".to_string());
        assert_eq!(err.to_string(), "field required");

        let err = FlangioError::NotFound("User a@b.c does not exist.".to_string());
        assert_eq!(err.to_string(), "User a@b.c does not exist.");
    }

    #[test]
    fn test_error_display_mongodb() {
        let err = FlangioError::MongoDB("connection refused".to_string());
        assert_eq!(err.to_string(), "MongoDB error: connection refused");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = FlangioError::Timeout("store unreachable".to_string());
        assert_eq!(err.to_string(), "Timeout: store unreachable");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(FlangioError::Validation("x".into()).status_code(), 400);
        assert_eq!(FlangioError::Identity("x".into()).status_code(), 400);
        assert_eq!(FlangioError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(FlangioError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(FlangioError::NotFound("x".into()).status_code(), 404);
        assert_eq!(FlangioError::MongoDB("x".into()).status_code(), 500);
        assert_eq!(FlangioError::Timeout("x".into()).status_code(), 503);
    }

    #[test]
    fn test_is_store_error() {
        assert!(FlangioError::MongoDB("x".into()).is_store_error());
        assert!(FlangioError::Connection("x".into()).is_store_error());
        assert!(FlangioError::Timeout("x".into()).is_store_error());
        assert!(!FlangioError::Validation("x".into()).is_store_error());
        assert!(!FlangioError::NotFound("x".into()).is_store_error());
    }

    #[test]
    fn test_context_keeps_variant() {
        let err = FlangioError::Timeout("store unreachable".into()).context("Import stopped");
        assert_eq!(err.to_string(), "Timeout: Import stopped: store unreachable");
        assert_eq!(err.status_code(), 503);

        let err = FlangioError::Validation("bad".into()).context("Item 2");
        assert!(matches!(err, FlangioError::Validation(ref m) if m == "Item 2: bad"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: FlangioError = json_err.into();
        assert!(matches!(err, FlangioError::Serialization(_)));
    }
}
