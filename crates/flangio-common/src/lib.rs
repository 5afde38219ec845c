//! Common utilities for flangio
//!
//! Shared error type, the response envelope, and HTTP status helpers used
//! across all flangio crates.

pub mod envelope;
pub mod error;
pub mod http;

pub use envelope::{Envelope, FieldError, ERROR_TYPE, GLOBAL_FIELD};
pub use error::{FlangioError, Result};
pub use http::HttpStatus;
