//! Bulk data imports
//!
//! [`loader`] turns an uploaded file into documents and writes them through a
//! [`DocumentStore`](flangio_mongodb::DocumentStore); [`tracker`] keeps a
//! record of every completed import.

pub mod loader;
pub mod tracker;

pub use loader::{import_file, parse_import_file, IMPORT_SUCCESS_MESSAGE};
pub use tracker::{ImportRecord, ImportTracker, IMPORT_DELETED_MESSAGE};
