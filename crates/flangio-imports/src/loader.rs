//! Data file loader
//!
//! Accepted layouts: a JSON array of objects, a single JSON object, or JSON
//! lines (one object per non-blank line).

use flangio_common::{FlangioError, Result};
use flangio_mongodb::document::json_to_document;
use flangio_mongodb::{DocumentStore, Namespace};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info, warn};

use crate::tracker::{ImportRecord, ImportTracker};

/// Flash message shown after a successful import
pub const IMPORT_SUCCESS_MESSAGE: &str = "The data was imported successfully.";

pub type JsonObject = Map<String, JsonValue>;

/// Split an uploaded file into the objects it holds
pub fn parse_import_file(contents: &str) -> Result<Vec<JsonObject>> {
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Err(FlangioError::Validation(
            "The file contains no documents.".to_string(),
        ));
    }

    let objects = match serde_json::from_str::<JsonValue>(trimmed) {
        Ok(JsonValue::Object(object)) => vec![object],
        Ok(JsonValue::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                JsonValue::Object(object) => Ok(object),
                _ => Err(FlangioError::Validation(format!(
                    "Item {} in the file is not a JSON object.",
                    index + 1
                ))),
            })
            .collect::<Result<Vec<_>>>()?,
        Ok(_) => {
            return Err(FlangioError::Validation(
                "The file must hold a JSON object, an array of objects, or JSON lines.".to_string(),
            ))
        }
        // Several top-level values: read it as JSON lines
        Err(_) => parse_json_lines(trimmed)?,
    };

    if objects.is_empty() {
        return Err(FlangioError::Validation(
            "The file contains no documents.".to_string(),
        ));
    }
    Ok(objects)
}

fn parse_json_lines(contents: &str) -> Result<Vec<JsonObject>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| match serde_json::from_str::<JsonValue>(line) {
            Ok(JsonValue::Object(object)) => Ok(object),
            _ => Err(FlangioError::Validation(format!(
                "Line {} is not a JSON object.",
                index + 1
            ))),
        })
        .collect()
}

/// Load `contents` into `ns` and record the import.
///
/// Documents are inserted one at a time; the first failed insert aborts the
/// import and no record is written.
pub async fn import_file(
    store: &dyn DocumentStore,
    tracker: &ImportTracker,
    ns: &Namespace,
    user: &str,
    filename: &str,
    contents: &str,
) -> Result<ImportRecord> {
    let objects = parse_import_file(contents)?;
    debug!(namespace = %ns, filename, count = objects.len(), "import file parsed");

    let mut imported = 0u64;
    for object in objects {
        let doc = json_to_document(object)?;
        if let Err(e) = store.insert_document(ns, doc).await {
            warn!(namespace = %ns, filename, imported, error = %e, "import aborted");
            return Err(e.context(format!(
                "Import stopped after {} document(s) were inserted",
                imported
            )));
        }
        imported += 1;
    }

    info!(namespace = %ns, filename, imported, "import complete");
    Ok(tracker.record_import(ns, user, filename, imported))
}
