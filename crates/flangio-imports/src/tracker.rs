//! Import record tracker
//!
//! Records describe completed bulk loads. They point at a namespace but do
//! not own the documents in it, so deleting a record never touches the store.

use chrono::{DateTime, Utc};
use flangio_common::{FlangioError, Result};
use flangio_mongodb::Namespace;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Flash message shown after a record is deleted
pub const IMPORT_DELETED_MESSAGE: &str =
    "The record of the import was deleted. No data was removed from MongoDB.";

/// Metadata about one completed file import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub slug: String,
    pub database_name: String,
    pub collection_name: String,
    pub user: String,
    pub filename: String,
    pub documents_imported: u64,
    pub timestamp: DateTime<Utc>,
}

impl ImportRecord {
    pub fn namespace(&self) -> Namespace {
        Namespace::new(&self.database_name, &self.collection_name)
    }
}

/// In-process store of import records, kept in insertion order
#[derive(Debug, Default)]
pub struct ImportTracker {
    records: RwLock<Vec<ImportRecord>>,
}

impl ImportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persist a record for a finished import and return it
    pub fn record_import(
        &self,
        ns: &Namespace,
        user: &str,
        filename: &str,
        documents_imported: u64,
    ) -> ImportRecord {
        let mut records = self.records.write();
        let record = ImportRecord {
            slug: unused_slug(&records, filename, random_suffix),
            database_name: ns.database.clone(),
            collection_name: ns.collection.clone(),
            user: user.to_string(),
            filename: filename.to_string(),
            documents_imported,
            timestamp: Utc::now(),
        };
        records.push(record.clone());
        info!(
            slug = %record.slug,
            namespace = %ns,
            user,
            documents_imported,
            "import recorded"
        );
        record
    }

    pub fn get(&self, slug: &str) -> Option<ImportRecord> {
        self.records.read().iter().find(|r| r.slug == slug).cloned()
    }

    /// Remove the record with `slug`; the imported documents stay in place
    pub fn delete_import(&self, slug: &str) -> Result<ImportRecord> {
        let mut records = self.records.write();
        let pos = records
            .iter()
            .position(|r| r.slug == slug)
            .ok_or_else(|| FlangioError::NotFound(format!("No import record with slug {}.", slug)))?;
        let removed = records.remove(pos);
        info!(slug, "import record deleted");
        Ok(removed)
    }

    /// Records newest first. The listing is narrowed to one namespace only
    /// when both names are given.
    pub fn list_imports(&self, database: Option<&str>, collection: Option<&str>) -> Vec<ImportRecord> {
        let records = self.records.read();
        let newest_first = records.iter().rev();
        match (database, collection) {
            (Some(db), Some(coll)) => newest_first
                .filter(|r| r.database_name == db && r.collection_name == coll)
                .cloned()
                .collect(),
            _ => newest_first.cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

/// `<filename stem, lowercased, non-alphanumerics as dashes>-<suffix>`,
/// drawing suffixes until the slug is free
fn unused_slug(
    records: &[ImportRecord],
    filename: &str,
    mut suffix: impl FnMut() -> String,
) -> String {
    let base = slug_base(filename);
    loop {
        let slug = format!("{}-{}", base, suffix());
        if records.iter().all(|r| r.slug != slug) {
            return slug;
        }
    }
}

fn slug_base(filename: &str) -> String {
    let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
    let mut base = String::with_capacity(stem.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            base.push(c.to_ascii_lowercase());
        } else if !base.ends_with('-') {
            base.push('-');
        }
    }
    let base = base.trim_matches('-');
    if base.is_empty() {
        "import".to_string()
    } else {
        base.to_string()
    }
}

/// 8 hex chars
fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}
