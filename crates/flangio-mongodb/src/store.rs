//! Document store client contract
//!
//! One method per admin operation. Implementations never panic on store
//! faults: every driver or transport failure comes back as a
//! [`FlangioError`](flangio_common::FlangioError).

use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument};
use flangio_common::Result;
use serde::{Deserialize, Serialize};

use crate::connection::Namespace;
use crate::index::IndexSpec;
use crate::query::FindQuery;

/// Server-local database hidden from listings
pub const RESERVED_DATABASE: &str = "local";

/// Legacy index metadata collection hidden from listings
pub const INDEX_METADATA_COLLECTION: &str = "system.indexes";

/// A database and the collections it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    pub collections: Vec<String>,
}

/// Applies the listing rules to raw (database, collections) pairs: drop the
/// reserved database, drop the index metadata collection, sort collections.
pub fn visible_databases(raw: Vec<(String, Vec<String>)>) -> Vec<DatabaseInfo> {
    raw.into_iter()
        .filter(|(name, _)| name != RESERVED_DATABASE)
        .map(|(name, collections)| {
            let mut collections: Vec<String> = collections
                .into_iter()
                .filter(|c| c != INDEX_METADATA_COLLECTION)
                .collect();
            collections.sort();
            DatabaseInfo { name, collections }
        })
        .collect()
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every database except [`RESERVED_DATABASE`], with collections
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>>;

    async fn drop_collection(&self, ns: &Namespace) -> Result<()>;

    async fn drop_database(&self, database: &str) -> Result<()>;

    /// Remove every document, keep the collection; returns the count removed
    async fn clear_collection(&self, ns: &Namespace) -> Result<u64>;

    /// Create the index if absent; returns its name
    async fn ensure_index(&self, ns: &Namespace, spec: &IndexSpec) -> Result<String>;

    /// Insert one document; returns its `_id`
    async fn insert_document(&self, ns: &Namespace, doc: BsonDocument) -> Result<Bson>;

    /// Replace the document with the same `_id`, inserting it when none
    /// matches; returns the `_id`
    async fn update_document(&self, ns: &Namespace, doc: BsonDocument) -> Result<Bson>;

    /// Delete the first match or every match; returns the count removed
    async fn delete_documents(
        &self,
        ns: &Namespace,
        query: BsonDocument,
        just_one: bool,
    ) -> Result<u64>;

    async fn find_documents(&self, ns: &Namespace, query: &FindQuery) -> Result<Vec<BsonDocument>>;

    /// Creates the database and collection by inserting a first document
    async fn create_database(&self, ns: &Namespace, initial_document: BsonDocument) -> Result<Bson> {
        self.insert_document(ns, initial_document).await
    }
}
