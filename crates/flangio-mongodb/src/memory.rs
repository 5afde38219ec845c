//! In-process [`DocumentStore`] with the same observable rules as MongoDB
//!
//! Databases exist while they hold at least one collection, collections are
//! created by their first write or index, filters match on top-level field
//! equality, and every insert without `_id` gets a fresh ObjectId.

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document as BsonDocument};
use flangio_common::{FlangioError, Result};
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::connection::Namespace;
use crate::document::bson_values_equal;
use crate::identity::ID_FIELD;
use crate::index::IndexSpec;
use crate::query::FindQuery;
use crate::store::{
    visible_databases, DatabaseInfo, DocumentStore, INDEX_METADATA_COLLECTION, RESERVED_DATABASE,
};

#[derive(Debug, Default, Clone)]
struct MemoryCollection {
    documents: Vec<BsonDocument>,
    /// Index name → key document
    indexes: BTreeMap<String, BsonDocument>,
}

type Databases = BTreeMap<String, BTreeMap<String, MemoryCollection>>;

/// Document store held in process memory
#[derive(Debug)]
pub struct MemoryStore {
    databases: RwLock<Databases>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store holding only the reserved server database
    pub fn new() -> Self {
        let mut databases = Databases::new();
        databases
            .entry(RESERVED_DATABASE.to_string())
            .or_default()
            .insert("startup_log".to_string(), MemoryCollection::default());
        Self {
            databases: RwLock::new(databases),
        }
    }

    /// Number of documents currently in `ns`
    pub fn count(&self, ns: &Namespace) -> usize {
        self.databases
            .read()
            .get(&ns.database)
            .and_then(|db| db.get(&ns.collection))
            .map_or(0, |c| c.documents.len())
    }

    fn with_collection_mut<T>(&self, ns: &Namespace, f: impl FnOnce(&mut MemoryCollection) -> T) -> T {
        let mut databases = self.databases.write();
        let collection = databases
            .entry(ns.database.clone())
            .or_default()
            .entry(ns.collection.clone())
            .or_default();
        f(collection)
    }
}

/// Top-level equality match; an empty filter matches everything
fn matches(doc: &BsonDocument, filter: &BsonDocument) -> bool {
    filter
        .iter()
        .all(|(key, expected)| doc.get(key).is_some_and(|actual| bson_values_equal(actual, expected)))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        let databases = self.databases.read();
        let raw = databases
            .iter()
            .filter(|(_, collections)| !collections.is_empty())
            .map(|(name, collections)| {
                let mut names: Vec<String> = collections.keys().cloned().collect();
                if collections.values().any(|c| !c.indexes.is_empty()) {
                    names.push(INDEX_METADATA_COLLECTION.to_string());
                }
                (name.clone(), names)
            })
            .collect();
        Ok(visible_databases(raw))
    }

    async fn drop_collection(&self, ns: &Namespace) -> Result<()> {
        let mut databases = self.databases.write();
        if let Some(db) = databases.get_mut(&ns.database) {
            db.remove(&ns.collection);
            if db.is_empty() {
                databases.remove(&ns.database);
            }
        }
        Ok(())
    }

    async fn drop_database(&self, database: &str) -> Result<()> {
        self.databases.write().remove(database);
        Ok(())
    }

    async fn clear_collection(&self, ns: &Namespace) -> Result<u64> {
        let mut databases = self.databases.write();
        let removed = databases
            .get_mut(&ns.database)
            .and_then(|db| db.get_mut(&ns.collection))
            .map_or(0, |c| std::mem::take(&mut c.documents).len());
        Ok(removed as u64)
    }

    async fn ensure_index(&self, ns: &Namespace, spec: &IndexSpec) -> Result<String> {
        let name = spec.default_name();
        let keys = spec.to_document();
        self.with_collection_mut(ns, |c| match c.indexes.get(&name) {
            Some(existing) if *existing != keys => Err(FlangioError::MongoDB(format!(
                "An existing index has the same name as the requested index: {}",
                name
            ))),
            Some(_) => Ok(name.clone()),
            None => {
                c.indexes.insert(name.clone(), keys);
                Ok(name.clone())
            }
        })
    }

    async fn insert_document(&self, ns: &Namespace, mut doc: BsonDocument) -> Result<Bson> {
        let id = match doc.get(ID_FIELD) {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                doc.insert(ID_FIELD, id.clone());
                id
            }
        };
        self.with_collection_mut(ns, |c| {
            if c.documents.iter().any(|d| d.get(ID_FIELD) == Some(&id)) {
                return Err(FlangioError::MongoDB(format!(
                    "E11000 duplicate key error collection: {} index: _id_ dup key: {{ _id: {} }}",
                    ns, id
                )));
            }
            c.documents.push(doc);
            Ok(id.clone())
        })
    }

    async fn update_document(&self, ns: &Namespace, doc: BsonDocument) -> Result<Bson> {
        let id = doc
            .get(ID_FIELD)
            .cloned()
            .ok_or_else(|| FlangioError::Identity("Document has no _id".to_string()))?;
        self.with_collection_mut(ns, |c| {
            match c.documents.iter_mut().find(|d| d.get(ID_FIELD) == Some(&id)) {
                Some(existing) => *existing = doc,
                None => c.documents.push(doc),
            }
        });
        Ok(id)
    }

    async fn delete_documents(
        &self,
        ns: &Namespace,
        query: BsonDocument,
        just_one: bool,
    ) -> Result<u64> {
        let mut databases = self.databases.write();
        let Some(collection) = databases
            .get_mut(&ns.database)
            .and_then(|db| db.get_mut(&ns.collection))
        else {
            return Ok(0);
        };

        if just_one {
            match collection.documents.iter().position(|d| matches(d, &query)) {
                Some(pos) => {
                    collection.documents.remove(pos);
                    Ok(1)
                }
                None => Ok(0),
            }
        } else {
            let before = collection.documents.len();
            collection.documents.retain(|d| !matches(d, &query));
            Ok((before - collection.documents.len()) as u64)
        }
    }

    async fn find_documents(&self, ns: &Namespace, query: &FindQuery) -> Result<Vec<BsonDocument>> {
        let databases = self.databases.read();
        let Some(collection) = databases
            .get(&ns.database)
            .and_then(|db| db.get(&ns.collection))
        else {
            return Ok(Vec::new());
        };
        Ok(collection
            .documents
            .iter()
            .filter(|d| matches(d, query.get_filter()))
            .skip(query.get_skip().unwrap_or(0) as usize)
            .take(query.get_limit() as usize)
            .cloned()
            .collect())
    }
}
