//! Admin operation façade
//!
//! Each operation is validate → execute → envelope. Failures never escape
//! as errors: they are classified into the envelope's `code`.

use bson::Bson;
use flangio_common::{Envelope, FieldError, FlangioError, Result};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::connection::{Namespace, StoreConfig};
use crate::document::{bson_to_json, document_to_json, json_to_document};
use crate::gate::{parse_object, Payload};
use crate::identity::{normalize_create_identity, normalize_update_identity};
use crate::index::IndexSpec;
use crate::query::FindQuery;
use crate::store::DocumentStore;

pub const NO_DATABASES_MESSAGE: &str = "No databases were found. You haven't created any yet, MongoDB isn't running, or its not connected.";
pub const DATABASE_CREATION_FAILED: &str = "The database creation operation failed.";

/// Admin operations over one document store
#[derive(Clone)]
pub struct Admin {
    store: Arc<dyn DocumentStore>,
    config: StoreConfig,
}

impl Admin {
    pub fn new(store: Arc<dyn DocumentStore>, config: StoreConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Request names win over the configured defaults
    pub fn namespace(&self, database: Option<&str>, collection: Option<&str>) -> Namespace {
        self.config.namespace(database, collection)
    }

    /// Insert (`update == false`) or save (`update == true`) a raw JSON document
    pub async fn create_or_update_document(&self, raw_json: &str, ns: &Namespace, update: bool) -> Envelope {
        let operation = if update { "update document" } else { "create document" };
        match self.write_document(raw_json, ns, update).await {
            Ok(envelope) => envelope,
            Err(e) => failure(operation, ns, e),
        }
    }

    pub async fn create_document(&self, raw_json: &str, ns: &Namespace) -> Envelope {
        self.create_or_update_document(raw_json, ns, false).await
    }

    pub async fn update_document(&self, raw_json: &str, ns: &Namespace) -> Envelope {
        self.create_or_update_document(raw_json, ns, true).await
    }

    async fn write_document(&self, raw_json: &str, ns: &Namespace, update: bool) -> Result<Envelope> {
        let mut object = parse_object(raw_json, Payload::Document)?;
        if update {
            normalize_update_identity(&mut object)?;
        } else {
            normalize_create_identity(&mut object);
        }
        let doc = json_to_document(object)?;

        let (id, message) = if update {
            (self.store.update_document(ns, doc).await?, "Document updated.")
        } else {
            (self.store.insert_document(ns, doc).await?, "Document created.")
        };
        info!(namespace = %ns, update, "document written");
        Ok(Envelope::ok(message).with_results(json!([{ "_id": bson_to_json(id) }])))
    }

    /// Delete the first (`just_one`) or every document matching a raw JSON query
    pub async fn delete_by_query(&self, raw_json: &str, ns: &Namespace, just_one: bool) -> Envelope {
        match self.delete_matching(raw_json, ns, just_one).await {
            Ok(removed) => {
                info!(namespace = %ns, just_one, removed, "documents deleted");
                Envelope::ok(format!("{} document(s) deleted.", removed))
                    .with_results(json!({ "deleted": removed }))
            }
            Err(e) => failure("delete by query", ns, e),
        }
    }

    async fn delete_matching(&self, raw_json: &str, ns: &Namespace, just_one: bool) -> Result<u64> {
        let query = json_to_document(parse_object(raw_json, Payload::Query)?)?;
        self.store.delete_documents(ns, query, just_one).await
    }

    /// Databases and their collections; an empty store gets an explanatory message
    pub async fn list_databases(&self) -> Envelope {
        match self.store.list_databases().await {
            Ok(dbs) if dbs.is_empty() => Envelope::ok(NO_DATABASES_MESSAGE).with_results(json!([])),
            Ok(dbs) => Envelope::ok(format!("Found {} database(s).", dbs.len()))
                .with_results(json!(dbs)),
            Err(e) => {
                warn!(error = %e, "listing databases failed");
                Envelope::from_error(&e)
            }
        }
    }

    pub async fn drop_collection(&self, ns: &Namespace) -> Envelope {
        match self.store.drop_collection(ns).await {
            Ok(()) => Envelope::ok("The collection was deleted."),
            Err(e) => failure("drop collection", ns, e),
        }
    }

    pub async fn drop_database(&self, database: &str) -> Envelope {
        match self.store.drop_database(database).await {
            Ok(()) => Envelope::ok("The database was deleted."),
            Err(e) => {
                warn!(database, error = %e, "drop database failed");
                Envelope::from_error(&e)
            }
        }
    }

    pub async fn clear_collection(&self, ns: &Namespace) -> Envelope {
        match self.store.clear_collection(ns).await {
            Ok(removed) => Envelope::ok("All records were removed from the collection.")
                .with_results(json!({ "deleted": removed })),
            Err(e) => failure("clear collection", ns, e),
        }
    }

    pub async fn ensure_index(&self, ns: &Namespace, spec: &IndexSpec) -> Envelope {
        match self.store.ensure_index(ns, spec).await {
            Ok(name) => Envelope::ok("Index created successfully").with_results(json!({ "name": name })),
            Err(e) => failure("ensure index", ns, e),
        }
    }

    /// Create a database and collection by inserting `initial_document`
    pub async fn create_database(&self, ns: &Namespace, initial_document: &str) -> Envelope {
        match self.insert_initial_document(ns, initial_document).await {
            Ok(id) => {
                info!(namespace = %ns, "database created");
                Envelope::ok("Database created.").with_results(json!([{ "_id": bson_to_json(id) }]))
            }
            Err(e) => {
                warn!(namespace = %ns, error = %e, "create database failed");
                Envelope::error(e.status(), DATABASE_CREATION_FAILED)
                    .with_errors(vec![FieldError::global(e.to_string())])
            }
        }
    }

    async fn insert_initial_document(&self, ns: &Namespace, initial_document: &str) -> Result<Bson> {
        let doc = json_to_document(parse_object(initial_document, Payload::Document)?)?;
        self.store.create_database(ns, doc).await
    }

    /// Browse documents as relaxed extended JSON
    pub async fn find_documents(&self, ns: &Namespace, query: &FindQuery) -> Envelope {
        match self.store.find_documents(ns, query).await {
            Ok(docs) => {
                let count = docs.len();
                let docs: Vec<_> = docs.into_iter().map(document_to_json).collect();
                Envelope::ok(format!("{} document(s) found.", count)).with_results(json!(docs))
            }
            Err(e) => failure("find documents", ns, e),
        }
    }
}

fn failure(operation: &str, ns: &Namespace, err: FlangioError) -> Envelope {
    if err.is_store_error() {
        warn!(operation, namespace = %ns, error = %err, "store operation failed");
    } else {
        info!(operation, namespace = %ns, error = %err, "request rejected");
    }
    Envelope::from_error(&err)
}
