//! MongoDB-backed [`DocumentStore`]

use async_trait::async_trait;
use bson::{doc, Bson, Document as BsonDocument};
use flangio_common::{FlangioError, Result};
use futures::TryStreamExt;
use mongodb::IndexModel;
use tracing::{debug, info};

use crate::connection::{Connection, Namespace, StoreConfig};
use crate::identity::ID_FIELD;
use crate::index::IndexSpec;
use crate::query::FindQuery;
use crate::store::{visible_databases, DatabaseInfo, DocumentStore};

/// Document store client talking to a MongoDB server
#[derive(Clone)]
pub struct MongoStore {
    connection: Connection,
}

impl MongoStore {
    /// Build a pooled client for `config`; no round trip happens here
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let connection = Connection::with_config(config).await?;
        info!(uri = %config.uri(), "document store client ready");
        Ok(Self { connection })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        let client = self.connection.client();
        let names = self
            .connection
            .bounded("listDatabases", client.list_database_names())
            .await?;

        let mut raw = Vec::with_capacity(names.len());
        for name in names {
            let db = client.database(&name);
            let collections = self
                .connection
                .bounded("listCollections", db.list_collection_names())
                .await?;
            raw.push((name, collections));
        }
        Ok(visible_databases(raw))
    }

    async fn drop_collection(&self, ns: &Namespace) -> Result<()> {
        let collection = self.connection.collection(ns);
        self.connection.bounded("drop", collection.drop()).await?;
        info!(namespace = %ns, "collection dropped");
        Ok(())
    }

    async fn drop_database(&self, database: &str) -> Result<()> {
        let db = self.connection.database(database);
        self.connection.bounded("dropDatabase", db.drop()).await?;
        info!(database, "database dropped");
        Ok(())
    }

    async fn clear_collection(&self, ns: &Namespace) -> Result<u64> {
        let collection = self.connection.collection(ns);
        let result = self
            .connection
            .bounded("delete", collection.delete_many(doc! {}))
            .await?;
        info!(namespace = %ns, removed = result.deleted_count, "collection cleared");
        Ok(result.deleted_count)
    }

    async fn ensure_index(&self, ns: &Namespace, spec: &IndexSpec) -> Result<String> {
        let collection = self.connection.collection(ns);
        let model = IndexModel::builder().keys(spec.to_document()).build();
        let result = self
            .connection
            .bounded("createIndexes", collection.create_index(model))
            .await?;
        info!(namespace = %ns, index = %result.index_name, "index ensured");
        Ok(result.index_name)
    }

    async fn insert_document(&self, ns: &Namespace, doc: BsonDocument) -> Result<Bson> {
        let collection = self.connection.collection(ns);
        let result = self
            .connection
            .bounded("insert", collection.insert_one(doc))
            .await?;
        debug!(namespace = %ns, id = %result.inserted_id, "document inserted");
        Ok(result.inserted_id)
    }

    async fn update_document(&self, ns: &Namespace, doc: BsonDocument) -> Result<Bson> {
        let id = doc.get(ID_FIELD).cloned().ok_or_else(|| {
            FlangioError::Identity("Document has no _id".to_string())
        })?;
        let collection = self.connection.collection(ns);
        let result = self
            .connection
            .bounded(
                "update",
                collection.replace_one(doc! { "_id": id.clone() }, doc).upsert(true),
            )
            .await?;
        debug!(
            namespace = %ns,
            matched = result.matched_count,
            upserted = result.upserted_id.is_some(),
            "document saved"
        );
        Ok(id)
    }

    async fn delete_documents(
        &self,
        ns: &Namespace,
        query: BsonDocument,
        just_one: bool,
    ) -> Result<u64> {
        let collection = self.connection.collection(ns);
        let result = if just_one {
            self.connection
                .bounded("delete", collection.delete_one(query))
                .await?
        } else {
            self.connection
                .bounded("delete", collection.delete_many(query))
                .await?
        };
        debug!(namespace = %ns, just_one, removed = result.deleted_count, "documents deleted");
        Ok(result.deleted_count)
    }

    async fn find_documents(&self, ns: &Namespace, query: &FindQuery) -> Result<Vec<BsonDocument>> {
        let collection = self.connection.collection(ns);
        let mut find = collection
            .find(query.get_filter().clone())
            .limit(query.get_limit());
        if let Some(skip) = query.get_skip() {
            find = find.skip(skip);
        }
        let cursor = self.connection.bounded("find", find).await?;
        // Draining the cursor issues getMore round trips; bound those too
        self.connection.bounded("getMore", cursor.try_collect()).await
    }
}

#[cfg(test)]
mod tests {
    //! These tests need a MongoDB server on 127.0.0.1:27017.
    //! Run with: cargo test -p flangio-mongodb -- --ignored

    use super::*;
    use std::time::Duration;

    async fn store() -> MongoStore {
        let config = StoreConfig::default().with_operation_timeout(Duration::from_secs(5));
        MongoStore::connect(&config).await.unwrap()
    }

    #[tokio::test]
    #[ignore]
    async fn test_insert_then_find() {
        let store = store().await;
        let ns = Namespace::new("flangio_test_mongo", "roundtrip");
        store.drop_collection(&ns).await.unwrap();

        store.insert_document(&ns, doc! { "foo": "bar" }).await.unwrap();
        let docs = store.find_documents(&ns, &FindQuery::new()).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get_str("foo").unwrap(), "bar");

        store.drop_database("flangio_test_mongo").await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_ensure_index_twice() {
        let store = store().await;
        let ns = Namespace::new("flangio_test_mongo", "indexed");
        let spec = IndexSpec::ascending("name").unwrap();
        assert_eq!(store.ensure_index(&ns, &spec).await.unwrap(), "name_1");
        assert_eq!(store.ensure_index(&ns, &spec).await.unwrap(), "name_1");
        store.drop_database("flangio_test_mongo").await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_store_is_an_error() {
        let config = StoreConfig::new("127.0.0.1", 1).with_operation_timeout(Duration::from_millis(200));
        let store = MongoStore::connect(&config).await.unwrap();
        let err = store.list_databases().await.unwrap_err();
        assert!(err.is_store_error());
    }
}
