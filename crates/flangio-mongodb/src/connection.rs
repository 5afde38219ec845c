//! MongoDB connection management with explicit store configuration

use bson::{doc, Document as BsonDocument};
use flangio_common::{FlangioError, Result};
use mongodb::{
    options::ClientOptions,
    Client, Collection, Database,
};
use std::future::IntoFuture;
use std::time::Duration;

/// Where the document store lives and which namespace requests default to.
///
/// Built once from process configuration and handed to the store
/// constructor; request-level database/collection names override the
/// defaults through [`StoreConfig::namespace`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    /// Database used when a request names none
    pub default_database: String,
    /// Collection used when a request names none
    pub default_collection: String,
    /// Upper bound for a single store call
    pub operation_timeout: Duration,
    pub pool: PoolConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 27017,
            default_database: "flangio".to_string(),
            default_collection: "main".to_string(),
            operation_timeout: Duration::from_secs(10),
            pool: PoolConfig::default(),
        }
    }
}

impl StoreConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_defaults(
        mut self,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        self.default_database = database.into();
        self.default_collection = collection.into();
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Connection string for the configured host and port
    pub fn uri(&self) -> String {
        format!("mongodb://{}:{}/", self.host, self.port)
    }

    /// Resolves a namespace, falling back to the configured defaults for
    /// absent or blank names
    pub fn namespace(&self, database: Option<&str>, collection: Option<&str>) -> Namespace {
        let pick = |given: Option<&str>, default: &str| {
            given
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        Namespace {
            database: pick(database, &self.default_database),
            collection: pick(collection, &self.default_collection),
        }
    }
}

/// A (database, collection) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Minimum number of connections in the pool
    pub min_pool_size: Option<u32>,
    /// Maximum number of connections in the pool
    pub max_pool_size: Option<u32>,
    /// Maximum time a connection can remain idle before being closed
    pub max_idle_time: Option<Duration>,
    /// Application name for server logs
    pub app_name: Option<String>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_pool_size: Some(0),
            max_pool_size: Some(10),
            max_idle_time: Some(Duration::from_secs(300)),
            app_name: Some("flangio".to_string()),
        }
    }
}

/// Pooled MongoDB client; every call goes through [`Connection::bounded`]
#[derive(Clone)]
pub struct Connection {
    client: Client,
    operation_timeout: Duration,
}

impl Connection {
    /// Build a client for the configured server.
    ///
    /// The driver connects lazily, so an unreachable server surfaces on the
    /// first operation rather than here.
    pub async fn with_config(config: &StoreConfig) -> Result<Self> {
        let mut client_options = ClientOptions::parse(config.uri()).await?;

        let pool = &config.pool;
        if let Some(min) = pool.min_pool_size {
            client_options.min_pool_size = Some(min);
        }
        if let Some(max) = pool.max_pool_size {
            client_options.max_pool_size = Some(max);
        }
        if let Some(idle) = pool.max_idle_time {
            client_options.max_idle_time = Some(idle);
        }
        if let Some(app) = pool.app_name.clone() {
            client_options.app_name = Some(app);
        }

        // Keep the driver's own waits inside the operation bound
        client_options.connect_timeout = Some(config.operation_timeout);
        client_options.server_selection_timeout = Some(config.operation_timeout);

        let client = Client::with_options(client_options)?;

        Ok(Self {
            client,
            operation_timeout: config.operation_timeout,
        })
    }

    /// Get a reference to the client
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    /// Untyped collection handle for a namespace
    pub fn collection(&self, ns: &Namespace) -> Collection<BsonDocument> {
        self.client.database(&ns.database).collection(&ns.collection)
    }

    /// Runs one driver call under the configured timeout.
    ///
    /// Expiry is reported as [`FlangioError::Timeout`]; driver errors are
    /// classified through `From<mongodb::error::Error>`.
    pub async fn bounded<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: IntoFuture<Output = mongodb::error::Result<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result.map_err(FlangioError::from),
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout = ?self.operation_timeout,
                    "document store did not answer"
                );
                Err(FlangioError::Timeout(format!(
                    "store unreachable: {} did not complete within {:?}",
                    operation, self.operation_timeout
                )))
            }
        }
    }

    /// Check if the server answers a ping
    pub async fn ping(&self) -> Result<()> {
        self.bounded("ping", self.database("admin").run_command(doc! { "ping": 1 }))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_store_config() {
        let config = StoreConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 27017);
        assert_eq!(config.uri(), "mongodb://127.0.0.1:27017/");
        assert_eq!(config.operation_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_namespace_overrides_win() {
        let config = StoreConfig::new("db.internal", 27018).with_defaults("flangio", "main");
        assert_eq!(config.namespace(None, None), Namespace::new("flangio", "main"));
        assert_eq!(config.namespace(Some("sales"), None), Namespace::new("sales", "main"));
        assert_eq!(
            config.namespace(Some("sales"), Some("orders")),
            Namespace::new("sales", "orders")
        );
    }

    #[test]
    fn test_blank_names_fall_back_to_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.namespace(Some("  "), Some("")), Namespace::new("flangio", "main"));
    }

    #[test]
    fn test_namespace_display() {
        assert_eq!(Namespace::new("a", "b").to_string(), "a.b");
    }

    #[test]
    fn test_default_pool_config() {
        let config = PoolConfig::default();
        assert_eq!(config.max_pool_size, Some(10));
        assert_eq!(config.app_name, Some("flangio".to_string()));
    }

    #[tokio::test]
    async fn test_connection_builds_lazily() {
        let config = StoreConfig::new("127.0.0.1", 1).with_operation_timeout(Duration::from_millis(200));
        let conn = Connection::with_config(&config).await.unwrap();
        let err = conn.ping().await.unwrap_err();
        assert!(err.is_store_error());
    }
}
