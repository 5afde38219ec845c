//! Command line and environment configuration

use clap::{Parser, ValueEnum};
use flangio_mongodb::StoreConfig;
use std::net::SocketAddr;
use std::time::Duration;

/// Which [`DocumentStore`](flangio_mongodb::DocumentStore) backs the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// A MongoDB server reached through the official driver
    Mongo,
    /// In-process store; data is lost on exit
    Memory,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "flangio-server")]
#[command(about = "MongoDB admin console with account management")]
pub struct Config {
    /// Address to bind to
    #[arg(long, env = "FLANGIO_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    #[arg(long, env = "MONGO_HOST", default_value = "127.0.0.1")]
    pub mongo_host: String,

    #[arg(long, env = "MONGO_PORT", default_value = "27017")]
    pub mongo_port: u16,

    /// Database used when a request names none
    #[arg(long, env = "MONGO_DB_NAME", default_value = "flangio")]
    pub mongo_db_name: String,

    /// Collection used when a request names none
    #[arg(long, env = "MONGO_MASTER_COLLECTION", default_value = "main")]
    pub mongo_master_collection: String,

    /// Upper bound on every store operation, in seconds
    #[arg(long, env = "FLANGIO_STORE_TIMEOUT_SECS", default_value = "10")]
    pub store_timeout_secs: u64,

    #[arg(long, env = "FLANGIO_BACKEND", value_enum, default_value = "mongo")]
    pub backend: Backend,

    /// Users created through the API also follow themselves
    #[arg(long, env = "AUTO_SELF_FOLLOW")]
    pub auto_self_follow: bool,

    /// Email of an administrator account created at startup
    #[arg(long, env = "FLANGIO_ADMIN_EMAIL", requires = "admin_password")]
    pub admin_email: Option<String>,

    #[arg(long, env = "FLANGIO_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Log filter (trace, debug, info, warn, error, or a full directive)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.mongo_host, self.mongo_port)
            .with_defaults(&self.mongo_db_name, &self.mongo_master_collection)
            .with_operation_timeout(Duration::from_secs(self.store_timeout_secs))
    }

    /// Bootstrap administrator credentials, when both are configured
    pub fn admin_credentials(&self) -> Option<(&str, &str)> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_build_store_config() {
        let config = Config::try_parse_from([
            "flangio-server",
            "--mongo-host",
            "db.internal",
            "--mongo-port",
            "27018",
            "--mongo-db-name",
            "console",
            "--mongo-master-collection",
            "records",
            "--store-timeout-secs",
            "3",
            "--backend",
            "memory",
        ])
        .unwrap();

        assert_eq!(config.backend, Backend::Memory);
        let store = config.store_config();
        assert_eq!(store.uri(), "mongodb://db.internal:27018/");
        assert_eq!(store.default_database, "console");
        assert_eq!(store.default_collection, "records");
        assert_eq!(store.operation_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_admin_credentials_need_both() {
        let config = Config::try_parse_from([
            "flangio-server",
            "--admin-email",
            "root@example.com",
            "--admin-password",
            "pw",
        ])
        .unwrap();
        assert_eq!(config.admin_credentials(), Some(("root@example.com", "pw")));
    }

    #[test]
    fn test_rejects_unknown_backend() {
        assert!(Config::try_parse_from(["flangio-server", "--backend", "sqlite"]).is_err());
    }
}
