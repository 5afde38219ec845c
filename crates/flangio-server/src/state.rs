//! Shared handler state

use flangio_accounts::{AccountStore, SessionStore, SocialGraph};
use flangio_common::Result;
use flangio_imports::ImportTracker;
use flangio_mongodb::{Admin, DocumentStore, MemoryStore, MongoStore, StoreConfig};
use std::sync::Arc;
use tracing::info;

use crate::config::{Backend, Config};

/// Everything a handler needs, cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub admin: Arc<Admin>,
    pub imports: Arc<ImportTracker>,
    pub accounts: Arc<AccountStore>,
    pub sessions: Arc<SessionStore>,
    pub social: Arc<SocialGraph>,
    /// New API users also get an edge to themselves
    pub auto_self_follow: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, store_config: StoreConfig) -> Self {
        Self {
            admin: Arc::new(Admin::new(store, store_config)),
            imports: Arc::new(ImportTracker::new()),
            accounts: Arc::new(AccountStore::new()),
            sessions: Arc::new(SessionStore::new()),
            social: Arc::new(SocialGraph::new()),
            auto_self_follow: false,
        }
    }

    /// State over a fresh [`MemoryStore`]
    pub fn in_memory(store_config: StoreConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), store_config)
    }

    pub fn with_auto_self_follow(mut self, enabled: bool) -> Self {
        self.auto_self_follow = enabled;
        self
    }

    /// Build the configured backend and bootstrap the administrator
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store_config = config.store_config();
        let store: Arc<dyn DocumentStore> = match config.backend {
            Backend::Mongo => Arc::new(MongoStore::connect(&store_config).await?),
            Backend::Memory => {
                info!("using the in-process document store");
                Arc::new(MemoryStore::new())
            }
        };

        let state = Self::new(store, store_config).with_auto_self_follow(config.auto_self_follow);
        if let Some((email, password)) = config.admin_credentials() {
            state.accounts.bootstrap_admin(email, password)?;
        }
        Ok(state)
    }

    pub fn store_config(&self) -> &StoreConfig {
        self.admin.config()
    }
}
