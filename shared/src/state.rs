use crate::config::{Config, StorageBackend};
use crate::session::{CookieSession, SessionProvider};
use fiscal_atoms::reference::load_seed_users;
use fiscal_atoms::{DynamoStore, LedgerStore, MemoryStore, ReferenceData, ReferenceError};
use std::sync::Arc;

/// Everything a request handler needs, built once per cold start
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub refs: ReferenceData,
    pub sessions: Arc<dyn SessionProvider>,
    pub config: Config,
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("reference data: {0}")]
    Reference(#[from] ReferenceError),
}

impl AppState {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        refs: ReferenceData,
        sessions: Arc<dyn SessionProvider>,
        config: Config,
    ) -> Self {
        Self {
            store,
            refs,
            sessions,
            config,
        }
    }

    pub async fn from_config(config: Config) -> Result<Self, StartupError> {
        let refs = ReferenceData::load(config.catalog_path.as_deref(), config.dossiers_path.as_deref())?;

        let store: Arc<dyn LedgerStore> = match config.storage {
            StorageBackend::Dynamo => {
                let aws_config = aws_config::load_from_env().await;
                let client = aws_sdk_dynamodb::Client::new(&aws_config);
                tracing::info!(table = %config.table_name, "Using DynamoDB ledger");
                Arc::new(DynamoStore::new(client, config.table_name.clone()))
            }
            StorageBackend::Memory => {
                let users = load_seed_users(config.seed_users_path.as_deref())?;
                tracing::info!(users = users.len(), "Using in-memory ledger");
                Arc::new(MemoryStore::with_users(users))
            }
        };

        Ok(Self::new(store, refs, Arc::new(CookieSession), config))
    }
}
