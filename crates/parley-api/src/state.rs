//! Application state wiring the stores and service together.
//!
//! AppState holds the concrete service instance used by both CLI and REST API.
//! The service is generic over store traits, but AppState pins it to the
//! SQLite implementations.

use std::path::PathBuf;
use std::sync::Arc;

use parley_core::service::conversation::ConversationService;
use parley_infra::config::{load_config, resolve_data_dir, resolve_database_url};
use parley_infra::sqlite::event::SqliteEventStore;
use parley_infra::sqlite::pool::DatabasePool;
use parley_infra::sqlite::session::SqliteSessionStore;
use parley_types::config::ParleyConfig;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteConversationService = ConversationService<SqliteSessionStore, SqliteEventStore>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub conversation: Arc<ConcreteConversationService>,
    pub config: Arc<ParleyConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Resolve the data directory and load `config.toml` from it.
    pub async fn load_config() -> anyhow::Result<(PathBuf, ParleyConfig)> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;
        let config = load_config(&data_dir).await;
        Ok((data_dir, config))
    }

    /// Initialize the application state: connect to DB, wire the service.
    pub async fn init(data_dir: PathBuf, config: ParleyConfig) -> anyhow::Result<Self> {
        let db_url = resolve_database_url(&config, &data_dir);
        let db_pool = DatabasePool::new(&db_url).await?;
        tracing::debug!(data_dir = %data_dir.display(), "Database ready");

        Ok(Self::from_pool(db_pool, config, data_dir))
    }

    /// Wire the service over an already opened pool.
    pub fn from_pool(db_pool: DatabasePool, config: ParleyConfig, data_dir: PathBuf) -> Self {
        let conversation = ConversationService::new(
            SqliteSessionStore::new(db_pool.clone()),
            SqliteEventStore::new(db_pool),
        );

        Self {
            conversation: Arc::new(conversation),
            config: Arc::new(config),
            data_dir,
        }
    }
}
