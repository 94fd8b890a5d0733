//! Application state wiring the stores and the backend client together.
//!
//! The stores are generic over the `StateStore` port; AppState pins them
//! to the SQLite adapter and hands every store the same event bus.

use std::path::PathBuf;

use complyx_core::assessment::AssessmentTracker;
use complyx_core::chat::MessageLog;
use complyx_core::event::EventBus;
use complyx_core::session::SessionRegistry;
use complyx_infra::config::{load_config, resolve_data_dir};
use complyx_infra::http::HttpAssessmentBackend;
use complyx_infra::sqlite::{DatabasePool, SqliteStateStore};

/// Shared application state holding the stores and the backend client.
pub struct AppState {
    pub sessions: SessionRegistry<SqliteStateStore>,
    pub log: MessageLog<SqliteStateStore>,
    pub tracker: AssessmentTracker<SqliteStateStore>,
    pub backend: HttpAssessmentBackend,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: connect to the database, restore
    /// the persisted stores, build the backend client.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("complyx.db").display()
        );
        let pool = DatabasePool::new(&db_url).await?;
        let store = SqliteStateStore::new(pool);

        let config = load_config(&data_dir).await;
        let backend = HttpAssessmentBackend::new(&config)?;

        let bus = EventBus::default();
        let sessions = SessionRegistry::load(store.clone(), bus.clone()).await?;
        let log = MessageLog::load(store.clone(), bus.clone()).await?;
        let tracker = AssessmentTracker::load(store, bus).await?;

        Ok(Self {
            sessions,
            log,
            tracker,
            backend,
            data_dir,
        })
    }
}
