use std::sync::Arc;

use crate::config::HubConfig;
use crate::db::pool::Database;

/// Shared application state, passed to all route handlers via `axum::extract::State`.
pub struct AppState {
    pub config: HubConfig,
    /// Lazily connected on first use; see [`Database::pool`].
    pub db: Database,
}

impl AppState {
    pub fn new(config: HubConfig) -> Arc<Self> {
        let db = Database::new(
            config.database_url.clone(),
            config.database_name.clone(),
            config.db_pool_size,
        );
        Arc::new(Self { config, db })
    }
}
