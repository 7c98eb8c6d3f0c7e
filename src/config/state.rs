// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;

use super::types::Config;
use crate::store::BirdStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<BirdStore>,
}

impl AppState {
    /// Create `AppState` backed by the seeded record store
    pub fn new(config: &Config) -> Self {
        Self::with_store(config, BirdStore::seeded())
    }

    pub fn with_store(config: &Config, store: BirdStore) -> Self {
        Self {
            config: config.clone(),
            store: Arc::new(store),
        }
    }

    /// Whether access logging is enabled
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
