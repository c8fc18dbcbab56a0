//! # Shared Application State
//!
//! Everything a handler needs, constructed once in `main` and injected
//! through axum's `State` extractor. No module-level singletons: the
//! database handle and configuration travel explicitly.

use crate::config::ApiConfig;
use qbu_db::Database;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
}

impl AppState {
    /// Creates the shared state.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState { db, config }
    }
}
