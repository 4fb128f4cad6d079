//! Application state for the API service.

use std::sync::Arc;

use common::config::AppConfig;
use common::db::{ConnectionProvider, SupabaseDb};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SupabaseDb,
}

impl AppState {
    /// Creates the production state: a Supabase-backed adapter whose client is
    /// built on first use from the credentials in `config`.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_provider(ConnectionProvider::supabase(config))
    }

    /// Creates a state around an explicit connection provider.
    pub fn with_provider(provider: ConnectionProvider) -> Self {
        Self {
            db: SupabaseDb::new(Arc::new(provider)),
        }
    }
}
