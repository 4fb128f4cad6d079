//! Lazily constructed, process-lifetime connection handle.

use std::sync::Arc;

use tokio::sync::OnceCell;

use super::backend::TableBackend;
use super::supabase::{ServiceCredentials, SupabaseClient};
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};

/// Shared connection handle.
pub type Handle = Arc<dyn TableBackend>;

/// Builds a handle from validated credentials.
pub type BackendFactory = Arc<dyn Fn(&ServiceCredentials) -> AppResult<Handle> + Send + Sync>;

/// Owns the single connection handle of the process.
///
/// The handle is built on the first successful [`get_handle`](Self::get_handle)
/// call. Concurrent first callers wait for the one construction in flight and
/// all of them get the same `Arc`. Failed attempts cache nothing.
pub struct ConnectionProvider {
    url: Option<String>,
    key: Option<String>,
    factory: BackendFactory,
    handle: OnceCell<Handle>,
}

impl ConnectionProvider {
    pub fn new(
        url: Option<String>,
        key: Option<String>,
        factory: BackendFactory,
    ) -> Self {
        Self {
            url,
            key,
            factory,
            handle: OnceCell::new(),
        }
    }

    /// Provider producing a [`SupabaseClient`] from the Supabase settings.
    pub fn supabase(config: &AppConfig) -> Self {
        Self::with_factory(config, |credentials| {
            let client = SupabaseClient::new(credentials)?;
            Ok(Arc::new(client) as Handle)
        })
    }

    /// Provider using the Supabase settings of `config` and a custom factory.
    pub fn with_factory<F>(config: &AppConfig, factory: F) -> Self
    where
        F: Fn(&ServiceCredentials) -> AppResult<Handle> + Send + Sync + 'static,
    {
        Self::new(
            config.supabase_url.clone(),
            config.supabase_key.clone(),
            Arc::new(factory),
        )
    }

    /// Whether URL and key are both present.
    pub fn is_configured(&self) -> bool {
        self.credentials().is_ok()
    }

    /// Whether the handle has been constructed.
    pub fn is_connected(&self) -> bool {
        self.handle.initialized()
    }

    /// Returns the cached handle, constructing it on first use.
    pub async fn get_handle(&self) -> AppResult<Handle> {
        self.handle
            .get_or_try_init(|| async {
                let credentials = self.credentials()?;
                let handle = (self.factory)(&credentials)?;
                tracing::info!(url = %credentials.url, "Supabase client created");
                Ok::<_, AppError>(handle)
            })
            .await
            .cloned()
    }

    fn credentials(&self) -> AppResult<ServiceCredentials> {
        let url = non_empty(&self.url);
        let key = non_empty(&self.key);
        match (url, key) {
            (Some(url), Some(key)) => Ok(ServiceCredentials {
                url: url.to_string(),
                key: key.to_string(),
            }),
            _ => Err(AppError::Configuration(
                "SUPABASE_URL and SUPABASE_KEY must be set in environment variables".to_string(),
            )),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
