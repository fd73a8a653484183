//! Dashboard application state.

use crate::uploads::UploadTracker;
use ocrdesk_client::{ApiClient, CachePolicy, Queries, TokenStore};
use ocrdesk_core::{AcceptPolicy, OcrdeskConfig};
use std::sync::Arc;

/// Shared application state for the dashboard.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: OcrdeskConfig,
    queries: Queries,
    uploads: UploadTracker,
    accept: AcceptPolicy,
}

impl AppState {
    /// Create state around an existing query layer.
    pub fn new(config: OcrdeskConfig, queries: Queries) -> Self {
        let accept = AcceptPolicy::new(&config.upload);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                queries,
                uploads: UploadTracker::new(),
                accept,
            }),
        }
    }

    /// Build the token store, API client and query layer from configuration.
    ///
    /// The token comes from the configured token file, or from `auth.token_env`
    /// when the file holds none.
    pub fn from_config(config: OcrdeskConfig) -> anyhow::Result<Self> {
        let tokens = TokenStore::open(&config.auth.token_file)?;
        if !tokens.is_set()
            && let Some(token) = config.auth.env_token()
        {
            tracing::info!("Using API token from environment");
            tokens.set(&token)?;
        }
        let client = ApiClient::new(&config.api, tokens)?;
        let queries = Queries::new(client, CachePolicy::from_config(&config.cache));
        Ok(Self::new(config, queries))
    }

    pub fn config(&self) -> &OcrdeskConfig {
        &self.inner.config
    }

    pub fn queries(&self) -> &Queries {
        &self.inner.queries
    }

    pub fn tokens(&self) -> &TokenStore {
        self.inner.queries.client().tokens()
    }

    pub fn uploads(&self) -> &UploadTracker {
        &self.inner.uploads
    }

    pub fn accept_policy(&self) -> &AcceptPolicy {
        &self.inner.accept
    }

    pub fn page_size(&self) -> u32 {
        self.inner.config.dashboard.page_size
    }

    pub fn gallery_limit(&self) -> u32 {
        self.inner.config.dashboard.gallery_limit
    }
}
