//! CLI command implementations for ocrdesk.

pub mod auth;
pub mod health;
pub mod serve;
pub mod stats;

use anyhow::Context;
use ocrdesk_client::{ApiClient, TokenStore};
use ocrdesk_core::OcrdeskConfig;

/// API client using the persisted token.
pub(crate) fn api_client(config: &OcrdeskConfig) -> anyhow::Result<ApiClient> {
    let tokens = TokenStore::open(&config.auth.token_file).with_context(|| {
        format!("failed to read token file {}", config.auth.token_file.display())
    })?;
    if !tokens.is_set()
        && let Some(token) = config.auth.env_token()
    {
        tokens.set(&token)?;
    }
    Ok(ApiClient::new(&config.api, tokens)?)
}
