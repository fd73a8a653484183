//! Token management commands.
//!
//! `ocrdesk login` - Store the API token used by the dashboard and the CLI.
//! `ocrdesk logout` - Forget it.

use ocrdesk_client::{ApiClient, TokenStore};
use ocrdesk_core::OcrdeskConfig;
use std::io::BufRead;

/// Store `token`, or the first line of stdin when none is given.
///
/// With `verify`, the token is checked against an authenticated endpoint and
/// dropped again if the backend refuses it.
pub async fn login(config: &OcrdeskConfig, token: Option<String>, verify: bool) -> anyhow::Result<()> {
    let token = match token {
        Some(token) => token,
        None => {
            eprintln!("Paste the API token and press enter:");
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line
        }
    };
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("no token given");
    }

    let tokens = TokenStore::open(&config.auth.token_file)?;
    tokens.set(token)?;

    if verify {
        let client = ApiClient::new(&config.api, tokens.clone())?;
        if let Err(e) = client.get_statistics().await {
            if e.is_unauthorized() {
                anyhow::bail!("the backend rejected the token; nothing was stored");
            }
            tracing::warn!(error = %e, "Could not verify token, keeping it");
        }
    }

    println!("✔ Token written to: {}", config.auth.token_file.display());
    Ok(())
}

pub fn logout(config: &OcrdeskConfig) -> anyhow::Result<()> {
    let tokens = TokenStore::open(&config.auth.token_file)?;
    if !tokens.is_set() {
        println!("No token stored.");
        return Ok(());
    }
    tokens.clear()?;
    println!("✔ Token removed from: {}", config.auth.token_file.display());
    Ok(())
}
