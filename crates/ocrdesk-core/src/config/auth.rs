//! Bearer token persistence configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the backend bearer token is kept between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// File holding the persisted token.
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,

    /// Environment variable that seeds the token at startup when the file is empty.
    #[serde(default)]
    pub token_env: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
            token_env: None,
        }
    }
}

impl AuthConfig {
    /// Token from `token_env`, if configured and set.
    pub fn env_token(&self) -> Option<String> {
        self.token_env
            .as_ref()
            .and_then(|var| std::env::var(var).ok())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

fn default_token_file() -> PathBuf {
    PathBuf::from("data/auth_token")
}
