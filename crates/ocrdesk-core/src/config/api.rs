//! Backend API configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base URL compiled in when `OCRDESK_API_URL` is unset at build time.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Connection settings for the OCR backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend REST API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    option_env!("OCRDESK_API_URL")
        .unwrap_or(DEFAULT_API_URL)
        .to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
