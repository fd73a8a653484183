//! Configuration types for the ocrdesk dashboard.
//!
//! Configuration is loaded from a YAML file (`ocrdesk.yaml` by default) and then
//! overlaid with environment variables. Every section has defaults, so an empty
//! file (or no file at all) yields a working local-development setup.
//!
//! # Environment
//!
//! - `OCRDESK_CONFIG`: path of the configuration file
//! - `OCRDESK_API_URL`: backend base URL. Read at build time for the default and
//!   again at runtime, where it overrides the file.

pub mod api;
pub mod auth;
pub mod cache;
pub mod dashboard;
pub mod upload;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use api::ApiConfig;
pub use auth::AuthConfig;
pub use cache::CacheConfig;
pub use dashboard::DashboardConfig;
pub use upload::UploadConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "OCRDESK_CONFIG";

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "OCRDESK_API_URL";

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "ocrdesk.yaml";

/// Complete ocrdesk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrdeskConfig {
    /// Backend API connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Dashboard web server.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Bearer token persistence.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Query cache staleness windows and refresh intervals.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Upload acceptance rules.
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl OcrdeskConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document; treat it as "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Resolve the configuration file path.
    ///
    /// An explicit path wins, then `OCRDESK_CONFIG`, then `ocrdesk.yaml`.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration, apply environment overrides and validate.
    ///
    /// A missing file is only an error when the path was given explicitly.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::resolve_path(explicit);
        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else if explicit.is_some() {
            return Err(ConfigError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        } else {
            Self::default()
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Overlay runtime environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.trim().is_empty()
        {
            self.api.base_url = url;
        }
    }

    /// Check the configuration for values the dashboard cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Config("api.base_url must not be empty".into()));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(ConfigError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.dashboard.port == 0 {
            return Err(ConfigError::Config("dashboard.port must not be 0".into()));
        }
        if self.dashboard.page_size == 0 || self.dashboard.gallery_limit == 0 {
            return Err(ConfigError::Config(
                "dashboard.page_size and dashboard.gallery_limit must be positive".into(),
            ));
        }
        self.cache.validate()?;
        if self.upload.max_file_bytes == 0 {
            return Err(ConfigError::Config("upload.max_file_bytes must be positive".into()));
        }
        Ok(())
    }
}
