//! Query cache configuration.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Staleness windows, auto-refresh intervals and retention, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Document list and document detail.
    #[serde(default = "default_five_minutes")]
    pub documents_secs: u64,

    /// Aggregate statistics.
    #[serde(default = "default_five_minutes")]
    pub statistics_secs: u64,

    /// AI corrections of a document.
    #[serde(default = "default_corrections_secs")]
    pub corrections_secs: u64,

    /// AI model description.
    #[serde(default = "default_model_secs")]
    pub model_secs: u64,

    /// AI status.
    #[serde(default = "default_status_secs")]
    pub status_secs: u64,

    /// Background refresh of the AI status.
    #[serde(default = "default_status_secs")]
    pub status_refresh_secs: u64,

    /// Background refresh of the statistics.
    #[serde(default = "default_five_minutes")]
    pub statistics_refresh_secs: u64,

    /// How long an unused entry is kept before it is dropped.
    #[serde(default = "default_model_secs")]
    pub gc_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            documents_secs: default_five_minutes(),
            statistics_secs: default_five_minutes(),
            corrections_secs: default_corrections_secs(),
            model_secs: default_model_secs(),
            status_secs: default_status_secs(),
            status_refresh_secs: default_status_secs(),
            statistics_refresh_secs: default_five_minutes(),
            gc_secs: default_model_secs(),
        }
    }
}

impl CacheConfig {
    pub fn documents(&self) -> Duration {
        Duration::from_secs(self.documents_secs)
    }

    pub fn statistics(&self) -> Duration {
        Duration::from_secs(self.statistics_secs)
    }

    pub fn corrections(&self) -> Duration {
        Duration::from_secs(self.corrections_secs)
    }

    pub fn model(&self) -> Duration {
        Duration::from_secs(self.model_secs)
    }

    pub fn status(&self) -> Duration {
        Duration::from_secs(self.status_secs)
    }

    pub fn status_refresh(&self) -> Duration {
        Duration::from_secs(self.status_refresh_secs)
    }

    pub fn statistics_refresh(&self) -> Duration {
        Duration::from_secs(self.statistics_refresh_secs)
    }

    pub fn gc(&self) -> Duration {
        Duration::from_secs(self.gc_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("documents_secs", self.documents_secs),
            ("statistics_secs", self.statistics_secs),
            ("corrections_secs", self.corrections_secs),
            ("model_secs", self.model_secs),
            ("status_secs", self.status_secs),
            ("status_refresh_secs", self.status_refresh_secs),
            ("statistics_refresh_secs", self.statistics_refresh_secs),
            ("gc_secs", self.gc_secs),
        ];
        for (name, secs) in windows {
            if secs == 0 {
                return Err(ConfigError::Config(format!("cache.{name} must be positive")));
            }
        }
        Ok(())
    }
}

fn default_five_minutes() -> u64 {
    5 * 60
}

fn default_corrections_secs() -> u64 {
    2 * 60
}

fn default_model_secs() -> u64 {
    10 * 60
}

fn default_status_secs() -> u64 {
    30
}
