//! Dashboard configuration.
//!
//! This module defines configuration for the dashboard web UI.

use serde::{Deserialize, Serialize};

/// Configuration for the dashboard web server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Host to bind the dashboard to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Documents per page in the paginated list.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Documents fetched by the gallery view.
    #[serde(default = "default_gallery_limit")]
    pub gallery_limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            page_size: default_page_size(),
            gallery_limit: default_gallery_limit(),
        }
    }
}

impl DashboardConfig {
    /// Socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_page_size() -> u32 {
    10
}

fn default_gallery_limit() -> u32 {
    100
}
