//! Upload configuration.

use serde::{Deserialize, Serialize};

/// Rules applied to files before they are sent to the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted file, in bytes. The backend refuses anything bigger.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Accepted image extensions (lowercase, without the dot). PDF is always accepted.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            image_extensions: default_image_extensions(),
        }
    }
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_image_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "gif", "bmp", "tiff"]
        .into_iter()
        .map(String::from)
        .collect()
}
