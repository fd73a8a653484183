//! Request and response payloads of the dashboard routes.

use ocrdesk_core::Correction;
use serde::{Deserialize, Serialize};

/// Tabs of the dashboard shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Documents,
    Upload,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Documents, Tab::Upload];

    /// Parse `?tab=`. Unknown or missing values select the overview.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("documents") => Tab::Documents,
            Some("upload") => Tab::Upload,
            _ => Tab::Overview,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Tab::Overview => "overview",
            Tab::Documents => "documents",
            Tab::Upload => "upload",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Visão Geral",
            Tab::Documents => "Documentos",
            Tab::Upload => "Enviar",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Tab::Overview => "chart-line",
            Tab::Documents => "file-lines",
            Tab::Upload => "upload",
        }
    }
}

/// Query parameters of `GET /`.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub tab: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub selected: Option<String>,
}

/// `?page=` of the document list fragment.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<u32>,
}

impl PageQuery {
    /// 1-based page, clamping 0 to 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// `?compact=` of the AI fragment; the compact form is the navbar indicator.
#[derive(Debug, Default, Deserialize)]
pub struct AiFragmentQuery {
    #[serde(default)]
    pub compact: bool,
}

/// Body of the delete confirmation form.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub confirmed: Option<String>,
    /// Where to go after deletion.
    #[serde(default)]
    pub back: Option<String>,
}

impl DeleteForm {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed.as_deref() == Some("true")
    }

    /// Local path to return to. Anything that is not a local path falls back to `/`.
    pub fn back(&self) -> &str {
        match self.back.as_deref() {
            Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
            _ => "/",
        }
    }
}

/// Body of `POST /corrections/{id}`.
#[derive(Debug, Deserialize)]
pub struct CorrectionUpdateBody {
    pub corrections: Vec<Correction>,
}

/// Reply of `GET /healthz`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub backend: BackendHealth,
}

#[derive(Debug, Serialize)]
pub struct BackendHealth {
    pub reachable: bool,
    /// Reachable and reporting itself healthy.
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub token: String,
}

/// Login page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub error: Option<String>,
}
