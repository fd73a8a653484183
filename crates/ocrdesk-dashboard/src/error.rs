//! Error types for the dashboard crate.

use crate::templates::html_escape;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use ocrdesk_client::ApiError;
use thiserror::Error;

/// Header that makes HTMX navigate the whole page instead of swapping.
pub const HX_REDIRECT: &str = "hx-redirect";

/// Errors that can occur in the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Failed to start the server.
    #[error("failed to start dashboard: {0}")]
    StartupFailed(String),

    /// No usable API token.
    #[error("authentication required")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DashboardError {
    fn status(&self) -> StatusCode {
        match self {
            DashboardError::Unauthorized => StatusCode::UNAUTHORIZED,
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DashboardError::Api(ApiError::Unauthorized) => StatusCode::UNAUTHORIZED,
            DashboardError::Api(ApiError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            DashboardError::Api(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the operator.
    fn user_message(&self) -> String {
        match self {
            DashboardError::NotFound(what) => format!("Não encontrado: {}", html_escape(what)),
            DashboardError::InvalidRequest(why) => format!("Requisição inválida: {}", html_escape(why)),
            DashboardError::Api(e) if e.is_not_found() => "Recurso não encontrado.".to_string(),
            DashboardError::Api(e) => match e.detail() {
                Some(detail) => format!("Erro do servidor: {}", html_escape(&detail)),
                None => "Erro ao comunicar com o servidor. Tente novamente.".to_string(),
            },
            _ => "Erro interno. Tente novamente.".to_string(),
        }
    }
}

/// Response that sends the browser to the login page.
///
/// Full page loads follow the meta refresh; HTMX requests follow `HX-Redirect`.
pub fn login_redirect() -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        Html(
            r#"<!DOCTYPE html><html><head><meta http-equiv="refresh" content="0; url=/login"></head><body><a href="/login">Entrar</a></body></html>"#,
        ),
    )
        .into_response();
    response
        .headers_mut()
        .insert(HX_REDIRECT, HeaderValue::from_static("/login"));
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::info!("Backend requires authentication, redirecting to login");
            return login_redirect();
        }

        if status.is_server_error() {
            tracing::warn!(error = %self, "Dashboard request failed");
        } else {
            tracing::debug!(error = %self, "Dashboard request rejected");
        }
        (status, Html(crate::templates::error_block(&self.user_message()))).into_response()
    }
}
