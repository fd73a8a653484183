//! Error types for the client crate.

use reqwest::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by backend calls.
///
/// Cloneable so one failed fetch can be reported to every caller waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The backend answered 401. The stored token has already been cleared.
    #[error("authentication required")]
    Unauthorized,

    /// The backend answered with another non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The request never got a response.
    #[error("transport error: {0}")]
    Transport(#[source] Arc<reqwest::Error>),

    /// The response body did not have the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The request was refused before being sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// HTTP status of the failure, when the backend answered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend `detail` message if the error body is a JSON error object.
    pub fn detail(&self) -> Option<String> {
        let ApiError::Status { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        value
            .get("detail")
            .or_else(|| value.get("message"))
            .or_else(|| value.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(Arc::new(err))
        }
    }
}
