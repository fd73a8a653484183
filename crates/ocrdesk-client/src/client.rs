//! HTTP client for the OCR backend.
//!
//! Every call goes through [`ApiClient::send`], which attaches the bearer token
//! and applies the same failure policy to all endpoints:
//! - 401: the token store is cleared and [`ApiError::Unauthorized`] is returned
//! - any other non-2xx: [`ApiError::Status`] with the response body
//! - no response: [`ApiError::Transport`]
//!
//! Nothing is retried.

use crate::error::ApiError;
use crate::token::TokenStore;
use ocrdesk_core::{
    AiCorrection, AiModel, AiStatus, ApiConfig, Correction, CorrectionId, Document, DocumentId,
    HealthStatus, Page, Statistics, TrainResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Size of the pieces an upload body is streamed in. Progress is reported per piece.
const UPLOAD_CHUNK: usize = 64 * 1024;

/// Static files served next to the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// The file as uploaded.
    Original,
    /// The image after OCR preprocessing.
    Preprocessed,
}

impl AssetKind {
    fn prefix(self) -> &'static str {
        match self {
            AssetKind::Original => "uploads",
            AssetKind::Preprocessed => "preprocessed-images",
        }
    }
}

/// A file to upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub description: Option<String>,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// `GET /documents` answers with a page envelope. Older backends answer
/// with a bare array, which is paginated locally.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Envelope(Page<T>),
    Bare(Vec<T>),
}

#[derive(Serialize)]
struct CorrectionUpdate<'a> {
    corrections: &'a [Correction],
}

/// Client for the backend REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    tokens: TokenStore,
}

impl ApiClient {
    /// Create a client for the configured backend sharing `tokens`.
    pub fn new(config: &ApiConfig, tokens: TokenStore) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ApiError::from)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token store consulted on every request.
    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Public URL of a static file stored by the backend.
    pub fn asset_url(&self, kind: AssetKind, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            kind.prefix(),
            urlencoding::encode(filename)
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, self.url(path));
        match self.tokens.get() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send a request and apply the shared failure policy.
    async fn send(&self, req: RequestBuilder, method: &Method, path: &str) -> Result<Response, ApiError> {
        tracing::debug!(%method, path, "Calling backend");

        let response = req.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Backend unreachable");
            ApiError::Transport(Arc::new(e))
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(%method, path, "Backend rejected credentials, clearing stored token");
            if let Err(e) = self.tokens.clear() {
                tracing::warn!(error = %e, "Failed to remove persisted token");
            }
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(%method, path, %status, error = %e, "Failed to read error body");
                    String::new()
                }
            };
            tracing::warn!(%method, path, %status, "Backend returned an error");
            return Err(ApiError::Status { status, body });
        }
        Ok(response)
    }

    async fn call(&self, method: Method, path: &str) -> Result<Response, ApiError> {
        let req = self.request(method.clone(), path);
        self.send(req, &method, path).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        Self::decode(self.call(Method::GET, "/health").await?).await
    }

    // -------------------------------------------------------------------------
    // Documents
    // -------------------------------------------------------------------------

    /// One page of documents. `page` is 1-based.
    pub async fn list_documents(&self, page: u32, limit: u32) -> Result<Page<Document>, ApiError> {
        let path = format!("/documents?page={page}&limit={limit}");
        let body: ListBody<Document> = Self::decode(self.call(Method::GET, &path).await?).await?;
        Ok(match body {
            ListBody::Envelope(page) => page,
            ListBody::Bare(all) => Page::paginate(all, page, limit),
        })
    }

    pub async fn get_document(&self, id: &DocumentId) -> Result<Document, ApiError> {
        let path = format!("/documents/{}", urlencoding::encode(id.as_str()));
        Self::decode(self.call(Method::GET, &path).await?).await
    }

    pub async fn upload_document(&self, upload: UploadRequest) -> Result<Document, ApiError> {
        self.upload_with_progress(upload, |_| {}).await
    }

    /// Upload a file, reporting the share of the body handed to the
    /// transport as a whole percentage.
    pub async fn upload_with_progress<F>(
        &self,
        upload: UploadRequest,
        on_progress: F,
    ) -> Result<Document, ApiError>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        let UploadRequest {
            file_name,
            mime_type,
            bytes,
            description,
        } = upload;

        let total = bytes.len() as u64;
        let chunks: Vec<Vec<u8>> = bytes.chunks(UPLOAD_CHUNK).map(<[u8]>::to_vec).collect();
        let mut sent: u64 = 0;
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            on_progress(percent(sent, total));
            Ok::<_, std::io::Error>(chunk)
        }));

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file_name.clone())
            .mime_str(&mime_type)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid mime type '{mime_type}': {e}")))?;

        let mut form = Form::new().part("file", part);
        if let Some(description) = description {
            form = form.text("description", description);
        }

        let path = "/documents/upload";
        let req = self.request(Method::POST, path).multipart(form);
        tracing::info!(file = %file_name, bytes = total, "Uploading document");
        Self::decode(self.send(req, &Method::POST, path).await?).await
    }

    pub async fn delete_document(&self, id: &DocumentId) -> Result<(), ApiError> {
        let path = format!("/documents/{}", urlencoding::encode(id.as_str()));
        self.call(Method::DELETE, &path).await?;
        Ok(())
    }

    /// Trigger OCR processing. The reply shape is backend-defined.
    pub async fn process_document(&self, id: &DocumentId) -> Result<serde_json::Value, ApiError> {
        let path = format!("/documents/{}/process", urlencoding::encode(id.as_str()));
        let response = self.call(Method::POST, &path).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    // -------------------------------------------------------------------------
    // AI corrections
    // -------------------------------------------------------------------------

    pub async fn list_ai_corrections(&self, document_id: &DocumentId) -> Result<Vec<AiCorrection>, ApiError> {
        let path = format!("/documents/{}/corrections", urlencoding::encode(document_id.as_str()));
        Self::decode(self.call(Method::GET, &path).await?).await
    }

    pub async fn create_ai_correction(&self, document_id: &DocumentId) -> Result<AiCorrection, ApiError> {
        let path = format!("/documents/{}/corrections", urlencoding::encode(document_id.as_str()));
        Self::decode(self.call(Method::POST, &path).await?).await
    }

    /// Replace the edit list of a correction record.
    pub async fn update_correction(
        &self,
        correction_id: &CorrectionId,
        corrections: &[Correction],
    ) -> Result<AiCorrection, ApiError> {
        let path = format!("/corrections/{}", urlencoding::encode(correction_id.as_str()));
        let req = self
            .request(Method::PUT, &path)
            .json(&CorrectionUpdate { corrections });
        Self::decode(self.send(req, &Method::PUT, &path).await?).await
    }

    // -------------------------------------------------------------------------
    // AI model
    // -------------------------------------------------------------------------

    pub async fn get_ai_model(&self) -> Result<AiModel, ApiError> {
        Self::decode(self.call(Method::GET, "/ai/model").await?).await
    }

    pub async fn train_ai_model(&self) -> Result<TrainResponse, ApiError> {
        Self::decode(self.call(Method::POST, "/ai/train").await?).await
    }

    pub async fn get_ai_status(&self) -> Result<AiStatus, ApiError> {
        Self::decode(self.call(Method::GET, "/ai/status").await?).await
    }

    // -------------------------------------------------------------------------
    // Statistics
    // -------------------------------------------------------------------------

    pub async fn get_statistics(&self) -> Result<Statistics, ApiError> {
        Self::decode(self.call(Method::GET, "/statistics").await?).await
    }
}

fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent * 100 + total / 2) / total).min(100) as u8
}
