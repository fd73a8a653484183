//! Upload acceptance rules and per-file progress entries.

use crate::config::UploadConfig;
use crate::format::format_file_size;
use crate::model::DocumentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a file was refused before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("tipo de arquivo não suportado: {0}")]
    UnsupportedType(String),

    #[error("arquivo muito grande ({size}), limite de {limit}")]
    TooLarge { size: String, limit: String },

    #[error("arquivo vazio")]
    Empty,
}

/// Decides which files the upload form accepts.
///
/// A file is accepted when its mime type is `image/*` or `application/pdf`,
/// or when its extension is one of the configured image extensions or `pdf`.
#[derive(Debug, Clone)]
pub struct AcceptPolicy {
    image_extensions: Vec<String>,
    max_file_bytes: u64,
}

impl AcceptPolicy {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            image_extensions: config
                .image_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            max_file_bytes: config.max_file_bytes,
        }
    }

    /// Value for the file input's `accept` attribute.
    pub fn accept_attribute(&self) -> String {
        let mut parts = vec!["image/*".to_string(), "application/pdf".to_string()];
        parts.extend(self.image_extensions.iter().map(|e| format!(".{e}")));
        parts.push(".pdf".to_string());
        parts.join(",")
    }

    /// Upper-case extension list for the drop zone hint.
    pub fn supported_hint(&self) -> String {
        let mut names: Vec<String> = self
            .image_extensions
            .iter()
            .map(|e| e.to_ascii_uppercase())
            .collect();
        names.push("PDF".to_string());
        names.join(", ")
    }

    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Mime type to send for a file, preferring what the browser declared.
    pub fn effective_mime(file_name: &str, declared: Option<&str>) -> String {
        match declared {
            Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => {
                mime.to_ascii_lowercase()
            }
            _ => mime_guess::from_path(file_name)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        }
    }

    /// Check type and size. Returns the mime type to upload with.
    pub fn check(
        &self,
        file_name: &str,
        declared_mime: Option<&str>,
        size: u64,
    ) -> Result<String, Rejection> {
        let mime = Self::effective_mime(file_name, declared_mime);
        if !self.accepts_type(file_name, &mime) {
            return Err(Rejection::UnsupportedType(file_name.to_string()));
        }
        if size == 0 {
            return Err(Rejection::Empty);
        }
        if size > self.max_file_bytes {
            return Err(Rejection::TooLarge {
                size: format_file_size(size),
                limit: format_file_size(self.max_file_bytes),
            });
        }
        Ok(mime)
    }

    fn accepts_type(&self, file_name: &str, mime: &str) -> bool {
        if mime.starts_with("image/") || mime == "application/pdf" {
            return true;
        }
        let Some(ext) = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
        else {
            return false;
        };
        ext == "pdf" || self.image_extensions.contains(&ext)
    }
}

impl Default for AcceptPolicy {
    fn default() -> Self {
        Self::new(&UploadConfig::default())
    }
}

/// State of one tracked upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    Processing,
    Completed,
    Error,
}

impl UploadStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, UploadStatus::Completed | UploadStatus::Error)
    }
}

/// Progress of one file sent from the upload form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub id: Uuid,
    pub file_name: String,
    pub file_size: u64,
    /// 0 to 100.
    pub progress: u8,
    pub status: UploadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<DocumentId>,
}

impl UploadProgress {
    /// New entry in the uploading state.
    pub fn started(file_name: impl Into<String>, file_size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            file_size,
            progress: 0,
            status: UploadStatus::Uploading,
            error: None,
            document_id: None,
        }
    }

    /// Entry for a file refused before upload.
    pub fn rejected(file_name: impl Into<String>, file_size: u64, reason: &Rejection) -> Self {
        let mut entry = Self::started(file_name, file_size);
        entry.fail(reason.to_string());
        entry
    }

    /// Record transfer progress. Finished entries are left alone.
    pub fn advance(&mut self, percent: u8) {
        if self.status == UploadStatus::Uploading {
            self.progress = percent.min(100).max(self.progress);
            if self.progress == 100 {
                self.status = UploadStatus::Processing;
            }
        }
    }

    pub fn complete(&mut self, document_id: DocumentId) {
        self.status = UploadStatus::Completed;
        self.progress = 100;
        self.document_id = Some(document_id);
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = UploadStatus::Error;
        self.error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_images_and_pdfs() {
        let policy = AcceptPolicy::default();
        assert_eq!(policy.check("scan.png", Some("image/png"), 10).unwrap(), "image/png");
        assert_eq!(policy.check("scan.TIFF", None, 10).unwrap(), "image/tiff");
        assert_eq!(
            policy.check("record.pdf", Some("application/octet-stream"), 10).unwrap(),
            "application/pdf"
        );
        assert!(policy.check("photo.webp", Some("image/webp"), 10).is_ok());
    }

    #[test]
    fn rejects_other_types() {
        let policy = AcceptPolicy::default();
        assert_eq!(
            policy.check("notes.txt", Some("text/plain"), 10),
            Err(Rejection::UnsupportedType("notes.txt".into()))
        );
        assert!(policy.check("archive", None, 10).is_err());
    }

    #[test]
    fn rejects_oversized_and_empty_files() {
        let policy = AcceptPolicy::default();
        assert!(matches!(
            policy.check("big.png", None, 10 * 1024 * 1024 + 1),
            Err(Rejection::TooLarge { .. })
        ));
        assert_eq!(policy.check("empty.png", None, 0), Err(Rejection::Empty));
    }

    #[test]
    fn accept_attribute_lists_extensions() {
        let policy = AcceptPolicy::default();
        let attr = policy.accept_attribute();
        assert!(attr.starts_with("image/*,application/pdf,.png"));
        assert!(attr.ends_with(".tiff,.pdf"));
        assert_eq!(policy.supported_hint(), "PNG, JPG, JPEG, GIF, BMP, TIFF, PDF");
    }

    #[test]
    fn progress_lifecycle() {
        let mut entry = UploadProgress::started("a.png", 2048);
        entry.advance(40);
        entry.advance(20);
        assert_eq!(entry.progress, 40);
        entry.advance(100);
        assert_eq!(entry.status, UploadStatus::Processing);
        entry.complete("12".into());
        assert_eq!(entry.status, UploadStatus::Completed);
        assert_eq!(entry.progress, 100);
        entry.advance(10);
        assert_eq!(entry.progress, 100);
    }

    #[test]
    fn failure_keeps_message() {
        let mut entry = UploadProgress::started("a.png", 1);
        entry.fail("boom");
        assert!(entry.status.is_finished());
        assert_eq!(entry.error.as_deref(), Some("boom"));
    }
}
