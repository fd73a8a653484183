//! Records mirrored from the OCR backend.
//!
//! Nothing here is computed by the dashboard. The types only pin down the wire
//! shape so that handlers and pages work with typed data instead of raw JSON.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Identifiers
// =============================================================================

/// The backend emits integer ids while the API contract types them as strings,
/// so ids accept both on the way in and are kept as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the id is usable for a request. Queries keyed by an
            /// empty id are disabled.
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of an uploaded document.
    DocumentId
);
string_id!(
    /// Identifier of an AI correction record or of a single edit inside it.
    CorrectionId
);
string_id!(
    /// Identifier of an AI model.
    ModelId
);

// =============================================================================
// Documents
// =============================================================================

/// Processing status of a document.
///
/// Values outside the four known ones are kept verbatim in `Unknown`
/// so they can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Completed,
    Error,
    Unknown(String),
}

impl DocumentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentStatus::Uploaded => "uploaded",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Error => "error",
            DocumentStatus::Unknown(raw) => raw,
        }
    }

    /// Whether OCR processing may be (re)triggered from the UI.
    pub fn is_processable(&self) -> bool {
        matches!(self, DocumentStatus::Uploaded | DocumentStatus::Error)
    }
}

impl From<String> for DocumentStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "uploaded" => DocumentStatus::Uploaded,
            "processing" => DocumentStatus::Processing,
            "completed" => DocumentStatus::Completed,
            "error" => DocumentStatus::Error,
            _ => DocumentStatus::Unknown(raw),
        }
    }
}

impl From<DocumentStatus> for String {
    fn from(status: DocumentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded document and whatever the backend extracted from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_text: Option<String>,
    /// Either a 0-1 fraction or a 0-100 percentage depending on the producer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl Document {
    /// Creation timestamp, falling back to the upload date.
    pub fn created_or_uploaded(&self) -> Option<&str> {
        self.created_at.as_deref().or(self.upload_date.as_deref())
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Cut one page out of a complete listing.
    ///
    /// `page` is 1-based. A page past the end is empty but keeps the totals.
    pub fn paginate(all: Vec<T>, page: u32, per_page: u32) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total = all.len() as u64;
        let total_pages = total.div_ceil(u64::from(per_page)) as u32;
        let start = (page as usize - 1).saturating_mul(per_page as usize);
        let items = all
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();
        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// AI corrections
// =============================================================================

/// Category of a single correction edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionKind {
    Spelling,
    Grammar,
    Context,
    Format,
}

impl CorrectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CorrectionKind::Spelling => "spelling",
            CorrectionKind::Grammar => "grammar",
            CorrectionKind::Context => "context",
            CorrectionKind::Format => "format",
        }
    }

    /// Portuguese label shown in the corrections table.
    pub fn label(self) -> &'static str {
        match self {
            CorrectionKind::Spelling => "Ortografia",
            CorrectionKind::Grammar => "Gramática",
            CorrectionKind::Context => "Contexto",
            CorrectionKind::Format => "Formatação",
        }
    }
}

/// Errors raised when a text span does not fit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanError {
    #[error("span start {start} is after end {end}")]
    Inverted { start: usize, end: usize },

    #[error("span end {end} exceeds text length {len}")]
    OutOfBounds { end: usize, len: usize },
}

#[derive(Deserialize)]
struct RawSpan {
    start: usize,
    end: usize,
}

/// Half-open character range `[start, end)` in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSpan")]
pub struct TextSpan {
    start: usize,
    end: usize,
}

impl TryFrom<RawSpan> for TextSpan {
    type Error = SpanError;

    fn try_from(raw: RawSpan) -> Result<Self, Self::Error> {
        TextSpan::new(raw.start, raw.end)
    }
}

impl TextSpan {
    pub fn new(start: usize, end: usize) -> Result<Self, SpanError> {
        if start > end {
            return Err(SpanError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check the span against a text measured in characters.
    pub fn check_within(&self, text: &str) -> Result<(), SpanError> {
        let len = text.chars().count();
        if self.end > len {
            return Err(SpanError::OutOfBounds { end: self.end, len });
        }
        Ok(())
    }

    /// The spanned characters of `text`, if the span fits.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.check_within(text).ok()?;
        let mut indices = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()));
        let start = indices.nth(self.start)?;
        let end = if self.is_empty() {
            start
        } else {
            indices.nth(self.len() - 1)?
        };
        text.get(start..end)
    }
}

/// A single edit suggested by the AI model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub id: CorrectionId,
    pub original: String,
    pub corrected: String,
    pub confidence: f64,
    #[serde(rename = "type")]
    pub kind: CorrectionKind,
    pub position: TextSpan,
}

impl Correction {
    /// Check that the edit's span lies inside the text it corrects.
    pub fn validate_against(&self, text: &str) -> Result<(), SpanError> {
        self.position.check_within(text)
    }
}

/// AI correction pass over one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiCorrection {
    pub id: CorrectionId,
    pub document_id: DocumentId,
    pub original_text: String,
    pub corrected_text: String,
    pub confidence_score: f64,
    #[serde(default)]
    pub corrections: Vec<Correction>,
    pub created_at: String,
}

impl AiCorrection {
    /// Edits whose span does not fit the original text.
    pub fn invalid_edits(&self) -> Vec<(&Correction, SpanError)> {
        self.corrections
            .iter()
            .filter_map(|c| c.validate_against(&self.original_text).err().map(|e| (c, e)))
            .collect()
    }
}

// =============================================================================
// AI model
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Active,
    Training,
    Inactive,
}

impl ModelStatus {
    pub fn label(self) -> &'static str {
        match self {
            ModelStatus::Active => "Ativo",
            ModelStatus::Training => "Treinando",
            ModelStatus::Inactive => "Inativo",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ModelStatus::Active => "green",
            ModelStatus::Training => "yellow",
            ModelStatus::Inactive => "gray",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiModel {
    pub id: ModelId,
    pub name: String,
    pub version: String,
    pub status: ModelStatus,
    pub accuracy: f64,
    pub last_trained: String,
    pub training_data_size: u64,
}

/// Live AI status, polled frequently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiStatus {
    pub status: String,
    pub accuracy: f64,
}

/// Reply to a training trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainResponse {
    pub message: String,
}

// =============================================================================
// Statistics and health
// =============================================================================

/// Aggregates recomputed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_documents: u64,
    pub processed_documents: u64,
    /// 0-1 fraction.
    pub average_confidence: f64,
    pub total_corrections: u64,
    pub documents_today: u64,
    /// 0-1 fraction.
    pub ai_accuracy: f64,
}

/// Reply of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "healthy" | "ok")
    }
}
