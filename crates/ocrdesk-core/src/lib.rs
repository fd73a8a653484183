//! # ocrdesk-core
//!
//! Types shared across the ocrdesk crates:
//! - Configuration loaded from `ocrdesk.yaml` and the environment
//! - Records mirrored from the OCR backend (documents, corrections, model, statistics)
//! - Display formatting (file sizes, dates, status labels, confidence scales, pagination)
//! - Upload acceptance rules and per-file progress tracking

// Configuration types shared across all ocrdesk crates
pub mod config;

pub mod format;
pub mod model;
pub mod upload;

pub use config::{
    ApiConfig, AuthConfig, CacheConfig, ConfigError, DashboardConfig, OcrdeskConfig, UploadConfig,
};
pub use model::{
    AiCorrection, AiModel, AiStatus, Correction, CorrectionId, CorrectionKind, Document,
    DocumentId, DocumentStatus, HealthStatus, ModelId, ModelStatus, Page, SpanError, Statistics,
    TextSpan, TrainResponse,
};
pub use upload::{AcceptPolicy, Rejection, UploadProgress, UploadStatus};
