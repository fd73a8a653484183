//! # ocrdesk-client
//!
//! Access to the OCR backend REST API.
//!
//! - [`ApiClient`]: one method per backend endpoint, bearer auth from a shared
//!   [`TokenStore`], and uniform handling of authentication failures
//! - [`QueryCache`]: keyed result cache with staleness windows, in-flight
//!   deduplication and prefix invalidation
//! - [`Queries`]: the read and write operations the dashboard uses, each with
//!   its cache key, staleness window and invalidation rule
//! - [`refresh`]: background tasks that keep frequently polled keys warm

pub mod cache;
pub mod client;
pub mod error;
pub mod queries;
pub mod refresh;
pub mod token;

pub use cache::{QueryCache, QueryKey};
pub use client::{ApiClient, AssetKind, UploadRequest};
pub use error::ApiError;
pub use queries::{CachePolicy, MutationKind, Queries};
pub use refresh::{RefreshIntervals, Refreshers, spawn_refreshers};
pub use token::TokenStore;
