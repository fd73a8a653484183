//! # ocrdesk-dashboard
//!
//! Operator web dashboard for the OCR document backend.
//!
//! This crate provides a server-rendered UI for:
//! - Overview (statistics cards, AI model panel, recent documents)
//! - Paginated document list and image gallery
//! - Multi-file upload with per-file progress
//! - Document detail with AI corrections
//! - Token login against the backend API
//!
//! ## Tech Stack
//!
//! - Axum for HTTP server
//! - HTMX + Alpine.js for interactivity (minimal JS)
//! - Tailwind CSS for styling

pub mod api_types;
pub mod auth;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;
pub mod uploads;

pub use error::DashboardError;
pub use routes::create_router;
pub use server::DashboardServer;
pub use state::AppState;
pub use uploads::UploadTracker;
