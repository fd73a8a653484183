//! Route definitions for the dashboard.

use crate::{auth, handlers, state::AppState};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Files accepted in one upload form submission, for sizing the body limit.
const MAX_FILES_PER_UPLOAD: u64 = 16;

/// Create the dashboard router.
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state
        .accept_policy()
        .max_file_bytes()
        .saturating_mul(MAX_FILES_PER_UPLOAD);
    let upload_limit = usize::try_from(upload_limit).unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(handlers::home))
        .route("/gallery", get(handlers::gallery))
        .route("/documents/{id}", get(handlers::document_detail))
        .route("/documents/{id}/process", post(handlers::process_document))
        .route(
            "/documents/{id}/delete",
            get(handlers::delete_document_get).post(handlers::delete_document_post),
        )
        .route("/documents/{id}/corrections", post(handlers::create_correction))
        .route("/corrections/{id}", post(handlers::update_correction))
        .route("/ai/train", post(handlers::train_model))
        .route(
            "/uploads",
            post(handlers::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/uploads/{id}/dismiss", post(handlers::dismiss_upload))
        .route("/fragments/documents", get(handlers::documents_fragment))
        .route("/fragments/statistics", get(handlers::statistics_fragment))
        .route("/fragments/uploads", get(handlers::uploads_fragment))
        .route("/fragments/ai", get(handlers::ai_fragment))
        .route("/healthz", get(handlers::healthz))
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", get(auth::logout))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(state.clone(), auth::require_token)),
        )
        .with_state(state)
}
