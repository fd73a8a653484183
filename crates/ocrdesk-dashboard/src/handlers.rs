//! Request handlers for the dashboard.

use axum::{
    Form, Json,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use ocrdesk_client::queries::keys;
use ocrdesk_client::{ApiError, MutationKind, UploadRequest};
use ocrdesk_core::{CorrectionId, Document, DocumentId, UploadStatus};
use uuid::Uuid;

use crate::api_types::{
    AiFragmentQuery, BackendHealth, CorrectionUpdateBody, DashboardQuery, DeleteForm,
    HealthResponse, PageQuery, Tab,
};
use crate::error::{DashboardError, HX_REDIRECT};
use crate::pages::DOCUMENTS_CHANGED;
use crate::pages::{self, TabContent};
use crate::state::AppState;
use crate::uploads::spawn_upload;

type HandlerResult<T> = Result<T, DashboardError>;

const HX_TRIGGER: &str = "hx-trigger";

/// Keep a component's result, or log the failure and let the component show
/// its error block. A missing token aborts the whole page instead.
fn component<T>(result: Result<T, ApiError>, what: &str) -> HandlerResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_unauthorized() => Err(e.into()),
        Err(e) => {
            tracing::warn!(component = what, error = %e, "Failed to load component data");
            Ok(None)
        }
    }
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Navigate after an action: `HX-Redirect` for HTMX, 303 otherwise.
fn redirect_after(headers: &HeaderMap, to: &str) -> Response {
    if !is_htmx(headers) {
        return Redirect::to(to).into_response();
    }
    match HeaderValue::from_str(to) {
        Ok(value) => {
            let mut response = StatusCode::OK.into_response();
            response.headers_mut().insert(HX_REDIRECT, value);
            response
        }
        Err(_) => Redirect::to("/").into_response(),
    }
}

/// Local path of the page the request came from. Protocol-relative paths
/// (`//host/...`) are not local.
fn referer_path(headers: &HeaderMap) -> Option<String> {
    let uri: Uri = headers.get(header::REFERER)?.to_str().ok()?.parse().ok()?;
    let path = uri.path_and_query()?.as_str();
    (path.starts_with('/') && !path.starts_with("//")).then(|| path.to_string())
}

/// Tell document lists on screen to reload.
fn documents_changed(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(HX_TRIGGER, HeaderValue::from_static(DOCUMENTS_CHANGED));
    response
}

fn document_path(id: &DocumentId) -> String {
    format!("/documents/{}", urlencoding::encode(id.as_str()))
}

// =============================================================================
// Pages
// =============================================================================

/// Handler for the dashboard shell.
pub async fn home(State(state): State<AppState>, Query(query): Query<DashboardQuery>) -> HandlerResult<Html<String>> {
    let tab = Tab::parse(query.tab.as_deref());
    let page = query.page.unwrap_or(1).max(1);
    let queries = state.queries();

    let selected = match query.selected.as_deref().map(DocumentId::from) {
        Some(id) if !id.is_empty() => {
            let doc = component(queries.document(&id).await, "selected document")?;
            if let Some(doc) = &doc {
                tracing::info!(document_id = %doc.id, filename = %doc.filename, "Document selected");
            }
            doc
        }
        _ => None,
    };

    let content = match tab {
        Tab::Overview => {
            let (stats, docs, model, status) = tokio::join!(
                queries.statistics(),
                queries.documents(page, state.page_size()),
                queries.ai_model(),
                queries.ai_status(),
            );
            let stats = component(stats, "statistics")?;
            let docs = component(docs, "documents")?;
            let model = component(model, "ai model")?;
            let status = component(status, "ai status")?;
            TabContent {
                statistics: Some(pages::statistics_fragment(
                    stats.as_deref(),
                    state.config().cache.statistics_refresh().as_secs(),
                )),
                documents: Some(pages::document_list_fragment(docs.as_deref(), page)),
                upload: None,
                ai: Some(pages::ai_fragment(
                    model.as_deref(),
                    status.as_deref(),
                    queries.is_pending(MutationKind::TrainModel),
                    false,
                )),
            }
        }
        Tab::Documents => {
            let docs = component(queries.documents(page, state.page_size()).await, "documents")?;
            TabContent {
                statistics: None,
                documents: Some(pages::document_list_fragment(docs.as_deref(), page)),
                upload: None,
                ai: None,
            }
        }
        Tab::Upload => TabContent {
            statistics: None,
            documents: None,
            upload: Some(pages::upload_panel(state.accept_policy(), &state.uploads().list())),
            ai: None,
        },
    };

    Ok(Html(pages::dashboard_page(tab, selected.as_deref(), content)))
}

/// Handler for the document gallery.
pub async fn gallery(State(state): State<AppState>) -> HandlerResult<Html<String>> {
    let queries = state.queries();
    let docs = component(queries.documents(1, state.gallery_limit()).await, "gallery")?;
    Ok(Html(pages::gallery_page(
        docs.as_deref(),
        queries.client(),
        queries.is_pending(MutationKind::Process),
    )))
}

/// Handler for the document detail page.
pub async fn document_detail(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult<Html<String>> {
    let id = DocumentId::from(id);
    let queries = state.queries();
    let (doc, corrections) = tokio::join!(queries.document(&id), queries.ai_corrections(&id));
    let doc = doc?;
    let corrections = component(corrections, "ai corrections")?;
    Ok(Html(pages::document_detail_page(
        &doc,
        corrections.as_deref().map(Vec::as_slice),
        queries.client(),
        queries.is_pending(MutationKind::CreateCorrection),
    )))
}

// =============================================================================
// Fragments
// =============================================================================

pub async fn documents_fragment(State(state): State<AppState>, Query(query): Query<PageQuery>) -> HandlerResult<Html<String>> {
    let page = query.page();
    let docs = component(state.queries().documents(page, state.page_size()).await, "documents")?;
    Ok(Html(pages::document_list_fragment(docs.as_deref(), page)))
}

pub async fn statistics_fragment(State(state): State<AppState>) -> HandlerResult<Html<String>> {
    let stats = component(state.queries().statistics().await, "statistics")?;
    Ok(Html(pages::statistics_fragment(
        stats.as_deref(),
        state.config().cache.statistics_refresh().as_secs(),
    )))
}

/// Polled while uploads run. Completed entries make document lists reload.
pub async fn uploads_fragment(State(state): State<AppState>) -> Response {
    let entries = state.uploads().list();
    let response = Html(pages::uploads_fragment(&entries)).into_response();
    if entries.iter().any(|e| e.status == UploadStatus::Completed) {
        documents_changed(response)
    } else {
        response
    }
}

pub async fn ai_fragment(State(state): State<AppState>, Query(query): Query<AiFragmentQuery>) -> HandlerResult<Html<String>> {
    let queries = state.queries();
    let pending = queries.is_pending(MutationKind::TrainModel);
    if query.compact {
        let status = component(queries.ai_status().await, "ai status")?;
        return Ok(Html(pages::ai_fragment(None, status.as_deref(), pending, true)));
    }
    let (model, status) = tokio::join!(queries.ai_model(), queries.ai_status());
    let model = component(model, "ai model")?;
    let status = component(status, "ai status")?;
    Ok(Html(pages::ai_fragment(model.as_deref(), status.as_deref(), pending, false)))
}

// =============================================================================
// Actions
// =============================================================================

pub async fn process_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> HandlerResult<Response> {
    let id = DocumentId::from(id);
    state.queries().process_document(&id).await?;
    tracing::info!(document_id = %id, "OCR processing requested");
    let back = referer_path(&headers).unwrap_or_else(|| "/gallery".to_string());
    Ok(documents_changed(redirect_after(&headers, &back)))
}

/// Handler for `GET /documents/{id}/delete`. Only ever shows the confirmation
/// page; deleting takes a POST.
pub async fn delete_document_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Query(form): Query<DeleteForm>,
) -> HandlerResult<Response> {
    let id = DocumentId::from(id);
    if id.is_empty() {
        return Err(DashboardError::InvalidRequest("document id".to_string()));
    }
    let back = delete_back_path(&id, &headers, &form);
    Ok(confirm_delete(&state, &id, &back))
}

/// Handler for `POST /documents/{id}/delete`.
pub async fn delete_document_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<DeleteForm>,
) -> HandlerResult<Response> {
    delete_or_confirm(&state, DocumentId::from(id), &headers, form).await
}

/// Deletes only with `confirmed=true`; anything else gets the confirmation page
/// and no backend call.
async fn delete_or_confirm(
    state: &AppState,
    id: DocumentId,
    headers: &HeaderMap,
    form: DeleteForm,
) -> HandlerResult<Response> {
    if id.is_empty() {
        return Err(DashboardError::InvalidRequest("document id".to_string()));
    }

    let back = delete_back_path(&id, headers, &form);
    if !form.is_confirmed() {
        return Ok(confirm_delete(state, &id, &back));
    }

    state.queries().delete_document(&id).await?;
    tracing::info!(document_id = %id, "Document deleted");
    Ok(documents_changed(redirect_after(headers, &back)))
}

/// Where to go after deleting: the form's `back`, else the referer unless it
/// is the deleted document's own page, else `/`.
fn delete_back_path(id: &DocumentId, headers: &HeaderMap, form: &DeleteForm) -> String {
    let own_page = document_path(id);
    match form.back.as_deref() {
        Some(_) => form.back().to_string(),
        None => referer_path(headers)
            .filter(|p| !p.starts_with(&own_page))
            .unwrap_or_else(|| "/".to_string()),
    }
}

fn confirm_delete(state: &AppState, id: &DocumentId, back: &str) -> Response {
    let cached = state.queries().cache().peek::<Document>(&keys::document(id));
    let filename = cached.as_ref().map(|d| d.filename.as_str());
    Html(pages::confirm_delete_page(id, filename, back)).into_response()
}

pub async fn create_correction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> HandlerResult<Response> {
    let id = DocumentId::from(id);
    let correction = state.queries().create_ai_correction(&id).await?;
    tracing::info!(
        document_id = %id,
        correction_id = %correction.id,
        edits = correction.corrections.len(),
        "AI correction generated"
    );
    Ok(redirect_after(&headers, &document_path(&id)))
}

pub async fn update_correction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CorrectionUpdateBody>,
) -> HandlerResult<Json<ocrdesk_core::AiCorrection>> {
    let id = CorrectionId::from(id);
    let updated = state.queries().update_correction(&id, &body.corrections).await?;
    tracing::info!(correction_id = %id, edits = body.corrections.len(), "Correction updated");
    Ok(Json(updated))
}

pub async fn train_model(State(state): State<AppState>, headers: HeaderMap) -> HandlerResult<Response> {
    let reply = state.queries().train_model().await?;
    tracing::info!(message = %reply.message, "Model training started");
    let back = referer_path(&headers).unwrap_or_else(|| "/".to_string());
    Ok(redirect_after(&headers, &back))
}

// =============================================================================
// Uploads
// =============================================================================

/// Handler for the upload form. Every file part is checked locally, then
/// uploaded in its own background task.
pub async fn upload(State(state): State<AppState>, headers: HeaderMap, mut multipart: Multipart) -> HandlerResult<Response> {
    let bad_body = |e: axum::extract::multipart::MultipartError| DashboardError::InvalidRequest(e.body_text());

    let mut accepted = 0usize;
    while let Some(field) = multipart.next_field().await.map_err(bad_body)? {
        // Browsers send an empty part when no file was picked.
        let Some(file_name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string) else {
            continue;
        };
        let declared = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(bad_body)?;
        let size = bytes.len() as u64;

        match state.accept_policy().check(&file_name, declared.as_deref(), size) {
            Ok(mime) => {
                let id = state.uploads().start(&file_name, size);
                tracing::info!(file = %file_name, size, mime = %mime, "Uploading file");
                let request = UploadRequest::new(file_name.as_str(), mime, bytes.to_vec())
                    .with_description(format!("Uploaded: {file_name}"));
                spawn_upload(state.queries().clone(), state.uploads().clone(), id, request);
                accepted += 1;
            }
            Err(reason) => {
                tracing::info!(file = %file_name, reason = %reason, "File rejected before upload");
                state.uploads().reject(&file_name, size, &reason);
            }
        }
    }

    if !is_htmx(&headers) {
        return Ok(Redirect::to("/?tab=upload").into_response());
    }
    let response = Html(pages::uploads_fragment(&state.uploads().list())).into_response();
    Ok(if accepted > 0 { documents_changed(response) } else { response })
}

pub async fn dismiss_upload(State(state): State<AppState>, Path(id): Path<Uuid>, headers: HeaderMap) -> Response {
    if !state.uploads().dismiss(id) {
        tracing::debug!(upload_id = %id, "Dismissed unknown upload entry");
    }
    if is_htmx(&headers) {
        Html(pages::uploads_fragment(&state.uploads().list())).into_response()
    } else {
        Redirect::to("/?tab=upload").into_response()
    }
}

// =============================================================================
// Health
// =============================================================================

/// Dashboard liveness plus an uncached backend health check.
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let backend = match state.queries().health().await {
        Ok(health) => BackendHealth {
            reachable: true,
            ok: health.is_healthy(),
            status: Some(health.status),
            error: None,
        },
        Err(e) => BackendHealth {
            reachable: false,
            ok: false,
            status: None,
            error: Some(e.to_string()),
        },
    };
    let ok = backend.ok;
    let status = if ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (
        status,
        Json(HealthResponse {
            ok,
            service: "ocrdesk-dashboard",
            backend,
        }),
    )
}
