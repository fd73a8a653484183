//! In-process fake of the OCR backend.
//!
//! Serves the subset of the REST API the client calls, on an ephemeral
//! port, and records every request so tests can count backend hits.

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use ocrdesk_client::{ApiClient, CachePolicy, Queries, TokenStore};
use ocrdesk_core::ApiConfig;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const GOOD_TOKEN: &str = "good-token";

/// A file part as received by the upload endpoint.
#[derive(Debug, Clone, Default)]
pub struct ReceivedUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
    pub description: Option<String>,
}

#[derive(Default)]
pub struct Backend {
    hits: Mutex<HashMap<String, usize>>,
    documents: Mutex<Vec<Value>>,
    pub last_authorization: Mutex<Option<String>>,
    pub uploads: Mutex<Vec<ReceivedUpload>>,
    pub corrections: Mutex<Vec<Value>>,
    /// Answer `GET /documents` with a bare array instead of a page envelope.
    pub bare_list: AtomicBool,
    pub fail_deletes: AtomicBool,
}

impl Backend {
    pub fn hits(&self, route: &str) -> usize {
        self.hits.lock().unwrap().get(route).copied().unwrap_or(0)
    }

    pub fn seed_documents(&self, count: usize) {
        let mut docs = self.documents.lock().unwrap();
        for n in 1..=count {
            docs.push(document(n, &format!("scan-{n}.png")));
        }
    }

    fn next_id(&self) -> usize {
        self.documents.lock().unwrap().len() + 1
    }
}

pub fn document(id: usize, filename: &str) -> Value {
    json!({
        "id": id,
        "filename": filename,
        "status": "uploaded",
        "file_size": 2048,
        "file_type": "image/png",
        "created_at": "2024-01-15T14:30:00"
    })
}

pub struct TestBackend {
    pub state: Arc<Backend>,
    pub base_url: String,
}

impl TestBackend {
    pub async fn start() -> Self {
        let state = Arc::new(Backend::default());
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            state,
            base_url: format!("http://{addr}"),
        }
    }

    pub fn config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            timeout_secs: 5,
        }
    }

    pub fn client(&self, tokens: TokenStore) -> ApiClient {
        ApiClient::new(&self.config(), tokens).unwrap()
    }

    /// Logged-in client wrapped in a fresh query cache.
    pub fn queries(&self) -> Queries {
        let tokens = TokenStore::in_memory();
        tokens.set(GOOD_TOKEN).unwrap();
        Queries::new(self.client(tokens), CachePolicy::default())
    }
}

fn router(state: Arc<Backend>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/statistics", get(statistics))
        .route("/ai/status", get(ai_status))
        .route("/ai/model", get(ai_model))
        .route("/ai/train", post(train))
        .route(
            "/documents/{id}/corrections",
            get(list_corrections).post(create_correction),
        )
        .route("/corrections/{id}", put(update_correction))
        .route("/documents", get(list_documents))
        .route("/documents/upload", post(upload))
        .route("/documents/{id}", get(get_document).delete(delete_document))
        .route("/documents/{id}/process", post(process_document))
        .layer(middleware::from_fn_with_state(state.clone(), record_and_authorize))
        .with_state(state)
}

async fn record_and_authorize(State(state): State<Arc<Backend>>, req: Request, next: Next) -> Response {
    let route = format!("{} {}", req.method(), req.uri().path());
    *state.hits.lock().unwrap().entry(route).or_default() += 1;

    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *state.last_authorization.lock().unwrap() = authorization.clone();

    let expected = format!("Bearer {GOOD_TOKEN}");
    if req.uri().path() != "/health" && authorization.as_deref() != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"}))).into_response();
    }
    next.run(req).await
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "version": "1.0"}))
}

async fn statistics(State(state): State<Arc<Backend>>) -> Json<Value> {
    let total = state.documents.lock().unwrap().len();
    Json(json!({
        "total_documents": total,
        "processed_documents": 0,
        "average_confidence": 0.875,
        "total_corrections": 3,
        "documents_today": 1,
        "ai_accuracy": 0.91
    }))
}

async fn ai_status() -> Json<Value> {
    Json(json!({"status": "active", "accuracy": 0.9}))
}

async fn ai_model() -> Json<Value> {
    Json(json!({
        "id": "m1",
        "name": "corretor-pt",
        "version": "1.2.0",
        "status": "active",
        "accuracy": 0.93,
        "last_trained": "2024-01-10T08:00:00",
        "training_data_size": 1200
    }))
}

async fn train() -> Json<Value> {
    Json(json!({"message": "Treinamento iniciado"}))
}

pub fn ai_correction(id: &str, document_id: &str) -> Value {
    json!({
        "id": id,
        "document_id": document_id,
        "original_text": "Certidao de nacimento",
        "corrected_text": "Certidão de nascimento",
        "confidence_score": 0.92,
        "corrections": [{
            "id": "e1",
            "original": "nacimento",
            "corrected": "nascimento",
            "confidence": 0.95,
            "type": "spelling",
            "position": {"start": 12, "end": 21}
        }],
        "created_at": "2024-01-15T14:30:00"
    })
}

async fn list_corrections(State(state): State<Arc<Backend>>, Path(id): Path<String>) -> Json<Value> {
    let corrections = state.corrections.lock().unwrap();
    let for_doc: Vec<Value> = corrections
        .iter()
        .filter(|c| c["document_id"] == id.as_str())
        .cloned()
        .collect();
    Json(Value::Array(for_doc))
}

async fn create_correction(State(state): State<Arc<Backend>>, Path(id): Path<String>) -> Json<Value> {
    let mut corrections = state.corrections.lock().unwrap();
    let record = ai_correction(&format!("c{}", corrections.len() + 1), &id);
    corrections.push(record.clone());
    Json(record)
}

async fn update_correction(
    State(state): State<Arc<Backend>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut corrections = state.corrections.lock().unwrap();
    match corrections.iter_mut().find(|c| c["id"] == id.as_str()) {
        Some(record) => {
            record["corrections"] = body["corrections"].clone();
            Json(record.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Correção não encontrada"}))).into_response(),
    }
}

#[derive(Deserialize)]
struct ListParams {
    page: usize,
    limit: usize,
}

async fn list_documents(State(state): State<Arc<Backend>>, Query(params): Query<ListParams>) -> Json<Value> {
    let docs = state.documents.lock().unwrap().clone();
    if state.bare_list.load(Ordering::SeqCst) {
        return Json(Value::Array(docs));
    }
    let total = docs.len();
    let items: Vec<Value> = docs
        .into_iter()
        .skip((params.page - 1) * params.limit)
        .take(params.limit)
        .collect();
    Json(json!({
        "items": items,
        "total": total,
        "page": params.page,
        "per_page": params.limit,
        "total_pages": total.div_ceil(params.limit)
    }))
}

async fn get_document(State(state): State<Arc<Backend>>, Path(id): Path<String>) -> Response {
    let docs = state.documents.lock().unwrap();
    match docs.iter().find(|d| d["id"].to_string() == id) {
        Some(doc) => Json(doc.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Documento não encontrado"}))).into_response(),
    }
}

async fn upload(State(state): State<Arc<Backend>>, mut multipart: Multipart) -> Response {
    let mut received = ReceivedUpload::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                received.file_name = field.file_name().map(str::to_string);
                received.content_type = field.content_type().map(str::to_string);
                received.size = field.bytes().await.unwrap().len();
            }
            Some("description") => received.description = Some(field.text().await.unwrap()),
            _ => {}
        }
    }
    let id = state.next_id();
    let doc = document(id, received.file_name.as_deref().unwrap_or("unnamed"));
    state.documents.lock().unwrap().push(doc.clone());
    state.uploads.lock().unwrap().push(received);
    Json(doc).into_response()
}

async fn delete_document(State(state): State<Arc<Backend>>, Path(id): Path<String>) -> Response {
    if state.fail_deletes.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "falha ao excluir"}))).into_response();
    }
    state.documents.lock().unwrap().retain(|d| d["id"].to_string() != id);
    Json(json!({"message": "Documento excluído"})).into_response()
}

async fn process_document(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"message": "Processamento iniciado", "document_id": id}))
}
