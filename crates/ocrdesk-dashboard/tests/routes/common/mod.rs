//! Fake OCR backend plus a dashboard router wired to it.

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ocrdesk_client::{ApiClient, CachePolicy, Queries, TokenStore};
use ocrdesk_core::{ApiConfig, OcrdeskConfig};
use ocrdesk_dashboard::{AppState, create_router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const GOOD_TOKEN: &str = "good-token";

#[derive(Default)]
pub struct Backend {
    hits: Mutex<HashMap<String, usize>>,
    documents: Mutex<Vec<Value>>,
    pub descriptions: Mutex<Vec<String>>,
}

impl Backend {
    pub fn hits(&self, route: &str) -> usize {
        self.hits.lock().unwrap().get(route).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    pub fn seed_documents(&self, count: usize) {
        let mut docs = self.documents.lock().unwrap();
        for n in 1..=count {
            docs.push(document(n, &format!("scan-{n}.png")));
        }
    }
}

fn document(id: usize, filename: &str) -> Value {
    json!({
        "id": id,
        "filename": filename,
        "status": "uploaded",
        "file_size": 2048,
        "created_at": "2024-01-15T14:30:00",
        "upload_date": "2024-01-15T14:30:00"
    })
}

pub struct Harness {
    pub backend: Arc<Backend>,
    pub state: AppState,
    pub router: Router,
    pub tokens: TokenStore,
}

impl Harness {
    /// Dashboard with a logged-in operator.
    pub async fn start() -> Self {
        Self::with_token(Some(GOOD_TOKEN)).await
    }

    pub async fn with_token(token: Option<&str>) -> Self {
        let backend = Arc::new(Backend::default());
        let app = backend_router(backend.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let tokens = TokenStore::in_memory();
        if let Some(token) = token {
            tokens.set(token).unwrap();
        }
        let api = ApiConfig {
            base_url: format!("http://{addr}"),
            timeout_secs: 5,
        };
        let mut config = OcrdeskConfig::default();
        config.api = api.clone();
        let client = ApiClient::new(&api, tokens.clone()).unwrap();
        let state = AppState::new(config, Queries::new(client, CachePolicy::default()));
        let router = create_router(state.clone());

        Self {
            backend,
            state,
            router,
            tokens,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, htmx: bool) -> (StatusCode, axum::http::HeaderMap, String) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if htmx {
            builder = builder.header("hx-request", "true");
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }
}

/// One-part multipart body for the upload form.
pub fn multipart_file(file_name: &str, content_type: &str, contents: &[u8]) -> (String, Vec<u8>) {
    let boundary = "ocrdesk-test-boundary";
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

fn backend_router(state: Arc<Backend>) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "healthy"})) }))
        .route("/statistics", get(statistics))
        .route("/ai/status", get(|| async { Json(json!({"status": "active", "accuracy": 0.9})) }))
        .route("/ai/model", get(ai_model))
        .route("/documents", get(list_documents))
        .route("/documents/upload", post(upload))
        .route("/documents/{id}", get(get_document).delete(delete_document))
        .route("/documents/{id}/corrections", get(|| async { Json(json!([])) }))
        .layer(middleware::from_fn_with_state(state.clone(), record_and_authorize))
        .with_state(state)
}

async fn record_and_authorize(State(state): State<Arc<Backend>>, req: Request, next: Next) -> Response {
    let route = format!("{} {}", req.method(), req.uri().path());
    *state.hits.lock().unwrap().entry(route).or_default() += 1;

    let expected = format!("Bearer {GOOD_TOKEN}");
    let authorization = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    if req.uri().path() != "/health" && authorization != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"}))).into_response();
    }
    next.run(req).await
}

async fn statistics(State(state): State<Arc<Backend>>) -> Json<Value> {
    Json(json!({
        "total_documents": state.documents.lock().unwrap().len(),
        "processed_documents": 0,
        "average_confidence": 0.875,
        "total_corrections": 3,
        "documents_today": 1,
        "ai_accuracy": 0.91
    }))
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

#[derive(Deserialize)]
struct ListParams {
    page: usize,
    limit: usize,
}

async fn list_documents(State(state): State<Arc<Backend>>, Query(params): Query<ListParams>) -> Json<Value> {
    let docs = state.documents.lock().unwrap().clone();
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

async fn delete_document(State(state): State<Arc<Backend>>, Path(id): Path<String>) -> Json<Value> {
    state.documents.lock().unwrap().retain(|d| d["id"].to_string() != id);
    Json(json!({"message": "Documento excluído"}))
}

async fn upload(State(state): State<Arc<Backend>>, mut multipart: Multipart) -> Json<Value> {
    let mut file_name = String::from("unnamed");
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().unwrap_or("unnamed").to_string();
                field.bytes().await.unwrap();
            }
            Some("description") => {
                let text = field.text().await.unwrap();
                state.descriptions.lock().unwrap().push(text);
            }
            _ => {}
        }
    }
    let mut docs = state.documents.lock().unwrap();
    let doc = document(docs.len() + 1, &file_name);
    docs.push(doc.clone());
    Json(doc)
}
