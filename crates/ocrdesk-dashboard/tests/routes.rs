//! Dashboard routes end to end, against an in-process fake backend.
//!
//! Run with: cargo test -p ocrdesk-dashboard --test routes

#[path = "routes/common/mod.rs"]
mod common;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use common::{GOOD_TOKEN, Harness, multipart_file};
use ocrdesk_core::UploadStatus;
use std::time::Duration;

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_pages_redirect_to_login_without_token() {
    let harness = Harness::with_token(None).await;

    let (status, headers, body) = harness.get("/").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get("hx-redirect").unwrap(), "/login");
    assert!(body.contains("url=/login"));
    assert_eq!(harness.backend.total_hits(), 0);

    let (status, _, body) = harness.get("/login").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"name="token""#));
}

#[tokio::test]
async fn test_login_stores_token_and_logout_clears_it() {
    let harness = Harness::with_token(None).await;

    let (status, headers, _) = harness
        .post_form("/login", &format!("token={GOOD_TOKEN}"), false)
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/");
    assert_eq!(harness.tokens.get().as_deref(), Some(GOOD_TOKEN));

    let (status, _, _) = harness.get("/?tab=documents").await;
    assert_eq!(status, StatusCode::OK);

    let (status, headers, _) = harness.get("/logout").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/login");
    assert!(!harness.tokens.is_set());
    assert!(harness.state.queries().cache().is_empty());
}

#[tokio::test]
async fn test_empty_token_is_refused() {
    let harness = Harness::with_token(None).await;
    let (status, headers, _) = harness.post_form("/login", "token=+++", false).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/login?error=empty");
    assert!(!harness.tokens.is_set());
}

#[tokio::test]
async fn test_backend_rejection_sends_operator_to_login() {
    let harness = Harness::with_token(Some("expired")).await;

    let (status, headers, _) = harness.get("/fragments/statistics").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get("hx-redirect").unwrap(), "/login");
    assert!(!harness.tokens.is_set());
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn test_unknown_tab_renders_overview() {
    let harness = Harness::start().await;
    harness.backend.seed_documents(2);

    let (status, _, body) = harness.get("/?tab=settings").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Estatísticas Gerais"));
    assert!(body.contains("Total de Documentos"));
    assert!(body.contains("88%"));
    assert!(body.contains("corretor-pt"));
    assert!(body.contains("scan-1.png"));
}

#[tokio::test]
async fn test_selected_document_shows_notice() {
    let harness = Harness::start().await;
    harness.backend.seed_documents(3);

    let (status, _, body) = harness.get("/?tab=documents&selected=2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Documento selecionado: scan-2.png"));
}

#[tokio::test]
async fn test_pagination_only_with_several_pages() {
    let harness = Harness::start().await;
    harness.backend.seed_documents(25);

    let (_, _, body) = harness.get("/fragments/documents?page=3").await;
    assert!(body.contains("Mostrando 21 a 25 de 25 documentos"));
    assert!(body.contains("Página 3 de 3"));

    let small = Harness::start().await;
    small.backend.seed_documents(4);
    let (_, _, body) = small.get("/fragments/documents").await;
    assert!(body.contains("scan-4.png"));
    assert!(!body.contains("Mostrando"));
}

#[tokio::test]
async fn test_empty_gallery() {
    let harness = Harness::start().await;
    let (status, _, body) = harness.get("/gallery").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Nenhum documento encontrado."));
    assert_eq!(harness.backend.hits("GET /documents"), 1);
}

#[tokio::test]
async fn test_missing_document_is_not_found() {
    let harness = Harness::start().await;
    let (status, _, _) = harness.get("/documents/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let harness = Harness::start().await;
    harness.backend.seed_documents(1);

    let (status, _, body) = harness.post_form("/documents/1/delete", "", false).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Tem certeza que deseja excluir este documento?"));
    assert!(body.contains(r#"name="confirmed" value="true""#));

    let (status, _, _) = harness.get("/documents/1/delete?confirmed=yes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.backend.hits("DELETE /documents/1"), 0);
}

#[tokio::test]
async fn test_get_never_deletes() {
    let harness = Harness::start().await;
    harness.backend.seed_documents(1);

    let (status, headers, body) = harness.get("/documents/1/delete?confirmed=true&back=%2Fgallery").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.get("hx-redirect").is_none());
    assert!(body.contains("Tem certeza que deseja excluir este documento?"));
    assert!(body.contains(r#"method="POST" action="/documents/1/delete""#));
    assert_eq!(harness.backend.hits("DELETE /documents/1"), 0);
}

#[tokio::test]
async fn test_confirmed_delete_from_htmx() {
    let harness = Harness::start().await;
    harness.backend.seed_documents(1);

    let (status, headers, _) = harness
        .post_form("/documents/1/delete", "confirmed=true&back=%2Fgallery", true)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("hx-redirect").unwrap(), "/gallery");
    assert_eq!(headers.get("hx-trigger").unwrap(), "documents-changed");
    assert_eq!(harness.backend.hits("DELETE /documents/1"), 1);
}

// =============================================================================
// Uploads
// =============================================================================

async fn post_upload(
    harness: &Harness,
    file_name: &str,
    content_type: &str,
    contents: &[u8],
) -> (StatusCode, HeaderMap, String) {
    let (content_type, body) = multipart_file(file_name, content_type, contents);
    let request = Request::builder()
        .method("POST")
        .uri("/uploads")
        .header(header::CONTENT_TYPE, content_type)
        .header("hx-request", "true")
        .body(Body::from(body))
        .unwrap();
    harness.send(request).await
}

#[tokio::test]
async fn test_unsupported_upload_is_rejected_locally() {
    let harness = Harness::start().await;

    let (status, headers, body) = post_upload(&harness, "notes.exe", "application/x-msdownload", b"MZ").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("notes.exe"));
    assert!(body.contains("tipo de arquivo não suportado"));
    assert!(!body.contains("every 1s"));
    assert!(headers.get("hx-trigger").is_none());

    let entries = harness.state.uploads().list();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].status, UploadStatus::Error);
    assert_eq!(harness.backend.hits("POST /documents/upload"), 0);
}

#[tokio::test]
async fn test_accepted_upload_completes_in_background() {
    let harness = Harness::start().await;

    let (status, headers, _) = post_upload(&harness, "scan.png", "image/png", &[7u8; 4096]).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("hx-trigger").unwrap(), "documents-changed");

    let mut entry = harness.state.uploads().list()[0].clone();
    for _ in 0..100 {
        if entry.status.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        entry = harness.state.uploads().list()[0].clone();
    }
    assert_eq!(entry.status, UploadStatus::Completed);
    assert_eq!(entry.progress, 100);
    assert_eq!(
        harness.backend.descriptions.lock().unwrap().as_slice(),
        ["Uploaded: scan.png"]
    );

    let (_, headers, _) = harness.get("/fragments/uploads").await;
    assert_eq!(headers.get("hx-trigger").unwrap(), "documents-changed");

    let (_, _, body) = harness
        .post_form(&format!("/uploads/{}/dismiss", entry.id), "", true)
        .await;
    assert!(!body.contains("scan.png"));
    assert!(harness.state.uploads().list().is_empty());
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_healthz_needs_no_token() {
    let harness = Harness::with_token(None).await;

    let (status, _, body) = harness.get("/healthz").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "ocrdesk-dashboard");
    assert_eq!(json["backend"]["status"], "healthy");
    assert_eq!(harness.backend.hits("GET /health"), 1);
}
