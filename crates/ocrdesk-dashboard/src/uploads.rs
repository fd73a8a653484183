//! Upload progress tracking.
//!
//! Each accepted file becomes an [`UploadProgress`] entry that a spawned task
//! advances while the body streams to the backend. Entries stay until the
//! operator dismisses them, or until more than [`MAX_FINISHED`] finished
//! entries pile up, at which point the oldest finished ones go. Dismissing
//! never cancels the transfer.

use ocrdesk_client::{Queries, UploadRequest};
use ocrdesk_core::{DocumentId, Rejection, UploadProgress};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Finished entries (completed, failed or rejected) kept for display.
pub const MAX_FINISHED: usize = 20;

/// Drop the oldest finished entries beyond [`MAX_FINISHED`].
fn trim_finished(entries: &mut Vec<UploadProgress>) {
    let finished = entries.iter().filter(|e| e.status.is_finished()).count();
    let mut excess = finished.saturating_sub(MAX_FINISHED);
    if excess == 0 {
        return;
    }
    entries.retain(|e| {
        if excess > 0 && e.status.is_finished() {
            excess -= 1;
            return false;
        }
        true
    });
}

/// Upload entries shown by the upload fragment.
#[derive(Debug, Clone, Default)]
pub struct UploadTracker {
    entries: Arc<RwLock<Vec<UploadProgress>>>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<UploadProgress>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<UploadProgress>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, id: Uuid, apply: impl FnOnce(&mut UploadProgress)) {
        let mut entries = self.write();
        if let Some(entry) = entries.iter_mut().find(|e| e.id == id) {
            apply(entry);
        }
        trim_finished(&mut entries);
    }

    /// Add an entry in the uploading state.
    pub fn start(&self, file_name: &str, file_size: u64) -> Uuid {
        let entry = UploadProgress::started(file_name, file_size);
        let id = entry.id;
        self.write().push(entry);
        id
    }

    /// Add an entry for a file refused before upload.
    pub fn reject(&self, file_name: &str, file_size: u64, reason: &Rejection) -> Uuid {
        let entry = UploadProgress::rejected(file_name, file_size, reason);
        let id = entry.id;
        let mut entries = self.write();
        entries.push(entry);
        trim_finished(&mut entries);
        id
    }

    pub fn advance(&self, id: Uuid, percent: u8) {
        self.update(id, |e| e.advance(percent));
    }

    pub fn complete(&self, id: Uuid, document_id: DocumentId) {
        self.update(id, |e| e.complete(document_id));
    }

    pub fn fail(&self, id: Uuid, message: impl Into<String>) {
        let message = message.into();
        self.update(id, |e| e.fail(message));
    }

    /// Remove an entry. Returns whether it existed.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    pub fn get(&self, id: Uuid) -> Option<UploadProgress> {
        self.read().iter().find(|e| e.id == id).cloned()
    }

    /// Snapshot of all entries, oldest first.
    pub fn list(&self) -> Vec<UploadProgress> {
        self.read().clone()
    }

    /// Whether any entry is still transferring or waiting on the backend.
    pub fn any_active(&self) -> bool {
        self.read().iter().any(|e| !e.status.is_finished())
    }
}

/// Upload one accepted file in the background, reflecting progress in `tracker`.
pub fn spawn_upload(
    queries: Queries,
    tracker: UploadTracker,
    id: Uuid,
    upload: UploadRequest,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let file_name = upload.file_name.clone();
        let progress = {
            let tracker = tracker.clone();
            move |pct: u8| tracker.advance(id, pct)
        };

        match queries.upload_document(upload, progress).await {
            Ok(document) => {
                tracing::info!(file = %file_name, document_id = %document.id, "Upload completed");
                tracker.complete(id, document.id);
            }
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "Upload failed");
                let message = e
                    .detail()
                    .unwrap_or_else(|| "Falha no envio do arquivo".to_string());
                tracker.fail(id, message);
            }
        }
    })
}
