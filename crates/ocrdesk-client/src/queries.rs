//! Read and write operations used by the dashboard.
//!
//! Reads go through the [`QueryCache`] with a per-query key and staleness
//! window. Writes call the backend directly and, only once the call has
//! succeeded, invalidate the keys whose data they changed:
//!
//! | Mutation                      | Invalidates                |
//! |-------------------------------|----------------------------|
//! | upload / delete / process     | `documents`                |
//! | create correction for `doc`   | `ai-corrections/{doc}`     |
//! | update correction             | `ai-corrections`           |
//! | train model                   | `ai-model`, `ai-status`    |
//!
//! A failed write invalidates nothing, so previously cached data stays visible.

use crate::cache::{QueryCache, QueryKey};
use crate::client::{ApiClient, UploadRequest};
use crate::error::ApiError;
use ocrdesk_core::{
    AiCorrection, AiModel, AiStatus, CacheConfig, Correction, CorrectionId, Document, DocumentId,
    HealthStatus, Page, Statistics, TrainResponse,
};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Cache keys, one constructor per query.
pub mod keys {
    use super::QueryKey;
    use ocrdesk_core::DocumentId;

    pub fn documents_root() -> QueryKey {
        QueryKey::new("documents")
    }

    pub fn documents(page: u32, limit: u32) -> QueryKey {
        documents_root().with(page).with(limit)
    }

    pub fn document(id: &DocumentId) -> QueryKey {
        QueryKey::new("document").with(id)
    }

    pub fn statistics() -> QueryKey {
        QueryKey::new("statistics")
    }

    pub fn ai_corrections_root() -> QueryKey {
        QueryKey::new("ai-corrections")
    }

    pub fn ai_corrections(document_id: &DocumentId) -> QueryKey {
        ai_corrections_root().with(document_id)
    }

    pub fn ai_model() -> QueryKey {
        QueryKey::new("ai-model")
    }

    pub fn ai_status() -> QueryKey {
        QueryKey::new("ai-status")
    }
}

/// Staleness window of each query, and how long unused results are kept.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub documents: Duration,
    pub statistics: Duration,
    pub corrections: Duration,
    pub model: Duration,
    pub status: Duration,
    pub gc: Duration,
}

impl CachePolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            documents: config.documents(),
            statistics: config.statistics(),
            corrections: config.corrections(),
            model: config.model(),
            status: config.status(),
            gc: config.gc(),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Write operations whose in-flight state the pages display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Upload,
    Delete,
    Process,
    CreateCorrection,
    UpdateCorrection,
    TrainModel,
}

impl MutationKind {
    const COUNT: usize = 6;

    fn index(self) -> usize {
        match self {
            MutationKind::Upload => 0,
            MutationKind::Delete => 1,
            MutationKind::Process => 2,
            MutationKind::CreateCorrection => 3,
            MutationKind::UpdateCorrection => 4,
            MutationKind::TrainModel => 5,
        }
    }
}

/// Decrements its counter when the mutation ends, however it ends.
struct PendingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

struct QueriesInner {
    client: ApiClient,
    cache: QueryCache,
    policy: CachePolicy,
    pending: [AtomicUsize; MutationKind::COUNT],
}

/// Cached reads and invalidating writes against the backend.
#[derive(Clone)]
pub struct Queries {
    inner: Arc<QueriesInner>,
}

impl std::fmt::Debug for Queries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queries")
            .field("base_url", &self.inner.client.base_url())
            .field("cache", &self.inner.cache)
            .finish()
    }
}

impl Queries {
    pub fn new(client: ApiClient, policy: CachePolicy) -> Self {
        let cache = QueryCache::with_gc_time(policy.gc);
        Self::with_cache(client, cache, policy)
    }

    /// Build on an existing cache, e.g. one shared with another component.
    pub fn with_cache(client: ApiClient, cache: QueryCache, policy: CachePolicy) -> Self {
        Self {
            inner: Arc::new(QueriesInner {
                client,
                cache,
                policy,
                pending: Default::default(),
            }),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.inner.policy
    }

    /// Whether a mutation of this kind is currently running.
    pub fn is_pending(&self, kind: MutationKind) -> bool {
        self.inner.pending[kind.index()].load(Ordering::SeqCst) > 0
    }

    /// Forget the token and every cached result.
    pub fn logout(&self) -> std::io::Result<()> {
        self.inner.cache.clear();
        self.inner.client.tokens().clear()
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub async fn documents(&self, page: u32, limit: u32) -> Result<Arc<Page<Document>>, ApiError> {
        let client = &self.inner.client;
        self.inner
            .cache
            .fetch(keys::documents(page, limit), self.inner.policy.documents, || {
                client.list_documents(page, limit)
            })
            .await
    }

    pub async fn document(&self, id: &DocumentId) -> Result<Arc<Document>, ApiError> {
        require_id(id.is_empty(), "document id")?;
        let client = &self.inner.client;
        self.inner
            .cache
            .fetch(keys::document(id), self.inner.policy.documents, || {
                client.get_document(id)
            })
            .await
    }

    pub async fn statistics(&self) -> Result<Arc<Statistics>, ApiError> {
        let client = &self.inner.client;
        self.inner
            .cache
            .fetch(keys::statistics(), self.inner.policy.statistics, || {
                client.get_statistics()
            })
            .await
    }

    pub async fn ai_corrections(&self, document_id: &DocumentId) -> Result<Arc<Vec<AiCorrection>>, ApiError> {
        require_id(document_id.is_empty(), "document id")?;
        let client = &self.inner.client;
        self.inner
            .cache
            .fetch(keys::ai_corrections(document_id), self.inner.policy.corrections, || {
                client.list_ai_corrections(document_id)
            })
            .await
    }

    pub async fn ai_model(&self) -> Result<Arc<AiModel>, ApiError> {
        let client = &self.inner.client;
        self.inner
            .cache
            .fetch(keys::ai_model(), self.inner.policy.model, || client.get_ai_model())
            .await
    }

    pub async fn ai_status(&self) -> Result<Arc<AiStatus>, ApiError> {
        let client = &self.inner.client;
        self.inner
            .cache
            .fetch(keys::ai_status(), self.inner.policy.status, || client.get_ai_status())
            .await
    }

    /// Backend health. Never cached.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.inner.client.health_check().await
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    async fn mutate<T, Fut>(
        &self,
        kind: MutationKind,
        call: Fut,
        invalidates: &[QueryKey],
    ) -> Result<T, ApiError>
    where
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let counter = &self.inner.pending[kind.index()];
        counter.fetch_add(1, Ordering::SeqCst);
        let _pending = PendingGuard { counter };

        let result = call.await;
        match &result {
            Ok(_) => {
                for key in invalidates {
                    self.inner.cache.invalidate(key);
                }
            }
            Err(e) => tracing::warn!(?kind, error = %e, "Mutation failed"),
        }
        result
    }

    pub async fn upload_document<F>(&self, upload: UploadRequest, on_progress: F) -> Result<Document, ApiError>
    where
        F: Fn(u8) + Send + Sync + 'static,
    {
        self.mutate(
            MutationKind::Upload,
            self.inner.client.upload_with_progress(upload, on_progress),
            &[keys::documents_root()],
        )
        .await
    }

    pub async fn delete_document(&self, id: &DocumentId) -> Result<(), ApiError> {
        require_id(id.is_empty(), "document id")?;
        self.mutate(
            MutationKind::Delete,
            self.inner.client.delete_document(id),
            &[keys::documents_root()],
        )
        .await
    }

    pub async fn process_document(&self, id: &DocumentId) -> Result<serde_json::Value, ApiError> {
        require_id(id.is_empty(), "document id")?;
        self.mutate(
            MutationKind::Process,
            self.inner.client.process_document(id),
            &[keys::documents_root()],
        )
        .await
    }

    pub async fn create_ai_correction(&self, document_id: &DocumentId) -> Result<AiCorrection, ApiError> {
        require_id(document_id.is_empty(), "document id")?;
        self.mutate(
            MutationKind::CreateCorrection,
            self.inner.client.create_ai_correction(document_id),
            &[keys::ai_corrections(document_id)],
        )
        .await
    }

    pub async fn update_correction(
        &self,
        correction_id: &CorrectionId,
        corrections: &[Correction],
    ) -> Result<AiCorrection, ApiError> {
        require_id(correction_id.is_empty(), "correction id")?;
        self.mutate(
            MutationKind::UpdateCorrection,
            self.inner.client.update_correction(correction_id, corrections),
            &[keys::ai_corrections_root()],
        )
        .await
    }

    pub async fn train_model(&self) -> Result<TrainResponse, ApiError> {
        self.mutate(
            MutationKind::TrainModel,
            self.inner.client.train_ai_model(),
            &[keys::ai_model(), keys::ai_status()],
        )
        .await
    }
}

fn require_id(empty: bool, what: &str) -> Result<(), ApiError> {
    if empty {
        return Err(ApiError::InvalidRequest(format!("{what} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenStore;
    use ocrdesk_core::ApiConfig;

    fn queries() -> Queries {
        // Port 9 (discard) is never contacted by these tests.
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 1,
        };
        let client = ApiClient::new(&config, TokenStore::in_memory()).unwrap();
        Queries::new(client, CachePolicy::default())
    }

    #[test]
    fn policy_matches_documented_windows() {
        let policy = CachePolicy::default();
        assert_eq!(policy.documents, Duration::from_secs(300));
        assert_eq!(policy.statistics, Duration::from_secs(300));
        assert_eq!(policy.corrections, Duration::from_secs(120));
        assert_eq!(policy.model, Duration::from_secs(600));
        assert_eq!(policy.status, Duration::from_secs(30));
        assert_eq!(policy.gc, Duration::from_secs(600));
    }

    #[test]
    fn keys_are_distinct_per_parameter() {
        assert_eq!(keys::documents(2, 10).to_string(), "documents/2/10");
        assert_eq!(keys::document(&"5".into()).to_string(), "document/5");
        assert_eq!(keys::ai_corrections(&"5".into()).to_string(), "ai-corrections/5");
        assert!(!keys::document(&"5".into()).matches_prefix(&keys::documents_root()));
    }

    #[tokio::test]
    async fn empty_ids_are_disabled_queries() {
        let q = queries();
        let err = q.document(&DocumentId::new("")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        let err = q.ai_corrections(&DocumentId::new(" ")).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
        assert!(q.cache().is_empty());
    }

    #[tokio::test]
    async fn failed_mutation_invalidates_nothing_and_clears_pending() {
        let q = queries();
        let key = keys::documents(1, 10);
        let page = Page::<Document>::paginate(Vec::new(), 1, 10);
        q.cache()
            .fetch(key.clone(), Duration::from_secs(60), || async { Ok::<_, ApiError>(page) })
            .await
            .unwrap();

        let result = q
            .mutate(
                MutationKind::Delete,
                async { Err::<(), _>(ApiError::Decode("boom".into())) },
                &[keys::documents_root()],
            )
            .await;
        assert!(result.is_err());
        assert!(q.cache().is_fresh(&key, Duration::from_secs(60)));
        assert!(!q.is_pending(MutationKind::Delete));
    }

    #[tokio::test]
    async fn pending_is_visible_while_running() {
        let q = queries();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let running = {
            let q = q.clone();
            tokio::spawn(async move {
                q.mutate(
                    MutationKind::TrainModel,
                    async move {
                        let _ = release_rx.await;
                        Ok::<_, ApiError>(())
                    },
                    &[],
                )
                .await
            })
        };

        while !q.is_pending(MutationKind::TrainModel) {
            tokio::task::yield_now().await;
        }
        assert!(!q.is_pending(MutationKind::Upload));
        release_tx.send(()).unwrap();
        running.await.unwrap().unwrap();
        assert!(!q.is_pending(MutationKind::TrainModel));
    }
}
