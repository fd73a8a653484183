//! Keyed cache of backend query results.
//!
//! Each key owns a slot with the last successful result, the time it was
//! fetched and a stale flag. A read returns the cached result while it is
//! younger than the caller's staleness window and has not been invalidated;
//! otherwise it runs the fetcher. Fetches of the same key are serialized by a
//! per-key async lock, and callers that waited on the lock take the outcome
//! of the fetch that held it, success or failure, instead of fetching again.
//!
//! Entries nobody has read for longer than the gc window are dropped.

use crate::error::ApiError;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Default retention of unused entries.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(10 * 60);

/// Ordered key of a cached query, e.g. `documents/1/10`.
///
/// Invalidation matches by prefix: `documents` covers every page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(root: impl Into<String>) -> Self {
        Self(vec![root.into()])
    }

    /// Append a parameter segment.
    pub fn with(mut self, segment: impl ToString) -> Self {
        self.0.push(segment.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Whether `prefix` selects this key.
    pub fn matches_prefix(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

type CachedValue = Arc<dyn Any + Send + Sync>;

struct Slot {
    /// Held for the duration of a fetch.
    fetch_lock: tokio::sync::Mutex<()>,
    state: Mutex<SlotState>,
}

struct SlotState {
    value: Option<CachedValue>,
    fetched_at: Option<Instant>,
    stale: bool,
    /// Bumped by every invalidation, to detect one that lands mid-fetch.
    epoch: u64,
    /// Number of fetches that ran to completion.
    completed: u64,
    /// Error of the last completed fetch, if it failed.
    failure: Option<ApiError>,
    last_used: Instant,
}

impl Slot {
    fn new() -> Self {
        Self {
            fetch_lock: tokio::sync::Mutex::new(()),
            state: Mutex::new(SlotState {
                value: None,
                fetched_at: None,
                stale: false,
                epoch: 0,
                completed: 0,
                failure: None,
                last_used: Instant::now(),
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn fresh<T: Send + Sync + 'static>(&self, stale_time: Duration) -> Option<Arc<T>> {
        let mut state = self.state();
        state.last_used = Instant::now();
        if state.stale {
            return None;
        }
        let fetched_at = state.fetched_at?;
        if fetched_at.elapsed() >= stale_time {
            return None;
        }
        state.value.clone()?.downcast::<T>().ok()
    }

    fn last<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.state().value.clone()?.downcast::<T>().ok()
    }

    /// Outcome of the fetch that completed after `seen`, if one did.
    fn completed_since<T: Send + Sync + 'static>(&self, seen: u64) -> Option<Result<Arc<T>, ApiError>> {
        let state = self.state();
        if state.completed == seen {
            return None;
        }
        if let Some(err) = &state.failure {
            return Some(Err(err.clone()));
        }
        let value = state.value.clone()?.downcast::<T>().ok()?;
        Some(Ok(value))
    }

    fn store(&self, value: CachedValue, started_epoch: u64) {
        let mut state = self.state();
        state.value = Some(value);
        state.fetched_at = Some(Instant::now());
        state.stale = state.epoch != started_epoch;
        state.completed += 1;
        state.failure = None;
        state.last_used = Instant::now();
    }

    fn fail(&self, err: &ApiError) {
        let mut state = self.state();
        state.completed += 1;
        state.failure = Some(err.clone());
    }
}

/// Shared query result cache.
#[derive(Clone)]
pub struct QueryCache {
    slots: Arc<Mutex<HashMap<QueryKey, Arc<Slot>>>>,
    gc_time: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_gc_time(DEFAULT_GC_TIME)
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("keys", &self.len())
            .field("gc_time", &self.gc_time)
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that drops entries left unused for `gc_time`.
    pub fn with_gc_time(gc_time: Duration) -> Self {
        Self {
            slots: Arc::default(),
            gc_time,
        }
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<QueryKey, Arc<Slot>>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn slot(&self, key: &QueryKey) -> Arc<Slot> {
        let mut slots = self.slots();
        if let Some(slot) = slots.get(key) {
            return slot.clone();
        }
        Self::collect(&mut slots, self.gc_time);
        let slot = Arc::new(Slot::new());
        slots.insert(key.clone(), slot.clone());
        slot
    }

    /// Drop slots unused for `gc_time` that no fetch is holding.
    fn collect(slots: &mut HashMap<QueryKey, Arc<Slot>>, gc_time: Duration) -> usize {
        let before = slots.len();
        slots.retain(|_, slot| Arc::strong_count(slot) > 1 || slot.state().last_used.elapsed() < gc_time);
        let dropped = before - slots.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped unused queries");
        }
        dropped
    }

    /// Return the cached result for `key` or fetch it.
    ///
    /// A failed fetch keeps the previous result in place and returns the error.
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        stale_time: Duration,
        fetcher: F,
    ) -> Result<Arc<T>, ApiError>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let slot = self.slot(&key);
        if let Some(value) = slot.fresh::<T>(stale_time) {
            tracing::trace!(key = %key, "Query cache hit");
            return Ok(value);
        }

        let seen = slot.state().completed;
        let _in_flight = slot.fetch_lock.lock().await;
        if let Some(outcome) = slot.completed_since::<T>(seen) {
            tracing::trace!(key = %key, "Query shared with concurrent fetch");
            return outcome;
        }
        if let Some(value) = slot.fresh::<T>(stale_time) {
            return Ok(value);
        }

        let started_epoch = slot.state().epoch;
        tracing::debug!(key = %key, "Query cache miss, fetching");
        match fetcher().await {
            Ok(value) => {
                let value = Arc::new(value);
                slot.store(value.clone(), started_epoch);
                Ok(value)
            }
            Err(err) => {
                slot.fail(&err);
                Err(err)
            }
        }
    }

    /// Mark every key under `prefix` stale. Returns how many keys matched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut slots = self.slots();
        Self::collect(&mut slots, self.gc_time);
        let mut matched = 0;
        for (key, slot) in slots.iter() {
            if key.matches_prefix(prefix) {
                let mut state = slot.state();
                state.stale = true;
                state.epoch += 1;
                matched += 1;
            }
        }
        tracing::debug!(prefix = %prefix, matched, "Invalidated queries");
        matched
    }

    /// Drop entries unused for longer than the gc window. Returns how many were dropped.
    pub fn prune(&self) -> usize {
        Self::collect(&mut self.slots(), self.gc_time)
    }

    /// Last stored result for `key`, fresh or not.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let slot = self.slots().get(key).cloned()?;
        slot.last::<T>()
    }

    /// Whether `key` would be served from cache with `stale_time`.
    pub fn is_fresh(&self, key: &QueryKey, stale_time: Duration) -> bool {
        let Some(slot) = self.slots().get(key).cloned() else {
            return false;
        };
        let state = slot.state();
        !state.stale
            && state
                .fetched_at
                .is_some_and(|at| at.elapsed() < stale_time)
    }

    /// Whether an entry exists for `key`.
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.slots().contains_key(key)
    }

    /// Drop every cached result.
    pub fn clear(&self) {
        self.slots().clear();
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MINUTE: Duration = Duration::from_secs(60);

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
    ) -> impl FnOnce() -> std::future::Ready<Result<usize, ApiError>> {
        let calls = calls.clone();
        move || std::future::ready(Ok(calls.fetch_add(1, Ordering::SeqCst) + 1))
    }

    #[test]
    fn prefix_matching() {
        let page = QueryKey::new("documents").with(1).with(10);
        assert!(page.matches_prefix(&QueryKey::new("documents")));
        assert!(!page.matches_prefix(&QueryKey::new("document")));
        assert!(!QueryKey::new("documents").matches_prefix(&page));
        assert_eq!(page.to_string(), "documents/1/10");
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_results_are_reused_until_stale() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("statistics");

        let first = cache.fetch(key.clone(), 5 * MINUTE, counting_fetch(&calls)).await.unwrap();
        let second = cache.fetch(key.clone(), 5 * MINUTE, counting_fetch(&calls)).await.unwrap();
        assert_eq!((*first, *second), (1, 1));

        tokio::time::advance(5 * MINUTE).await;
        let third = cache.fetch(key.clone(), 5 * MINUTE, counting_fetch(&calls)).await.unwrap();
        assert_eq!(*third, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidation_forces_refetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let page1 = QueryKey::new("documents").with(1).with(10);
        let page2 = QueryKey::new("documents").with(2).with(10);
        let other = QueryKey::new("ai-model");

        cache.fetch(page1.clone(), MINUTE, counting_fetch(&calls)).await.unwrap();
        cache.fetch(page2.clone(), MINUTE, counting_fetch(&calls)).await.unwrap();
        cache.fetch(other.clone(), MINUTE, counting_fetch(&calls)).await.unwrap();

        assert_eq!(cache.invalidate(&QueryKey::new("documents")), 2);
        assert!(!cache.is_fresh(&page1, MINUTE));
        assert!(cache.is_fresh(&other, MINUTE));

        let refetched = cache.fetch(page1.clone(), MINUTE, counting_fetch(&calls)).await.unwrap();
        assert_eq!(*refetched, 4);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_value() {
        let cache = QueryCache::new();
        let key = QueryKey::new("ai-status");
        cache
            .fetch(key.clone(), MINUTE, || async { Ok::<_, ApiError>(7u32) })
            .await
            .unwrap();
        cache.invalidate(&key);

        let result = cache
            .fetch(key.clone(), MINUTE, || async {
                Err::<u32, _>(ApiError::Decode("bad".into()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(cache.peek::<u32>(&key).as_deref(), Some(&7));
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("ai-model");

        let slow = |calls: Arc<AtomicUsize>| {
            move || async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, ApiError>(calls.fetch_add(1, Ordering::SeqCst) + 1)
            }
        };

        let (a, b) = tokio::join!(
            cache.fetch(key.clone(), MINUTE, slow(calls.clone())),
            cache.fetch(key.clone(), MINUTE, slow(calls.clone())),
        );
        assert_eq!((*a.unwrap(), *b.unwrap()), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_failure() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("statistics");

        let failing = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Err::<u32, _>(ApiError::Unauthorized)
            }
        };

        let started = std::time::Instant::now();
        let (a, b, c) = tokio::join!(
            cache.fetch(key.clone(), MINUTE, failing(calls.clone())),
            cache.fetch(key.clone(), MINUTE, failing(calls.clone())),
            cache.fetch(key.clone(), MINUTE, failing(calls.clone())),
        );
        assert!(a.unwrap_err().is_unauthorized());
        assert!(b.unwrap_err().is_unauthorized());
        assert!(c.unwrap_err().is_unauthorized());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_millis(140));

        // A later read is a new attempt.
        cache
            .fetch(key.clone(), MINUTE, failing(calls.clone()))
            .await
            .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unused_entries_are_dropped_after_gc_time() {
        let cache = QueryCache::with_gc_time(10 * MINUTE);
        let calls = Arc::new(AtomicUsize::new(0));
        let old_page = QueryKey::new("documents").with(7).with(10);
        let status = QueryKey::new("ai-status");

        cache.fetch(old_page.clone(), MINUTE, counting_fetch(&calls)).await.unwrap();
        cache.fetch(status.clone(), MINUTE, counting_fetch(&calls)).await.unwrap();

        tokio::time::advance(6 * MINUTE).await;
        cache.fetch(status.clone(), MINUTE, counting_fetch(&calls)).await.unwrap();
        tokio::time::advance(5 * MINUTE).await;

        assert_eq!(cache.prune(), 1);
        assert!(!cache.contains(&old_page));
        assert!(cache.contains(&status));

        // Reading a new key collects as well.
        tokio::time::advance(11 * MINUTE).await;
        cache
            .fetch(QueryKey::new("ai-model"), MINUTE, counting_fetch(&calls))
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_with_fetch_in_flight_is_kept() {
        let cache = QueryCache::with_gc_time(MINUTE);
        let key = QueryKey::new("document").with(3);
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let fetching = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(key, MINUTE, || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<_, ApiError>(3u32)
                    })
                    .await
            })
        };
        started_rx.await.unwrap();

        tokio::time::advance(2 * MINUTE).await;
        assert_eq!(cache.prune(), 0);
        release_tx.send(()).unwrap();
        assert_eq!(*fetching.await.unwrap().unwrap(), 3);
        assert_eq!(cache.peek::<u32>(&key).as_deref(), Some(&3));
    }

    #[tokio::test]
    async fn invalidation_during_fetch_marks_result_stale() {
        let cache = QueryCache::new();
        let key = QueryKey::new("documents").with(1).with(10);
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let fetching = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(key, MINUTE, || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<_, ApiError>(1u32)
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        cache.invalidate(&QueryKey::new("documents"));
        release_tx.send(()).unwrap();
        assert_eq!(*fetching.await.unwrap().unwrap(), 1);

        assert!(!cache.is_fresh(&key, MINUTE));
        assert_eq!(cache.peek::<u32>(&key).as_deref(), Some(&1));
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = QueryCache::new();
        cache
            .fetch(QueryKey::new("statistics"), MINUTE, || async { Ok::<_, ApiError>(1u8) })
            .await
            .unwrap();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
