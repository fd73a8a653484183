//! Periodic background refresh of queries the dashboard keeps on screen.
//!
//! AI status and statistics are refetched on a fixed interval whether or
//! not anyone is looking, so the next page render finds them warm.

use crate::queries::{Queries, keys};
use ocrdesk_core::CacheConfig;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Refresh intervals.
#[derive(Debug, Clone, Copy)]
pub struct RefreshIntervals {
    pub ai_status: Duration,
    pub statistics: Duration,
}

impl RefreshIntervals {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            ai_status: config.status_refresh(),
            statistics: config.statistics_refresh(),
        }
    }
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Handles of the running refresh tasks. Dropping this does not stop them.
#[derive(Debug)]
pub struct Refreshers {
    handles: Vec<JoinHandle<()>>,
}

impl Refreshers {
    /// Stop every refresh task.
    pub fn abort(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Spawn the AI status and statistics refresh loops.
pub fn spawn_refreshers(queries: &Queries, intervals: RefreshIntervals) -> Refreshers {
    let status = {
        let queries = queries.clone();
        tokio::spawn(async move {
            every(intervals.ai_status, "ai-status", || {
                let queries = queries.clone();
                async move {
                    queries.cache().invalidate(&keys::ai_status());
                    queries.ai_status().await.map(|_| ())
                }
            })
            .await
        })
    };

    let statistics = {
        let queries = queries.clone();
        tokio::spawn(async move {
            every(intervals.statistics, "statistics", || {
                let queries = queries.clone();
                async move {
                    queries.cache().invalidate(&keys::statistics());
                    queries.statistics().await.map(|_| ())
                }
            })
            .await
        })
    };

    tracing::debug!(
        ai_status_secs = intervals.ai_status.as_secs(),
        statistics_secs = intervals.statistics.as_secs(),
        "Started background refresh"
    );
    Refreshers {
        handles: vec![status, statistics],
    }
}

async fn every<F, Fut>(period: Duration, name: &'static str, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<(), crate::error::ApiError>>,
{
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        match tick().await {
            Ok(()) => tracing::trace!(query = name, "Refreshed"),
            Err(e) if e.is_unauthorized() => {
                tracing::debug!(query = name, "Refresh skipped, not logged in")
            }
            Err(e) => tracing::warn!(query = name, error = %e, "Background refresh failed"),
        }
    }
}
