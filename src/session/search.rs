//! Debounced version search

use crate::backend::{BackendError, PipelineBackend};
use crate::core::Version;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Searches a pipeline's versions, keeping only the latest query
pub struct VersionSearch<B> {
    backend: Arc<B>,
    pipeline_id: Uuid,
    debounce: Duration,
    latest: AtomicU64,
}

impl<B: PipelineBackend> VersionSearch<B> {
    pub fn new(backend: Arc<B>, pipeline_id: Uuid, debounce: Duration) -> Self {
        Self {
            backend,
            pipeline_id,
            debounce,
            latest: AtomicU64::new(0),
        }
    }

    /// Search versions whose label contains `query`, ignoring case
    ///
    /// Waits for the debounce period first. Returns `Ok(None)` when another
    /// search started (or [`Self::cancel`] was called) in the meantime.
    pub async fn search(&self, query: &str) -> Result<Option<Vec<Version>>, BackendError> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if !self.is_latest(ticket) {
            debug!("Search for {:?} superseded before sending", query);
            return Ok(None);
        }

        let result = self.backend.search_versions(self.pipeline_id, query).await;
        if !self.is_latest(ticket) {
            debug!("Search for {:?} superseded while in flight", query);
            return Ok(None);
        }

        let mut versions = result?;

        versions.retain(|v| v.matches_query(query));
        Ok(Some(versions))
    }

    /// Drop the result of any pending search
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}
