//! In-memory backend (for testing or offline use)

use crate::backend::{BackendError, PipelineBackend, RunHandle};
use crate::core::{PipelineInfo, RunConfiguration, Version};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Backend keeping pipelines, versions and triggered runs in memory
pub struct InMemoryBackend {
    versions: RwLock<HashMap<Uuid, Version>>,
    by_pipeline: RwLock<HashMap<Uuid, Vec<Uuid>>>,
    runs: RwLock<Vec<RunHandle>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            versions: RwLock::new(HashMap::new()),
            by_pipeline: RwLock::new(HashMap::new()),
            runs: RwLock::new(Vec::new()),
        }
    }

    /// Create a backend serving one pipeline
    pub fn with_pipeline(pipeline: &PipelineInfo, versions: Vec<Version>) -> Self {
        let ids = versions.iter().map(|v| v.id).collect();
        let versions = versions.into_iter().map(|v| (v.id, v)).collect();

        Self {
            versions: RwLock::new(versions),
            by_pipeline: RwLock::new(HashMap::from([(pipeline.id, ids)])),
            runs: RwLock::new(Vec::new()),
        }
    }

    /// Register a pipeline with no versions yet
    pub async fn register_pipeline(&self, pipeline: &PipelineInfo) {
        self.by_pipeline
            .write()
            .await
            .entry(pipeline.id)
            .or_insert_with(Vec::new);
    }

    /// Upload a version of a pipeline
    pub async fn upload_version(&self, pipeline_id: Uuid, version: Version) {
        self.by_pipeline
            .write()
            .await
            .entry(pipeline_id)
            .or_insert_with(Vec::new)
            .push(version.id);
        self.versions.write().await.insert(version.id, version);
    }

    /// Runs triggered so far, oldest first
    pub async fn runs(&self) -> Vec<RunHandle> {
        self.runs.read().await.clone()
    }

    /// Get a version by ID
    pub async fn version(&self, version_id: Uuid) -> Option<Version> {
        self.versions.read().await.get(&version_id).cloned()
    }

    async fn pipeline_versions(&self, pipeline_id: Uuid) -> Result<Vec<Version>, BackendError> {
        let by_pipeline = self.by_pipeline.read().await;
        let ids = by_pipeline
            .get(&pipeline_id)
            .ok_or_else(|| BackendError::NotFound(format!("pipeline {}", pipeline_id)))?;

        let versions = self.versions.read().await;
        Ok(ids.iter().filter_map(|id| versions.get(id).cloned()).collect())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineBackend for InMemoryBackend {
    async fn fetch_current_version(&self, pipeline_id: Uuid) -> Result<Version, BackendError> {
        self.pipeline_versions(pipeline_id)
            .await?
            .into_iter()
            .max_by_key(|v| v.number)
            .ok_or(BackendError::PipelineNotUploaded(pipeline_id))
    }

    async fn search_versions(
        &self,
        pipeline_id: Uuid,
        query: &str,
    ) -> Result<Vec<Version>, BackendError> {
        let mut matches: Vec<Version> = self
            .pipeline_versions(pipeline_id)
            .await?
            .into_iter()
            .filter(|v| v.matches_query(query))
            .collect();

        // Newest first
        matches.sort_by(|a, b| b.number.cmp(&a.number));
        Ok(matches)
    }

    async fn submit_run(
        &self,
        pipeline_id: Uuid,
        config: &RunConfiguration,
        version_id: Uuid,
        notify: bool,
    ) -> Result<RunHandle, BackendError> {
        let versions = self.pipeline_versions(pipeline_id).await?;
        if versions.is_empty() {
            return Err(BackendError::PipelineNotUploaded(pipeline_id));
        }
        if !versions.iter().any(|v| v.id == version_id) {
            return Err(BackendError::StaleVersion(version_id));
        }

        let handle = RunHandle {
            id: Uuid::new_v4(),
            pipeline_id,
            version_id,
            config: config.clone(),
            notify,
            created_at: Utc::now(),
        };
        debug!("Recorded run {} of version {}", handle.id, version_id);
        self.runs.write().await.push(handle.clone());

        Ok(handle)
    }

    async fn save_version_default_config(
        &self,
        version_id: Uuid,
        config: &RunConfiguration,
    ) -> Result<Version, BackendError> {
        let mut versions = self.versions.write().await;
        let version = versions
            .get_mut(&version_id)
            .ok_or_else(|| BackendError::NotFound(format!("version {}", version_id)))?;

        version.stored_config = config.values().clone();
        Ok(version.clone())
    }
}
