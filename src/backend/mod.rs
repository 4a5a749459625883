//! Collaborator seam for fetching versions and submitting runs
//!
//! The engine never talks to the network itself: everything that leaves the
//! process goes through [`PipelineBackend`].

pub mod memory;

pub use memory::InMemoryBackend;

use crate::core::{RunConfiguration, Version};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Pipeline {0} has never been uploaded")]
    PipelineNotUploaded(Uuid),

    #[error("Version {0} is not a version of this pipeline")]
    StaleVersion(Uuid),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    Api(String),
}

/// Handle of a triggered run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHandle {
    /// Unique run ID
    pub id: Uuid,

    pub pipeline_id: Uuid,

    /// Version the run is bound to
    pub version_id: Uuid,

    /// Configuration the run was triggered with
    pub config: RunConfiguration,

    /// Whether the user asked to be notified on completion
    pub notify: bool,

    pub created_at: DateTime<Utc>,
}

/// Trait for the remote calls a run session depends on
#[async_trait]
pub trait PipelineBackend: Send + Sync {
    /// Fetch the pipeline's current version
    async fn fetch_current_version(&self, pipeline_id: Uuid) -> Result<Version, BackendError>;

    /// Search the pipeline's versions by label
    async fn search_versions(
        &self,
        pipeline_id: Uuid,
        query: &str,
    ) -> Result<Vec<Version>, BackendError>;

    /// Trigger a run of `version_id` with `config`
    async fn submit_run(
        &self,
        pipeline_id: Uuid,
        config: &RunConfiguration,
        version_id: Uuid,
        notify: bool,
    ) -> Result<RunHandle, BackendError>;

    /// Overwrite the stored configuration of a version
    async fn save_version_default_config(
        &self,
        version_id: Uuid,
        config: &RunConfiguration,
    ) -> Result<Version, BackendError>;
}
