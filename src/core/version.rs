//! Pipelines, versions and prior runs

use crate::core::parameter::ParameterSchema;
use crate::core::run_config::FormValues;
use crate::core::validate::ValidationContext;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pre-computed permissions of the current user on a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    /// May trigger runs
    #[serde(default = "allowed")]
    pub run: bool,

    /// May overwrite a version's stored configuration
    #[serde(default = "allowed")]
    pub update_version: bool,
}

fn allowed() -> bool {
    true
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            run: true,
            update_version: true,
        }
    }
}

/// The pipeline a session configures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub id: Uuid,

    /// Short unique code
    pub code: String,

    /// Display name
    pub name: String,

    /// Cron expression of the active schedule, if any
    #[serde(default)]
    pub schedule: Option<String>,

    #[serde(default)]
    pub permissions: Permissions,
}

impl PipelineInfo {
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            id: Uuid::new_v4(),
            name: code.clone(),
            code,
            schedule: None,
            permissions: Permissions::default(),
        }
    }

    pub fn with_schedule(mut self, cron: impl Into<String>) -> Self {
        self.schedule = Some(cron.into());
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn is_scheduled(&self) -> bool {
        self.schedule.is_some()
    }

    /// Validation context implied by the pipeline's schedule
    pub fn validation_context(&self) -> ValidationContext {
        ValidationContext {
            scheduled: self.is_scheduled(),
        }
    }
}

/// Immutable snapshot of a pipeline's parameter schema and stored configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: Uuid,

    /// Sequence number, increasing with each upload
    pub number: u32,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "parameters")]
    pub schema: ParameterSchema,

    /// Default configuration stored with the version
    #[serde(rename = "config", default)]
    pub stored_config: FormValues,

    pub created_at: DateTime<Utc>,

    pub author: String,
}

impl Version {
    /// Create a version created now with an empty stored configuration
    pub fn new(number: u32, author: impl Into<String>, schema: ParameterSchema) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            name: None,
            schema,
            stored_config: FormValues::new(),
            created_at: Utc::now(),
            author: author.into(),
        }
    }

    pub fn with_config(mut self, config: FormValues) -> Self {
        self.stored_config = config;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Label shown in the version picker: number, creation date and author
    pub fn label(&self) -> String {
        format!(
            "v{} - {} - {}",
            self.number,
            self.created_at.format("%Y-%m-%d"),
            self.author
        )
    }

    /// Case-insensitive substring match on the label; an empty query matches
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim();
        query.is_empty() || self.label().to_lowercase().contains(&query.to_lowercase())
    }
}

/// A concrete earlier run a session can be opened from
#[derive(Debug, Clone, PartialEq)]
pub struct PriorRun {
    pub id: Uuid,

    /// Version the run was bound to
    pub version: Version,

    /// Configuration the run was submitted with
    pub config: FormValues,
}
