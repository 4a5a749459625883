//! Pipeline definition loaded from YAML

use crate::backend::InMemoryBackend;
use crate::core::parameter::{Parameter, ParameterSchema};
use crate::core::run_config::FormValues;
use crate::core::version::{Permissions, PipelineInfo, Version};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Top-level pipeline definition: the pipeline and its uploaded versions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    /// Pipeline identity, schedule and permissions
    pub pipeline: PipelineSection,

    /// Uploaded versions, in any order
    pub versions: Vec<VersionConfig>,
}

/// Pipeline section as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    /// Unique pipeline code
    pub code: String,

    /// Display name (defaults to the code)
    #[serde(default)]
    pub name: Option<String>,

    /// Cron expression of the active schedule
    #[serde(default)]
    pub schedule: Option<String>,

    /// Pre-computed permissions of the current user
    #[serde(default)]
    pub permissions: Permissions,
}

/// Version configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
    /// Sequence number; the highest one is the current version
    pub number: u32,

    #[serde(default)]
    pub name: Option<String>,

    /// Who uploaded the version
    pub author: String,

    /// Upload date (defaults to load time)
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Declared parameters, in display order
    #[serde(default)]
    pub parameters: Vec<Parameter>,

    /// Stored default configuration
    #[serde(default)]
    pub config: FormValues,
}

impl PipelineDefinition {
    /// Load a pipeline definition from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a pipeline definition from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let definition: PipelineDefinition = serde_yaml::from_str(yaml)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Validate the pipeline definition
    pub fn validate(&self) -> Result<()> {
        if self.versions.is_empty() {
            anyhow::bail!("Pipeline '{}' has no versions", self.pipeline.code);
        }

        let mut seen_numbers = std::collections::HashSet::new();
        for version in &self.versions {
            if !seen_numbers.insert(version.number) {
                anyhow::bail!("Duplicate version number: {}", version.number);
            }

            let schema = ParameterSchema::new(version.parameters.clone());
            schema
                .validate()
                .with_context(|| format!("Invalid parameters in version {}", version.number))?;

            // A version's stored config can only refer to its own parameters
            for code in version.config.keys() {
                if !schema.contains(code) {
                    anyhow::bail!(
                        "Version {} config sets undeclared parameter '{}'",
                        version.number,
                        code
                    );
                }
            }
        }

        Ok(())
    }

    /// Number of the current version
    pub fn current_version_number(&self) -> Option<u32> {
        self.versions.iter().map(|v| v.number).max()
    }

    /// Convert to domain models, assigning fresh ids
    pub fn to_domain(&self) -> (PipelineInfo, Vec<Version>) {
        let section = &self.pipeline;
        let pipeline = PipelineInfo {
            id: Uuid::new_v4(),
            code: section.code.clone(),
            name: section.name.clone().unwrap_or_else(|| section.code.clone()),
            schedule: section.schedule.clone(),
            permissions: section.permissions,
        };

        let loaded_at = Utc::now();
        let versions = self
            .versions
            .iter()
            .map(|config| Version {
                id: Uuid::new_v4(),
                number: config.number,
                name: config.name.clone(),
                schema: ParameterSchema::new(config.parameters.clone()),
                stored_config: config.config.clone(),
                created_at: config.created_at.unwrap_or(loaded_at),
                author: config.author.clone(),
            })
            .collect();

        (pipeline, versions)
    }

    /// Build an in-memory backend serving this definition
    pub fn to_backend(&self) -> (PipelineInfo, InMemoryBackend) {
        let (pipeline, versions) = self.to_domain();
        let backend = InMemoryBackend::with_pipeline(&pipeline, versions);
        (pipeline, backend)
    }
}
