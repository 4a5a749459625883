//! Version resolution guarded by a generation counter

use crate::backend::PipelineBackend;
use crate::core::{seed_config, FormValues, PipelineInfo, PriorRun, Version};
use crate::session::SessionError;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Generation of a resolution request
///
/// Only a resolution whose generation is still the latest may be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which version a session should configure
#[derive(Debug, Clone)]
pub enum VersionSelection {
    /// Fetch the pipeline's current version
    Current,
    /// A version the user picked explicitly
    Explicit(Version),
    /// Reuse an earlier run's version and configuration as-is
    PriorRun(PriorRun),
}

/// Active version and the form values seeded for it
#[derive(Debug, Clone)]
pub struct Resolution {
    pub generation: Generation,
    pub version: Version,
    pub seed: FormValues,
}

/// Resolves the active version of a pipeline
pub struct VersionResolver<B> {
    backend: Arc<B>,
    generation: AtomicU64,
}

impl<B: PipelineBackend> VersionResolver<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            generation: AtomicU64::new(0),
        }
    }

    /// Start a new resolution, superseding every earlier one
    pub fn begin(&self) -> Generation {
        Generation(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Supersede every in-flight resolution without starting one
    pub fn invalidate(&self) {
        self.begin();
    }

    pub fn current(&self) -> Generation {
        Generation(self.generation.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }

    /// Resolve `selection` under a fresh generation
    ///
    /// Returns `Ok(None)` when a later resolution started before this one
    /// finished.
    pub async fn resolve(
        &self,
        pipeline: &PipelineInfo,
        selection: VersionSelection,
    ) -> Result<Option<Resolution>, SessionError> {
        let generation = self.begin();
        self.resolve_as(generation, pipeline, selection).await
    }

    /// Resolve `selection` under a generation obtained from [`Self::begin`]
    pub async fn resolve_as(
        &self,
        generation: Generation,
        pipeline: &PipelineInfo,
        selection: VersionSelection,
    ) -> Result<Option<Resolution>, SessionError> {
        let (version, seed) = match selection {
            VersionSelection::PriorRun(run) => {
                let seed = seed_verbatim(&run.version, &run.config);
                (run.version, seed)
            }
            VersionSelection::Explicit(version) => {
                let seed = seed_config(&version.schema, &version.stored_config);
                (version, seed)
            }
            VersionSelection::Current => {
                let fetched = self.backend.fetch_current_version(pipeline.id).await;
                if !self.is_current(generation) {
                    debug!("Discarding current-version fetch {} for {}", generation, pipeline.code);
                    return Ok(None);
                }
                let version = fetched.map_err(SessionError::SchemaResolution)?;
                let seed = seed_config(&version.schema, &version.stored_config);
                (version, seed)
            }
        };

        if !self.is_current(generation) {
            debug!("Discarding resolution {} of version {}", generation, version.number);
            return Ok(None);
        }

        Ok(Some(Resolution {
            generation,
            version,
            seed,
        }))
    }
}

/// Seed from a prior run's configuration, keeping its values as they were
///
/// Only codes the run's version does not carry fall back to the usual seed.
fn seed_verbatim(version: &Version, config: &FormValues) -> FormValues {
    let mut seed = seed_config(&version.schema, config);
    for (code, value) in config {
        if version.schema.contains(code) {
            seed.insert(code.clone(), value.clone());
        }
    }
    seed
}
