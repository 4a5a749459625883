//! Run session - the in-memory state of one run/config dialog

use crate::backend::{PipelineBackend, RunHandle};
use crate::core::{
    build, validate, FieldErrors, FormValues, PipelineInfo, PriorRun, RunConfiguration, Value,
    Version,
};
use crate::session::resolver::{Generation, VersionResolver, VersionSelection};
use crate::session::search::VersionSearch;
use crate::session::{SessionConfig, SessionError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Events that can occur during a session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    VersionResolved {
        version_id: Uuid,
        number: u32,
    },
    /// A resolution finished after the user moved on and was dropped
    StaleResolutionDiscarded {
        generation: Generation,
    },
    ResolutionFailed {
        error: String,
    },
    ValidationFailed {
        errors: FieldErrors,
    },
    RunSubmitted {
        run_id: Uuid,
        version_id: Uuid,
    },
    SubmissionFailed {
        error: String,
    },
    DefaultConfigSaved {
        version_id: Uuid,
    },
    Closed,
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(SessionEvent) + Send + Sync>;

/// How a session is opened
#[derive(Debug, Clone)]
pub enum SessionOrigin {
    /// Configure the pipeline's current version
    Current,
    /// Re-run an earlier run with its version and configuration
    PriorRun(PriorRun),
}

#[derive(Debug, Default)]
struct SessionState {
    active: Option<Version>,
    values: FormValues,
    errors: FieldErrors,
    /// Non-field error from the last submission or save
    banner: Option<String>,
    /// Inline notice when the active version could not be resolved
    notice: Option<String>,
    closed: bool,
}

impl SessionState {
    fn reset(&mut self) {
        *self = SessionState {
            closed: self.closed,
            ..SessionState::default()
        };
    }
}

/// One run/config dialog
///
/// The session is the only writer of its state. Version switches reset the
/// form entirely; resolutions that land after a later switch, or after the
/// session was closed, are discarded.
pub struct RunSession<B> {
    pipeline: PipelineInfo,
    backend: Arc<B>,
    config: SessionConfig,
    resolver: VersionResolver<B>,
    search: VersionSearch<B>,
    state: Mutex<SessionState>,
    event_handlers: Mutex<Vec<EventHandler>>,
}

impl<B: PipelineBackend + 'static> RunSession<B> {
    pub fn new(pipeline: PipelineInfo, backend: Arc<B>, config: SessionConfig) -> Self {
        let resolver = VersionResolver::new(backend.clone());
        let search = VersionSearch::new(backend.clone(), pipeline.id, config.search_debounce());

        Self {
            pipeline,
            backend,
            config,
            resolver,
            search,
            state: Mutex::new(SessionState::default()),
            event_handlers: Mutex::new(Vec::new()),
        }
    }

    pub fn pipeline(&self) -> &PipelineInfo {
        &self.pipeline
    }

    /// Add an event handler
    pub async fn add_event_handler<F>(&self, handler: F)
    where
        F: Fn(SessionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.lock().await.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    async fn emit_event(&self, event: SessionEvent) {
        let handlers = self.event_handlers.lock().await;
        for handler in handlers.iter() {
            handler(event.clone());
        }
    }

    /// Open (or reopen) the session
    ///
    /// Returns `Ok(false)` if the resolution was superseded before it landed.
    pub async fn open(&self, origin: SessionOrigin) -> Result<bool, SessionError> {
        self.state.lock().await.closed = false;
        info!("Opening run session for {}", self.pipeline.code);

        let selection = match origin {
            SessionOrigin::Current => VersionSelection::Current,
            SessionOrigin::PriorRun(run) => VersionSelection::PriorRun(run),
        };
        self.switch_to(selection).await
    }

    /// Switch to a version the user picked
    pub async fn select_version(&self, version: Version) -> Result<bool, SessionError> {
        self.switch_to(VersionSelection::Explicit(version)).await
    }

    /// Switch back to the pipeline's current version
    pub async fn select_current(&self) -> Result<bool, SessionError> {
        self.switch_to(VersionSelection::Current).await
    }

    async fn switch_to(&self, selection: VersionSelection) -> Result<bool, SessionError> {
        // Take the generation and reset under the same lock the result is applied under
        let generation = {
            let mut state = self.state.lock().await;
            if state.closed {
                return Err(SessionError::Closed);
            }
            let generation = self.resolver.begin();
            state.reset();
            generation
        };
        debug!("Resolving version {} for {}", generation, self.pipeline.code);

        let resolved = self
            .resolver
            .resolve_as(generation, &self.pipeline, selection)
            .await;

        match resolved {
            Ok(Some(resolution)) => {
                let event = {
                    let mut state = self.state.lock().await;
                    if !self.resolver.is_current(resolution.generation) {
                        None
                    } else {
                        let event = SessionEvent::VersionResolved {
                            version_id: resolution.version.id,
                            number: resolution.version.number,
                        };
                        state.values = resolution.seed;
                        state.active = Some(resolution.version);
                        Some(event)
                    }
                };

                match event {
                    Some(event) => {
                        info!("Active version for {}: {:?}", self.pipeline.code, event);
                        self.emit_event(event).await;
                        Ok(true)
                    }
                    None => {
                        self.emit_event(SessionEvent::StaleResolutionDiscarded { generation })
                            .await;
                        Ok(false)
                    }
                }
            }
            Ok(None) => {
                self.emit_event(SessionEvent::StaleResolutionDiscarded { generation })
                    .await;
                Ok(false)
            }
            Err(error) => {
                {
                    let mut state = self.state.lock().await;
                    if !self.resolver.is_current(generation) {
                        return Ok(false);
                    }
                    state.notice = Some(error.to_string());
                }
                warn!("Version resolution failed for {}: {}", self.pipeline.code, error);
                self.emit_event(SessionEvent::ResolutionFailed {
                    error: error.to_string(),
                })
                .await;
                Err(error)
            }
        }
    }

    /// Search the pipeline's versions (debounced)
    ///
    /// Returns `Ok(None)` when a newer search superseded this one.
    pub async fn search_versions(&self, query: &str) -> Result<Option<Vec<Version>>, SessionError> {
        self.search
            .search(query)
            .await
            .map_err(SessionError::Search)
    }

    /// Set the raw value of a field
    pub async fn set_value(
        &self,
        code: impl Into<String>,
        raw: impl Into<Value>,
    ) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(SessionError::Closed);
        }
        let code = code.into();
        state.errors.remove(&code);
        state.values.insert(code, raw.into());
        Ok(())
    }

    /// Current raw form values
    pub async fn values(&self) -> FormValues {
        self.state.lock().await.values.clone()
    }

    pub async fn active_version(&self) -> Option<Version> {
        self.state.lock().await.active.clone()
    }

    /// Field errors from the last validation
    pub async fn errors(&self) -> FieldErrors {
        self.state.lock().await.errors.clone()
    }

    /// Error banner from the last failed submission or save
    pub async fn banner(&self) -> Option<String> {
        self.state.lock().await.banner.clone()
    }

    /// Inline notice from the last failed version resolution
    pub async fn notice(&self) -> Option<String> {
        self.state.lock().await.notice.clone()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }

    /// Validate the form against the active version
    pub async fn validate(&self) -> Result<FieldErrors, SessionError> {
        let mut state = self.state.lock().await;
        let active = state.active.as_ref().ok_or(SessionError::NoActiveVersion)?;

        let errors = validate(
            &active.schema,
            &state.values,
            &self.pipeline.validation_context(),
        );
        state.errors = errors.clone();
        Ok(errors)
    }

    /// Build the configuration for the active version
    pub async fn build(&self) -> Option<RunConfiguration> {
        let state = self.state.lock().await;
        state
            .active
            .as_ref()
            .map(|active| build(&active.schema, &state.values))
    }

    /// Validate, build and hand the configuration over for the given operation
    async fn prepare(&self) -> Result<(Generation, Uuid, RunConfiguration), SessionError> {
        let prepared = {
            let mut state = self.state.lock().await;
            if state.closed {
                return Err(SessionError::Closed);
            }
            let active = state.active.as_ref().ok_or(SessionError::NoActiveVersion)?;

            let errors = validate(
                &active.schema,
                &state.values,
                &self.pipeline.validation_context(),
            );
            if errors.is_empty() {
                let config = build(&active.schema, &state.values);
                let version_id = active.id;
                state.errors.clear();
                state.banner = None;
                Ok((self.resolver.current(), version_id, config))
            } else {
                state.errors = errors.clone();
                Err(errors)
            }
        };

        match prepared {
            Ok(prepared) => Ok(prepared),
            Err(errors) => {
                debug!("{} field(s) invalid for {}", errors.len(), self.pipeline.code);
                self.emit_event(SessionEvent::ValidationFailed {
                    errors: errors.clone(),
                })
                .await;
                Err(SessionError::Validation(errors))
            }
        }
    }

    /// Validate and submit a run of the active version
    ///
    /// Nothing is sent when validation fails. When the backend rejects the
    /// run, the form values stay in place and the error becomes the banner.
    pub async fn submit(&self, notify: bool) -> Result<RunHandle, SessionError> {
        if !self.pipeline.permissions.run {
            return Err(SessionError::PermissionDenied("run this pipeline"));
        }

        let (generation, version_id, config) = self.prepare().await?;

        match self
            .backend
            .submit_run(self.pipeline.id, &config, version_id, notify)
            .await
        {
            Ok(handle) => {
                info!(
                    "Submitted run {} of {} (version {})",
                    handle.id, self.pipeline.code, version_id
                );
                if self.config.close_on_submit {
                    let mut state = self.state.lock().await;
                    // A close or switch during the call already reset the form
                    if self.resolver.is_current(generation) {
                        self.shut_locked(&mut state);
                    }
                }
                self.emit_event(SessionEvent::RunSubmitted {
                    run_id: handle.id,
                    version_id,
                })
                .await;
                Ok(handle)
            }
            Err(error) => {
                warn!("Run submission failed for {}: {}", self.pipeline.code, error);
                self.set_banner(generation, error.to_string()).await;
                self.emit_event(SessionEvent::SubmissionFailed {
                    error: error.to_string(),
                })
                .await;
                Err(SessionError::Submission(error))
            }
        }
    }

    /// Validate and store the form as the active version's default config
    pub async fn save_default_config(&self) -> Result<Version, SessionError> {
        if !self.pipeline.permissions.update_version {
            return Err(SessionError::PermissionDenied("update this version"));
        }

        let (generation, version_id, config) = self.prepare().await?;

        match self
            .backend
            .save_version_default_config(version_id, &config)
            .await
        {
            Ok(version) => {
                info!("Saved default config of version {}", version.number);
                {
                    let mut state = self.state.lock().await;
                    // The user may have switched away while the save was in flight
                    if self.resolver.is_current(generation) {
                        state.active = Some(version.clone());
                    }
                }
                self.emit_event(SessionEvent::DefaultConfigSaved { version_id })
                    .await;
                Ok(version)
            }
            Err(error) => {
                warn!("Saving default config failed: {}", error);
                self.set_banner(generation, error.to_string()).await;
                self.emit_event(SessionEvent::SubmissionFailed {
                    error: error.to_string(),
                })
                .await;
                Err(SessionError::Submission(error))
            }
        }
    }

    /// Close the session, dropping in-flight resolutions and searches
    pub async fn close(&self) {
        self.shut().await;
        self.emit_event(SessionEvent::Closed).await;
    }

    /// Show `message` as the banner unless the form was reset since `generation`
    async fn set_banner(&self, generation: Generation, message: String) {
        let mut state = self.state.lock().await;
        if self.resolver.is_current(generation) {
            state.banner = Some(message);
        } else {
            debug!("Dropping banner for superseded form {}", generation);
        }
    }

    async fn shut(&self) {
        let mut state = self.state.lock().await;
        self.shut_locked(&mut state);
    }

    fn shut_locked(&self, state: &mut SessionState) {
        self.resolver.invalidate();
        self.search.cancel();
        state.reset();
        state.closed = true;
        debug!("Closed run session for {}", self.pipeline.code);
    }
}
