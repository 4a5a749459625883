//! Test utility functions for runconf
#![allow(dead_code)]

use runconf::backend::{BackendError, InMemoryBackend, PipelineBackend, RunHandle};
use runconf::core::{
    FieldErrors, Parameter, ParameterSchema, ParameterType, PipelineInfo, RunConfiguration,
    Version,
};
use runconf::session::{RunSession, SessionConfig, SessionEvent};

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Backend wrapping [`InMemoryBackend`] with delays and injected failures
pub struct MockBackend {
    inner: InMemoryBackend,
    fetch_delays: Mutex<Vec<Duration>>,
    submit_failure: Mutex<Option<BackendError>>,
    submit_delay: Option<Duration>,
    search_failure: Mutex<Option<(Duration, BackendError)>>,
    save_failure: Mutex<Option<BackendError>>,
    fetches: AtomicUsize,
    submits: AtomicUsize,
}

impl MockBackend {
    pub fn new(pipeline: &PipelineInfo, versions: Vec<Version>) -> Self {
        Self {
            inner: InMemoryBackend::with_pipeline(pipeline, versions),
            fetch_delays: Mutex::new(Vec::new()),
            submit_failure: Mutex::new(None),
            submit_delay: None,
            search_failure: Mutex::new(None),
            save_failure: Mutex::new(None),
            fetches: AtomicUsize::new(0),
            submits: AtomicUsize::new(0),
        }
    }

    /// Delay the next current-version fetches, one delay per call
    pub fn with_fetch_delays(self, delays: Vec<Duration>) -> Self {
        *self.fetch_delays.lock().unwrap() = delays;
        self
    }

    /// Delay every submission
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    /// Make the next search wait `delay` and then fail with `error`
    pub fn fail_next_search(&self, delay: Duration, error: BackendError) {
        *self.search_failure.lock().unwrap() = Some((delay, error));
    }

    /// Make every submission fail with `error`
    pub fn fail_submissions(&self, error: BackendError) {
        *self.submit_failure.lock().unwrap() = Some(error);
    }

    /// Make every default-config save fail with `error`
    pub fn fail_saves(&self, error: BackendError) {
        *self.save_failure.lock().unwrap() = Some(error);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of submissions that reached the backend
    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub async fn runs(&self) -> Vec<RunHandle> {
        self.inner.runs().await
    }

    pub async fn version(&self, version_id: Uuid) -> Option<Version> {
        self.inner.version(version_id).await
    }
}

#[async_trait]
impl PipelineBackend for MockBackend {
    async fn fetch_current_version(&self, pipeline_id: Uuid) -> Result<Version, BackendError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = {
            let mut delays = self.fetch_delays.lock().unwrap();
            if delays.is_empty() {
                None
            } else {
                Some(delays.remove(0))
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.fetch_current_version(pipeline_id).await
    }

    async fn search_versions(
        &self,
        pipeline_id: Uuid,
        query: &str,
    ) -> Result<Vec<Version>, BackendError> {
        let failure = self.search_failure.lock().unwrap().take();
        if let Some((delay, error)) = failure {
            tokio::time::sleep(delay).await;
            return Err(error);
        }
        self.inner.search_versions(pipeline_id, query).await
    }

    async fn submit_run(
        &self,
        pipeline_id: Uuid,
        config: &RunConfiguration,
        version_id: Uuid,
        notify: bool,
    ) -> Result<RunHandle, BackendError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.submit_failure.lock().unwrap().clone();
        if let Some(error) = failure {
            return Err(error);
        }
        self.inner
            .submit_run(pipeline_id, config, version_id, notify)
            .await
    }

    async fn save_version_default_config(
        &self,
        version_id: Uuid,
        config: &RunConfiguration,
    ) -> Result<Version, BackendError> {
        let failure = self.save_failure.lock().unwrap().clone();
        if let Some(error) = failure {
            return Err(error);
        }
        self.inner.save_version_default_config(version_id, config).await
    }
}

/// Version 1 declares `x` and `n`; version 2 declares `n` and `tags`
pub fn two_versions() -> (Version, Version) {
    let v1 = Version::new(
        1,
        "Ada",
        ParameterSchema::new(vec![
            Parameter::new("x", ParameterType::Str).with_default("only in v1"),
            Parameter::new("n", ParameterType::Int).required(),
        ]),
    );
    let v2 = Version::new(
        2,
        "Grace",
        ParameterSchema::new(vec![
            Parameter::new("n", ParameterType::Int).required().with_default(5i64),
            Parameter::new("tags", ParameterType::Str).multiple(),
        ]),
    );
    (v1, v2)
}

/// Session over a mock backend, with every emitted event recorded
pub async fn session_with(
    pipeline: PipelineInfo,
    backend: MockBackend,
) -> (RunSession<MockBackend>, Arc<MockBackend>, Arc<Mutex<Vec<SessionEvent>>>) {
    let backend = Arc::new(backend);
    let session = RunSession::new(
        pipeline,
        backend.clone(),
        SessionConfig::new().with_search_debounce(20),
    );

    let events = Arc::new(Mutex::new(Vec::new()));
    let recorder = events.clone();
    session
        .add_event_handler(move |event| recorder.lock().unwrap().push(event))
        .await;

    (session, backend, events)
}

/// Assert a field carries the given error message
pub fn assert_field_error(errors: &FieldErrors, code: &str, expected: &str) {
    let error = errors
        .get(code)
        .unwrap_or_else(|| panic!("Field '{}' has no error, errors: {:?}", code, errors));
    assert_eq!(
        error.to_string(),
        expected,
        "Field '{}' error mismatch",
        code
    );
}

/// Count recorded events matching a predicate
pub fn count_events<F>(events: &Mutex<Vec<SessionEvent>>, predicate: F) -> usize
where
    F: Fn(&SessionEvent) -> bool,
{
    events.lock().unwrap().iter().filter(|e| predicate(e)).count()
}
