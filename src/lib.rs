//! runconf - run configuration engine for data pipelines

pub mod backend;
pub mod cli;
pub mod core;
pub mod session;

// Re-export commonly used types
pub use crate::backend::{BackendError, InMemoryBackend, PipelineBackend, RunHandle};
pub use crate::core::{
    build, coerce, seed_config, validate, FieldError, FieldErrors, FormValues, Parameter,
    ParameterSchema, ParameterType, PipelineInfo, PriorRun, RunConfiguration, ValidationContext,
    Value, Version,
};
pub use crate::session::{RunSession, SessionConfig, SessionError, SessionEvent, SessionOrigin};
