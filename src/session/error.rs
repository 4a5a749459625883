//! Session error types

use crate::backend::BackendError;
use crate::core::FieldErrors;
use thiserror::Error;

/// Error types for run session operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// No version has resolved yet, or the last switch is still in flight
    #[error("No active version")]
    NoActiveVersion,

    #[error("Could not resolve the pipeline version: {0}")]
    SchemaResolution(#[source] BackendError),

    /// Blocks submission locally, before any remote call
    #[error("{} field(s) have errors", .0.len())]
    Validation(FieldErrors),

    #[error("You are not allowed to {0}")]
    PermissionDenied(&'static str),

    /// The remote mutation failed; form values are kept for a retry
    #[error("Submission failed: {0}")]
    Submission(#[source] BackendError),

    #[error("Version search failed: {0}")]
    Search(#[source] BackendError),

    #[error("Session is closed")]
    Closed,
}
