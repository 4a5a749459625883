//! Core domain models
//!
//! Parameter schemas, raw and normalized values, and the pure functions that
//! turn form input into a run configuration.

pub mod coerce;
pub mod config;
pub mod parameter;
pub mod run_config;
pub mod validate;
pub mod value;
pub mod version;
pub mod widget;

pub use coerce::coerce;
pub use config::PipelineDefinition;
pub use parameter::{ConnectionKind, Parameter, ParameterSchema, ParameterType, SchemaError};
pub use run_config::{build, seed_config, FormValues, RunConfiguration};
pub use validate::{validate, FieldError, FieldErrors, RequiredOverride, ValidationContext};
pub use value::Value;
pub use version::{Permissions, PipelineInfo, PriorRun, Version};
pub use widget::Widget;
