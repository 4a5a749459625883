//! Field validation for run configurations

use crate::core::coerce::coerce;
use crate::core::parameter::{Parameter, ParameterSchema, ParameterType};
use crate::core::run_config::FormValues;
use crate::core::value::Value;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// External condition that can make an optional parameter required
///
/// Implemented by [`ValidationContext`] and by any `Fn(&Parameter) -> bool`.
pub trait RequiredOverride {
    fn required_override(&self, parameter: &Parameter) -> bool;
}

impl<F> RequiredOverride for F
where
    F: Fn(&Parameter) -> bool,
{
    fn required_override(&self, parameter: &Parameter) -> bool {
        self(parameter)
    }
}

/// Validation context derived from the pipeline
///
/// A scheduled pipeline runs unattended with its stored configuration, so
/// every parameter must hold a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationContext {
    /// Whether the pipeline has an active schedule
    pub scheduled: bool,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled() -> Self {
        Self { scheduled: true }
    }
}

impl RequiredOverride for ValidationContext {
    fn required_override(&self, _parameter: &Parameter) -> bool {
        self.scheduled
    }
}

/// Error attached to a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("This field is required")]
    Required,

    #[error("Enter a valid number")]
    InvalidNumber,

    #[error("Enter true or false")]
    InvalidBoolean,
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Field errors keyed by parameter code
pub type FieldErrors = BTreeMap<String, FieldError>;

/// Compute the field errors of `values` against `schema`
///
/// A field is effectively required when the parameter is declared required
/// or `context` overrides it. Under the override a boolean set to `false`
/// counts as empty. Numeric fields also fail when any element did not parse.
pub fn validate<C>(schema: &ParameterSchema, values: &FormValues, context: &C) -> FieldErrors
where
    C: RequiredOverride + ?Sized,
{
    let mut errors = FieldErrors::new();

    for parameter in schema {
        if let Some(error) = validate_field(parameter, values.get(&parameter.code), context) {
            errors.insert(parameter.code.clone(), error);
        }
    }

    errors
}

fn validate_field<C>(parameter: &Parameter, raw: Option<&Value>, context: &C) -> Option<FieldError>
where
    C: RequiredOverride + ?Sized,
{
    let value = coerce(parameter, raw.unwrap_or(&Value::Null));
    let overridden = context.required_override(parameter);
    let effectively_required = parameter.required || overridden;

    let empty = value.is_empty()
        || (overridden
            && parameter.param_type == ParameterType::Bool
            && value == Value::Bool(false));

    if effectively_required && empty {
        return Some(FieldError::Required);
    }

    match parameter.param_type {
        ParameterType::Int | ParameterType::Float if value.is_invalid() => {
            Some(FieldError::InvalidNumber)
        }
        ParameterType::Bool if value.is_invalid() => Some(FieldError::InvalidBoolean),
        _ => None,
    }
}
