//! Type-directed coercion of raw input into normalized values

use crate::core::parameter::{Parameter, ParameterType};
use crate::core::value::Value;
use regex::Regex;
use std::sync::LazyLock;

static INT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+").expect("valid integer pattern"));

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("valid float pattern")
});

/// Convert raw input into the normalized value for a parameter
///
/// Empty input becomes the parameter's empty value. Anything else is read as
/// a list of candidates (a scalar is a one-element list), each candidate is
/// converted according to the parameter type, and single-valued parameters
/// keep only the first one.
///
/// Numeric parse failures never error: they produce [`Value::Invalid`], which
/// validation reports.
pub fn coerce(parameter: &Parameter, raw: &Value) -> Value {
    if raw.is_empty() {
        return parameter.empty_value();
    }

    let candidates: Vec<&Value> = match raw {
        Value::List(items) => items
            .iter()
            .flat_map(|item| match item {
                Value::List(inner) => inner.iter().collect::<Vec<_>>(),
                other => vec![other],
            })
            .collect(),
        scalar => vec![scalar],
    };

    let mut coerced = candidates
        .into_iter()
        .map(|candidate| coerce_element(parameter.param_type, candidate));

    if parameter.multiple {
        Value::List(coerced.collect())
    } else {
        coerced.next().unwrap_or(Value::Null)
    }
}

/// Convert one candidate element
fn coerce_element(param_type: ParameterType, value: &Value) -> Value {
    match param_type {
        ParameterType::Int => match value {
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) if fits_i64(*f) => Value::Int(f.trunc() as i64),
            Value::Str(s) => parse_int(s).map(Value::Int).unwrap_or_else(|| invalid(value)),
            _ => invalid(value),
        },
        ParameterType::Float => match value {
            Value::Float(f) if f.is_nan() => invalid(value),
            Value::Float(f) => Value::Float(*f),
            Value::Int(i) => Value::Float(*i as f64),
            Value::Str(s) => parse_float(s).map(Value::Float).unwrap_or_else(|| invalid(value)),
            _ => invalid(value),
        },
        ParameterType::Bool => match value {
            Value::Bool(b) => Value::Bool(*b),
            Value::Str(s) if s.eq_ignore_ascii_case("true") => Value::Bool(true),
            Value::Str(s) if s.eq_ignore_ascii_case("false") => Value::Bool(false),
            _ => invalid(value),
        },
        ParameterType::Str | ParameterType::Dataset | ParameterType::Connection(_) => match value {
            Value::Null => Value::Null,
            Value::Str(s) | Value::Invalid(s) => Value::Str(s.clone()),
            other => Value::Str(other.to_text()),
        },
    }
}

fn invalid(value: &Value) -> Value {
    match value {
        Value::Invalid(raw) => Value::Invalid(raw.clone()),
        other => Value::Invalid(other.to_text()),
    }
}

/// Whether the integer part of `f` is representable as an `i64`
fn fits_i64(f: f64) -> bool {
    let truncated = f.trunc();
    truncated >= i64::MIN as f64 && truncated < i64::MAX as f64
}

/// Base-10 integer parse of the leading digits, ignoring trailing text
fn parse_int(s: &str) -> Option<i64> {
    INT_PREFIX
        .find(s.trim_start())
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Floating-point parse of the longest numeric prefix
fn parse_float(s: &str) -> Option<f64> {
    FLOAT_PREFIX
        .find(s.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
