//! Parameter schema model

use crate::core::value::Value;
use crate::core::widget::Widget;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid code pattern"));

/// Kind of external connection a parameter refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Postgresql,
    S3,
    Gcs,
    Dhis2,
    Iaso,
    Custom,
}

impl ConnectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionKind::Postgresql => "postgresql",
            ConnectionKind::S3 => "s3",
            ConnectionKind::Gcs => "gcs",
            ConnectionKind::Dhis2 => "dhis2",
            ConnectionKind::Iaso => "iaso",
            ConnectionKind::Custom => "custom",
        }
    }
}

/// Declared type of a parameter
///
/// This is a closed set: an unknown type string fails to parse instead of
/// falling through to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ParameterType {
    Bool,
    Int,
    Float,
    Str,
    Dataset,
    Connection(ConnectionKind),
}

/// Returned when a type string names no known parameter type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown parameter type '{0}'")]
pub struct UnknownParameterType(pub String);

impl ParameterType {
    /// Get the string representation of this parameter type
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::Bool => "bool",
            ParameterType::Int => "int",
            ParameterType::Float => "float",
            ParameterType::Str => "str",
            ParameterType::Dataset => "dataset",
            ParameterType::Connection(kind) => kind.as_str(),
        }
    }

    /// Check if values of this type are parsed as numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, ParameterType::Int | ParameterType::Float)
    }
}

impl FromStr for ParameterType {
    type Err = UnknownParameterType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let param_type = match s {
            "bool" => ParameterType::Bool,
            "int" => ParameterType::Int,
            "float" => ParameterType::Float,
            "str" => ParameterType::Str,
            "dataset" => ParameterType::Dataset,
            "postgresql" => ParameterType::Connection(ConnectionKind::Postgresql),
            "s3" => ParameterType::Connection(ConnectionKind::S3),
            "gcs" => ParameterType::Connection(ConnectionKind::Gcs),
            "dhis2" => ParameterType::Connection(ConnectionKind::Dhis2),
            "iaso" => ParameterType::Connection(ConnectionKind::Iaso),
            "custom" => ParameterType::Connection(ConnectionKind::Custom),
            other => return Err(UnknownParameterType(other.to_string())),
        };
        Ok(param_type)
    }
}

impl TryFrom<String> for ParameterType {
    type Error = UnknownParameterType;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ParameterType> for String {
    fn from(param_type: ParameterType) -> Self {
        param_type.as_str().to_string()
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_required() -> bool {
    true
}

/// One typed, named slot in a pipeline version's input schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Unique key within the schema
    pub code: String,

    /// Human-readable name
    pub name: String,

    /// Declared type
    #[serde(rename = "type")]
    pub param_type: ParameterType,

    /// Whether a value must be provided
    #[serde(default = "default_required")]
    pub required: bool,

    /// Whether the parameter takes a list of values
    #[serde(default)]
    pub multiple: bool,

    /// Allowed raw values, in display order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,

    /// Raw default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Help text shown next to the field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Parameter {
    /// Create an optional, single-valued parameter named after its code
    pub fn new(code: impl Into<String>, param_type: ParameterType) -> Self {
        let code = code.into();
        Self {
            name: code.clone(),
            code,
            param_type,
            required: false,
            multiple: false,
            choices: None,
            default: None,
            help: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn with_choices<T: Into<Value>>(mut self, choices: Vec<T>) -> Self {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// The value a field of this parameter holds when nothing was entered
    pub fn empty_value(&self) -> Value {
        if self.multiple {
            Value::List(Vec::new())
        } else {
            Value::Null
        }
    }

    /// The control a front end must show for this parameter
    pub fn widget(&self) -> Widget {
        Widget::for_parameter(self)
    }
}

/// Problems found when checking a parameter schema
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Duplicate parameter code: {0}")]
    DuplicateCode(String),

    #[error("Parameter code '{0}' is not a valid identifier")]
    InvalidCode(String),

    #[error("Boolean parameter '{0}' cannot take multiple values")]
    MultipleBoolean(String),

    #[error("Boolean parameter '{0}' cannot declare choices")]
    BooleanChoices(String),

    #[error("Parameter '{0}' declares an empty list of choices")]
    EmptyChoices(String),

    #[error("Default value {value} of parameter '{code}' is not one of its choices")]
    DefaultNotInChoices { code: String, value: Value },
}

/// Ordered set of parameters belonging to one version
///
/// Order only affects display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSchema {
    parameters: Vec<Parameter>,
}

impl ParameterSchema {
    /// Create a schema without checking it (see [`ParameterSchema::validate`])
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    /// Create a schema and check it
    pub fn try_new(parameters: Vec<Parameter>) -> Result<Self, SchemaError> {
        let schema = Self::new(parameters);
        schema.validate()?;
        Ok(schema)
    }

    /// Get a parameter by code
    pub fn get(&self, code: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameter codes in display order
    pub fn codes(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.code.as_str()).collect()
    }

    /// Check codes, boolean constraints and choices
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen_codes = HashSet::new();

        for parameter in &self.parameters {
            let code = &parameter.code;

            if !seen_codes.insert(code.as_str()) {
                return Err(SchemaError::DuplicateCode(code.clone()));
            }
            if !CODE_PATTERN.is_match(code) {
                return Err(SchemaError::InvalidCode(code.clone()));
            }

            if parameter.param_type == ParameterType::Bool {
                if parameter.multiple {
                    return Err(SchemaError::MultipleBoolean(code.clone()));
                }
                if parameter.choices.is_some() {
                    return Err(SchemaError::BooleanChoices(code.clone()));
                }
            }

            if let Some(choices) = &parameter.choices {
                if choices.is_empty() {
                    return Err(SchemaError::EmptyChoices(code.clone()));
                }

                if let Some(default) = &parameter.default {
                    let defaults = match default {
                        Value::List(items) => items.as_slice(),
                        single => std::slice::from_ref(single),
                    };
                    if let Some(missing) = defaults.iter().find(|d| !choices.contains(d)) {
                        return Err(SchemaError::DefaultNotInChoices {
                            code: code.clone(),
                            value: missing.clone(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a ParameterSchema {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

impl FromIterator<Parameter> for ParameterSchema {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
