//! Run configuration seeding and building

use crate::core::coerce::coerce;
use crate::core::parameter::ParameterSchema;
use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// In-memory form state: parameter code to raw value
///
/// May hold codes the active schema does not declare; [`build`] ignores them.
pub type FormValues = BTreeMap<String, Value>;

/// Normalized code-to-value mapping used to trigger one execution
///
/// Serializes as a flat JSON object with one scalar-or-array entry per
/// declared parameter code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunConfiguration(FormValues);

impl RunConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value of a parameter
    pub fn get(&self, code: &str) -> Option<&Value> {
        self.0.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Borrow the configuration as form values
    pub fn values(&self) -> &FormValues {
        &self.0
    }

    pub fn into_values(self) -> FormValues {
        self.0
    }

    /// Encode for the wire
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(code, value)| (code.clone(), serde_json::Value::from(value.clone())))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for RunConfiguration {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Seed form values for a schema from a stored configuration
///
/// Per parameter: the stored value if present and not null, else the
/// declared default, else the parameter's empty value. Stored values for
/// codes the schema does not declare are dropped.
pub fn seed_config(schema: &ParameterSchema, stored: &FormValues) -> FormValues {
    schema
        .iter()
        .map(|parameter| {
            let value = stored
                .get(&parameter.code)
                .filter(|value| **value != Value::Null)
                .cloned()
                .or_else(|| parameter.default.clone())
                .unwrap_or_else(|| parameter.empty_value());
            (parameter.code.clone(), value)
        })
        .collect()
}

/// Coerce every declared parameter's form value
///
/// Extraneous keys in `form_values` are ignored and missing ones coerce from
/// null. Applying `build` to its own output returns the same configuration.
pub fn build(schema: &ParameterSchema, form_values: &FormValues) -> RunConfiguration {
    schema
        .iter()
        .map(|parameter| {
            let raw = form_values.get(&parameter.code).unwrap_or(&Value::Null);
            (parameter.code.clone(), coerce(parameter, raw))
        })
        .collect()
}
