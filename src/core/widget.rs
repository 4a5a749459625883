//! Widget descriptor for parameter fields

use crate::core::parameter::{ConnectionKind, Parameter, ParameterType};
use crate::core::value::Value;
use serde::Serialize;

/// Control a front end shows for one parameter
///
/// Every parameter type maps to a widget, so there is no type that renders
/// nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    Switch,
    /// Fixed set of values; coercion still applies to the picked values
    Select { choices: Vec<Value>, multiple: bool },
    /// Free-text list, one entry per created tag
    TagInput,
    NumberInput { integer: bool },
    TextInput,
    DatasetPicker { multiple: bool },
    ConnectionPicker { kind: ConnectionKind, multiple: bool },
}

impl Widget {
    pub fn for_parameter(parameter: &Parameter) -> Self {
        let multiple = parameter.multiple;

        match parameter.param_type {
            ParameterType::Bool => Widget::Switch,
            ParameterType::Dataset => Widget::DatasetPicker { multiple },
            ParameterType::Connection(kind) => Widget::ConnectionPicker { kind, multiple },
            ParameterType::Int | ParameterType::Float | ParameterType::Str => {
                match &parameter.choices {
                    Some(choices) => Widget::Select {
                        choices: choices.clone(),
                        multiple,
                    },
                    None if multiple => Widget::TagInput,
                    None if parameter.param_type == ParameterType::Str => Widget::TextInput,
                    None => Widget::NumberInput {
                        integer: parameter.param_type == ParameterType::Int,
                    },
                }
            }
        }
    }
}
