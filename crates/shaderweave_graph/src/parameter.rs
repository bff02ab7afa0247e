// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph-level exposed parameters.

use crate::value::{Value, ValueType};
use serde::{Deserialize, Serialize};

/// A named, typed value exposed on the graph and bound to a shader uniform.
///
/// Parameter nodes reference parameters by name; referencing a name that
/// is not in the graph's parameter table is a compile error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Unique parameter name within the graph
    pub name: String,
    /// Declared value type
    pub value_type: ValueType,
    /// Default value reported to the output consumer
    pub value: Value,
}

impl Parameter {
    /// Create a parameter with the type's default value.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            value: value_type.default_value(),
        }
    }

    /// Create a parameter with an explicit default value.
    pub fn with_value(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value_type: value.value_type(),
            value,
        }
    }
}
