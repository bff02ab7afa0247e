// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use crate::value::{Value, ValueType};
use serde::{Deserialize, Serialize};

/// A named port on a node.
///
/// Input ports carry a literal [`Value`] used when no connection feeds
/// them; output ports carry the declared result type. The port name is the
/// key of the owning node's port map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Declared value type
    pub value_type: ValueType,
    /// Literal value (the default for unconnected inputs)
    pub value: Value,
    /// Optional display name for the editor
    pub display: Option<String>,
}

impl Port {
    /// Create a port of the given type with its type default as literal.
    pub fn new(value_type: ValueType) -> Self {
        Self {
            value_type,
            value: value_type.default_value(),
            display: None,
        }
    }

    /// Create a port with an explicit literal value.
    pub fn with_value(value: Value) -> Self {
        Self {
            value_type: value.value_type(),
            value,
            display: None,
        }
    }

    /// Set the display name.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_default_literal() {
        let port = Port::new(ValueType::Vec3);
        assert_eq!(port.value, Value::Vec3([0.0; 3]));
        assert_eq!(port.value_type, ValueType::Vec3);
    }

    #[test]
    fn test_port_from_value() {
        let port = Port::with_value(Value::Float(2.5)).with_display("Strength");
        assert_eq!(port.value_type, ValueType::Float);
        assert_eq!(port.display.as_deref(), Some("Strength"));
    }
}
