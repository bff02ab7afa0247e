// SPDX-License-Identifier: MIT OR Apache-2.0
//! Literal constant nodes, one kind per numeric type.

use crate::error::CompileError;
use crate::evaluator::EmitContext;
use crate::registry::{ComponentSchema, Emission, NodeComponent, PortSchema, TypedExpr};
use indexmap::IndexMap;
use shaderweave_graph::{Node, ValueType};

/// Emits its `value` port inline; never allocates a variable.
pub struct Constant {
    value_type: ValueType,
}

impl Constant {
    pub fn new(value_type: ValueType) -> Self {
        Self { value_type }
    }
}

impl NodeComponent for Constant {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            inputs: vec![PortSchema::new("value", self.value_type)],
            outputs: vec![PortSchema::new("out", self.value_type)],
            ..ComponentSchema::default()
        }
    }

    fn emit(
        &self,
        _ctx: &mut EmitContext<'_>,
        _node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let value = super::numeric_input(inputs, "value", self.value_type)?;
        Ok(Emission::inline("out", value))
    }
}
