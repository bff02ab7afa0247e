// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vector assembly and component extraction.

use crate::error::CompileError;
use crate::evaluator::EmitContext;
use crate::registry::{ComponentSchema, Emission, NodeComponent, PortSchema, TypedExpr};
use indexmap::IndexMap;
use shaderweave_graph::{Node, Value, ValueType};

use super::numeric_input;

/// Packs four scalars into a vec4; `w` defaults to 1.
pub struct Combine;

impl NodeComponent for Combine {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            inputs: vec![
                PortSchema::new("x", ValueType::Float),
                PortSchema::new("y", ValueType::Float),
                PortSchema::new("z", ValueType::Float),
                PortSchema::with_default("w", Value::Float(1.0)),
            ],
            outputs: vec![PortSchema::new("out", ValueType::Vec4)],
            ..ComponentSchema::default()
        }
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        _node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let x = numeric_input(inputs, "x", ValueType::Float)?;
        let y = numeric_input(inputs, "y", ValueType::Float)?;
        let z = numeric_input(inputs, "z", ValueType::Float)?;
        let w = numeric_input(inputs, "w", ValueType::Float)?;
        let (var, line) = ctx.assign(
            ValueType::Vec4,
            &format!("vec4({}, {}, {}, {})", x.expr, y.expr, z.expr, w.expr),
        );
        let mut emission = Emission::inline("out", TypedExpr::new(var, ValueType::Vec4));
        emission.code.push(line);
        Ok(emission)
    }
}

/// Unpacks a vec4 into scalar components; the source is evaluated once and
/// all four outputs are memoized from the same variable.
pub struct Split;

impl NodeComponent for Split {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            inputs: vec![PortSchema::new("value", ValueType::Vec4)],
            outputs: vec![
                PortSchema::new("x", ValueType::Float),
                PortSchema::new("y", ValueType::Float),
                PortSchema::new("z", ValueType::Float),
                PortSchema::new("w", ValueType::Float),
            ],
            ..ComponentSchema::default()
        }
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        _node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let value = numeric_input(inputs, "value", ValueType::Vec4)?;
        let (var, line) = ctx.assign(ValueType::Vec4, &value.expr);
        let mut emission = Emission::default();
        emission.code.push(line);
        for lane in ["x", "y", "z", "w"] {
            emission.outputs.insert(
                lane.to_string(),
                TypedExpr::new(format!("{var}.{lane}"), ValueType::Float),
            );
        }
        Ok(emission)
    }
}
