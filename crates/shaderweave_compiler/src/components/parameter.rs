// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material parameter reads.

use crate::error::CompileError;
use crate::evaluator::EmitContext;
use crate::registry::{ComponentSchema, Emission, NodeComponent, PortSchema, TypedExpr};
use crate::result::UniformEntry;
use crate::subgraph::sanitize_identifier;
use indexmap::IndexMap;
use shaderweave_graph::{Node, Value, ValueType};

/// Reads a named entry of the graph's parameter table as a uniform.
///
/// The uniform map key is `Parameter_<name>`; the emitted symbol is
/// `u_<name>`. The output type follows the parameter declaration, not the
/// node's authored port type.
pub struct ParameterRead;

impl NodeComponent for ParameterRead {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            inputs: vec![PortSchema::new("name", ValueType::String)],
            outputs: vec![PortSchema::new("out", ValueType::Vec4)],
            ..ComponentSchema::default()
        }
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        node: &Node,
        _inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let name = match node.input("name").map(|p| &p.value) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(CompileError::UnknownParameter("<unnamed>".to_string())),
        };
        let parameter = ctx
            .graph
            .parameter(&name)
            .cloned()
            .ok_or_else(|| CompileError::UnknownParameter(name.clone()))?;

        let symbol = format!("u_{}", sanitize_identifier(&name));
        ctx.add_uniform(
            format!("Parameter_{name}"),
            UniformEntry {
                name: symbol.clone(),
                value_type: parameter.value_type,
                value: parameter.value,
            },
        )?;
        Ok(Emission::inline(
            "out",
            TypedExpr::new(symbol, parameter.value_type),
        ))
    }
}
