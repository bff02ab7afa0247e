// SPDX-License-Identifier: MIT OR Apache-2.0
//! The cross-stage varying bridge.

use crate::error::CompileError;
use crate::evaluator::EmitContext;
use crate::registry::{ComponentSchema, Emission, NodeComponent, PortSchema, TypedExpr};
use indexmap::IndexMap;
use shaderweave_graph::{Node, ShaderStage, ValueType};

use super::numeric_input;

/// Kind id of the varying bridge node.
pub const VARYING_KIND: &str = "varying";

/// Carries a vertex-stage value into the fragment stage.
///
/// The vertex pass evaluates the upstream expression and writes it into a
/// per-node varying slot; the fragment pass reads the slot without
/// recursing upstream, so vertex-only work never leaks into the fragment
/// shader.
pub struct VaryingBridge;

impl VaryingBridge {
    fn symbol(node: &Node) -> String {
        format!("v_bridge_{}", node.id.short())
    }
}

impl NodeComponent for VaryingBridge {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            inputs: vec![PortSchema::new("in", ValueType::Vec3)],
            outputs: vec![PortSchema::new("out", ValueType::Vec3)],
            ..ComponentSchema::default()
        }
    }

    fn skip_input_resolution(&self, stage: ShaderStage) -> bool {
        stage == ShaderStage::Fragment
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let symbol = Self::symbol(node);
        ctx.declare_varying(symbol.clone(), ValueType::Vec3);

        let mut emission = Emission::inline("out", TypedExpr::new(symbol.clone(), ValueType::Vec3));
        if ctx.stage == ShaderStage::Vertex {
            let value = numeric_input(inputs, "in", ValueType::Vec3)?;
            emission.code.push(format!("{} = {};", symbol, value.expr));
        }
        Ok(emission)
    }
}
