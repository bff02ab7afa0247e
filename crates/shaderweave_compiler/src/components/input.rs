// SPDX-License-Identifier: MIT OR Apache-2.0
//! Geometry and frame inputs that map straight onto template symbols.

use crate::error::CompileError;
use crate::evaluator::EmitContext;
use crate::registry::{ComponentSchema, Emission, NodeComponent, PortSchema, TypedExpr};
use indexmap::IndexMap;
use shaderweave_graph::{Node, ValueType};

/// Reads a fixed symbol provided by the stage template (`sw_uv`,
/// `sw_worldPos`, `sw_time`, ...). Pure; emits no code.
pub struct SymbolInput {
    symbol: &'static str,
    value_type: ValueType,
}

impl SymbolInput {
    pub fn new(symbol: &'static str, value_type: ValueType) -> Self {
        Self { symbol, value_type }
    }
}

impl NodeComponent for SymbolInput {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            outputs: vec![PortSchema::new("out", self.value_type)],
            ..ComponentSchema::default()
        }
    }

    fn emit(
        &self,
        _ctx: &mut EmitContext<'_>,
        _node: &Node,
        _inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        Ok(Emission::inline(
            "out",
            TypedExpr::new(self.symbol, self.value_type),
        ))
    }
}
