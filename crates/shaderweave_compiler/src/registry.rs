// SPDX-License-Identifier: MIT OR Apache-2.0
//! Component registry: the closed per-kind codegen dispatch table.

use crate::error::{CompileError, RegistryError};
use crate::evaluator::EmitContext;
use indexmap::IndexMap;
use shaderweave_graph::{Node, Port, ShaderStage, Value, ValueType};
use std::sync::Arc;

/// Which stages a component's output may be consumed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageAffinity {
    /// Usable in both stages
    #[default]
    Any,
    /// Only meaningful in the vertex stage
    VertexOnly,
    /// Only meaningful in the fragment stage
    FragmentOnly,
}

/// Schema of one port declared by a component.
#[derive(Debug, Clone)]
pub struct PortSchema {
    /// Port name
    pub name: &'static str,
    /// Declared value type
    pub value_type: ValueType,
    /// Literal default; the type default when `None`
    pub default: Option<Value>,
}

impl PortSchema {
    /// Port of a type with the type default.
    pub fn new(name: &'static str, value_type: ValueType) -> Self {
        Self {
            name,
            value_type,
            default: None,
        }
    }

    /// Port with an explicit default literal.
    pub fn with_default(name: &'static str, default: Value) -> Self {
        Self {
            name,
            value_type: default.value_type(),
            default: Some(default),
        }
    }
}

/// Port schema and stage affinity of a component kind, fixed at
/// registration time.
#[derive(Debug, Clone, Default)]
pub struct ComponentSchema {
    /// Declared input ports, in order
    pub inputs: Vec<PortSchema>,
    /// Declared output ports, in order
    pub outputs: Vec<PortSchema>,
    /// Stage restriction
    pub affinity: StageAffinity,
}

/// A resolved expression together with its value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedExpr {
    /// Shader expression text (a generated variable name or inline literal)
    pub expr: String,
    /// Value type of the expression
    pub value_type: ValueType,
}

impl TypedExpr {
    /// Build a typed expression.
    pub fn new(expr: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            expr: expr.into(),
            value_type,
        }
    }
}

/// A reusable helper function emitted into the defines section.
#[derive(Debug, Clone)]
pub struct HelperDefine {
    /// Function name, the dedup key
    pub name: String,
    /// Full function text
    pub text: String,
}

/// What one component evaluation produced.
#[derive(Debug, Clone, Default)]
pub struct Emission {
    /// Expressions for each populated output port
    pub outputs: IndexMap<String, TypedExpr>,
    /// Instruction lines to append, in order
    pub code: Vec<String>,
    /// Helper functions to merge into the defines set
    pub defines: Vec<HelperDefine>,
}

impl Emission {
    /// Emission carrying a single output and no code.
    pub fn inline(port: &str, value: TypedExpr) -> Self {
        let mut outputs = IndexMap::new();
        outputs.insert(port.to_string(), value);
        Self {
            outputs,
            ..Self::default()
        }
    }
}

/// Codegen behavior of one node kind.
///
/// Implemented once per kind and stored by kind id; the evaluator resolves
/// input expressions, applies coercion, and then calls [`emit`](Self::emit).
pub trait NodeComponent: Send + Sync {
    /// Port schema and stage affinity.
    fn schema(&self) -> ComponentSchema;

    /// True when the evaluator must not recurse into this node's inputs
    /// for the given stage (the varying bridge reads a cross-stage slot
    /// instead of its upstream in the fragment stage).
    fn skip_input_resolution(&self, _stage: ShaderStage) -> bool {
        false
    }

    /// Produce output expressions and instruction lines for a node.
    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError>;
}

/// Registry mapping component kind ids to their [`NodeComponent`].
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    components: IndexMap<String, Arc<dyn NodeComponent>>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component kind.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        component: Arc<dyn NodeComponent>,
    ) -> Result<(), RegistryError> {
        let kind = kind.into();
        if self.components.contains_key(&kind) {
            return Err(RegistryError::DuplicateComponent(kind));
        }
        self.components.insert(kind, component);
        Ok(())
    }

    /// Look up a component by kind id.
    pub fn get(&self, kind: &str) -> Option<&Arc<dyn NodeComponent>> {
        self.components.get(kind)
    }

    /// Registered kind ids in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Build a node of a kind with its schema defaults.
    pub fn instantiate(&self, kind: &str) -> Option<Node> {
        let component = self.components.get(kind)?;
        let schema = component.schema();
        let mut node = Node::new(kind);
        for input in &schema.inputs {
            let port = match &input.default {
                Some(value) => Port::with_value(value.clone()),
                None => Port::new(input.value_type),
            };
            node.set_input(input.name, port);
        }
        for output in &schema.outputs {
            node.set_output(output.name, Port::new(output.value_type));
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::builtin_registry;

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = builtin_registry();
        let component = registry.get("add").expect("builtin add").clone();
        let err = registry.register("add", component).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateComponent("add".into()));
    }

    #[test]
    fn test_instantiate_applies_schema_defaults() {
        let registry = builtin_registry();
        let node = registry.instantiate("mix").expect("builtin mix");
        assert!(node.input("a").is_some());
        assert!(node.input("b").is_some());
        assert_eq!(node.input("t").unwrap().value, Value::Float(0.5));
        assert!(node.output("out").is_some());
    }

    #[test]
    fn test_unknown_kind_instantiate() {
        assert!(builtin_registry().instantiate("does-not-exist").is_none());
    }
}
