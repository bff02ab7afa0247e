// SPDX-License-Identifier: MIT OR Apache-2.0
//! Memoized, order-correct graph evaluation producing shader instructions.
//!
//! One [`GraphEvaluator`] exists per stage pass; the [`EvalShared`] tables
//! (uniforms, bindings, resources, defines, varyings, warnings) are shared
//! between the passes of a single compile call and never across calls.

use crate::coerce::{coerce, literal};
use crate::error::{CompileError, CompileWarning, SubGraphError, TypeError};
use crate::registry::{ComponentRegistry, StageAffinity, TypedExpr};
use crate::result::{BindingEntry, ResourceTable, UniformEntry};
use crate::subgraph::{
    sanitize_identifier, ResolvedSubGraphs, SUBGRAPH_INPUT_KIND, SUBGRAPH_KIND,
    SUBGRAPH_OUTPUT_KIND,
};
use indexmap::IndexMap;
use shaderweave_graph::{Graph, GraphError, Node, NodeId, Port, ShaderStage, Value, ValueType};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::trace;

/// Mutable state shared by all evaluator passes of one compile call.
#[derive(Debug, Default)]
pub struct EvalShared {
    counter: usize,
    pub(crate) defines: IndexMap<String, String>,
    pub(crate) uniforms: BTreeMap<String, UniformEntry>,
    pub(crate) bindings: BTreeMap<String, BindingEntry>,
    pub(crate) resource: ResourceTable,
    pub(crate) varyings: IndexMap<String, ValueType>,
    pub(crate) warnings: Vec<CompileWarning>,
    subgraph_instances: usize,
}

impl EvalShared {
    /// Fresh state for one compile call.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_var(&mut self) -> String {
        self.counter += 1;
        format!("v{}", self.counter)
    }

    /// Assign binding indices by lexicographic key order over the merged
    /// tables. Called once, after the last evaluator pass.
    pub(crate) fn finalize_binding_indices(&mut self) {
        for (index, entry) in self.bindings.values_mut().enumerate() {
            entry.index = index;
        }
    }
}

/// What a [`NodeComponent`](crate::registry::NodeComponent) sees while
/// emitting: the current stage, the graph snapshot, and the shared tables.
pub struct EmitContext<'a> {
    /// Stage of the running pass
    pub stage: ShaderStage,
    /// Graph being compiled (the inner graph during subgraph inlining)
    pub graph: &'a Graph,
    shared: &'a mut EvalShared,
}

impl EmitContext<'_> {
    /// Allocate a fresh single-assignment variable name.
    pub fn alloc_var(&mut self) -> String {
        self.shared.alloc_var()
    }

    /// Allocate a variable and build its assignment line.
    pub fn assign(&mut self, value_type: ValueType, expr: &str) -> (String, String) {
        let var = self.alloc_var();
        let line = format!("{} {} = {};", value_type.code_name(), var, expr);
        (var, line)
    }

    /// Register a uniform entry; duplicate keys must agree on type.
    pub fn add_uniform(&mut self, key: String, entry: UniformEntry) -> Result<(), TypeError> {
        if let Some(existing) = self.shared.uniforms.get(&key) {
            if existing.value_type != entry.value_type {
                return Err(TypeError::ConflictingBinding {
                    key,
                    first: existing.value_type,
                    second: entry.value_type,
                });
            }
            return Ok(());
        }
        self.shared.uniforms.insert(key, entry);
        Ok(())
    }

    /// Register a binding slot; the index is assigned after all passes.
    pub fn add_binding(
        &mut self,
        key: String,
        name: String,
        value_type: ValueType,
    ) -> Result<(), TypeError> {
        if let Some(existing) = self.shared.bindings.get(&key) {
            if existing.value_type != value_type {
                return Err(TypeError::ConflictingBinding {
                    key,
                    first: existing.value_type,
                    second: value_type,
                });
            }
            return Ok(());
        }
        self.shared.bindings.insert(
            key,
            BindingEntry {
                index: 0,
                name,
                value_type,
            },
        );
        Ok(())
    }

    /// Record the default texture asset for a binding key.
    pub fn set_texture_default(&mut self, key: String, asset: String) {
        self.shared.resource.texture.entry(key).or_insert(asset);
    }

    /// Record the default sampler preset for a binding key.
    pub fn set_sampler_default(&mut self, key: String, preset: String) {
        self.shared.resource.sampler.entry(key).or_insert(preset);
    }

    /// Declare a cross-stage varying slot.
    pub fn declare_varying(&mut self, name: String, value_type: ValueType) {
        self.shared.varyings.entry(name).or_insert(value_type);
    }

    /// Report a non-fatal problem.
    pub fn warn(&mut self, warning: CompileWarning) {
        tracing::warn!(?warning, "compile warning");
        self.shared.warnings.push(warning);
    }
}

/// One stage pass over a graph snapshot.
///
/// Keeps a memo table keyed by `(node, output port)` so shared upstream
/// work is evaluated exactly once, an in-flight set guarding against
/// corrupted cyclic snapshots, and an ordered single-assignment
/// instruction buffer.
pub struct GraphEvaluator<'a> {
    graph: &'a Graph,
    registry: &'a ComponentRegistry,
    subgraphs: &'a ResolvedSubGraphs,
    stage: ShaderStage,
    shared: &'a mut EvalShared,
    memo: HashMap<(NodeId, String), TypedExpr>,
    in_flight: HashSet<NodeId>,
    code: Vec<String>,
    /// Subgraph function parameters by declared input name; empty at root.
    bindings_in: IndexMap<String, TypedExpr>,
}

impl<'a> GraphEvaluator<'a> {
    /// New pass over `graph` for `stage`.
    pub fn new(
        graph: &'a Graph,
        registry: &'a ComponentRegistry,
        subgraphs: &'a ResolvedSubGraphs,
        stage: ShaderStage,
        shared: &'a mut EvalShared,
    ) -> Self {
        Self {
            graph,
            registry,
            subgraphs,
            stage,
            shared,
            memo: HashMap::new(),
            in_flight: HashSet::new(),
            code: Vec::new(),
            bindings_in: IndexMap::new(),
        }
    }

    /// Pre-bind a subgraph input name to an expression. Previews of
    /// subgraph assets bind every declared input to its default literal.
    pub fn bind_input(&mut self, name: impl Into<String>, value: TypedExpr) {
        self.bindings_in.insert(name.into(), value);
    }

    /// Instruction lines emitted so far, in order.
    pub fn code(&self) -> &[String] {
        &self.code
    }

    /// Consume the pass, returning its instruction buffer.
    pub fn into_code(self) -> Vec<String> {
        self.code
    }

    /// Resolve one output of one node to a typed expression.
    pub fn resolve(&mut self, node_id: NodeId, port: &str) -> Result<TypedExpr, CompileError> {
        let key = (node_id, port.to_string());
        if let Some(hit) = self.memo.get(&key) {
            return Ok(hit.clone());
        }
        if self.in_flight.contains(&node_id) {
            return Err(CompileError::CyclicGraph(node_id));
        }

        let graph = self.graph;
        let node = graph
            .node(node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        trace!(kind = %node.kind, ?node_id, port, "evaluating node output");

        self.in_flight.insert(node_id);
        let outcome = self.evaluate_node(node);
        self.in_flight.remove(&node_id);
        outcome?;

        self.memo
            .get(&key)
            .cloned()
            .ok_or_else(|| CompileError::MissingOutput {
                node: node_id,
                port: port.to_string(),
            })
    }

    /// Resolve one input port of a node: follow its connection (with
    /// coercion at the boundary) or fall back to the port literal.
    pub fn input_value(
        &mut self,
        node: &Node,
        name: &str,
        port: &Port,
    ) -> Result<TypedExpr, CompileError> {
        let graph = self.graph;
        if let Some(connection) = graph.incoming(node.id, name) {
            let source = self.resolve(connection.from_node, &connection.from_port)?;
            let expr = coerce(&source.expr, source.value_type, port.value_type)?;
            return Ok(TypedExpr::new(expr, port.value_type));
        }
        // Opaque literals (textures, samplers, gradients) have no inline
        // text; the owning component reads the port value directly.
        let expr = literal(&port.value).unwrap_or_default();
        Ok(TypedExpr::new(expr, port.value_type))
    }

    fn evaluate_node(&mut self, node: &Node) -> Result<(), CompileError> {
        match node.kind.as_str() {
            SUBGRAPH_KIND => self.inline_subgraph(node),
            SUBGRAPH_INPUT_KIND => self.bind_subgraph_input(node),
            _ => self.evaluate_component(node),
        }
    }

    fn evaluate_component(&mut self, node: &Node) -> Result<(), CompileError> {
        let component = self
            .registry
            .get(&node.kind)
            .cloned()
            .ok_or_else(|| CompileError::UnknownComponent(node.kind.clone()))?;

        let schema = component.schema();
        let blocked = match (schema.affinity, self.stage) {
            (StageAffinity::VertexOnly, ShaderStage::Fragment) => Some("fragment"),
            (StageAffinity::FragmentOnly, ShaderStage::Vertex) => Some("vertex"),
            _ => None,
        };
        if let Some(stage) = blocked {
            return Err(CompileError::StageMismatch {
                node: node.id,
                kind: node.kind.clone(),
                stage,
            });
        }

        let mut inputs = IndexMap::new();
        if !component.skip_input_resolution(self.stage) {
            for (name, port) in &node.inputs {
                let value = self.input_value(node, name, port)?;
                inputs.insert(name.clone(), value);
            }
        }

        let emission = {
            let mut ctx = EmitContext {
                stage: self.stage,
                graph: self.graph,
                shared: &mut *self.shared,
            };
            component.emit(&mut ctx, node, &inputs)?
        };

        self.code.extend(emission.code);
        for define in emission.defines {
            // Identical helper text from repeated instances merges to one.
            self.shared.defines.entry(define.name).or_insert(define.text);
        }
        for (port, value) in emission.outputs {
            self.memo.insert((node.id, port), value);
        }
        Ok(())
    }

    fn bind_subgraph_input(&mut self, node: &Node) -> Result<(), CompileError> {
        let name = match node.input("name").map(|p| &p.value) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(SubGraphError::MalformedSubGraph(self.graph.name.clone()).into()),
        };
        let bound = self
            .bindings_in
            .get(&name)
            .cloned()
            .ok_or_else(|| SubGraphError::MalformedSubGraph(name))?;
        self.memo.insert((node.id, "out".to_string()), bound);
        Ok(())
    }

    /// Inline a subgraph node: compile the resolved inner graph into a
    /// helper function namespaced by instance, then call it, binding the
    /// outer node's inputs to parameters and outputs to fresh variables.
    fn inline_subgraph(&mut self, node: &Node) -> Result<(), CompileError> {
        let asset = match node.input("asset").map(|p| &p.value) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(SubGraphError::MissingAsset("<unset>".to_string()).into()),
        };
        let inner = self
            .subgraphs
            .get(&asset)
            .ok_or_else(|| SubGraphError::MissingAsset(asset.clone()))?;

        // Declared inputs, in inner authoring order.
        let mut params: Vec<(String, ValueType)> = Vec::new();
        for n in inner.nodes() {
            if n.kind == SUBGRAPH_INPUT_KIND {
                let name = match n.input("name").map(|p| &p.value) {
                    Some(Value::String(s)) if !s.is_empty() => s.clone(),
                    _ => return Err(SubGraphError::MalformedSubGraph(asset).into()),
                };
                let value_type = n
                    .output("out")
                    .map(|p| p.value_type)
                    .unwrap_or(ValueType::Float);
                params.push((name, value_type));
            }
        }

        // Exactly one output node per subgraph.
        let mut output_nodes = inner.nodes().filter(|n| n.kind == SUBGRAPH_OUTPUT_KIND);
        let output_node = match (output_nodes.next(), output_nodes.next()) {
            (Some(single), None) => single,
            _ => return Err(SubGraphError::MalformedSubGraph(asset).into()),
        };

        // Outer argument expressions, coerced to parameter types.
        let mut args = Vec::new();
        for (name, value_type) in &params {
            let expr = match node.input(name) {
                Some(port) => {
                    let resolved = self.input_value(node, name, port)?;
                    coerce(&resolved.expr, resolved.value_type, *value_type)?
                }
                None => literal(&value_type.default_value()).unwrap_or_default(),
            };
            args.push(expr);
        }

        self.shared.subgraph_instances += 1;
        let ns = format!(
            "sg_{}_{}",
            sanitize_identifier(&asset),
            self.shared.subgraph_instances
        );

        let mut bindings_in = IndexMap::new();
        for (name, value_type) in &params {
            bindings_in.insert(
                name.clone(),
                TypedExpr::new(format!("p_{}", sanitize_identifier(name)), *value_type),
            );
        }

        let (body, slots) = {
            let mut inner_eval = GraphEvaluator {
                graph: inner,
                registry: self.registry,
                subgraphs: self.subgraphs,
                stage: self.stage,
                shared: &mut *self.shared,
                memo: HashMap::new(),
                in_flight: HashSet::new(),
                code: Vec::new(),
                bindings_in,
            };
            let mut slots: Vec<(String, TypedExpr)> = Vec::new();
            for (slot, port) in &output_node.inputs {
                let value = inner_eval.input_value(output_node, slot, port)?;
                slots.push((slot.clone(), value));
            }
            (inner_eval.code, slots)
        };

        let mut signature: Vec<String> = params
            .iter()
            .map(|(name, value_type)| {
                format!(
                    "in {} p_{}",
                    value_type.code_name(),
                    sanitize_identifier(name)
                )
            })
            .collect();
        for (slot, value) in &slots {
            signature.push(format!(
                "out {} o_{}",
                value.value_type.code_name(),
                sanitize_identifier(slot)
            ));
        }

        let mut text = format!("void {}({}) {{\n", ns, signature.join(", "));
        for line in &body {
            text.push_str("  ");
            text.push_str(line);
            text.push('\n');
        }
        for (slot, value) in &slots {
            text.push_str(&format!(
                "  o_{} = {};\n",
                sanitize_identifier(slot),
                value.expr
            ));
        }
        text.push_str("}\n");
        self.shared.defines.insert(ns.clone(), text);

        // Call site: declare result variables, then call the function.
        let mut call_args = args;
        for (slot, value) in &slots {
            let var = self.shared.alloc_var();
            self.code
                .push(format!("{} {};", value.value_type.code_name(), var));
            call_args.push(var.clone());
            self.memo
                .insert((node.id, slot.clone()), TypedExpr::new(var, value.value_type));
        }
        self.code.push(format!("{}({});", ns, call_args.join(", ")));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::builtin_registry;
    use shaderweave_graph::Port;

    fn evaluate<'a>(
        graph: &'a Graph,
        registry: &'a ComponentRegistry,
        subgraphs: &'a ResolvedSubGraphs,
        shared: &'a mut EvalShared,
    ) -> GraphEvaluator<'a> {
        GraphEvaluator::new(graph, registry, subgraphs, ShaderStage::Fragment, shared)
    }

    #[test]
    fn test_resolve_memoizes_repeated_lookups() {
        let registry = builtin_registry();
        let mut graph = Graph::new("scratch");
        let add = graph.add_node(registry.instantiate("add").unwrap());

        let subgraphs = ResolvedSubGraphs::empty();
        let mut shared = EvalShared::new();
        let mut evaluator = evaluate(&graph, &registry, &subgraphs, &mut shared);
        let first = evaluator.resolve(add, "out").unwrap();
        let second = evaluator.resolve(add, "out").unwrap();
        assert_eq!(first, second);
        assert_eq!(evaluator.code().len(), 1);
    }

    #[test]
    fn test_resolve_unknown_node_fails() {
        let registry = builtin_registry();
        let graph = Graph::new("scratch");
        let subgraphs = ResolvedSubGraphs::empty();
        let mut shared = EvalShared::new();
        let mut evaluator = evaluate(&graph, &registry, &subgraphs, &mut shared);
        let missing = NodeId::new();
        let err = evaluator.resolve(missing, "out").unwrap_err();
        assert_eq!(err, CompileError::Graph(GraphError::NodeNotFound(missing)));
    }

    #[test]
    fn test_input_value_falls_back_to_port_literal() {
        let registry = builtin_registry();
        let mut graph = Graph::new("scratch");
        let mut node = Node::new("scratch-kind");
        node.set_input("strength", Port::with_value(Value::Float(2.0)));
        let id = graph.add_node(node);

        let subgraphs = ResolvedSubGraphs::empty();
        let mut shared = EvalShared::new();
        let mut evaluator = evaluate(&graph, &registry, &subgraphs, &mut shared);
        let node = graph.node(id).unwrap();
        let port = node.input("strength").unwrap();
        let value = evaluator.input_value(node, "strength", port).unwrap();
        assert_eq!(value, TypedExpr::new("2.0", ValueType::Float));
    }

    #[test]
    fn test_alloc_var_is_sequential() {
        let mut shared = EvalShared::new();
        assert_eq!(shared.alloc_var(), "v1");
        assert_eq!(shared.alloc_var(), "v2");
    }
}
