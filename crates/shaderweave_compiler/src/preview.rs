// SPDX-License-Identifier: MIT OR Apache-2.0
//! Preview compilation: render a single node output or a subgraph asset
//! as a color, without requiring context nodes.

use crate::coerce::{coerce, literal};
use crate::context::{finish, sections};
use crate::error::{CompileError, SubGraphError};
use crate::evaluator::{EvalShared, GraphEvaluator};
use crate::registry::{ComponentRegistry, TypedExpr};
use crate::result::CompilationResult;
use crate::subgraph::{
    ResolvedSubGraphs, SUBGRAPH_INPUT_KIND, SUBGRAPH_OUTPUT_KIND,
};
use crate::template::{preview_fragment_source, preview_vertex_source};
use shaderweave_graph::{
    Graph, GraphError, MaterialTemplate, NodeId, ShaderStage, Value, ValueType,
};

/// Compile a preview shader showing one output port of one node.
///
/// `port` defaults to the node's first declared output. Evaluation runs
/// as a fragment pass; the resolved expression is coerced to vec4 for
/// display. A texture-typed output is special-cased to a sample at the
/// mesh UV instead of a coercion failure.
pub fn compile_node_preview(
    graph: &Graph,
    registry: &ComponentRegistry,
    subgraphs: &ResolvedSubGraphs,
    node_id: NodeId,
    port: Option<&str>,
) -> Result<CompilationResult, CompileError> {
    let port = match port {
        Some(name) => name.to_string(),
        None => graph
            .node(node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?
            .first_output()
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| CompileError::MissingOutput {
                node: node_id,
                port: String::new(),
            })?,
    };
    let mut shared = EvalShared::new();
    let mut evaluator =
        GraphEvaluator::new(graph, registry, subgraphs, ShaderStage::Fragment, &mut shared);
    let value = evaluator.resolve(node_id, &port)?;
    let color = display_color(&value)?;
    let body = indent(evaluator.into_code());
    shared.finalize_binding_indices();
    assemble(graph, shared, &body, &color)
}

/// Compile a preview shader for a whole subgraph asset.
///
/// Declared inputs are bound to their default literals; the single
/// output node's first slot becomes the preview color.
pub fn compile_sub_graph_preview(
    graph: &Graph,
    registry: &ComponentRegistry,
    subgraphs: &ResolvedSubGraphs,
) -> Result<CompilationResult, CompileError> {
    if graph.setting.template != MaterialTemplate::SubGraph {
        return Err(SubGraphError::NotASubGraph(graph.name.clone()).into());
    }
    let mut output_nodes = graph.nodes().filter(|n| n.kind == SUBGRAPH_OUTPUT_KIND);
    let output = match (output_nodes.next(), output_nodes.next()) {
        (Some(single), None) => single,
        _ => return Err(SubGraphError::MalformedSubGraph(graph.name.clone()).into()),
    };

    let mut shared = EvalShared::new();
    let mut evaluator =
        GraphEvaluator::new(graph, registry, subgraphs, ShaderStage::Fragment, &mut shared);
    for node in graph.nodes() {
        if node.kind != SUBGRAPH_INPUT_KIND {
            continue;
        }
        let Some(Value::String(name)) = node.input("name").map(|p| &p.value) else {
            continue;
        };
        let value_type = node
            .output("out")
            .map(|p| p.value_type)
            .unwrap_or(ValueType::Float);
        let expr = literal(&value_type.default_value()).unwrap_or_default();
        evaluator.bind_input(name.clone(), TypedExpr::new(expr, value_type));
    }

    let (slot, slot_port) = output
        .inputs
        .first()
        .map(|(name, port)| (name.clone(), port.clone()))
        .ok_or_else(|| SubGraphError::MalformedSubGraph(graph.name.clone()))?;
    let value = evaluator.input_value(output, &slot, &slot_port)?;
    let color = display_color(&value)?;
    let body = indent(evaluator.into_code());
    shared.finalize_binding_indices();
    assemble(graph, shared, &body, &color)
}

/// Coerce a resolved expression into a displayable vec4.
fn display_color(value: &TypedExpr) -> Result<String, CompileError> {
    if value.value_type == ValueType::Texture2D {
        return Ok(format!("texture({}, sw_uv)", value.expr));
    }
    Ok(coerce(&value.expr, value.value_type, ValueType::Vec4)?)
}

fn indent(lines: Vec<String>) -> String {
    let mut body = String::new();
    for line in lines {
        body.push_str("  ");
        body.push_str(&line);
        body.push('\n');
    }
    body
}

fn assemble(
    graph: &Graph,
    shared: EvalShared,
    body: &str,
    color: &str,
) -> Result<CompilationResult, CompileError> {
    let stage = sections(&shared, body);
    let vert_code = preview_vertex_source(&sections(&shared, ""));
    let frag_code = preview_fragment_source(&stage, color);
    Ok(finish(graph, shared, vert_code, frag_code))
}
