// SPDX-License-Identifier: MIT OR Apache-2.0
//! Whole-material compilation: both stage passes plus table assembly.

use crate::coerce::{coerce, literal};
use crate::components::VARYING_KIND;
use crate::error::CompileError;
use crate::evaluator::{EvalShared, GraphEvaluator};
use crate::registry::{ComponentRegistry, TypedExpr};
use crate::result::CompilationResult;
use crate::subgraph::ResolvedSubGraphs;
use crate::template::{
    fragment_source, vertex_source, FragmentBlocks, LitBlocks, StageSections,
};
use shaderweave_graph::{Graph, MaterialTemplate, Node, NodeId, ShaderStage, ValueType};
use std::collections::HashSet;
use tracing::debug;

/// Block slice kinds understood by the stage templates.
mod block {
    pub const POSITION_OFFSET: &str = "PositionOffset";
    pub const NORMAL_OFFSET: &str = "NormalOffset";
    pub const BASE_COLOR: &str = "BaseColor";
    pub const ALPHA: &str = "Alpha";
    pub const NORMAL: &str = "Normal";
    pub const METALLIC: &str = "Metallic";
    pub const ROUGHNESS: &str = "Roughness";
    pub const EMISSIVE: &str = "Emissive";
    pub const ALPHA_CLIP_THRESHOLD: &str = "AlphaClipThreshold";
    pub const COAT_MASK: &str = "CoatMask";
    pub const COAT_SMOOTHNESS: &str = "CoatSmoothness";
}

/// Declared type of one block slice.
fn block_type(kind: &str) -> ValueType {
    match kind {
        block::ALPHA
        | block::METALLIC
        | block::ROUGHNESS
        | block::ALPHA_CLIP_THRESHOLD
        | block::COAT_MASK
        | block::COAT_SMOOTHNESS => ValueType::Float,
        _ => ValueType::Vec3,
    }
}

/// Template-provided fallback expression when a block is absent or
/// unconnected on the context node.
fn block_default(kind: &str) -> &'static str {
    match kind {
        block::POSITION_OFFSET | block::NORMAL_OFFSET | block::EMISSIVE => "vec3(0.0)",
        block::BASE_COLOR => "vec3(1.0)",
        block::NORMAL => "sw_worldNormal",
        block::ALPHA => "1.0",
        block::METALLIC | block::COAT_MASK => "0.0",
        block::ROUGHNESS => "0.5",
        block::ALPHA_CLIP_THRESHOLD => "0.5",
        block::COAT_SMOOTHNESS => "0.8",
        _ => "0.0",
    }
}

struct StagePass {
    body: String,
    blocks: Vec<(String, String)>,
}

impl StagePass {
    fn block(&self, kind: &str) -> String {
        self.blocks
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, expr)| expr.clone())
            .unwrap_or_else(|| block_default(kind).to_string())
    }
}

/// Compiles one material graph into both stage sources plus side tables.
///
/// A compiler instance is built per call over immutable borrows; it holds
/// no state between calls, so the same graph always compiles to the same
/// result.
pub struct ContextCompiler<'a> {
    graph: &'a Graph,
    registry: &'a ComponentRegistry,
    subgraphs: &'a ResolvedSubGraphs,
}

impl<'a> ContextCompiler<'a> {
    /// Compiler over one graph snapshot and its resolved subgraphs.
    pub fn new(
        graph: &'a Graph,
        registry: &'a ComponentRegistry,
        subgraphs: &'a ResolvedSubGraphs,
    ) -> Self {
        Self {
            graph,
            registry,
            subgraphs,
        }
    }

    /// Blocks a context node must provide for the graph's settings.
    fn required_blocks(&self, stage: ShaderStage) -> Vec<&'static str> {
        let setting = &self.graph.setting;
        match stage {
            ShaderStage::Vertex => vec![block::POSITION_OFFSET, block::NORMAL_OFFSET],
            ShaderStage::Fragment => {
                let mut kinds = vec![block::BASE_COLOR, block::ALPHA];
                if setting.template == MaterialTemplate::Lit {
                    kinds.extend([
                        block::NORMAL,
                        block::METALLIC,
                        block::ROUGHNESS,
                        block::EMISSIVE,
                    ]);
                    if setting.clear_coat {
                        kinds.extend([block::COAT_MASK, block::COAT_SMOOTHNESS]);
                    }
                }
                if setting.alpha_clip {
                    kinds.push(block::ALPHA_CLIP_THRESHOLD);
                }
                kinds
            }
        }
    }

    /// Run one stage pass: evaluate every required block of the stage's
    /// context node into an expression, collecting instructions and table
    /// entries into `shared`.
    fn stage_pass(
        &self,
        stage: ShaderStage,
        context: Option<&Node>,
        shared: &mut EvalShared,
    ) -> Result<StagePass, CompileError> {
        let mut evaluator =
            GraphEvaluator::new(self.graph, self.registry, self.subgraphs, stage, shared);
        // Varying bridges are only reachable through the fragment context,
        // but their write side must land in the vertex body. Bridges no
        // fragment block consumes stay out of both stages.
        if stage == ShaderStage::Vertex {
            let consumed = self.fragment_upstream();
            for node in self.graph.nodes() {
                if node.kind == VARYING_KIND && consumed.contains(&node.id) {
                    evaluator.resolve(node.id, "out")?;
                }
            }
        }
        let mut blocks = Vec::new();
        if let Some(node) = context {
            for kind in self.required_blocks(stage) {
                if !node.blocks.iter().any(|b| b.kind == kind) {
                    continue;
                }
                let Some(port) = node.input(kind) else {
                    continue;
                };
                // Unconnected blocks with an untouched literal fall back to
                // the template default rather than a zeroed literal.
                let expr = if self.graph.incoming(node.id, kind).is_some() {
                    let value: TypedExpr = evaluator.input_value(node, kind, port)?;
                    coerce(&value.expr, value.value_type, block_type(kind))?
                } else {
                    match literal(&port.value) {
                        Some(text) if port.value != port.value_type.default_value() => {
                            coerce(&text, port.value.value_type(), block_type(kind))?
                        }
                        _ => continue,
                    }
                };
                blocks.push((kind.to_string(), expr));
            }
        }
        let mut body = String::new();
        for line in evaluator.into_code() {
            body.push_str("  ");
            body.push_str(&line);
            body.push('\n');
        }
        debug!(?stage, blocks = blocks.len(), "stage pass complete");
        Ok(StagePass { body, blocks })
    }

    /// Node ids transitively upstream of the fragment context.
    fn fragment_upstream(&self) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<NodeId> = self
            .graph
            .context_node(ShaderStage::Fragment)
            .map(|n| n.id)
            .into_iter()
            .collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            for connection in self.graph.connections() {
                if connection.to_node == id {
                    stack.push(connection.from_node);
                }
            }
        }
        seen
    }

    /// Compile the full material.
    pub fn compile(&self) -> Result<CompilationResult, CompileError> {
        self.graph.validate()?;
        let fragment_context = self
            .graph
            .context_node(ShaderStage::Fragment)
            .ok_or(CompileError::MissingContext("fragment"))?;
        let vertex_context = self.graph.context_node(ShaderStage::Vertex);

        let mut shared = EvalShared::new();
        let vertex = self.stage_pass(ShaderStage::Vertex, vertex_context, &mut shared)?;
        let fragment =
            self.stage_pass(ShaderStage::Fragment, Some(fragment_context), &mut shared)?;
        shared.finalize_binding_indices();

        let setting = &self.graph.setting;
        let blocks = FragmentBlocks {
            base_color: fragment.block(block::BASE_COLOR),
            alpha: fragment.block(block::ALPHA),
            lit: (setting.template == MaterialTemplate::Lit).then(|| LitBlocks {
                normal: fragment.block(block::NORMAL),
                metallic: fragment.block(block::METALLIC),
                roughness: fragment.block(block::ROUGHNESS),
                emissive: fragment.block(block::EMISSIVE),
                coat: setting.clear_coat.then(|| {
                    (
                        fragment.block(block::COAT_MASK),
                        fragment.block(block::COAT_SMOOTHNESS),
                    )
                }),
            }),
            alpha_clip: setting
                .alpha_clip
                .then(|| fragment.block(block::ALPHA_CLIP_THRESHOLD)),
        };

        let vert_code = vertex_source(
            &sections(&shared, &vertex.body),
            &vertex.block(block::POSITION_OFFSET),
            &vertex.block(block::NORMAL_OFFSET),
        );
        let frag_code = fragment_source(&sections(&shared, &fragment.body), &blocks);

        Ok(finish(self.graph, shared, vert_code, frag_code))
    }
}

/// Build the declaration sections shared by both stages.
pub(crate) fn sections(shared: &EvalShared, body: &str) -> StageSections {
    let mut varyings = String::new();
    for (name, value_type) in &shared.varyings {
        varyings.push_str(&format!("{} {};\n", value_type.code_name(), name));
    }
    let mut uniforms = String::new();
    for entry in shared.uniforms.values() {
        uniforms.push_str(&format!(
            "uniform {} {};\n",
            entry.value_type.code_name(),
            entry.name
        ));
    }
    // Sampler slots are binding-table metadata only; GLSL declares the
    // combined sampler2D for the texture slot.
    for entry in shared.bindings.values() {
        if entry.value_type == ValueType::Texture2D {
            uniforms.push_str(&format!("uniform sampler2D {};\n", entry.name));
        }
    }
    let mut defines = String::new();
    for text in shared.defines.values() {
        defines.push_str(text);
    }
    StageSections {
        varyings,
        uniforms,
        defines,
        body: body.to_string(),
    }
}

/// Assemble the final result from the shared tables and stage sources.
pub(crate) fn finish(
    graph: &Graph,
    shared: EvalShared,
    vert_code: String,
    frag_code: String,
) -> CompilationResult {
    CompilationResult {
        vert_code,
        frag_code,
        uniform_map: shared.uniforms,
        binding_map: shared.bindings,
        resource: shared.resource,
        parameters: graph.parameters().to_vec(),
        setting: graph.setting.clone(),
        warnings: shared.warnings,
    }
}
