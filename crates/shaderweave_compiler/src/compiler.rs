// SPDX-License-Identifier: MIT OR Apache-2.0
//! The public compile façade.

use crate::context::ContextCompiler;
use crate::error::{CompileError, RegistryError};
use crate::preview;
use crate::registry::{ComponentRegistry, NodeComponent};
use crate::result::CompilationResult;
use crate::subgraph::{prefetch, SubGraphProvider};
use shaderweave_graph::{Graph, NodeId};
use std::sync::Arc;
use tracing::info;

/// Stateless-per-call compiler for shader graphs.
///
/// Holds the component registry and an optional subgraph provider; every
/// `compile*` call takes an immutable graph snapshot and produces a fresh
/// [`CompilationResult`] whose tables are internally consistent. Calls
/// never write back into the graph, so a compile can run while an editor
/// keeps mutating its own copy.
pub struct ShaderGraphCompiler {
    registry: ComponentRegistry,
    provider: Option<Arc<dyn SubGraphProvider>>,
}

impl ShaderGraphCompiler {
    /// Compiler with the builtin component catalog and no provider.
    pub fn new() -> Self {
        Self {
            registry: crate::components::builtin_registry(),
            provider: None,
        }
    }

    /// Compiler over a custom registry.
    pub fn with_registry(registry: ComponentRegistry) -> Self {
        Self {
            registry,
            provider: None,
        }
    }

    /// Install the subgraph provider.
    pub fn set_provider(&mut self, provider: Arc<dyn SubGraphProvider>) {
        self.provider = Some(provider);
    }

    /// Register a host-specific component kind.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        component: Arc<dyn NodeComponent>,
    ) -> Result<(), RegistryError> {
        self.registry.register(kind, component)
    }

    /// Access the registry, e.g. to enumerate the available kinds.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Compile a material graph into both stages plus side tables.
    pub async fn compile(&self, graph: &Graph) -> Result<CompilationResult, CompileError> {
        let subgraphs = prefetch(graph, self.provider.as_deref()).await?;
        let result = ContextCompiler::new(graph, &self.registry, &subgraphs).compile()?;
        info!(
            graph = %graph.name,
            uniforms = result.uniform_map.len(),
            bindings = result.binding_map.len(),
            warnings = result.warnings.len(),
            "compiled material"
        );
        Ok(result)
    }

    /// Compile a preview shader for one output port of one node; `None`
    /// previews the node's first declared output.
    pub async fn compile_preview(
        &self,
        graph: &Graph,
        node: NodeId,
        port: Option<&str>,
    ) -> Result<CompilationResult, CompileError> {
        let subgraphs = prefetch(graph, self.provider.as_deref()).await?;
        preview::compile_node_preview(graph, &self.registry, &subgraphs, node, port)
    }

    /// Compile a preview shader for a whole subgraph asset.
    pub async fn compile_sub_graph_preview(
        &self,
        graph: &Graph,
    ) -> Result<CompilationResult, CompileError> {
        let subgraphs = prefetch(graph, self.provider.as_deref()).await?;
        preview::compile_sub_graph_preview(graph, &self.registry, &subgraphs)
    }
}

impl Default for ShaderGraphCompiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::builtin_registry;
    use crate::error::CompileWarning;
    use crate::registry::{ComponentSchema, Emission, NodeComponent, PortSchema, StageAffinity, TypedExpr};
    use crate::subgraph::{MapProvider, SUBGRAPH_INPUT_KIND, SUBGRAPH_KIND, SUBGRAPH_OUTPUT_KIND};
    use indexmap::IndexMap;
    use shaderweave_graph::{
        Block, Connection, Graph, Node, NodeId, Parameter, Port, Setting, Value, ValueType,
        FRAGMENT_CONTEXT_KIND, VERTEX_CONTEXT_KIND,
    };

    fn fragment_context(blocks: &[(&str, ValueType)]) -> Node {
        let mut node = Node::new(FRAGMENT_CONTEXT_KIND);
        for (kind, value_type) in blocks {
            node.push_block(Block::new(*kind), Port::new(*value_type));
        }
        node
    }

    /// Unlit graph with a BaseColor/Alpha context; returns the context id.
    fn unlit_graph() -> (Graph, NodeId) {
        let mut graph = Graph::with_setting("test material", Setting::unlit());
        let ctx = graph.add_node(fragment_context(&[
            ("BaseColor", ValueType::Vec3),
            ("Alpha", ValueType::Float),
        ]));
        (graph, ctx)
    }

    fn vec3_constant(color: [f32; 3]) -> Node {
        let mut node = ShaderGraphCompiler::new()
            .registry
            .instantiate("vec3")
            .unwrap();
        node.set_input("value", Port::with_value(Value::Vec3(color)));
        node
    }

    #[tokio::test]
    async fn test_unlit_literal_base_color() {
        let (mut graph, ctx) = unlit_graph();
        let red = graph.add_node(vec3_constant([1.0, 0.0, 0.0]));
        graph.connect(red, "out", ctx, "BaseColor").unwrap();

        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        assert!(result
            .frag_code
            .contains("vec3 sw_BaseColor = vec3(1.0, 0.0, 0.0);"));
        assert!(result
            .frag_code
            .contains("sw_fragColor = vec4(sw_BaseColor, sw_Alpha);"));
        // A literal feed creates no uniforms and no bindings.
        assert!(result.uniform_map.is_empty());
        assert!(result.binding_map.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_compile_is_pure() {
        let (mut graph, ctx) = unlit_graph();
        graph
            .add_parameter(Parameter::with_value("Tint", Value::Vec3([0.2, 0.4, 0.8])))
            .unwrap();
        let mut read = ShaderGraphCompiler::new()
            .registry
            .instantiate("parameter")
            .unwrap();
        read.set_input("name", Port::with_value(Value::String("Tint".into())));
        let read = graph.add_node(read);
        graph.connect(read, "out", ctx, "BaseColor").unwrap();

        let compiler = ShaderGraphCompiler::new();
        let first = compiler.compile(&graph).await.unwrap();
        let second = compiler.compile(&graph).await.unwrap();
        assert_eq!(first.vert_code, second.vert_code);
        assert_eq!(first.frag_code, second.frag_code);
        assert_eq!(first.uniform_map, second.uniform_map);
        assert_eq!(first.binding_map, second.binding_map);
    }

    #[tokio::test]
    async fn test_shared_upstream_evaluated_once() {
        let (mut graph, ctx) = unlit_graph();
        let registry = builtin_registry();
        let shared = graph.add_node(registry.instantiate("add").unwrap());
        let consumer = graph.add_node(registry.instantiate("multiply").unwrap());
        graph.connect(shared, "out", consumer, "a").unwrap();
        graph.connect(shared, "out", consumer, "b").unwrap();
        graph.connect(consumer, "out", ctx, "BaseColor").unwrap();

        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        // The add node's instruction appears exactly once even though two
        // edges consume it.
        assert_eq!(result.frag_code.matches(" + ").count(), 1);
    }

    #[tokio::test]
    async fn test_parameter_becomes_uniform() {
        let (mut graph, ctx) = unlit_graph();
        graph
            .add_parameter(Parameter::with_value("Albedo", Value::Vec3([1.0, 0.5, 0.25])))
            .unwrap();
        let mut read = builtin_registry().instantiate("parameter").unwrap();
        read.set_input("name", Port::with_value(Value::String("Albedo".into())));
        let read = graph.add_node(read);
        graph.connect(read, "out", ctx, "BaseColor").unwrap();

        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        // The whole result serializes camelCase for host consumption.
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["uniformMap"]["Parameter_Albedo"].is_object());
        assert!(json["fragCode"].is_string());

        let entry = result.uniform_map.get("Parameter_Albedo").unwrap();
        assert_eq!(entry.name, "u_Albedo");
        assert_eq!(entry.value_type, ValueType::Vec3);
        assert_eq!(entry.value, Value::Vec3([1.0, 0.5, 0.25]));
        assert!(result.frag_code.contains("uniform vec3 u_Albedo;"));
        assert!(result.frag_code.contains("vec3 sw_BaseColor = u_Albedo;"));
        assert_eq!(result.parameters.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_parameter_fails() {
        let (mut graph, ctx) = unlit_graph();
        let mut read = builtin_registry().instantiate("parameter").unwrap();
        read.set_input("name", Port::with_value(Value::String("Missing".into())));
        let read = graph.add_node(read);
        graph.connect(read, "out", ctx, "BaseColor").unwrap();

        let err = ShaderGraphCompiler::new().compile(&graph).await.unwrap_err();
        assert_eq!(err, CompileError::UnknownParameter("Missing".into()));
    }

    #[tokio::test]
    async fn test_unknown_component_fails() {
        let (mut graph, ctx) = unlit_graph();
        let mut node = Node::new("does-not-exist");
        node.set_output("out", Port::new(ValueType::Vec3));
        let node = graph.add_node(node);
        graph.connect(node, "out", ctx, "BaseColor").unwrap();

        let err = ShaderGraphCompiler::new().compile(&graph).await.unwrap_err();
        assert_eq!(err, CompileError::UnknownComponent("does-not-exist".into()));
    }

    #[tokio::test]
    async fn test_missing_fragment_context_fails() {
        let graph = Graph::with_setting("empty", Setting::unlit());
        let err = ShaderGraphCompiler::new().compile(&graph).await.unwrap_err();
        assert_eq!(err, CompileError::MissingContext("fragment"));
    }

    #[tokio::test]
    async fn test_texture_bindings_and_resource_defaults() {
        let (mut graph, ctx) = unlit_graph();
        let mut sample = builtin_registry().instantiate("sample-texture").unwrap();
        sample.set_input(
            "texture",
            Port::with_value(Value::Texture(Some("albedo.png".into()))),
        );
        let sample = graph.add_node(sample);
        graph.connect(sample, "rgb", ctx, "BaseColor").unwrap();

        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        assert_eq!(result.binding_map.len(), 2);
        // Lexicographic key order assigns Sampler_* before Texture_*.
        let entries: Vec<_> = result.binding_map.iter().collect();
        assert!(entries[0].0.starts_with("Sampler_"));
        assert_eq!(entries[0].1.index, 0);
        assert!(entries[1].0.starts_with("Texture_"));
        assert_eq!(entries[1].1.index, 1);
        assert_eq!(entries[1].1.value_type, ValueType::Texture2D);

        let texture_key = entries[1].0.clone();
        assert_eq!(
            result.resource.texture.get(&texture_key).map(String::as_str),
            Some("albedo.png")
        );
        assert!(result.frag_code.contains("texture(sw_tex_"));
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_identical_gradients_share_one_helper() {
        let (mut graph, ctx) = unlit_graph();
        let registry = builtin_registry();
        let first = graph.add_node(registry.instantiate("sample-gradient").unwrap());
        let second = graph.add_node(registry.instantiate("sample-gradient").unwrap());
        let sum = graph.add_node(registry.instantiate("add").unwrap());
        graph.connect(first, "out", sum, "a").unwrap();
        graph.connect(second, "out", sum, "b").unwrap();
        graph.connect(sum, "out", ctx, "BaseColor").unwrap();

        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        // Both nodes carry the default stops, so one baked helper serves
        // both call sites.
        assert_eq!(result.frag_code.matches("vec4 grad_").count(), 1);
        assert_eq!(result.frag_code.matches("= grad_").count(), 2);
    }

    #[tokio::test]
    async fn test_texture_asset_node_feeds_sampler() {
        let (mut graph, ctx) = unlit_graph();
        let registry = builtin_registry();
        let mut asset = registry.instantiate("texture-asset").unwrap();
        asset.set_input(
            "asset",
            Port::with_value(Value::Texture(Some("noise.png".into()))),
        );
        let asset = graph.add_node(asset);
        let sample = graph.add_node(registry.instantiate("sample-texture").unwrap());
        graph.connect(asset, "texture", sample, "texture").unwrap();
        graph.connect(sample, "rgb", ctx, "BaseColor").unwrap();

        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        // One texture slot owned by the asset node, one sampler owned by
        // the sample node.
        assert_eq!(result.binding_map.len(), 2);
        let texture_key = result
            .binding_map
            .keys()
            .find(|k| k.starts_with("Texture_"))
            .unwrap()
            .clone();
        assert_eq!(
            result.resource.texture.get(&texture_key).map(String::as_str),
            Some("noise.png")
        );
        assert!(result.frag_code.contains("texture(sw_tex_"));
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_unassigned_texture_degrades_with_warning() {
        let (mut graph, ctx) = unlit_graph();
        let sample = graph.add_node(builtin_registry().instantiate("sample-texture").unwrap());
        graph.connect(sample, "rgb", ctx, "BaseColor").unwrap();

        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        assert_eq!(result.warnings.len(), 1);
        let CompileWarning::MissingResource { key, fallback, .. } = &result.warnings[0];
        assert!(key.starts_with("Texture_"));
        assert_eq!(fallback, "white");
        assert_eq!(
            result.resource.texture.get(key).map(String::as_str),
            Some("white")
        );
    }

    #[tokio::test]
    async fn test_varying_bridge_moves_work_to_vertex_stage() {
        let (mut graph, ctx) = unlit_graph();
        let registry = builtin_registry();
        let pos = graph.add_node(registry.instantiate("world-position").unwrap());
        let scaled = graph.add_node(registry.instantiate("multiply").unwrap());
        let bridge = graph.add_node(registry.instantiate("varying").unwrap());
        graph.connect(pos, "out", scaled, "a").unwrap();
        graph.connect(scaled, "out", bridge, "in").unwrap();
        graph.connect(bridge, "out", ctx, "BaseColor").unwrap();

        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        assert!(result.vert_code.contains("out vec3 v_bridge_"));
        assert!(result.frag_code.contains("in vec3 v_bridge_"));
        // The multiply runs in the vertex stage only; the fragment stage
        // reads the interpolated slot.
        assert!(result.vert_code.contains(" * "));
        assert!(!result.frag_code.contains(" * "));
    }

    #[tokio::test]
    async fn test_unconsumed_varying_stays_out_of_both_stages() {
        let (mut graph, ctx) = unlit_graph();
        let registry = builtin_registry();
        let pos = graph.add_node(registry.instantiate("world-position").unwrap());
        let orphan = graph.add_node(registry.instantiate("varying").unwrap());
        graph.connect(pos, "out", orphan, "in").unwrap();
        let red = graph.add_node(vec3_constant([1.0, 0.0, 0.0]));
        graph.connect(red, "out", ctx, "BaseColor").unwrap();

        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        assert!(!result.vert_code.contains("v_bridge_"));
        assert!(!result.frag_code.contains("v_bridge_"));
    }

    #[tokio::test]
    async fn test_alpha_clip_setting_emits_discard() {
        let (mut graph, _ctx) = unlit_graph();
        graph.setting.alpha_clip = true;
        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        assert!(result
            .frag_code
            .contains("if (sw_Alpha < sw_AlphaClipThreshold) discard;"));
    }

    #[tokio::test]
    async fn test_lit_template_defaults() {
        let mut graph = Graph::new("lit material");
        graph.add_node(fragment_context(&[("BaseColor", ValueType::Vec3)]));
        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        assert!(result.frag_code.contains("uniform vec3 sw_lightDir;"));
        assert!(result.frag_code.contains("float sw_Roughness = 0.5;"));
    }

    #[tokio::test]
    async fn test_vertex_context_offsets() {
        let (mut graph, _ctx) = unlit_graph();
        let mut vertex_ctx = Node::new(VERTEX_CONTEXT_KIND);
        vertex_ctx.push_block(
            Block::new("PositionOffset"),
            Port::with_value(Value::Vec3([0.0, 1.0, 0.0])),
        );
        graph.add_node(vertex_ctx);

        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        assert!(result
            .vert_code
            .contains("vec3 sw_PositionOffset = vec3(0.0, 1.0, 0.0);"));
    }

    fn sub_graph_invert() -> Graph {
        let mut inner = Graph::with_setting("invert", Setting::sub_graph());
        let mut input = Node::new(SUBGRAPH_INPUT_KIND);
        input.set_input("name", Port::with_value(Value::String("Fac".into())));
        input.set_output("out", Port::new(ValueType::Vec3));
        let input = inner.add_node(input);
        let invert = inner.add_node(builtin_registry().instantiate("one-minus").unwrap());
        let mut output = Node::new(SUBGRAPH_OUTPUT_KIND);
        output.set_input("Color", Port::new(ValueType::Vec3));
        let output = inner.add_node(output);
        inner.connect(input, "out", invert, "value").unwrap();
        inner.connect(invert, "out", output, "Color").unwrap();
        inner
    }

    fn sub_graph_user() -> (Graph, NodeId) {
        let (mut graph, ctx) = unlit_graph();
        let mut user = Node::new(SUBGRAPH_KIND);
        user.set_input("asset", Port::with_value(Value::String("fx/invert".into())));
        user.set_input("Fac", Port::with_value(Value::Vec3([0.25, 0.25, 0.25])));
        user.set_output("Color", Port::new(ValueType::Vec3));
        let user = graph.add_node(user);
        graph.connect(user, "Color", ctx, "BaseColor").unwrap();
        (graph, user)
    }

    #[tokio::test]
    async fn test_subgraph_inlines_as_namespaced_function() {
        let mut provider = MapProvider::new();
        provider.insert("fx/invert", sub_graph_invert());
        let mut compiler = ShaderGraphCompiler::new();
        compiler.set_provider(Arc::new(provider));

        let (graph, _user) = sub_graph_user();
        let result = compiler.compile(&graph).await.unwrap();
        assert!(result.frag_code.contains("void sg_fx_invert_1("));
        assert!(result.frag_code.contains("sg_fx_invert_1(vec3(0.25, 0.25, 0.25), "));
    }

    #[tokio::test]
    async fn test_two_subgraph_instances_get_distinct_namespaces() {
        let mut provider = MapProvider::new();
        provider.insert("fx/invert", sub_graph_invert());
        let mut compiler = ShaderGraphCompiler::new();
        compiler.set_provider(Arc::new(provider));

        let (mut graph, ctx) = unlit_graph();
        let mut first = Node::new(SUBGRAPH_KIND);
        first.set_input("asset", Port::with_value(Value::String("fx/invert".into())));
        first.set_output("Color", Port::new(ValueType::Vec3));
        let first = graph.add_node(first);
        let mut second = Node::new(SUBGRAPH_KIND);
        second.set_input("asset", Port::with_value(Value::String("fx/invert".into())));
        second.set_output("Color", Port::new(ValueType::Vec3));
        let second = graph.add_node(second);
        let combine = graph.add_node(builtin_registry().instantiate("add").unwrap());
        graph.connect(first, "Color", combine, "a").unwrap();
        graph.connect(second, "Color", combine, "b").unwrap();
        graph.connect(combine, "out", ctx, "BaseColor").unwrap();

        let result = compiler.compile(&graph).await.unwrap();
        assert!(result.frag_code.contains("void sg_fx_invert_1("));
        assert!(result.frag_code.contains("void sg_fx_invert_2("));
    }

    #[tokio::test]
    async fn test_subgraph_without_provider_fails() {
        let (graph, _user) = sub_graph_user();
        let err = ShaderGraphCompiler::new().compile(&graph).await.unwrap_err();
        assert_eq!(err, CompileError::SubGraph(crate::SubGraphError::NoProvider));
    }

    #[tokio::test]
    async fn test_node_preview_coerces_to_vec4() {
        let mut graph = Graph::new("scratch");
        let node = graph.add_node(vec3_constant([0.0, 1.0, 0.0]));
        // None previews the first declared output.
        let result = ShaderGraphCompiler::new()
            .compile_preview(&graph, node, None)
            .await
            .unwrap();
        assert!(result
            .frag_code
            .contains("sw_fragColor = vec4(vec3(0.0, 1.0, 0.0), 1.0);"));
        assert!(result.frag_code.contains("void sw_frag()"));
    }

    #[tokio::test]
    async fn test_sub_graph_preview_binds_default_inputs() {
        let inner = sub_graph_invert();
        let result = ShaderGraphCompiler::new()
            .compile_sub_graph_preview(&inner)
            .await
            .unwrap();
        // Fac defaults to vec3(0); the preview shows 1 - 0.
        assert!(result.frag_code.contains("vec3(1.0) - vec3(0.0, 0.0, 0.0)"));
    }

    #[tokio::test]
    async fn test_sub_graph_preview_rejects_material_graph() {
        let (graph, _ctx) = unlit_graph();
        let err = ShaderGraphCompiler::new()
            .compile_sub_graph_preview(&graph)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CompileError::SubGraph(crate::SubGraphError::NotASubGraph(_))
        ));
    }

    struct VertexPositionRead;

    impl NodeComponent for VertexPositionRead {
        fn schema(&self) -> ComponentSchema {
            ComponentSchema {
                outputs: vec![PortSchema::new("out", ValueType::Vec3)],
                affinity: StageAffinity::VertexOnly,
                ..ComponentSchema::default()
            }
        }

        fn emit(
            &self,
            _ctx: &mut crate::EmitContext<'_>,
            _node: &Node,
            _inputs: &IndexMap<String, TypedExpr>,
        ) -> Result<Emission, CompileError> {
            Ok(Emission::inline(
                "out",
                TypedExpr::new("a_position", ValueType::Vec3),
            ))
        }
    }

    #[tokio::test]
    async fn test_vertex_only_component_rejected_in_fragment_stage() {
        let mut compiler = ShaderGraphCompiler::new();
        compiler
            .register("vertex-position", Arc::new(VertexPositionRead))
            .unwrap();

        let (mut graph, ctx) = unlit_graph();
        let source = graph.add_node(compiler.registry.instantiate("vertex-position").unwrap());
        graph.connect(source, "out", ctx, "BaseColor").unwrap();

        let err = compiler.compile(&graph).await.unwrap_err();
        assert!(matches!(
            err,
            CompileError::StageMismatch {
                stage: "fragment",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_preview_of_corrupted_snapshot_reports_cycle() {
        // connect() refuses cycles, so fabricate the edges directly; the
        // preview path skips whole-graph validation and must still stop
        // on the evaluator's in-flight guard.
        let (mut graph, _ctx) = unlit_graph();
        let registry = builtin_registry();
        let a = graph.add_node(registry.instantiate("add").unwrap());
        let b = graph.add_node(registry.instantiate("add").unwrap());
        graph.insert_connection_unchecked(Connection::new(a, "out", b, "a"));
        graph.insert_connection_unchecked(Connection::new(b, "out", a, "a"));

        let err = ShaderGraphCompiler::new()
            .compile_preview(&graph, a, None)
            .await
            .unwrap_err();
        assert_eq!(err, CompileError::CyclicGraph(a));
    }

    #[tokio::test]
    async fn test_binding_indices_follow_sorted_keys() {
        let (mut graph, ctx) = unlit_graph();
        let registry = builtin_registry();
        let first = graph.add_node(registry.instantiate("sample-texture").unwrap());
        let second = graph.add_node(registry.instantiate("sample-texture").unwrap());
        let blend = graph.add_node(registry.instantiate("mix").unwrap());
        graph.connect(first, "rgb", blend, "a").unwrap();
        graph.connect(second, "rgb", blend, "b").unwrap();
        graph.connect(blend, "out", ctx, "BaseColor").unwrap();

        let result = ShaderGraphCompiler::new().compile(&graph).await.unwrap();
        assert_eq!(result.binding_map.len(), 4);
        let indices: Vec<usize> = result.binding_map.values().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }
}
