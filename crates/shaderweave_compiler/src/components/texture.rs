// SPDX-License-Identifier: MIT OR Apache-2.0
//! Texture sampling.

use crate::error::{CompileError, CompileWarning};
use crate::evaluator::EmitContext;
use crate::registry::{ComponentSchema, Emission, NodeComponent, PortSchema, TypedExpr};
use indexmap::IndexMap;
use shaderweave_graph::{Node, Value, ValueType};

/// Fallback texture asset when none is assigned.
const DEFAULT_TEXTURE: &str = "white";
/// Fallback sampler preset when none is assigned.
const DEFAULT_SAMPLER: &str = "linear-clamp";

/// A texture binding slot carrying an asset reference.
///
/// Registers one texture binding keyed by the node id and records the
/// assigned (or default) asset in the resource table. Its output is the
/// bound symbol, so several samplers can share one slot.
pub struct TextureAsset;

impl NodeComponent for TextureAsset {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            inputs: vec![PortSchema::new("asset", ValueType::Texture2D)],
            outputs: vec![PortSchema::new("texture", ValueType::Texture2D)],
            ..ComponentSchema::default()
        }
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        node: &Node,
        _inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let short = node.id.short();
        let key = format!("Texture_{short}");
        let symbol = format!("sw_tex_{short}");
        ctx.add_binding(key.clone(), symbol.clone(), ValueType::Texture2D)?;
        register_texture_resource(ctx, node, "asset", key);
        let mut emission = Emission::default();
        emission
            .outputs
            .insert("texture".to_string(), TypedExpr::new(symbol, ValueType::Texture2D));
        Ok(emission)
    }
}

/// Record the texture asset behind `port` for `key`, degrading to the
/// default asset with a warning when none is assigned.
fn register_texture_resource(ctx: &mut EmitContext<'_>, node: &Node, port: &str, key: String) {
    match node.input(port).map(|p| &p.value) {
        Some(Value::Texture(Some(asset))) => {
            ctx.set_texture_default(key, asset.clone());
        }
        _ => {
            ctx.set_texture_default(key.clone(), DEFAULT_TEXTURE.to_string());
            ctx.warn(CompileWarning::MissingResource {
                node: node.id,
                key,
                fallback: DEFAULT_TEXTURE.to_string(),
            });
        }
    }
}

/// Samples a bound 2D texture at a UV coordinate.
///
/// The texture may come from an upstream [`TextureAsset`] node; otherwise
/// the sample node registers its own texture slot from its port literal.
/// A sampler slot is always registered per sample node. An unassigned
/// texture degrades to the default with a warning instead of failing the
/// compile.
pub struct SampleTexture;

impl NodeComponent for SampleTexture {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            inputs: vec![
                PortSchema::new("texture", ValueType::Texture2D),
                PortSchema::new("sampler", ValueType::Sampler),
                PortSchema::new("uv", ValueType::Vec2),
            ],
            outputs: vec![
                PortSchema::new("rgba", ValueType::Vec4),
                PortSchema::new("rgb", ValueType::Vec3),
                PortSchema::new("a", ValueType::Float),
            ],
            ..ComponentSchema::default()
        }
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let short = node.id.short();
        let sampler_key = format!("Sampler_{short}");
        let sampler_symbol = format!("sw_samp_{short}");
        ctx.add_binding(sampler_key.clone(), sampler_symbol, ValueType::Sampler)?;

        // A connected texture port reuses the upstream binding symbol;
        // otherwise this node owns its own slot.
        let texture_symbol = match inputs.get("texture") {
            Some(value)
                if ctx.graph.incoming(node.id, "texture").is_some()
                    && !value.expr.is_empty() =>
            {
                value.expr.clone()
            }
            _ => {
                let texture_key = format!("Texture_{short}");
                let symbol = format!("sw_tex_{short}");
                ctx.add_binding(texture_key.clone(), symbol.clone(), ValueType::Texture2D)?;
                register_texture_resource(ctx, node, "texture", texture_key);
                symbol
            }
        };
        let sampler = match node.input("sampler").map(|p| &p.value) {
            Some(Value::Sampler(Some(preset))) => preset.clone(),
            _ => DEFAULT_SAMPLER.to_string(),
        };
        ctx.set_sampler_default(sampler_key, sampler);

        // Unconnected UV falls back to the interpolated mesh UV, not the
        // port literal.
        let uv = match inputs.get("uv") {
            Some(value) if ctx.graph.incoming(node.id, "uv").is_some() => value.expr.clone(),
            _ => "sw_uv".to_string(),
        };

        let (var, line) = ctx.assign(
            ValueType::Vec4,
            &format!("texture({texture_symbol}, {uv})"),
        );
        let mut emission = Emission::default();
        emission.code.push(line);
        emission.outputs.insert(
            "rgba".to_string(),
            TypedExpr::new(var.clone(), ValueType::Vec4),
        );
        emission.outputs.insert(
            "rgb".to_string(),
            TypedExpr::new(format!("{var}.rgb"), ValueType::Vec3),
        );
        emission.outputs.insert(
            "a".to_string(),
            TypedExpr::new(format!("{var}.a"), ValueType::Float),
        );
        Ok(emission)
    }
}
