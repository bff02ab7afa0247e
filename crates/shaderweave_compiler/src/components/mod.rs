// SPDX-License-Identifier: MIT OR Apache-2.0
//! Builtin node components.
//!
//! Each submodule groups related kinds; [`builtin_registry`] assembles the
//! full catalog. Subgraph and context kinds are handled by the evaluator
//! directly and are never registered here.

mod constant;
mod gradient;
mod input;
mod math;
mod parameter;
mod texture;
mod varying;
mod vector;

pub use varying::VARYING_KIND;

use crate::coerce::{coerce, literal};
use crate::registry::{ComponentRegistry, TypedExpr};
use indexmap::IndexMap;
use shaderweave_graph::ValueType;
use std::sync::Arc;

/// Fetch a resolved input coerced to `value_type`, falling back to the
/// type's default literal when the port is absent or carries no text.
pub(crate) fn numeric_input(
    inputs: &IndexMap<String, TypedExpr>,
    name: &str,
    value_type: ValueType,
) -> Result<TypedExpr, crate::error::TypeError> {
    match inputs.get(name) {
        Some(value) if !value.expr.is_empty() => {
            let expr = coerce(&value.expr, value.value_type, value_type)?;
            Ok(TypedExpr::new(expr, value_type))
        }
        _ => Ok(TypedExpr::new(
            literal(&value_type.default_value()).unwrap_or_default(),
            value_type,
        )),
    }
}

/// Registry preloaded with every builtin component kind.
pub fn builtin_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    // Kinds are fixed at build time, so registration cannot collide.
    let result = (|| {
        registry.register("float", Arc::new(constant::Constant::new(ValueType::Float)))?;
        registry.register("vec2", Arc::new(constant::Constant::new(ValueType::Vec2)))?;
        registry.register("vec3", Arc::new(constant::Constant::new(ValueType::Vec3)))?;
        registry.register("vec4", Arc::new(constant::Constant::new(ValueType::Vec4)))?;
        registry.register("color", Arc::new(constant::Constant::new(ValueType::Vec4)))?;

        registry.register("add", Arc::new(math::Binary::new("+")))?;
        registry.register("subtract", Arc::new(math::Binary::new("-")))?;
        registry.register("multiply", Arc::new(math::Binary::new("*")))?;
        registry.register("divide", Arc::new(math::Binary::new("/")))?;
        registry.register("mix", Arc::new(math::Mix))?;
        registry.register("dot", Arc::new(math::Dot))?;
        registry.register("normalize", Arc::new(math::Normalize))?;
        registry.register("power", Arc::new(math::Power))?;
        registry.register("saturate", Arc::new(math::Saturate))?;
        registry.register("one-minus", Arc::new(math::OneMinus))?;

        registry.register("combine", Arc::new(vector::Combine))?;
        registry.register("split", Arc::new(vector::Split))?;

        registry.register("uv", Arc::new(input::SymbolInput::new("sw_uv", ValueType::Vec2)))?;
        registry.register(
            "world-position",
            Arc::new(input::SymbolInput::new("sw_worldPos", ValueType::Vec3)),
        )?;
        registry.register(
            "world-normal",
            Arc::new(input::SymbolInput::new("sw_worldNormal", ValueType::Vec3)),
        )?;
        registry.register(
            "vertex-color",
            Arc::new(input::SymbolInput::new("sw_vertexColor", ValueType::Vec4)),
        )?;
        registry.register("time", Arc::new(input::SymbolInput::new("sw_time", ValueType::Float)))?;

        registry.register("parameter", Arc::new(parameter::ParameterRead))?;
        registry.register("texture-asset", Arc::new(texture::TextureAsset))?;
        registry.register("sample-texture", Arc::new(texture::SampleTexture))?;
        registry.register("sample-gradient", Arc::new(gradient::SampleGradient))?;
        registry.register(VARYING_KIND, Arc::new(varying::VaryingBridge))?;
        Ok::<(), crate::error::RegistryError>(())
    })();
    debug_assert!(result.is_ok(), "builtin kinds are unique");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_nonempty() {
        let registry = builtin_registry();
        for kind in ["add", "mix", "parameter", "sample-texture", VARYING_KIND] {
            assert!(registry.get(kind).is_some(), "missing builtin `{kind}`");
        }
    }
}
