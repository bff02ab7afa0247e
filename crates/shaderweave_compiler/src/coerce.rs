// SPDX-License-Identifier: MIT OR Apache-2.0
//! Expression-level type coercion and literal formatting.

use crate::error::TypeError;
use shaderweave_graph::{Value, ValueType};

/// Format a float the way it appears in emitted shader source.
pub fn fmt_f32(v: f32) -> String {
    if v.is_finite() {
        let s = format!("{v:.9}");
        let trimmed = s.trim_end_matches('0');
        if trimmed.ends_with('.') {
            format!("{trimmed}0")
        } else {
            trimmed.to_string()
        }
    } else {
        "0.0".to_string()
    }
}

fn vec_ctor(name: &str, parts: &[f32]) -> String {
    let inner: Vec<String> = parts.iter().copied().map(fmt_f32).collect();
    format!("{}({})", name, inner.join(", "))
}

/// Inline shader text for a literal, or `None` for opaque types
/// (textures, samplers, gradients, vertex streams, strings).
pub fn literal(value: &Value) -> Option<String> {
    match value {
        Value::Float(v) => Some(fmt_f32(*v)),
        Value::Vec2(v) => Some(vec_ctor("vec2", v)),
        Value::Vec3(v) => Some(vec_ctor("vec3", v)),
        Value::Vec4(v) => Some(vec_ctor("vec4", v)),
        Value::Mat2(v) => Some(vec_ctor("mat2", v)),
        Value::Mat3(v) => Some(vec_ctor("mat3", v)),
        Value::Mat4(v) => Some(vec_ctor("mat4", v)),
        Value::Bool(v) => Some(v.to_string()),
        Value::Texture(_)
        | Value::Sampler(_)
        | Value::Gradient(_)
        | Value::Vertex
        | Value::String(_) => None,
    }
}

/// Convert `expr` of type `from` into an expression of type `to`.
///
/// Identity when equal; scalars broadcast into vectors; vectors truncate
/// by swizzle or extend with zero-fill, except vec3 -> vec4 which fills
/// the fourth component with `1.0` (colors stay opaque). Vector-to-scalar
/// and every non-numeric mismatch are rejected.
pub fn coerce(expr: &str, from: ValueType, to: ValueType) -> Result<String, TypeError> {
    use ValueType::{Float, Vec2, Vec3, Vec4};

    if from == to {
        return Ok(expr.to_string());
    }

    let incompatible = || TypeError::Incompatible { from, to };

    if !from.is_numeric() || !to.is_numeric() {
        return Err(incompatible());
    }

    Ok(match (from, to) {
        // Scalar broadcast
        (Float, Vec2) => format!("vec2({expr})"),
        (Float, Vec3) => format!("vec3({expr})"),
        (Float, Vec4) => format!("vec4({expr})"),
        // Truncation by swizzle
        (Vec3 | Vec4, Vec2) => format!("({expr}).xy"),
        (Vec4, Vec3) => format!("({expr}).xyz"),
        // Extension
        (Vec2, Vec3) => format!("vec3({expr}, 0.0)"),
        (Vec2, Vec4) => format!("vec4({expr}, 0.0, 0.0)"),
        (Vec3, Vec4) => format!("vec4({expr}, 1.0)"),
        // Vector to scalar stays explicit (split node)
        _ => return Err(incompatible()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_untouched() {
        assert_eq!(
            coerce("v1", ValueType::Vec3, ValueType::Vec3).unwrap(),
            "v1"
        );
    }

    #[test]
    fn test_scalar_broadcast() {
        assert_eq!(
            coerce("x", ValueType::Float, ValueType::Vec3).unwrap(),
            "vec3(x)"
        );
    }

    #[test]
    fn test_truncation() {
        assert_eq!(
            coerce("v", ValueType::Vec4, ValueType::Vec2).unwrap(),
            "(v).xy"
        );
    }

    #[test]
    fn test_vec3_to_vec4_opaque_alpha() {
        assert_eq!(
            coerce("c", ValueType::Vec3, ValueType::Vec4).unwrap(),
            "vec4(c, 1.0)"
        );
    }

    #[test]
    fn test_vector_to_scalar_rejected() {
        assert!(matches!(
            coerce("v", ValueType::Vec3, ValueType::Float),
            Err(TypeError::Incompatible { .. })
        ));
    }

    #[test]
    fn test_opaque_types_rejected() {
        assert!(coerce("t", ValueType::Texture2D, ValueType::Vec4).is_err());
        assert!(coerce("b", ValueType::Bool, ValueType::Float).is_err());
        assert!(coerce("m", ValueType::Mat3, ValueType::Vec3).is_err());
    }

    #[test]
    fn test_literal_formatting() {
        assert_eq!(literal(&Value::Float(1.0)).unwrap(), "1.0");
        assert_eq!(literal(&Value::Float(0.25)).unwrap(), "0.25");
        assert_eq!(
            literal(&Value::Vec3([1.0, 0.0, 0.0])).unwrap(),
            "vec3(1.0, 0.0, 0.0)"
        );
        assert_eq!(literal(&Value::Texture(None)), None);
    }
}
