// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value types that flow through shader-graph ports.

use serde::{Deserialize, Serialize};

/// Semantic type of a value carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Scalar float
    Float,
    /// 2D vector
    Vec2,
    /// 3D vector
    Vec3,
    /// 4D vector / color
    Vec4,
    /// 2x2 matrix
    Mat2,
    /// 3x3 matrix
    Mat3,
    /// 4x4 matrix
    Mat4,
    /// 2D texture reference
    Texture2D,
    /// Sampler state reference
    Sampler,
    /// Color gradient (ordered stops)
    Gradient,
    /// Vertex stream handle
    Vertex,
    /// Boolean flag
    Bool,
    /// String (asset ids, parameter names)
    String,
}

impl ValueType {
    /// Number of scalar components, for numeric types.
    ///
    /// Matrices report their total element count; opaque types report 0.
    pub fn components(&self) -> usize {
        match self {
            Self::Float => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
            Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
            Self::Texture2D
            | Self::Sampler
            | Self::Gradient
            | Self::Vertex
            | Self::Bool
            | Self::String => 0,
        }
    }

    /// True for float/vec2/vec3/vec4.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Float | Self::Vec2 | Self::Vec3 | Self::Vec4)
    }

    /// Spelling of this type in emitted shader source.
    pub fn code_name(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Mat2 => "mat2",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
            Self::Texture2D => "sampler2D",
            Self::Sampler => "sampler",
            Self::Gradient => "gradient",
            Self::Vertex => "vertex",
            Self::Bool => "bool",
            Self::String => "string",
        }
    }

    /// Check whether a value of this type may feed a port of `other`'s type.
    ///
    /// Equal types always connect. Scalars broadcast into vectors and
    /// vectors resize between each other; everything else (matrices,
    /// textures, samplers, gradients, bools, strings, vertex streams) only
    /// connects to its own type. Vector-to-scalar is not implicit; a split
    /// node makes the component read explicit.
    pub fn can_coerce_to(&self, other: &ValueType) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (Self::Float, Self::Vec2 | Self::Vec3 | Self::Vec4) => true,
            (Self::Vec2 | Self::Vec3 | Self::Vec4, Self::Vec2 | Self::Vec3 | Self::Vec4) => true,
            _ => false,
        }
    }

    /// Construct the default literal for this type.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Float => Value::Float(0.0),
            Self::Vec2 => Value::Vec2([0.0; 2]),
            Self::Vec3 => Value::Vec3([0.0; 3]),
            Self::Vec4 => Value::Vec4([0.0, 0.0, 0.0, 1.0]),
            Self::Mat2 => Value::Mat2(identity(2)),
            Self::Mat3 => Value::Mat3(identity(3)),
            Self::Mat4 => Value::Mat4(identity(4)),
            Self::Texture2D => Value::Texture(None),
            Self::Sampler => Value::Sampler(None),
            Self::Gradient => Value::Gradient(vec![
                GradientStop { offset: 0.0, color: [0.0, 0.0, 0.0, 1.0] },
                GradientStop { offset: 1.0, color: [1.0, 1.0, 1.0, 1.0] },
            ]),
            Self::Vertex => Value::Vertex,
            Self::Bool => Value::Bool(false),
            Self::String => Value::String(String::new()),
        }
    }
}

fn identity<const N: usize>(side: usize) -> [f32; N] {
    let mut out = [0.0; N];
    for i in 0..side {
        out[i * side + i] = 1.0;
    }
    out
}

/// A single stop of a [`ValueType::Gradient`] value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position of the stop in `[0, 1]`.
    pub offset: f32,
    /// RGBA color at the stop.
    pub color: [f32; 4],
}

/// A literal value stored on a port or parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Scalar float
    Float(f32),
    /// 2D vector
    Vec2([f32; 2]),
    /// 3D vector
    Vec3([f32; 3]),
    /// 4D vector / color
    Vec4([f32; 4]),
    /// 2x2 matrix, column-major
    Mat2([f32; 4]),
    /// 3x3 matrix, column-major
    Mat3([f32; 9]),
    /// 4x4 matrix, column-major
    Mat4([f32; 16]),
    /// Texture asset id, if assigned
    Texture(Option<String>),
    /// Sampler preset name, if assigned
    Sampler(Option<String>),
    /// Ordered gradient stops
    Gradient(Vec<GradientStop>),
    /// Vertex stream marker (carries no literal payload)
    Vertex,
    /// Boolean flag
    Bool(bool),
    /// String payload
    String(String),
}

impl Value {
    /// The [`ValueType`] this literal belongs to.
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Float(_) => ValueType::Float,
            Self::Vec2(_) => ValueType::Vec2,
            Self::Vec3(_) => ValueType::Vec3,
            Self::Vec4(_) => ValueType::Vec4,
            Self::Mat2(_) => ValueType::Mat2,
            Self::Mat3(_) => ValueType::Mat3,
            Self::Mat4(_) => ValueType::Mat4,
            Self::Texture(_) => ValueType::Texture2D,
            Self::Sampler(_) => ValueType::Sampler,
            Self::Gradient(_) => ValueType::Gradient,
            Self::Vertex => ValueType::Vertex,
            Self::Bool(_) => ValueType::Bool,
            Self::String(_) => ValueType::String,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_counts() {
        assert_eq!(ValueType::Float.components(), 1);
        assert_eq!(ValueType::Vec3.components(), 3);
        assert_eq!(ValueType::Mat3.components(), 9);
        assert_eq!(ValueType::Texture2D.components(), 0);
    }

    #[test]
    fn test_default_matches_type() {
        for ty in [
            ValueType::Float,
            ValueType::Vec2,
            ValueType::Vec3,
            ValueType::Vec4,
            ValueType::Mat2,
            ValueType::Mat3,
            ValueType::Mat4,
            ValueType::Texture2D,
            ValueType::Sampler,
            ValueType::Gradient,
            ValueType::Vertex,
            ValueType::Bool,
            ValueType::String,
        ] {
            assert_eq!(ty.default_value().value_type(), ty);
        }
    }

    #[test]
    fn test_mat_default_is_identity() {
        let Value::Mat3(m) = ValueType::Mat3.default_value() else {
            panic!("expected mat3");
        };
        assert_eq!(m[0], 1.0);
        assert_eq!(m[4], 1.0);
        assert_eq!(m[8], 1.0);
        assert_eq!(m[1], 0.0);
    }

    #[test]
    fn test_vec4_default_is_opaque() {
        assert_eq!(
            ValueType::Vec4.default_value(),
            Value::Vec4([0.0, 0.0, 0.0, 1.0])
        );
    }
}
