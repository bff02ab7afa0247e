// SPDX-License-Identifier: MIT OR Apache-2.0
//! Gradient evaluation baked into a helper function.

use crate::coerce::fmt_f32;
use crate::error::CompileError;
use crate::evaluator::EmitContext;
use crate::registry::{
    ComponentSchema, Emission, HelperDefine, NodeComponent, PortSchema, TypedExpr,
};
use indexmap::IndexMap;
use shaderweave_graph::{GradientStop, Node, Value, ValueType};

use super::numeric_input;

use std::hash::{DefaultHasher, Hash, Hasher};

/// Evaluates an authored color gradient at a scalar position.
///
/// The stops are compile-time data, so they bake into a helper function
/// of chained `mix` segments instead of binding a lookup table. Helpers
/// are keyed by stop content, so nodes with the same stops share one.
pub struct SampleGradient;

impl NodeComponent for SampleGradient {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            inputs: vec![
                PortSchema::new("gradient", ValueType::Gradient),
                PortSchema::new("t", ValueType::Float),
            ],
            outputs: vec![PortSchema::new("out", ValueType::Vec4)],
            ..ComponentSchema::default()
        }
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let stops = match node.input("gradient").map(|p| &p.value) {
            Some(Value::Gradient(stops)) if !stops.is_empty() => stops.clone(),
            _ => vec![
                GradientStop {
                    offset: 0.0,
                    color: [0.0, 0.0, 0.0, 1.0],
                },
                GradientStop {
                    offset: 1.0,
                    color: [1.0, 1.0, 1.0, 1.0],
                },
            ],
        };
        let t = numeric_input(inputs, "t", ValueType::Float)?;

        // Named by content so repeated identical gradients share one
        // helper via the defines table.
        let name = helper_name(&stops);
        let define = HelperDefine {
            name: name.clone(),
            text: bake(&name, &stops),
        };

        let (var, line) = ctx.assign(ValueType::Vec4, &format!("{}({})", name, t.expr));
        let mut emission = Emission::inline("out", TypedExpr::new(var, ValueType::Vec4));
        emission.code.push(line);
        emission.defines.push(define);
        Ok(emission)
    }
}

fn helper_name(stops: &[GradientStop]) -> String {
    let mut hasher = DefaultHasher::new();
    for stop in stops {
        stop.offset.to_bits().hash(&mut hasher);
        for channel in stop.color {
            channel.to_bits().hash(&mut hasher);
        }
    }
    format!("grad_{:016x}", hasher.finish())
}

fn color_literal(color: [f32; 4]) -> String {
    format!(
        "vec4({}, {}, {}, {})",
        fmt_f32(color[0]),
        fmt_f32(color[1]),
        fmt_f32(color[2]),
        fmt_f32(color[3])
    )
}

fn bake(name: &str, stops: &[GradientStop]) -> String {
    let mut text = format!("vec4 {name}(float t) {{\n");
    text.push_str(&format!("  vec4 c = {};\n", color_literal(stops[0].color)));
    for pair in stops.windows(2) {
        let span = (pair[1].offset - pair[0].offset).max(1e-5);
        text.push_str(&format!(
            "  c = mix(c, {}, clamp((t - {}) / {}, 0.0, 1.0));\n",
            color_literal(pair[1].color),
            fmt_f32(pair[0].offset),
            fmt_f32(span)
        ));
    }
    text.push_str("  return c;\n}\n");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bake_two_stops() {
        let stops = [
            GradientStop {
                offset: 0.0,
                color: [0.0, 0.0, 0.0, 1.0],
            },
            GradientStop {
                offset: 1.0,
                color: [1.0, 1.0, 1.0, 1.0],
            },
        ];
        let text = bake("grad_x", &stops);
        assert!(text.starts_with("vec4 grad_x(float t) {"));
        assert!(text.contains("mix(c, vec4(1.0, 1.0, 1.0, 1.0)"));
    }

    #[test]
    fn test_helper_name_keyed_by_stop_data() {
        let black_to_white = [
            GradientStop {
                offset: 0.0,
                color: [0.0, 0.0, 0.0, 1.0],
            },
            GradientStop {
                offset: 1.0,
                color: [1.0, 1.0, 1.0, 1.0],
            },
        ];
        let mut shifted = black_to_white;
        shifted[1].offset = 0.75;
        assert_eq!(helper_name(&black_to_white), helper_name(&black_to_white));
        assert_ne!(helper_name(&black_to_white), helper_name(&shifted));
    }

    #[test]
    fn test_bake_single_stop_is_constant() {
        let stops = [GradientStop {
            offset: 0.5,
            color: [1.0, 0.0, 0.0, 1.0],
        }];
        let text = bake("grad_x", &stops);
        assert!(!text.contains("mix"));
        assert!(text.contains("vec4(1.0, 0.0, 0.0, 1.0)"));
    }
}
