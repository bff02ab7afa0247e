// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arithmetic and interpolation components.
//!
//! Ports are declared vec3 for the common color case; coercion at the
//! connection boundary broadcasts scalars and resizes vectors.

use crate::error::CompileError;
use crate::evaluator::EmitContext;
use crate::registry::{ComponentSchema, Emission, NodeComponent, PortSchema, TypedExpr};
use indexmap::IndexMap;
use shaderweave_graph::{Node, Value, ValueType};

use super::numeric_input;

fn binary_schema() -> ComponentSchema {
    ComponentSchema {
        inputs: vec![
            PortSchema::new("a", ValueType::Vec3),
            PortSchema::new("b", ValueType::Vec3),
        ],
        outputs: vec![PortSchema::new("out", ValueType::Vec3)],
        ..ComponentSchema::default()
    }
}

fn unary_schema() -> ComponentSchema {
    ComponentSchema {
        inputs: vec![PortSchema::new("value", ValueType::Vec3)],
        outputs: vec![PortSchema::new("out", ValueType::Vec3)],
        ..ComponentSchema::default()
    }
}

/// Infix arithmetic over two vec3 operands.
pub struct Binary {
    op: &'static str,
}

impl Binary {
    pub fn new(op: &'static str) -> Self {
        Self { op }
    }
}

impl NodeComponent for Binary {
    fn schema(&self) -> ComponentSchema {
        binary_schema()
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        _node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let a = numeric_input(inputs, "a", ValueType::Vec3)?;
        let b = numeric_input(inputs, "b", ValueType::Vec3)?;
        let (var, line) = ctx.assign(
            ValueType::Vec3,
            &format!("{} {} {}", a.expr, self.op, b.expr),
        );
        let mut emission = Emission::inline("out", TypedExpr::new(var, ValueType::Vec3));
        emission.code.push(line);
        Ok(emission)
    }
}

/// `mix(a, b, t)` with a scalar blend factor defaulting to 0.5.
pub struct Mix;

impl NodeComponent for Mix {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            inputs: vec![
                PortSchema::new("a", ValueType::Vec3),
                PortSchema::new("b", ValueType::Vec3),
                PortSchema::with_default("t", Value::Float(0.5)),
            ],
            outputs: vec![PortSchema::new("out", ValueType::Vec3)],
            ..ComponentSchema::default()
        }
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        _node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let a = numeric_input(inputs, "a", ValueType::Vec3)?;
        let b = numeric_input(inputs, "b", ValueType::Vec3)?;
        let t = numeric_input(inputs, "t", ValueType::Float)?;
        let (var, line) = ctx.assign(
            ValueType::Vec3,
            &format!("mix({}, {}, {})", a.expr, b.expr, t.expr),
        );
        let mut emission = Emission::inline("out", TypedExpr::new(var, ValueType::Vec3));
        emission.code.push(line);
        Ok(emission)
    }
}

/// `dot(a, b)` producing a scalar.
pub struct Dot;

impl NodeComponent for Dot {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            inputs: vec![
                PortSchema::new("a", ValueType::Vec3),
                PortSchema::new("b", ValueType::Vec3),
            ],
            outputs: vec![PortSchema::new("out", ValueType::Float)],
            ..ComponentSchema::default()
        }
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        _node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let a = numeric_input(inputs, "a", ValueType::Vec3)?;
        let b = numeric_input(inputs, "b", ValueType::Vec3)?;
        let (var, line) = ctx.assign(ValueType::Float, &format!("dot({}, {})", a.expr, b.expr));
        let mut emission = Emission::inline("out", TypedExpr::new(var, ValueType::Float));
        emission.code.push(line);
        Ok(emission)
    }
}

/// `normalize(value)`.
pub struct Normalize;

impl NodeComponent for Normalize {
    fn schema(&self) -> ComponentSchema {
        unary_schema()
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        _node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let value = numeric_input(inputs, "value", ValueType::Vec3)?;
        let (var, line) = ctx.assign(ValueType::Vec3, &format!("normalize({})", value.expr));
        let mut emission = Emission::inline("out", TypedExpr::new(var, ValueType::Vec3));
        emission.code.push(line);
        Ok(emission)
    }
}

/// `pow(a, b)` over scalars, exponent defaulting to 2.
pub struct Power;

impl NodeComponent for Power {
    fn schema(&self) -> ComponentSchema {
        ComponentSchema {
            inputs: vec![
                PortSchema::new("a", ValueType::Float),
                PortSchema::with_default("b", Value::Float(2.0)),
            ],
            outputs: vec![PortSchema::new("out", ValueType::Float)],
            ..ComponentSchema::default()
        }
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        _node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let a = numeric_input(inputs, "a", ValueType::Float)?;
        let b = numeric_input(inputs, "b", ValueType::Float)?;
        let (var, line) = ctx.assign(ValueType::Float, &format!("pow({}, {})", a.expr, b.expr));
        let mut emission = Emission::inline("out", TypedExpr::new(var, ValueType::Float));
        emission.code.push(line);
        Ok(emission)
    }
}

/// Clamp into `[0, 1]`.
pub struct Saturate;

impl NodeComponent for Saturate {
    fn schema(&self) -> ComponentSchema {
        unary_schema()
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        _node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let value = numeric_input(inputs, "value", ValueType::Vec3)?;
        let (var, line) = ctx.assign(
            ValueType::Vec3,
            &format!("clamp({}, 0.0, 1.0)", value.expr),
        );
        let mut emission = Emission::inline("out", TypedExpr::new(var, ValueType::Vec3));
        emission.code.push(line);
        Ok(emission)
    }
}

/// `1 - value`, componentwise.
pub struct OneMinus;

impl NodeComponent for OneMinus {
    fn schema(&self) -> ComponentSchema {
        unary_schema()
    }

    fn emit(
        &self,
        ctx: &mut EmitContext<'_>,
        _node: &Node,
        inputs: &IndexMap<String, TypedExpr>,
    ) -> Result<Emission, CompileError> {
        let value = numeric_input(inputs, "value", ValueType::Vec3)?;
        let (var, line) = ctx.assign(ValueType::Vec3, &format!("vec3(1.0) - {}", value.expr));
        let mut emission = Emission::inline("out", TypedExpr::new(var, ValueType::Vec3));
        emission.code.push(line);
        Ok(emission)
    }
}
