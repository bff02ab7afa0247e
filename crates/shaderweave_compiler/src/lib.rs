// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader graph compiler.
//!
//! Turns a [`shaderweave_graph::Graph`] snapshot into vertex and fragment
//! shader source plus the uniform, binding and resource tables a host
//! needs to drive the compiled material. The entry point is
//! [`ShaderGraphCompiler`]; per-kind codegen lives behind the
//! [`NodeComponent`] trait, and subgraph assets are fetched through an
//! async [`SubGraphProvider`] before the synchronous evaluation passes.

pub mod coerce;
mod compiler;
pub mod components;
mod context;
pub mod error;
mod evaluator;
mod preview;
pub mod registry;
mod result;
pub mod subgraph;
mod template;

pub use compiler::ShaderGraphCompiler;
pub use components::builtin_registry;
pub use context::ContextCompiler;
pub use error::{CompileError, CompileWarning, RegistryError, SubGraphError, TypeError};
pub use evaluator::{EmitContext, EvalShared, GraphEvaluator};
pub use registry::{
    ComponentRegistry, ComponentSchema, Emission, HelperDefine, NodeComponent, PortSchema,
    StageAffinity, TypedExpr,
};
pub use result::{BindingEntry, CompilationResult, ResourceTable, UniformEntry};
pub use subgraph::{MapProvider, ResolvedSubGraphs, SubGraphProvider};
