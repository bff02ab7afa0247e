// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed shader-graph data model for ShaderWeave.
//!
//! This crate holds the in-memory representation consumed by the compiler:
//! - Typed values and shader value types
//! - Nodes with ordered, named input/output ports
//! - Context nodes (vertex/fragment stage roots) owning blocks
//! - Directed connections between ports
//! - Graph-level named parameters
//! - Material settings (template, blend/cull/depth flags)
//! - A serde interchange document format
//!
//! The model is mutated only by an owning editor; the compiler reads it as
//! an immutable snapshot and never writes back.

pub mod connection;
pub mod document;
pub mod graph;
pub mod node;
pub mod parameter;
pub mod port;
pub mod setting;
pub mod value;

pub use connection::{Connection, ConnectionId};
pub use graph::{Graph, GraphError, ShaderStage};
pub use node::{Block, Node, NodeId, FRAGMENT_CONTEXT_KIND, VERTEX_CONTEXT_KIND};
pub use parameter::Parameter;
pub use port::Port;
pub use setting::{MaterialTemplate, Setting};
pub use value::{GradientStop, Value, ValueType};
