// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compile error taxonomy.
//!
//! Graph-integrity and type errors abort the compile call; resource
//! problems degrade to warnings carried on the result; subgraph errors
//! abort the call.

use shaderweave_graph::{GraphError, NodeId, ValueType};

/// Error raised while registering components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A component kind was registered twice
    #[error("component kind `{0}` is already registered")]
    DuplicateComponent(String),
}

/// Type-level failure at a connection or merge site.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// No coercion exists between the two types
    #[error("cannot coerce {from:?} to {to:?}")]
    Incompatible {
        /// Source value type
        from: ValueType,
        /// Target value type
        to: ValueType,
    },

    /// Two stages registered the same table key with different types
    #[error("table key `{key}` registered as {first:?} and {second:?}")]
    ConflictingBinding {
        /// Disputed table key
        key: String,
        /// First registered type
        first: ValueType,
        /// Conflicting registration
        second: ValueType,
    },
}

/// Failure while resolving or inlining a subgraph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubGraphError {
    /// Provider has no graph for the asset
    #[error("subgraph asset `{0}` could not be resolved")]
    MissingAsset(String),

    /// A subgraph includes itself, directly or transitively
    #[error("cyclic subgraph inclusion through `{0}`")]
    CyclicInclusion(String),

    /// The resolved graph is not subgraph-typed
    #[error("asset `{0}` is not a subgraph")]
    NotASubGraph(String),

    /// The subgraph violates the single-Output contract
    #[error("subgraph `{0}` must have exactly one output node")]
    MalformedSubGraph(String),

    /// No provider is installed but the graph references subgraphs
    #[error("no subgraph provider installed")]
    NoProvider,
}

/// Fatal error aborting a compile call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// Graph integrity violation
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Node kind has no registered component
    #[error("unknown component kind `{0}`")]
    UnknownComponent(String),

    /// Parameter node references a name missing from the parameter table
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// Directed cycle hit during evaluation (corrupted snapshot)
    #[error("cycle detected while evaluating node {0:?}")]
    CyclicGraph(NodeId),

    /// A value derived in one stage is wired into the other stage
    #[error("node {node:?} of kind `{kind}` cannot be used in the {stage} stage")]
    StageMismatch {
        /// Offending node
        node: NodeId,
        /// Offending component kind
        kind: String,
        /// Stage the node was reached from
        stage: &'static str,
    },

    /// Component evaluation did not produce a requested output port
    #[error("component for node {node:?} emitted no output `{port}`")]
    MissingOutput {
        /// Evaluated node
        node: NodeId,
        /// Requested output port
        port: String,
    },

    /// The graph has no context node for a required stage
    #[error("graph has no {0} context node")]
    MissingContext(&'static str),

    /// Type failure
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Subgraph failure
    #[error(transparent)]
    SubGraph(#[from] SubGraphError),
}

/// Non-fatal problem reported alongside a still-usable result.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CompileWarning {
    /// A resource asset could not be resolved; a default was substituted
    MissingResource {
        /// Node owning the resource slot
        node: NodeId,
        /// Binding key the fallback was registered under
        key: String,
        /// Default value substituted
        fallback: String,
    },
}
