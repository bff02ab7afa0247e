// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the shader graph.

use crate::port::Port;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node, scoped to one graph instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Short hex form used to namespace generated shader identifiers.
    pub fn short(&self) -> String {
        let simple = self.0.simple().to_string();
        simple[..8].to_string()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node kind id of the vertex stage root.
pub const VERTEX_CONTEXT_KIND: &str = "vertex-context";
/// Node kind id of the fragment stage root.
pub const FRAGMENT_CONTEXT_KIND: &str = "fragment-context";

/// A named sub-contribution pinned inside a context node.
///
/// Each block is backed by an input port on the owning context node keyed
/// by the block kind (e.g. `BaseColor`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block kind, unique within its context (e.g. `BaseColor`, `Alpha`)
    pub kind: String,
    /// Optional display name for the editor
    pub display: Option<String>,
}

impl Block {
    /// Create a block of the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            display: None,
        }
    }
}

/// A node instance in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Component kind id resolved through the registry at compile time
    pub kind: String,
    /// Ordered input ports by name
    pub inputs: IndexMap<String, Port>,
    /// Ordered output ports by name
    pub outputs: IndexMap<String, Port>,
    /// Block children; only context nodes carry any
    pub blocks: Vec<Block>,
}

impl Node {
    /// Create a node of a kind with no ports; ports are normally filled in
    /// from the component schema by the registry.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            kind: kind.into(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            blocks: Vec::new(),
        }
    }

    /// Get an input port by name.
    pub fn input(&self, name: &str) -> Option<&Port> {
        self.inputs.get(name)
    }

    /// Get an output port by name.
    pub fn output(&self, name: &str) -> Option<&Port> {
        self.outputs.get(name)
    }

    /// Name and port of the first declared output, if any.
    pub fn first_output(&self) -> Option<(&str, &Port)> {
        self.outputs.iter().next().map(|(n, p)| (n.as_str(), p))
    }

    /// True for vertex/fragment stage roots.
    pub fn is_context(&self) -> bool {
        self.kind == VERTEX_CONTEXT_KIND || self.kind == FRAGMENT_CONTEXT_KIND
    }

    /// Add an input port, replacing any existing port of the same name.
    pub fn set_input(&mut self, name: impl Into<String>, port: Port) -> &mut Self {
        self.inputs.insert(name.into(), port);
        self
    }

    /// Add an output port, replacing any existing port of the same name.
    pub fn set_output(&mut self, name: impl Into<String>, port: Port) -> &mut Self {
        self.outputs.insert(name.into(), port);
        self
    }

    /// Append a block and its backing input port.
    pub fn push_block(&mut self, block: Block, port: Port) -> &mut Self {
        self.inputs.insert(block.kind.clone(), port);
        self.blocks.push(block);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    #[test]
    fn test_node_ids_are_unique() {
        assert_ne!(NodeId::new(), NodeId::new());
    }

    #[test]
    fn test_short_id_is_hex() {
        let short = NodeId::new().short();
        assert_eq!(short.len(), 8);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_block_port_backing() {
        let mut node = Node::new(FRAGMENT_CONTEXT_KIND);
        node.push_block(Block::new("BaseColor"), Port::new(ValueType::Vec3));
        assert!(node.is_context());
        assert_eq!(node.blocks.len(), 1);
        assert!(node.input("BaseColor").is_some());
    }

    #[test]
    fn test_first_output_order() {
        let mut node = Node::new("split");
        node.set_output("r", Port::new(ValueType::Float));
        node.set_output("g", Port::new(ValueType::Float));
        assert_eq!(node.first_output().map(|(n, _)| n), Some("r"));
    }
}
