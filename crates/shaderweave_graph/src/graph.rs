// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph container: nodes, connections, parameters, settings, integrity.

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeId, FRAGMENT_CONTEXT_KIND, VERTEX_CONTEXT_KIND};
use crate::parameter::Parameter;
use crate::setting::Setting;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Shading stage a context node roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

impl ShaderStage {
    /// Context node kind id for this stage.
    pub fn context_kind(&self) -> &'static str {
        match self {
            Self::Vertex => VERTEX_CONTEXT_KIND,
            Self::Fragment => FRAGMENT_CONTEXT_KIND,
        }
    }
}

/// A shader node graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Material settings
    pub setting: Setting,
    /// Exposed parameters, unique by name
    parameters: Vec<Parameter>,
    /// Nodes in authoring order
    nodes: IndexMap<NodeId, Node>,
    /// Connections in authoring order
    connections: IndexMap<ConnectionId, Connection>,
}

impl Graph {
    /// Create a new empty graph with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_setting(name, Setting::default())
    }

    /// Create a new empty graph with explicit settings.
    pub fn with_setting(name: impl Into<String>, setting: Setting) -> Self {
        Self {
            name: name.into(),
            setting,
            parameters: Vec::new(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Add a node to the graph.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and all connections touching it.
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.involves_node(node_id));
        self.nodes.swap_remove(&node_id)
    }

    /// Get a node by ID.
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID.
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Iterate all nodes in authoring order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterate all connections.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// The connection feeding an input port, if any (inputs have at most one).
    pub fn incoming(&self, node_id: NodeId, port: &str) -> Option<&Connection> {
        self.connections
            .values()
            .find(|c| c.to_node == node_id && c.to_port == port)
    }

    /// Add a parameter to the graph table.
    pub fn add_parameter(&mut self, parameter: Parameter) -> Result<(), GraphError> {
        if self.parameters.iter().any(|p| p.name == parameter.name) {
            return Err(GraphError::DuplicateParameter(parameter.name));
        }
        self.parameters.push(parameter);
        Ok(())
    }

    /// Look up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// All parameters in declaration order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// The context root for a stage, if present.
    pub fn context_node(&self, stage: ShaderStage) -> Option<&Node> {
        self.nodes
            .values()
            .find(|n| n.kind == stage.context_kind())
    }

    /// Connect an output port to an input port.
    ///
    /// Rejects missing endpoints, double-writes to an input, self-loops,
    /// incompatible types, and edges that would close a cycle.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: &str,
        to_node: NodeId,
        to_port: &str,
    ) -> Result<ConnectionId, GraphError> {
        let source_node = self
            .nodes
            .get(&from_node)
            .ok_or(GraphError::NodeNotFound(from_node))?;
        let target_node = self
            .nodes
            .get(&to_node)
            .ok_or(GraphError::NodeNotFound(to_node))?;

        let source = source_node
            .output(from_port)
            .ok_or_else(|| GraphError::PortNotFound(from_node, from_port.to_string()))?;
        let target = target_node
            .input(to_port)
            .ok_or_else(|| GraphError::PortNotFound(to_node, to_port.to_string()))?;

        if !source.value_type.can_coerce_to(&target.value_type) {
            return Err(GraphError::IncompatiblePorts {
                from: source.value_type,
                to: target.value_type,
            });
        }

        if self.incoming(to_node, to_port).is_some() {
            return Err(GraphError::PortAlreadyConnected(to_node, to_port.to_string()));
        }

        if from_node == to_node {
            return Err(GraphError::SelfLoop(from_node));
        }

        // Adding from->to closes a cycle iff `from` is reachable from `to`.
        if self.reaches(to_node, from_node) {
            return Err(GraphError::Cycle);
        }

        let connection = Connection::new(from_node, from_port, to_node, to_port);
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Remove a connection.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.swap_remove(&connection_id)
    }

    /// Insert a connection bypassing every [`Graph::connect`] check.
    ///
    /// Lets tests fabricate corrupted snapshots (cycles, dangling edges)
    /// that the public API refuses to build.
    #[doc(hidden)]
    pub fn insert_connection_unchecked(&mut self, connection: Connection) -> ConnectionId {
        let id = connection.id;
        self.connections.insert(id, connection);
        id
    }

    /// Whether `to` is reachable from `from` walking edges downstream.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            for c in self.connections.values().filter(|c| c.from_node == id) {
                stack.push(c.to_node);
            }
        }
        false
    }

    /// Nodes in dependency order (sources before consumers).
    pub fn topological_order(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut visited = HashSet::new();
        let mut in_progress = HashSet::new();
        let mut order = Vec::new();

        for node_id in self.nodes.keys() {
            if !visited.contains(node_id) {
                self.visit(*node_id, &mut visited, &mut in_progress, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        node_id: NodeId,
        visited: &mut HashSet<NodeId>,
        in_progress: &mut HashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> Result<(), GraphError> {
        if in_progress.contains(&node_id) {
            return Err(GraphError::Cycle);
        }
        if visited.contains(&node_id) {
            return Ok(());
        }

        in_progress.insert(node_id);
        for connection in self.connections.values() {
            if connection.to_node == node_id {
                self.visit(connection.from_node, visited, in_progress, order)?;
            }
        }
        in_progress.remove(&node_id);

        visited.insert(node_id);
        order.push(node_id);
        Ok(())
    }

    /// Check the whole graph for integrity violations.
    ///
    /// This is the authoritative check shared between edit-time use and the
    /// compiler: acyclicity, live connection endpoints, unique block kinds
    /// per context, and unique parameter names.
    pub fn validate(&self) -> Result<(), GraphError> {
        for connection in self.connections.values() {
            let source = self
                .nodes
                .get(&connection.from_node)
                .ok_or(GraphError::DanglingConnection(connection.id))?;
            let target = self
                .nodes
                .get(&connection.to_node)
                .ok_or(GraphError::DanglingConnection(connection.id))?;
            if source.output(&connection.from_port).is_none()
                || target.input(&connection.to_port).is_none()
            {
                return Err(GraphError::DanglingConnection(connection.id));
            }
        }

        for node in self.nodes.values() {
            let mut kinds = HashSet::new();
            for block in &node.blocks {
                if !kinds.insert(block.kind.as_str()) {
                    return Err(GraphError::DuplicateBlock {
                        node: node.id,
                        kind: block.kind.clone(),
                    });
                }
            }
        }

        let mut names = HashSet::new();
        for parameter in &self.parameters {
            if !names.insert(parameter.name.as_str()) {
                return Err(GraphError::DuplicateParameter(parameter.name.clone()));
            }
        }

        self.topological_order().map(|_| ())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Integrity error raised by graph mutation or validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port not found on a node
    #[error("port `{1}` not found on node {0:?}")]
    PortNotFound(NodeId, String),

    /// Source type cannot feed target type
    #[error("cannot connect {from:?} output to {to:?} input")]
    IncompatiblePorts {
        /// Source output type
        from: crate::value::ValueType,
        /// Target input type
        to: crate::value::ValueType,
    },

    /// Input already has a writer
    #[error("input `{1}` on node {0:?} is already connected")]
    PortAlreadyConnected(NodeId, String),

    /// Self-loop not allowed
    #[error("node {0:?} cannot connect to itself")]
    SelfLoop(NodeId),

    /// Graph contains a directed cycle
    #[error("graph contains a cycle")]
    Cycle,

    /// Connection references a missing node or port
    #[error("connection {0:?} references a missing node or port")]
    DanglingConnection(ConnectionId),

    /// Duplicate block kind inside one context
    #[error("context {node:?} has duplicate block kind `{kind}`")]
    DuplicateBlock {
        /// Owning context node
        node: NodeId,
        /// Repeated block kind
        kind: String,
    },

    /// Duplicate parameter name
    #[error("duplicate parameter name `{0}`")]
    DuplicateParameter(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Block;
    use crate::port::Port;
    use crate::value::ValueType;

    fn float_source() -> Node {
        let mut node = Node::new("float");
        node.set_output("out", Port::new(ValueType::Float));
        node
    }

    fn float_passthrough() -> Node {
        let mut node = Node::new("id");
        node.set_input("in", Port::new(ValueType::Float));
        node.set_output("out", Port::new(ValueType::Float));
        node
    }

    #[test]
    fn test_connect_and_order() {
        let mut graph = Graph::new("g");
        let a = graph.add_node(float_source());
        let b = graph.add_node(float_passthrough());
        graph.connect(a, "out", b, "in").expect("valid edge");

        let order = graph.topological_order().expect("acyclic");
        let pos = |id| order.iter().position(|&n| n == id).unwrap();
        assert!(pos(a) < pos(b));
    }

    #[test]
    fn test_single_writer_enforced() {
        let mut graph = Graph::new("g");
        let a = graph.add_node(float_source());
        let b = graph.add_node(float_source());
        let c = graph.add_node(float_passthrough());
        graph.connect(a, "out", c, "in").unwrap();
        let err = graph.connect(b, "out", c, "in").unwrap_err();
        assert!(matches!(err, GraphError::PortAlreadyConnected(..)));
    }

    #[test]
    fn test_connect_rejects_cycle() {
        let mut graph = Graph::new("g");
        let a = graph.add_node(float_passthrough());
        let b = graph.add_node(float_passthrough());
        graph.connect(a, "out", b, "in").unwrap();
        assert_eq!(graph.connect(b, "out", a, "in").unwrap_err(), GraphError::Cycle);
    }

    #[test]
    fn test_connect_rejects_incompatible_types() {
        let mut graph = Graph::new("g");
        let mut tex = Node::new("texture-asset");
        tex.set_output("texture", Port::new(ValueType::Texture2D));
        let tex = graph.add_node(tex);
        let sink = graph.add_node(float_passthrough());
        let err = graph.connect(tex, "texture", sink, "in").unwrap_err();
        assert!(matches!(err, GraphError::IncompatiblePorts { .. }));
    }

    #[test]
    fn test_coercible_connection_allowed() {
        let mut graph = Graph::new("g");
        let a = graph.add_node(float_source());
        let mut sink = Node::new("sink");
        sink.set_input("color", Port::new(ValueType::Vec3));
        let b = graph.add_node(sink);
        assert!(graph.connect(a, "out", b, "color").is_ok());
    }

    #[test]
    fn test_validate_duplicate_block() {
        let mut graph = Graph::new("g");
        let mut ctx = Node::new(FRAGMENT_CONTEXT_KIND);
        ctx.push_block(Block::new("BaseColor"), Port::new(ValueType::Vec3));
        ctx.blocks.push(Block::new("BaseColor"));
        graph.add_node(ctx);
        assert!(matches!(
            graph.validate().unwrap_err(),
            GraphError::DuplicateBlock { .. }
        ));
    }

    #[test]
    fn test_validate_detects_forced_cycle() {
        // Bypass connect() checks to simulate a corrupted snapshot.
        let mut graph = Graph::new("g");
        let a = graph.add_node(float_passthrough());
        let b = graph.add_node(float_passthrough());
        graph.insert_connection_unchecked(Connection::new(a, "out", b, "in"));
        graph.insert_connection_unchecked(Connection::new(b, "out", a, "in"));
        assert_eq!(graph.validate().unwrap_err(), GraphError::Cycle);
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let mut graph = Graph::new("g");
        graph
            .add_parameter(Parameter::new("Albedo", ValueType::Vec4))
            .unwrap();
        let err = graph
            .add_parameter(Parameter::new("Albedo", ValueType::Float))
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateParameter("Albedo".into()));
    }

    #[test]
    fn test_remove_node_drops_edges() {
        let mut graph = Graph::new("g");
        let a = graph.add_node(float_source());
        let b = graph.add_node(float_passthrough());
        graph.connect(a, "out", b, "in").unwrap();
        graph.remove_node(a);
        assert_eq!(graph.connections().count(), 0);
    }
}
