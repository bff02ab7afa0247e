// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serde interchange format for shader graphs.
//!
//! This is the document shape produced by the authoring editor and consumed
//! here: a flat node list with per-node port data and blocks, a connection
//! list, a parameter table and a settings record. [`GraphDoc::into_graph`]
//! rebuilds a validated in-memory [`Graph`] from it.

use crate::graph::{Graph, GraphError};
use crate::node::{Block, Node, NodeId};
use crate::parameter::Parameter;
use crate::port::Port;
use crate::setting::Setting;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ports of one node in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortData {
    /// Input ports by name, in authoring order
    #[serde(default)]
    pub inputs: IndexMap<String, Port>,
    /// Output ports by name, in authoring order
    #[serde(default)]
    pub outputs: IndexMap<String, Port>,
}

/// One node entry in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDoc {
    /// Node id, unique within the document
    pub id: Uuid,
    /// Component kind id
    pub kind: String,
    /// Port literals and types
    #[serde(default)]
    pub port_data: PortData,
    /// Blocks, for context nodes
    #[serde(default)]
    pub blocks: Vec<Block>,
    /// Owning context node, editor-side metadata
    #[serde(default)]
    pub context_id: Option<Uuid>,
}

/// One connection entry in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDoc {
    /// Source node id
    pub from_node: Uuid,
    /// Source output port name
    pub from_port: String,
    /// Target node id
    pub to_node: Uuid,
    /// Target input port name
    pub to_port: String,
}

/// A complete shader-graph document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDoc {
    /// Graph name
    #[serde(default)]
    pub name: String,
    /// Node list
    #[serde(default)]
    pub nodes: Vec<NodeDoc>,
    /// Connection list
    #[serde(default)]
    pub connections: Vec<ConnectionDoc>,
    /// Exposed parameters
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Material settings
    #[serde(default)]
    pub setting: Setting,
}

impl GraphDoc {
    /// Rebuild a validated [`Graph`] from the document.
    ///
    /// Connections are re-checked through [`Graph::connect`], so a document
    /// carrying a cycle, a double-written input or an incompatible edge is
    /// rejected with the corresponding [`GraphError`].
    pub fn into_graph(self) -> Result<Graph, GraphError> {
        let mut graph = Graph::with_setting(self.name, self.setting);

        for parameter in self.parameters {
            graph.add_parameter(parameter)?;
        }

        for doc in self.nodes {
            let mut node = Node::new(doc.kind);
            node.id = NodeId(doc.id);
            node.inputs = doc.port_data.inputs;
            node.outputs = doc.port_data.outputs;
            node.blocks = doc.blocks;
            graph.add_node(node);
        }

        for doc in self.connections {
            graph.connect(
                NodeId(doc.from_node),
                &doc.from_port,
                NodeId(doc.to_node),
                &doc.to_port,
            )?;
        }

        graph.validate()?;
        Ok(graph)
    }
}

impl From<&Graph> for GraphDoc {
    fn from(graph: &Graph) -> Self {
        Self {
            name: graph.name.clone(),
            nodes: graph
                .nodes()
                .map(|node| NodeDoc {
                    id: node.id.0,
                    kind: node.kind.clone(),
                    port_data: PortData {
                        inputs: node.inputs.clone(),
                        outputs: node.outputs.clone(),
                    },
                    blocks: node.blocks.clone(),
                    context_id: None,
                })
                .collect(),
            connections: graph
                .connections()
                .map(|c| ConnectionDoc {
                    from_node: c.from_node.0,
                    from_port: c.from_port.clone(),
                    to_node: c.to_node.0,
                    to_port: c.to_port.clone(),
                })
                .collect(),
            parameters: graph.parameters().to_vec(),
            setting: graph.setting.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Value, ValueType};

    #[test]
    fn test_document_json_round_trip() {
        let mut graph = Graph::new("mat");
        graph
            .add_parameter(Parameter::new("Albedo", ValueType::Vec4))
            .unwrap();
        let mut color = Node::new("color");
        color.set_output("color", Port::with_value(Value::Vec4([1.0, 0.0, 0.0, 1.0])));
        let color_id = graph.add_node(color);
        let mut sink = Node::new("sink");
        sink.set_input("in", Port::new(ValueType::Vec4));
        let sink_id = graph.add_node(sink);
        graph.connect(color_id, "color", sink_id, "in").unwrap();

        let doc = GraphDoc::from(&graph);
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: GraphDoc = serde_json::from_str(&json).unwrap();
        let rebuilt = parsed.into_graph().unwrap();

        assert_eq!(rebuilt.node_count(), 2);
        assert_eq!(rebuilt.connections().count(), 1);
        assert_eq!(rebuilt.parameters().len(), 1);
    }

    #[test]
    fn test_document_rejects_cycle() {
        let mut a = NodeDoc {
            id: Uuid::new_v4(),
            kind: "id".into(),
            port_data: PortData::default(),
            blocks: Vec::new(),
            context_id: None,
        };
        a.port_data.inputs.insert("in".into(), Port::new(ValueType::Float));
        a.port_data.outputs.insert("out".into(), Port::new(ValueType::Float));
        let mut b = a.clone();
        b.id = Uuid::new_v4();

        let doc = GraphDoc {
            name: "bad".into(),
            connections: vec![
                ConnectionDoc {
                    from_node: a.id,
                    from_port: "out".into(),
                    to_node: b.id,
                    to_port: "in".into(),
                },
                ConnectionDoc {
                    from_node: b.id,
                    from_port: "out".into(),
                    to_node: a.id,
                    to_port: "in".into(),
                },
            ],
            nodes: vec![a, b],
            parameters: Vec::new(),
            setting: Setting::default(),
        };

        assert_eq!(doc.into_graph().unwrap_err(), GraphError::Cycle);
    }

    #[test]
    fn test_minimal_document_parses() {
        let json = r#"{"name":"empty"}"#;
        let doc: GraphDoc = serde_json::from_str(json).unwrap();
        let graph = doc.into_graph().unwrap();
        assert_eq!(graph.node_count(), 0);
    }
}
