//! JSON document form of a graph.
//!
//! ```json
//! {
//!   "metadata": { "created": "...", "version": "1.0.0" },
//!   "nodes": [ { "id": "...", "type": "Class", "properties": {} } ],
//!   "edges": [ { "from": "...", "to": "...", "type": "PREFERS", "properties": {} } ]
//! }
//! ```
//!
//! Loading always replays nodes and edges through the store's write path,
//! so a hand-edited document with a repeated node id is merged the same
//! way assembly would merge it.

use crate::edge::Edge;
use crate::error::Result;
use crate::graph::{GraphMetadata, GraphStore};
use crate::node::Node;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub metadata: GraphMetadata,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl From<&GraphStore> for GraphDocument {
    fn from(graph: &GraphStore) -> Self {
        Self {
            metadata: graph.metadata().clone(),
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().cloned().collect(),
        }
    }
}

impl From<GraphDocument> for GraphStore {
    fn from(doc: GraphDocument) -> Self {
        let mut graph = GraphStore::with_metadata(doc.metadata);
        for node in doc.nodes {
            graph.upsert_node(node.kind, &node.id, node.properties);
        }
        for edge in doc.edges {
            graph.add_edge(&edge.from, &edge.to, edge.kind, edge.properties);
        }
        graph
    }
}

impl GraphStore {
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument::from(self)
    }

    /// Serializes to pretty-printed JSON text.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Reconstructs a graph from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: GraphDocument = serde_json::from_str(json)?;
        Ok(doc.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeKind;
    use crate::node::{NodeKind, Properties};

    #[test]
    fn test_document_field_order() {
        let mut graph = GraphStore::with_metadata(GraphMetadata::at("2024-01-01T00:00:00.000Z"));
        graph.upsert_node(NodeKind::Class, "A", Properties::new());
        graph.add_edge("A", "B", EdgeKind::Injects, Properties::new());

        let json = graph.to_json_string().unwrap();
        let metadata = json.find("\"metadata\"").unwrap();
        let nodes = json.find("\"nodes\"").unwrap();
        let edges = json.find("\"edges\"").unwrap();
        assert!(metadata < nodes && nodes < edges);
        assert!(json.contains("\"type\": \"INJECTS\""));
    }

    #[test]
    fn test_load_merges_repeated_nodes() {
        let json = r#"{
            "metadata": { "created": "2024-01-01T00:00:00.000Z", "version": "1.0.0" },
            "nodes": [
                { "id": "A", "type": "Interface", "properties": { "name": "A" } },
                { "id": "A", "type": "Class", "properties": { "area": "frontend" } }
            ],
            "edges": [
                { "from": "A", "to": "B", "type": "PREFERS", "properties": {} },
                { "from": "A", "to": "B", "type": "PREFERS" }
            ]
        }"#;

        let graph = GraphStore::from_json_str(json).unwrap();

        assert_eq!(graph.node_count(), 1);
        let node = graph.get_node("A").unwrap();
        assert_eq!(node.kind, NodeKind::Interface);
        assert_eq!(node.properties["area"], "frontend");
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.metadata().created, "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_load_tolerates_missing_sections() {
        let graph = GraphStore::from_json_str("{}").unwrap();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.metadata().version, "1.0.0");
    }

    #[test]
    fn test_load_rejects_unknown_edge_type() {
        let json = r#"{ "edges": [ { "from": "A", "to": "B", "type": "CALLS" } ] }"#;
        assert!(GraphStore::from_json_str(json).is_err());
    }
}
