//! Core graph data structure.
//!
//! The GraphStore holds every node and edge produced by assembly. Writes
//! go through two operations only: `upsert_node`, which merges into an
//! existing node, and `add_edge`, which always appends. Reads are plain
//! linear scans; a graph is a few thousand edges per module.

use crate::edge::{Edge, EdgeKind};
use crate::node::{Node, NodeKind, Properties};
use crate::error::{GraphError, Result};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Format version written into every serialized graph.
pub const GRAPH_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphMetadata {
    /// ISO-8601 creation timestamp.
    pub created: String,
    pub version: String,
}

impl GraphMetadata {
    /// Metadata stamped with the current time.
    pub fn now() -> Self {
        Self::stamped(Utc::now())
    }

    fn stamped(time: DateTime<Utc>) -> Self {
        Self::at(time.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Metadata stamped with a Unix timestamp, as given by `SOURCE_DATE_EPOCH`.
    pub fn from_unix_seconds(seconds: i64) -> Result<Self> {
        Utc.timestamp_opt(seconds, 0)
            .single()
            .map(Self::stamped)
            .ok_or_else(|| GraphError::InvalidTimestamp(seconds.to_string()))
    }

    /// Metadata stamped with an RFC 3339 time, normalized to UTC milliseconds.
    pub fn parse(created: &str) -> Result<Self> {
        DateTime::parse_from_rfc3339(created)
            .map(|time| Self::stamped(time.with_timezone(&Utc)))
            .map_err(|_| GraphError::InvalidTimestamp(created.to_string()))
    }

    /// Metadata with a fixed timestamp, for reproducible snapshots.
    pub fn at(created: impl Into<String>) -> Self {
        Self {
            created: created.into(),
            version: GRAPH_VERSION.to_string(),
        }
    }
}

impl Default for GraphMetadata {
    fn default() -> Self {
        Self::now()
    }
}

/// The configuration relationship graph.
#[derive(Debug, Clone)]
pub struct GraphStore {
    /// Nodes in first-insertion order.
    nodes: Vec<Node>,

    /// Maps node ids to positions in `nodes`.
    id_index: HashMap<String, usize>,

    /// Edges in insertion order, duplicates included.
    edges: Vec<Edge>,

    metadata: GraphMetadata,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for GraphStore {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges && self.metadata == other.metadata
    }
}

impl GraphStore {
    /// Creates an empty graph stamped with the current time.
    pub fn new() -> Self {
        Self::with_metadata(GraphMetadata::now())
    }

    pub fn with_metadata(metadata: GraphMetadata) -> Self {
        Self {
            nodes: Vec::new(),
            id_index: HashMap::new(),
            edges: Vec::new(),
            metadata,
        }
    }

    /// Creates a node, or merges `properties` into the existing node with that id.
    ///
    /// On merge, keys in `properties` overwrite same-named keys and all other
    /// keys stay. The kind of an existing node never changes.
    pub fn upsert_node(&mut self, kind: NodeKind, id: &str, properties: Properties) -> &Node {
        let position = match self.id_index.get(id) {
            Some(&position) => {
                let existing = &mut self.nodes[position];
                for (key, value) in properties {
                    existing.properties.insert(key, value);
                }
                position
            }
            None => {
                let position = self.nodes.len();
                self.nodes.push(Node::new(kind, id, properties));
                self.id_index.insert(id.to_string(), position);
                position
            }
        };
        &self.nodes[position]
    }

    /// Appends an edge. No uniqueness check is made.
    pub fn add_edge(&mut self, from: &str, to: &str, kind: EdgeKind, properties: Properties) {
        self.edges.push(Edge::new(from, to, kind, properties));
    }

    /// Gets a node by its id.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.id_index.get(id).map(|&position| &self.nodes[position])
    }

    pub fn nodes_by_kind(&self, kind: NodeKind) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.kind == kind).collect()
    }

    pub fn find_nodes<P>(&self, predicate: P) -> Vec<&Node>
    where
        P: Fn(&Node) -> bool,
    {
        self.nodes.iter().filter(|n| predicate(n)).collect()
    }

    /// Edges leaving a node, in insertion order.
    pub fn edges_from(&self, id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.from == id).collect()
    }

    /// Edges entering a node, in insertion order.
    pub fn edges_to(&self, id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.to == id).collect()
    }

    pub fn edges_by_kind(&self, kind: EdgeKind) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.kind == kind).collect()
    }

    /// Replays another graph's nodes and edges into this one.
    ///
    /// Used to combine graphs built separately per module. Node merge rules
    /// apply as for any other upsert; edges are appended in order.
    pub fn merge(&mut self, other: &GraphStore) {
        for node in &other.nodes {
            self.upsert_node(node.kind, &node.id, node.properties.clone());
        }
        for edge in &other.edges {
            self.add_edge(&edge.from, &edge.to, edge.kind, edge.properties.clone());
        }
    }

    /// Removes all nodes and edges. Metadata is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.id_index.clear();
        self.edges.clear();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterates over all nodes in first-insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Iterates over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn metadata(&self) -> &GraphMetadata {
        &self.metadata
    }
}

/// Node and edge counts with per-type histograms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_types: BTreeMap<NodeKind, usize>,
    pub edge_types: BTreeMap<EdgeKind, usize>,
}

impl GraphStore {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut node_types = BTreeMap::new();
        for node in &self.nodes {
            *node_types.entry(node.kind).or_insert(0) += 1;
        }

        let mut edge_types = BTreeMap::new();
        for edge in &self.edges {
            *edge_types.entry(edge.kind).or_insert(0) += 1;
        }

        GraphStats {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            node_types,
            edge_types,
        }
    }
}
