//! Module dependency analysis.
//!
//! A derived view over the DEPENDS_ON edges of a graph. An edge `A -> B`
//! means module A loads after B. Parallel edges collapse into one here;
//! the underlying store keeps them all.

use crate::edge::EdgeKind;
use crate::error::{GraphError, Result};
use crate::graph::GraphStore;
use crate::node::NodeKind;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// A module reached by a dependency walk, with its distance from the start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyHop {
    pub module: String,
    pub hops: usize,
}

pub struct ModuleDependencies {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl ModuleDependencies {
    /// Collects Module nodes and DEPENDS_ON edges from a graph.
    pub fn from_store(store: &GraphStore) -> Self {
        let mut deps = Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        };

        for node in store.nodes_by_kind(NodeKind::Module) {
            deps.intern(&node.id);
        }
        for edge in store.edges_by_kind(EdgeKind::DependsOn) {
            let from = deps.intern(&edge.from);
            let to = deps.intern(&edge.to);
            deps.graph.update_edge(from, to, ());
        }

        deps
    }

    fn intern(&mut self, module: &str) -> NodeIndex {
        if let Some(&index) = self.index.get(module) {
            return index;
        }
        let index = self.graph.add_node(module.to_string());
        self.index.insert(module.to_string(), index);
        index
    }

    fn lookup(&self, module: &str) -> Result<NodeIndex> {
        self.index
            .get(module)
            .copied()
            .ok_or_else(|| GraphError::UnknownModule(module.to_string()))
    }

    pub fn contains(&self, module: &str) -> bool {
        self.index.contains_key(module)
    }

    fn neighbors(&self, module: &str, direction: Direction) -> Result<Vec<String>> {
        let index = self.lookup(module)?;
        let mut names: Vec<String> = self
            .graph
            .neighbors_directed(index, direction)
            .map(|n| self.graph[n].clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn walk(&self, module: &str, direction: Direction) -> Result<Vec<DependencyHop>> {
        let start = self.lookup(module)?;
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut reached = Vec::new();

        visited.insert(start);
        queue.push_back((start, 0usize));

        while let Some((current, hops)) = queue.pop_front() {
            for next in self.graph.neighbors_directed(current, direction) {
                if visited.insert(next) {
                    reached.push(DependencyHop {
                        module: self.graph[next].clone(),
                        hops: hops + 1,
                    });
                    queue.push_back((next, hops + 1));
                }
            }
        }

        reached.sort_by(|a, b| a.hops.cmp(&b.hops).then_with(|| a.module.cmp(&b.module)));
        Ok(reached)
    }

    /// Modules `module` declares in its sequence, sorted by name.
    pub fn direct(&self, module: &str) -> Result<Vec<String>> {
        self.neighbors(module, Direction::Outgoing)
    }

    /// Every module `module` depends on, nearest first.
    pub fn transitive(&self, module: &str) -> Result<Vec<DependencyHop>> {
        self.walk(module, Direction::Outgoing)
    }

    /// Modules that declare `module` in their sequence.
    pub fn dependents(&self, module: &str) -> Result<Vec<String>> {
        self.neighbors(module, Direction::Incoming)
    }

    /// Every module that depends on `module`, nearest first.
    pub fn transitive_dependents(&self, module: &str) -> Result<Vec<DependencyHop>> {
        self.walk(module, Direction::Incoming)
    }

    /// All known modules with every dependency before its dependents.
    pub fn load_order(&self) -> Result<Vec<String>> {
        let sorted = petgraph::algo::toposort(&self.graph, None)
            .map_err(|cycle| GraphError::DependencyCycle(self.graph[cycle.node_id()].clone()))?;

        Ok(sorted
            .into_iter()
            .rev()
            .map(|index| self.graph[index].clone())
            .collect())
    }
}
