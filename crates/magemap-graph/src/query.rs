//! Read-side queries used by the command line.
//!
//! Both queries are filters over the edge list joined with the source
//! node's properties. Nothing here is indexed.

use crate::edge::{Edge, EdgeKind};
use crate::graph::GraphStore;
use crate::node::split_composite_id;
use serde::Serialize;

const DEFAULT_AREA: &str = "global";
const DEFAULT_OBSERVER_METHOD: &str = "execute";

/// One plugin intercepting a target, as listed by `plugins_for`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub class: Option<String>,
    pub sort_order: i64,
    /// `None` means every public method of the target.
    pub method: Option<String>,
    pub area: String,
    pub source: Option<String>,
}

/// One observer of an event, as listed by `observers_for`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserverInfo {
    pub id: String,
    pub name: String,
    pub class: Option<String>,
    pub method: String,
    pub area: String,
    pub source: Option<String>,
}

fn in_area(edge: &Edge, area: Option<&str>) -> bool {
    match area {
        Some(wanted) => edge.str_property("area").unwrap_or(DEFAULT_AREA) == wanted,
        None => true,
    }
}

impl GraphStore {
    /// INTERCEPTS edges into `target`, ascending by `sortOrder`.
    ///
    /// A missing `sortOrder` counts as 10. Edges with equal sort order
    /// keep their insertion order.
    pub fn intercepts_sorted(&self, target: &str) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self
            .edges()
            .filter(|e| e.kind == EdgeKind::Intercepts && e.to == target)
            .collect();
        edges.sort_by_key(|e| e.sort_order());
        edges
    }

    /// Plugins intercepting `target` in execution order, optionally limited to one area.
    pub fn plugins_for(&self, target: &str, area: Option<&str>) -> Vec<PluginInfo> {
        self.intercepts_sorted(target)
            .into_iter()
            .filter(|edge| in_area(edge, area))
            .map(|edge| {
                let node = self.get_node(&edge.from);
                PluginInfo {
                    id: edge.from.clone(),
                    name: node
                        .and_then(|n| n.str_property("name"))
                        .unwrap_or(&edge.from)
                        .to_string(),
                    class: node.and_then(|n| n.str_property("class")).map(str::to_string),
                    sort_order: edge.sort_order(),
                    method: edge.str_property("method").map(str::to_string),
                    area: edge.str_property("area").unwrap_or(DEFAULT_AREA).to_string(),
                    source: edge.str_property("source").map(str::to_string),
                }
            })
            .collect()
    }

    /// OBSERVES edges into `event`, in insertion order.
    pub fn observes(&self, event: &str) -> Vec<&Edge> {
        self.edges()
            .filter(|e| e.kind == EdgeKind::Observes && e.to == event)
            .collect()
    }

    /// Observers of `event`, optionally limited to one area.
    pub fn observers_for(&self, event: &str, area: Option<&str>) -> Vec<ObserverInfo> {
        self.observes(event)
            .into_iter()
            .filter(|edge| in_area(edge, area))
            .map(|edge| {
                let node = self.get_node(&edge.from);
                let fallback_name = split_composite_id(&edge.from)
                    .map(|(_, name)| name)
                    .unwrap_or(&edge.from);
                ObserverInfo {
                    id: edge.from.clone(),
                    name: node
                        .and_then(|n| n.str_property("name"))
                        .unwrap_or(fallback_name)
                        .to_string(),
                    class: node.and_then(|n| n.str_property("class")).map(str::to_string),
                    method: edge
                        .str_property("method")
                        .unwrap_or(DEFAULT_OBSERVER_METHOD)
                        .to_string(),
                    area: edge.str_property("area").unwrap_or(DEFAULT_AREA).to_string(),
                    source: edge.str_property("source").map(str::to_string),
                }
            })
            .collect()
    }
}
