//! Graph builder for assembling the configuration graph from extracted records.
//!
//! The builder is a pure transform: records in, nodes and edges out, no
//! I/O. Records are consumed in the order the extractors produced them,
//! so the same input always yields the same graph, byte for byte.

use crate::edge::EdgeKind;
use crate::graph::{GraphMetadata, GraphStore};
use crate::node::{composite_id, NodeKind, Properties};
use magemap_core::{DiConfig, EventsConfig, ModuleConfig, ModuleSource};
use serde_json::{json, Value};
use tracing::warn;

fn props(value: Value) -> Properties {
    match value {
        Value::Object(map) => map,
        _ => Properties::new(),
    }
}

/// Returns false (and warns) if any required field is empty.
fn has_required(record: &str, source: &str, fields: &[(&str, &str)]) -> bool {
    match fields.iter().find(|(_, value)| value.is_empty()) {
        Some((field, _)) => {
            warn!("Skipping {} without {} in {}", record, field, source);
            false
        }
        None => true,
    }
}

/// Builds a GraphStore from extracted configuration records.
pub struct GraphBuilder {
    graph: GraphStore,
    /// Area assumed for records that were never tagged.
    default_area: String,
}

impl GraphBuilder {
    /// Creates a builder whose graph carries `metadata`.
    ///
    /// The builder never reads the clock. Callers stamp the time once,
    /// or pass a fixed one for reproducible snapshots.
    pub fn new(metadata: GraphMetadata) -> Self {
        Self {
            graph: GraphStore::with_metadata(metadata),
            default_area: "global".to_string(),
        }
    }

    pub fn default_area(mut self, area: impl Into<String>) -> Self {
        self.default_area = area.into();
        self
    }

    fn area<'a>(&'a self, area: &'a Option<String>) -> &'a str {
        area.as_deref().unwrap_or(&self.default_area)
    }

    /// Builds the graph from the three record sets, in a fixed order:
    /// dependency configuration, then events, then modules.
    pub fn build(mut self, di: &DiConfig, events: &EventsConfig, modules: &ModuleConfig) -> GraphStore {
        self.add_di_config(di);
        self.add_events_config(events);
        self.add_module_config(modules);
        self.graph
    }

    /// Adds everything scanned from one module.
    pub fn add_source(&mut self, source: &ModuleSource) -> &mut Self {
        self.add_di_config(&source.di);
        self.add_events_config(&source.events);
        self.add_module_config(&source.modules);
        self
    }

    /// Finishes building and returns the graph.
    pub fn finish(self) -> GraphStore {
        self.graph
    }

    /// Adds preferences, plugins, virtual types, and constructor injections.
    pub fn add_di_config(&mut self, di: &DiConfig) -> &mut Self {
        for pref in &di.preferences {
            if !has_required(
                "preference",
                &pref.source,
                &[("for", pref.interface.as_str()), ("type", pref.implementation.as_str())],
            ) {
                continue;
            }
            let area = self.area(&pref.area).to_string();

            self.graph.upsert_node(
                NodeKind::Interface,
                &pref.interface,
                props(json!({ "name": pref.interface, "area": area })),
            );
            self.graph.upsert_node(
                NodeKind::Class,
                &pref.implementation,
                props(json!({ "name": pref.implementation, "area": area })),
            );
            self.graph.add_edge(
                &pref.interface,
                &pref.implementation,
                EdgeKind::Prefers,
                props(json!({ "area": area, "source": pref.source })),
            );
        }

        for plugin in &di.plugins {
            if !has_required(
                "plugin",
                &plugin.source,
                &[("type name", plugin.target_class.as_str()), ("name", plugin.plugin_name.as_str())],
            ) {
                continue;
            }
            let area = self.area(&plugin.area).to_string();

            // Targets are typed Class even when they are interfaces; an
            // existing Interface node keeps its kind on merge.
            self.graph.upsert_node(
                NodeKind::Class,
                &plugin.target_class,
                props(json!({ "name": plugin.target_class })),
            );

            let plugin_id = composite_id(&plugin.target_class, &plugin.plugin_name);
            self.graph.upsert_node(
                NodeKind::Plugin,
                &plugin_id,
                props(json!({
                    "name": plugin.plugin_name,
                    "class": plugin.plugin_type,
                    "method": plugin.method,
                    "sortOrder": plugin.sort_order,
                    "disabled": plugin.disabled,
                    "area": area,
                })),
            );

            if !plugin.disabled {
                self.graph.add_edge(
                    &plugin_id,
                    &plugin.target_class,
                    EdgeKind::Intercepts,
                    props(json!({
                        "sortOrder": plugin.sort_order,
                        "method": plugin.method,
                        "area": area,
                        "source": plugin.source,
                    })),
                );
            }
        }

        for vt in &di.virtual_types {
            if !has_required(
                "virtual type",
                &vt.source,
                &[("name", vt.name.as_str()), ("type", vt.base_type.as_str())],
            ) {
                continue;
            }
            let area = self.area(&vt.area).to_string();
            let arguments = serde_json::to_value(&vt.arguments).unwrap_or_default();

            self.graph.upsert_node(
                NodeKind::VirtualType,
                &vt.name,
                props(json!({
                    "name": vt.name,
                    "baseType": vt.base_type,
                    "arguments": arguments,
                    "area": area,
                })),
            );
            self.graph.add_edge(
                &vt.name,
                &vt.base_type,
                EdgeKind::ExtendsVirtual,
                props(json!({ "area": area })),
            );
        }

        for tc in &di.type_configs {
            if !has_required("type", &tc.source, &[("name", tc.class_name.as_str())]) {
                continue;
            }
            let area = self.area(&tc.area).to_string();

            self.graph.upsert_node(
                NodeKind::Class,
                &tc.class_name,
                props(json!({ "name": tc.class_name })),
            );

            // Only object arguments are wiring; literals and arrays are not.
            for (arg_name, argument) in tc.arguments.iter() {
                if let Some(target) = argument.object_ref() {
                    self.graph.add_edge(
                        &tc.class_name,
                        target,
                        EdgeKind::Injects,
                        props(json!({ "argumentName": arg_name, "area": area })),
                    );
                }
            }
        }

        self
    }

    /// Adds events and observers.
    pub fn add_events_config(&mut self, events: &EventsConfig) -> &mut Self {
        for event in &events.events {
            let area = self.area(&event.area).to_string();
            self.graph.upsert_node(
                NodeKind::Event,
                &event.name,
                props(json!({ "name": event.name, "area": area })),
            );
        }

        for observer in &events.observers {
            if !has_required(
                "observer",
                &observer.source,
                &[("event", observer.event_name.as_str()), ("name", observer.observer_name.as_str())],
            ) {
                continue;
            }
            let area = self.area(&observer.area).to_string();

            let observer_id = composite_id(&observer.event_name, &observer.observer_name);
            self.graph.upsert_node(
                NodeKind::Observer,
                &observer_id,
                props(json!({
                    "name": observer.observer_name,
                    "class": observer.observer_class,
                    "method": observer.method,
                    "disabled": observer.disabled,
                    "shared": observer.shared,
                    "area": area,
                })),
            );

            if !observer.disabled {
                self.graph.add_edge(
                    &observer_id,
                    &observer.event_name,
                    EdgeKind::Observes,
                    props(json!({
                        "method": observer.method,
                        "area": area,
                        "source": observer.source,
                    })),
                );
            }
        }

        self
    }

    /// Adds modules and their load-order dependencies.
    pub fn add_module_config(&mut self, modules: &ModuleConfig) -> &mut Self {
        for module in &modules.modules {
            if !has_required("module", &module.source, &[("name", module.name.as_str())]) {
                continue;
            }

            self.graph.upsert_node(
                NodeKind::Module,
                &module.name,
                props(json!({ "name": module.name, "version": module.version })),
            );

            for dep in &module.dependencies {
                if !has_required("sequence entry", &module.source, &[("name", dep.name.as_str())]) {
                    continue;
                }
                self.graph.upsert_node(
                    NodeKind::Module,
                    &dep.name,
                    props(json!({ "name": dep.name })),
                );
                self.graph.add_edge(
                    &module.name,
                    &dep.name,
                    EdgeKind::DependsOn,
                    props(json!({ "type": dep.kind.to_string() })),
                );
            }
        }

        self
    }
}

/// Assembles a graph from the three record sets.
pub fn assemble(
    di: &DiConfig,
    events: &EventsConfig,
    modules: &ModuleConfig,
    metadata: GraphMetadata,
) -> GraphStore {
    GraphBuilder::new(metadata).build(di, events, modules)
}
