//! Assembly, serialization and query behaviour over whole graphs.

use magemap_core::{
    DiConfig, EventsConfig, ExtractorConfig, ModuleConfig, ModuleSource, ObserverRecord,
    PluginRecord, Preference,
};
use magemap_graph::{
    assemble, EdgeKind, GraphBuilder, GraphMetadata, GraphStore, ModuleDependencies, NodeKind,
    Properties, SnapshotDir,
};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CREATED: &str = "2024-05-01T12:00:00.000Z";

fn preference_and_plugin() -> DiConfig {
    DiConfig {
        preferences: vec![Preference {
            interface: "A".to_string(),
            implementation: "B".to_string(),
            source: "etc/di.xml".to_string(),
            area: None,
        }],
        plugins: vec![PluginRecord {
            target_class: "A".to_string(),
            plugin_name: "P".to_string(),
            plugin_type: Some("Vendor\\Plugin".to_string()),
            method: None,
            sort_order: 5,
            disabled: false,
            source: "etc/frontend/di.xml".to_string(),
            area: Some("frontend".to_string()),
        }],
        ..Default::default()
    }
}

#[test]
fn test_preference_with_plugin() {
    let graph = assemble(
        &preference_and_plugin(),
        &EventsConfig::default(),
        &ModuleConfig::default(),
        GraphMetadata::at(CREATED),
    );

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.get_node("A").unwrap().kind, NodeKind::Interface);
    assert_eq!(graph.get_node("B").unwrap().kind, NodeKind::Class);

    let plugin = graph.get_node("A::P").unwrap();
    assert_eq!(plugin.kind, NodeKind::Plugin);
    assert_eq!(plugin.properties["sortOrder"], 5);
    assert_eq!(plugin.properties["area"], "frontend");

    assert_eq!(graph.edge_count(), 2);
    let prefers = graph.edges_by_kind(EdgeKind::Prefers);
    assert_eq!((prefers[0].from.as_str(), prefers[0].to.as_str()), ("A", "B"));
    let intercepts = graph.edges_by_kind(EdgeKind::Intercepts);
    assert_eq!((intercepts[0].from.as_str(), intercepts[0].to.as_str()), ("A::P", "A"));
    assert_eq!(intercepts[0].sort_order(), 5);

    let listed = graph.plugins_for("A", Some("frontend"));
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].class.as_deref(), Some("Vendor\\Plugin"));
    assert!(graph.plugins_for("A", Some("adminhtml")).is_empty());
}

#[test]
fn test_disabled_observer_is_not_listed() {
    let events = EventsConfig {
        events: Vec::new(),
        observers: vec![ObserverRecord {
            event_name: "save_after".to_string(),
            observer_name: "Sync".to_string(),
            observer_class: Some("Vendor\\Sync".to_string()),
            method: "execute".to_string(),
            disabled: true,
            shared: true,
            source: "etc/events.xml".to_string(),
            area: None,
        }],
    };

    let graph = assemble(
        &DiConfig::default(),
        &events,
        &ModuleConfig::default(),
        GraphMetadata::at(CREATED),
    );

    assert_eq!(graph.get_node("save_after::Sync").unwrap().kind, NodeKind::Observer);
    assert!(graph.edges_by_kind(EdgeKind::Observes).is_empty());
    assert!(graph.observers_for("save_after", None).is_empty());
}

#[test]
fn test_assembly_is_deterministic() {
    let build = || {
        assemble(
            &preference_and_plugin(),
            &EventsConfig::default(),
            &ModuleConfig::default(),
            GraphMetadata::at(CREATED),
        )
    };

    let first = build().to_json_string().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert_eq!(first, build().to_json_string().unwrap());
}

#[test]
fn test_json_round_trip_keeps_order_and_stats() {
    let graph = GraphBuilder::new(GraphMetadata::at(CREATED)).build(
        &preference_and_plugin(),
        &EventsConfig::default(),
        &ModuleConfig::default(),
    );

    let json = graph.to_json_string().unwrap();
    let restored = GraphStore::from_json_str(&json).unwrap();

    assert_eq!(restored, graph);
    assert_eq!(restored.stats(), graph.stats());
    assert_eq!(restored.to_json_string().unwrap(), json);

    let ids: Vec<&str> = restored.nodes().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["A", "B", "A::P"]);
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_module_directory_to_snapshot() {
    let dir = tempdir().unwrap();
    let module = dir.path().join("module-customer");
    write(
        &module.join("etc/module.xml"),
        r#"<config>
    <module name="Magento_Customer" setup_version="2.0.1">
        <sequence>
            <module name="Magento_Eav"/>
            <module name="Magento_Store"/>
        </sequence>
    </module>
</config>"#,
    );
    write(
        &module.join("etc/di.xml"),
        r#"<config xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <type name="Magento\Customer\Model\Session">
        <arguments>
            <argument name="storage" xsi:type="object">Magento\Customer\Model\Session\Storage</argument>
        </arguments>
    </type>
    <virtualType name="customerLogger" type="Magento\Framework\Logger\Monolog"/>
</config>"#,
    );
    write(
        &module.join("etc/adminhtml/events.xml"),
        r#"<config>
    <event name="customer_save_after">
        <observer name="grid" instance="Magento\Customer\Observer\Grid"/>
    </event>
</config>"#,
    );

    let config = ExtractorConfig::default();
    let source = ModuleSource::scan(&module, &config).unwrap();
    let mut builder = GraphBuilder::new(GraphMetadata::at(CREATED));
    builder.add_source(&source);
    let graph = builder.finish();

    let injects = graph.edges_by_kind(EdgeKind::Injects);
    assert_eq!(injects.len(), 1);
    assert_eq!(injects[0].to, "Magento\\Customer\\Model\\Session\\Storage");
    assert_eq!(injects[0].str_property("argumentName"), Some("storage"));

    assert_eq!(graph.edges_by_kind(EdgeKind::ExtendsVirtual).len(), 1);

    let observers = graph.observers_for("customer_save_after", Some("adminhtml"));
    assert_eq!(observers.len(), 1);
    assert_eq!(observers[0].name, "grid");

    let deps = ModuleDependencies::from_store(&graph);
    assert_eq!(
        deps.direct("Magento_Customer").unwrap(),
        ["Magento_Eav", "Magento_Store"]
    );

    let snapshots = SnapshotDir::open(dir.path().join("data")).unwrap();
    let path = snapshots.save("Magento_Customer", &graph).unwrap();
    let found = snapshots
        .find(None, Some("Magento\\Customer\\Model\\Session"))
        .unwrap();
    assert_eq!(found, path);
    assert_eq!(SnapshotDir::load(&found).unwrap(), graph);
}

fn key() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["name", "area", "class", "sortOrder", "extra"]).prop_map(String::from)
}

fn properties() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::vec((key(), any::<i64>()), 0..6)
}

fn to_props(pairs: &[(String, i64)]) -> Properties {
    let mut map = Properties::new();
    for (k, v) in pairs {
        map.insert(k.clone(), json!(v));
    }
    map
}

fn node_kind() -> impl Strategy<Value = NodeKind> {
    prop::sample::select(vec![
        NodeKind::Interface,
        NodeKind::Class,
        NodeKind::Plugin,
        NodeKind::Observer,
        NodeKind::Event,
        NodeKind::Module,
        NodeKind::VirtualType,
    ])
}

fn edge_kind() -> impl Strategy<Value = EdgeKind> {
    prop::sample::select(vec![
        EdgeKind::Prefers,
        EdgeKind::Intercepts,
        EdgeKind::Observes,
        EdgeKind::Injects,
        EdgeKind::ExtendsVirtual,
        EdgeKind::DependsOn,
    ])
}

/// Ids drawn from a small pool so that repeats are common.
fn graph_id() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Vendor\\Api\\Thing",
        "Vendor\\Model\\Thing",
        "Vendor\\Model\\Thing::audit",
        "order_save_after",
        "Vendor_Module",
    ])
    .prop_map(str::to_string)
}

proptest! {
    #[test]
    fn prop_upsert_is_union_with_overwrite(first in properties(), second in properties()) {
        let mut graph = GraphStore::new();
        graph.upsert_node(NodeKind::Class, "X", to_props(&first));
        graph.upsert_node(NodeKind::Plugin, "X", to_props(&second));

        let mut expected = to_props(&first);
        for (k, v) in to_props(&second) {
            expected.insert(k, v);
        }

        let node = graph.get_node("X").unwrap();
        prop_assert_eq!(graph.node_count(), 1);
        prop_assert_eq!(node.kind, NodeKind::Class);
        prop_assert_eq!(&node.properties, &expected);
    }

    #[test]
    fn prop_edges_are_appended(count in 0usize..20) {
        let mut graph = GraphStore::new();
        for i in 0..count {
            let mut props = Properties::new();
            props.insert("sortOrder".to_string(), json!(i));
            graph.add_edge("T::p", "T", EdgeKind::Intercepts, props);
        }

        prop_assert_eq!(graph.edge_count(), count);
        let restored = GraphStore::from_json_str(&graph.to_json_string().unwrap()).unwrap();
        prop_assert_eq!(restored, graph);
    }

    #[test]
    fn prop_json_round_trip_keeps_nodes_edges_and_stats(
        nodes in prop::collection::vec((node_kind(), graph_id(), properties()), 0..16),
        edges in prop::collection::vec((graph_id(), graph_id(), edge_kind(), properties()), 0..16),
    ) {
        let mut graph = GraphStore::with_metadata(GraphMetadata::at(CREATED));
        for (kind, id, props) in &nodes {
            graph.upsert_node(*kind, id, to_props(props));
        }
        for (from, to, kind, props) in &edges {
            graph.add_edge(from, to, *kind, to_props(props));
        }

        let restored = GraphStore::from_json_str(&graph.to_json_string().unwrap()).unwrap();

        let node_view = |g: &GraphStore| {
            g.nodes()
                .map(|n| (n.id.clone(), n.kind, n.properties.clone()))
                .collect::<Vec<_>>()
        };
        let edge_view = |g: &GraphStore| {
            g.edges()
                .map(|e| (e.from.clone(), e.to.clone(), e.kind, e.properties.clone()))
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(node_view(&restored), node_view(&graph));
        prop_assert_eq!(edge_view(&restored), edge_view(&graph));
        prop_assert_eq!(restored.stats(), graph.stats());
        prop_assert_eq!(restored.metadata(), graph.metadata());

        let distinct: HashSet<&str> = nodes.iter().map(|(_, id, _)| id.as_str()).collect();
        prop_assert_eq!(restored.node_count(), distinct.len());
        prop_assert_eq!(restored.edge_count(), edges.len());
        for node in restored.nodes() {
            let first = nodes.iter().find(|(_, id, _)| *id == node.id).unwrap();
            prop_assert_eq!(node.kind, first.0);
        }
    }
}
