//! Mage Map Graph - configuration relationship graph
//!
//! This crate turns extracted configuration records into a typed graph of
//! interfaces, classes, plugins, observers, events, virtual types and
//! modules, and answers questions against it.
//!
//! # Architecture
//!
//! ```text
//! DiConfig ─┐
//! EventsConfig ─┼─► GraphBuilder ─► GraphStore ─► GraphDocument (JSON)
//! ModuleConfig ─┘                     │
//!                                     ├─► plugins_for / observers_for
//!                                     └─► ModuleDependencies (petgraph)
//! ```
//!
//! The store merges nodes that share an id and keeps every edge, in the
//! order it was added. Assembly over the same input therefore always
//! yields the same document.
//!
//! # Example
//!
//! ```no_run
//! use magemap_core::{ExtractorConfig, ModuleSource};
//! use magemap_graph::{GraphBuilder, GraphMetadata, SnapshotDir};
//! use std::path::Path;
//!
//! let config = ExtractorConfig::default();
//! let source = ModuleSource::scan(Path::new("vendor/magento/module-customer"), &config)?;
//!
//! let mut builder = GraphBuilder::new(GraphMetadata::now());
//! builder.add_source(&source);
//! let graph = builder.finish();
//!
//! for plugin in graph.plugins_for("Magento\\Customer\\Model\\Customer", None) {
//!     println!("{} ({})", plugin.name, plugin.sort_order);
//! }
//! SnapshotDir::open("data")?.save("Magento_Customer", &graph)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod dependencies;
mod doc;
mod edge;
mod error;
mod graph;
mod node;
mod query;
mod snapshot;

pub use builder::{assemble, GraphBuilder};
pub use dependencies::{DependencyHop, ModuleDependencies};
pub use doc::GraphDocument;
pub use edge::{Edge, EdgeKind, DEFAULT_SORT_ORDER};
pub use error::{GraphError, Result};
pub use graph::{GraphMetadata, GraphStats, GraphStore, GRAPH_VERSION};
pub use node::{composite_id, split_composite_id, Node, NodeKind, Properties, COMPOSITE_SEPARATOR};
pub use query::{ObserverInfo, PluginInfo};
pub use snapshot::SnapshotDir;
