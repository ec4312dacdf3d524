//! Mage Map Core - configuration extraction
//!
//! This crate reads a module's declarative configuration files and turns
//! them into flat, normalized records:
//!
//! - `di.xml` → preferences, plugins, virtual types, constructor arguments
//! - `events.xml` → events and observers
//! - `module.xml` → module version and load-order dependencies
//!
//! Markup is first parsed into a generic attribute tree ([`Element`]);
//! the extractors only ever see that tree.
//!
//! # Example
//!
//! ```no_run
//! use magemap_core::{ExtractorConfig, ModuleSource};
//! use std::path::Path;
//!
//! let config = ExtractorConfig::default();
//! let source = ModuleSource::scan(Path::new("vendor/magento/module-customer"), &config)?;
//! println!("{} plugins", source.di.plugins.len());
//! # Ok::<(), magemap_core::ParseError>(())
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod source;
pub mod tree;

pub use config::{ExtractorConfig, DEFAULT_AREAS};
pub use error::{ParseError, Result};
pub use extract::{
    parse_file, parse_module, parse_required, Argument, ArgumentValue, Arguments, ArrayItem,
    ConfigExtractor, Dependency, DependencyKind, DiConfig, DiExtractor, EventRecord, EventsConfig,
    EventsExtractor, ModuleConfig, ModuleExtractor, ModuleRecord, ObserverRecord, PluginRecord,
    Preference, RecordBatch, TypeConfig, VirtualTypeRecord,
};
pub use source::{module_dir_for, ModuleSource};
pub use tree::{load_document, parse_document, Element};
