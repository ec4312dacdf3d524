//! Configuration extractors.
//!
//! Each extractor turns one parsed configuration file into flat records.
//! The driver in this module handles everything around that: locating the
//! global file and the area overlays, skipping what is optional, and
//! tagging each freshly extracted batch with its area label.
//!
//! ```text
//! etc/di.xml            ──> extract ──> tag "global"   ─┐
//! etc/frontend/di.xml   ──> extract ──> tag "frontend" ─┼──> accumulated records
//! etc/adminhtml/di.xml  ──> extract ──> tag "adminhtml"─┘
//! ```

mod di;
mod events;
mod module;

pub use di::{
    Argument, ArgumentValue, Arguments, ArrayItem, DiConfig, DiExtractor, DiStats, PluginRecord,
    Preference, TypeConfig, VirtualTypeRecord,
};
pub use events::{EventRecord, EventsConfig, EventsExtractor, EventsStats, ObserverRecord};
pub use module::{Dependency, DependencyKind, ModuleConfig, ModuleExtractor, ModuleRecord, ModuleStats};

use crate::config::ExtractorConfig;
use crate::error::{ParseError, Result};
use crate::tree::{load_document, Element};
use std::path::Path;
use tracing::{debug, warn};

/// A set of records produced by one extractor.
pub trait RecordBatch: Default {
    /// Sets the area label on every record in the batch.
    fn tag_area(&mut self, area: &str);

    /// Moves all records of `other` to the end of `self`.
    fn append(&mut self, other: Self);
}

/// Extraction logic for one kind of configuration file.
///
/// Implementations are pure: they get a tree and the source path and
/// return records. They never know which area the file belongs to.
pub trait ConfigExtractor {
    type Output: RecordBatch;

    /// File name looked up under `etc/` and `etc/<area>/`.
    fn file_name(&self) -> &'static str;

    /// Expected document element.
    fn root(&self) -> &'static str {
        "config"
    }

    /// Whether area overlay files exist for this kind.
    fn overlays_areas(&self) -> bool {
        true
    }

    /// Whether a module is invalid without the global file.
    fn required(&self) -> bool {
        false
    }

    fn extract(&self, root: &Element, source: &str) -> Self::Output;
}

fn read_root<E: ConfigExtractor>(extractor: &E, path: &Path) -> Result<Element> {
    if !path.exists() {
        return Err(ParseError::MissingFile(path.to_path_buf()));
    }

    let root = load_document(path)?;
    if root.name != extractor.root() {
        return Err(ParseError::MissingRoot {
            path: path.to_path_buf(),
            root: extractor.root().to_string(),
        });
    }

    Ok(root)
}

/// Parses one configuration file.
///
/// A missing file or a document without the expected root yields `None`
/// and a warning. A malformed document is an error.
pub fn parse_file<E: ConfigExtractor>(extractor: &E, path: &Path) -> Result<Option<E::Output>> {
    debug!("Parsing {}", path.display());

    match read_root(extractor, path) {
        Ok(root) => Ok(Some(extractor.extract(&root, &path.display().to_string()))),
        Err(e) if e.is_skippable() => {
            warn!("{}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Parses a file the module cannot do without.
pub fn parse_required<E: ConfigExtractor>(extractor: &E, path: &Path) -> Result<E::Output> {
    if !path.exists() {
        return Err(ParseError::MissingFile(path.to_path_buf()));
    }
    Ok(parse_file(extractor, path)?.unwrap_or_default())
}

/// Parses the global file and every configured area overlay of one module.
///
/// Records come back in a fixed order: global first, then the areas in
/// the order `config.areas` declares them.
pub fn parse_module<E: ConfigExtractor>(
    extractor: &E,
    module_dir: &Path,
    config: &ExtractorConfig,
) -> Result<E::Output> {
    let etc = module_dir.join("etc");
    if !etc.is_dir() {
        return Err(ParseError::InvalidModulePath(etc));
    }

    let mut results = E::Output::default();

    let global_path = etc.join(extractor.file_name());
    let global = if extractor.required() {
        Some(parse_required(extractor, &global_path)?)
    } else if global_path.exists() {
        parse_file(extractor, &global_path)?
    } else {
        warn!("No {} in {}", extractor.file_name(), etc.display());
        None
    };

    if let Some(mut batch) = global {
        batch.tag_area(&config.global_area);
        results.append(batch);
    }

    if extractor.overlays_areas() {
        for area in &config.areas {
            let area_path = etc.join(area).join(extractor.file_name());
            if !area_path.exists() {
                debug!("No {} for area {}", extractor.file_name(), area);
                continue;
            }
            if let Some(mut batch) = parse_file(extractor, &area_path)? {
                batch.tag_area(area);
                results.append(batch);
            }
        }
    }

    Ok(results)
}
