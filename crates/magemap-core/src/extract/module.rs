//! Module declaration (`module.xml`).

use super::{ConfigExtractor, RecordBatch};
use crate::tree::Element;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// How one module depends on another.
///
/// Only load-order (`<sequence>`) dependencies are read from `module.xml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Sequence,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence => write!(f, "sequence"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependency {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DependencyKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleRecord {
    pub name: String,
    pub version: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleConfig {
    pub modules: Vec<ModuleRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStats {
    pub modules: usize,
    pub total_dependencies: usize,
}

impl ModuleConfig {
    pub fn stats(&self) -> ModuleStats {
        ModuleStats {
            modules: self.modules.len(),
            total_dependencies: self.modules.iter().map(|m| m.dependencies.len()).sum(),
        }
    }

    pub fn dependencies_for(&self, module_name: &str) -> &[Dependency] {
        self.modules
            .iter()
            .find(|m| m.name == module_name)
            .map(|m| m.dependencies.as_slice())
            .unwrap_or_default()
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }
}

impl RecordBatch for ModuleConfig {
    // Module declarations have no area overlays.
    fn tag_area(&mut self, _area: &str) {}

    fn append(&mut self, other: Self) {
        self.modules.extend(other.modules);
    }
}

/// Extractor for `module.xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleExtractor;

impl ConfigExtractor for ModuleExtractor {
    type Output = ModuleConfig;

    fn file_name(&self) -> &'static str {
        "module.xml"
    }

    fn overlays_areas(&self) -> bool {
        false
    }

    fn required(&self) -> bool {
        true
    }

    fn extract(&self, root: &Element, source: &str) -> ModuleConfig {
        let declarations = root.one_or_many("module");
        if declarations.is_empty() {
            warn!("No <module> element in {}", source);
        }

        let modules = declarations
            .into_iter()
            .map(|module| {
                let dependencies = module
                    .child("sequence")
                    .map(|seq| {
                        seq.one_or_many("module")
                            .into_iter()
                            .map(|dep| Dependency {
                                name: dep.attr_or_empty("name"),
                                kind: DependencyKind::Sequence,
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                ModuleRecord {
                    name: module.attr_or_empty("name"),
                    version: module.attr("setup_version").map(str::to_string),
                    dependencies,
                    source: source.to_string(),
                }
            })
            .collect();

        ModuleConfig { modules }
    }
}
