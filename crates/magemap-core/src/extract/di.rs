//! Dependency configuration (`di.xml`).
//!
//! Extracts preferences, plugins, virtual types, and constructor
//! argument configuration for types.

use super::{ConfigExtractor, RecordBatch};
use crate::config::ExtractorConfig;
use crate::tree::Element;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::warn;

/// An interface bound to one concrete implementation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub interface: String,
    pub implementation: String,
    pub source: String,
    pub area: Option<String>,
}

/// A plugin declared on a type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRecord {
    pub target_class: String,
    pub plugin_name: String,
    pub plugin_type: Option<String>,
    pub method: Option<String>,
    pub sort_order: i64,
    pub disabled: bool,
    pub source: String,
    pub area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualTypeRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub base_type: String,
    pub arguments: Arguments,
    pub source: String,
    pub area: Option<String>,
}

/// Constructor arguments configured for a type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeConfig {
    pub class_name: String,
    pub arguments: Arguments,
    pub source: String,
    pub area: Option<String>,
}

/// Value of a constructor argument or array item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    /// Nested items of an `array` argument, in document order.
    Items(Vec<ArrayItem>),
    Text(String),
    Null,
}

impl ArgumentValue {
    fn text_of(element: &Element) -> Self {
        match element.text() {
            Some(text) => Self::Text(text.to_string()),
            None => Self::Null,
        }
    }
}

/// An argument tagged with its declared value kind (`xsi:type`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub kind: String,
    pub value: ArgumentValue,
}

impl Argument {
    /// The referenced class or virtual type when this is an `object` argument.
    pub fn object_ref(&self) -> Option<&str> {
        match (&self.kind[..], &self.value) {
            ("object", ArgumentValue::Text(target)) if !target.is_empty() => Some(target.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayItem {
    pub name: Option<String>,
    pub value: ArgumentValue,
    pub kind: Option<String>,
}

/// Named arguments in declaration order. Serializes as a JSON object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments(Vec<(String, Argument)>);

impl Arguments {
    /// Inserts an argument; a repeated name replaces the earlier value in place.
    pub fn insert(&mut self, name: String, argument: Argument) {
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = argument,
            None => self.0.push((name, argument)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Argument)> {
        self.0.iter().map(|(n, a)| (n.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Arguments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, argument) in &self.0 {
            map.serialize_entry(name, argument)?;
        }
        map.end()
    }
}

/// Everything extracted from one or more `di.xml` files.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiConfig {
    pub preferences: Vec<Preference>,
    pub plugins: Vec<PluginRecord>,
    pub virtual_types: Vec<VirtualTypeRecord>,
    pub type_configs: Vec<TypeConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiStats {
    pub preferences: usize,
    pub plugins: usize,
    pub virtual_types: usize,
    pub type_configs: usize,
    pub total: usize,
}

impl DiConfig {
    pub fn stats(&self) -> DiStats {
        DiStats {
            preferences: self.preferences.len(),
            plugins: self.plugins.len(),
            virtual_types: self.virtual_types.len(),
            type_configs: self.type_configs.len(),
            total: self.preferences.len()
                + self.plugins.len()
                + self.virtual_types.len()
                + self.type_configs.len(),
        }
    }

    /// Enabled plugins on a class, in ascending sort order.
    /// Equal sort orders keep declaration order.
    pub fn plugins_for(&self, class_name: &str) -> Vec<&PluginRecord> {
        let mut plugins: Vec<&PluginRecord> = self
            .plugins
            .iter()
            .filter(|p| p.target_class == class_name && !p.disabled)
            .collect();
        plugins.sort_by_key(|p| p.sort_order);
        plugins
    }

    /// First preference declared for an interface.
    pub fn preference_for(&self, interface: &str) -> Option<&Preference> {
        self.preferences.iter().find(|p| p.interface == interface)
    }
}

impl RecordBatch for DiConfig {
    fn tag_area(&mut self, area: &str) {
        let area = Some(area.to_string());
        for pref in &mut self.preferences {
            pref.area = area.clone();
        }
        for plugin in &mut self.plugins {
            plugin.area = area.clone();
        }
        for vt in &mut self.virtual_types {
            vt.area = area.clone();
        }
        for tc in &mut self.type_configs {
            tc.area = area.clone();
        }
    }

    fn append(&mut self, other: Self) {
        self.preferences.extend(other.preferences);
        self.plugins.extend(other.plugins);
        self.virtual_types.extend(other.virtual_types);
        self.type_configs.extend(other.type_configs);
    }
}

/// Extractor for `di.xml`.
#[derive(Debug, Clone)]
pub struct DiExtractor {
    default_sort_order: i64,
}

impl DiExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            default_sort_order: config.default_sort_order,
        }
    }

    fn sort_order(&self, plugin: &Element, source: &str) -> i64 {
        let Some(raw) = plugin.attr("sortOrder") else {
            return self.default_sort_order;
        };
        raw.trim().parse().unwrap_or_else(|_| {
            warn!(
                "Invalid sortOrder {:?} on plugin {:?} in {}, using {}",
                raw,
                plugin.attr_or_empty("name"),
                source,
                self.default_sort_order
            );
            self.default_sort_order
        })
    }

    fn extract_plugins(&self, type_el: &Element, type_name: &str, source: &str) -> Vec<PluginRecord> {
        type_el
            .one_or_many("plugin")
            .into_iter()
            .map(|plugin| PluginRecord {
                target_class: type_name.to_string(),
                plugin_name: plugin.attr_or_empty("name"),
                plugin_type: plugin.attr("type").map(str::to_string),
                method: plugin.attr("method").map(str::to_string),
                sort_order: self.sort_order(plugin, source),
                disabled: plugin.flag("disabled"),
                source: source.to_string(),
                area: None,
            })
            .collect()
    }
}

/// Classifies every `<argument>` under an `<arguments>` element.
pub(crate) fn extract_arguments(args: &Element) -> Arguments {
    let mut extracted = Arguments::default();
    for arg in args.one_or_many("argument") {
        let kind = arg.attr("xsi:type").unwrap_or("string").to_string();
        let value = if kind == "array" {
            ArgumentValue::Items(extract_items(arg))
        } else {
            ArgumentValue::text_of(arg)
        };
        extracted.insert(arg.attr_or_empty("name"), Argument { kind, value });
    }
    extracted
}

fn extract_items(array: &Element) -> Vec<ArrayItem> {
    array
        .one_or_many("item")
        .into_iter()
        .map(|item| {
            let kind = item.attr("xsi:type").map(str::to_string);
            let value = if kind.as_deref() == Some("array") {
                ArgumentValue::Items(extract_items(item))
            } else {
                ArgumentValue::text_of(item)
            };
            ArrayItem {
                name: item.attr("name").map(str::to_string),
                value,
                kind,
            }
        })
        .collect()
}

impl ConfigExtractor for DiExtractor {
    type Output = DiConfig;

    fn file_name(&self) -> &'static str {
        "di.xml"
    }

    fn extract(&self, root: &Element, source: &str) -> DiConfig {
        let mut results = DiConfig::default();

        for pref in root.one_or_many("preference") {
            if let (Some(interface), Some(implementation)) = (pref.attr("for"), pref.attr("type")) {
                results.preferences.push(Preference {
                    interface: interface.to_string(),
                    implementation: implementation.to_string(),
                    source: source.to_string(),
                    area: None,
                });
            }
        }

        for type_el in root.one_or_many("type") {
            let type_name = type_el.attr_or_empty("name");

            results
                .plugins
                .extend(self.extract_plugins(type_el, &type_name, source));

            if let Some(args) = type_el.child("arguments") {
                results.type_configs.push(TypeConfig {
                    class_name: type_name,
                    arguments: extract_arguments(args),
                    source: source.to_string(),
                    area: None,
                });
            }
        }

        for vt in root.one_or_many("virtualType") {
            results.virtual_types.push(VirtualTypeRecord {
                name: vt.attr_or_empty("name"),
                base_type: vt.attr_or_empty("type"),
                arguments: vt.child("arguments").map(extract_arguments).unwrap_or_default(),
                source: source.to_string(),
                area: None,
            });
        }

        results
    }
}
