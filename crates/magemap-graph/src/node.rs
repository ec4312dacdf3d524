//! Node types for the configuration graph.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Open property bag carried by nodes and edges.
///
/// Values are scalars, ordered sequences, or nested objects. Keys keep
/// their insertion order so serialized graphs are stable.
pub type Properties = Map<String, Value>;

/// Separator used in composite identifiers.
pub const COMPOSITE_SEPARATOR: &str = "::";

/// Joins an owner and a name into one node id, e.g. `target::pluginName`
/// or `event::observerName`.
///
/// Plugins and observers are only unique per owner, so every producer of
/// those ids goes through here.
pub fn composite_id(owner: &str, name: &str) -> String {
    format!("{}{}{}", owner, COMPOSITE_SEPARATOR, name)
}

/// Splits a composite id at its last separator.
///
/// Owners are class names that may themselves contain `::`, names never do.
pub fn split_composite_id(id: &str) -> Option<(&str, &str)> {
    id.rsplit_once(COMPOSITE_SEPARATOR)
}

/// The kind of configuration entity a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Interface,
    Class,
    Plugin,
    Observer,
    Event,
    Module,
    VirtualType,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interface => "Interface",
            Self::Class => "Class",
            Self::Plugin => "Plugin",
            Self::Observer => "Observer",
            Self::Event => "Event",
            Self::Module => "Module",
            Self::VirtualType => "VirtualType",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "interface" => Ok(Self::Interface),
            "class" => Ok(Self::Class),
            "plugin" => Ok(Self::Plugin),
            "observer" => Ok(Self::Observer),
            "event" => Ok(Self::Event),
            "module" => Ok(Self::Module),
            "virtualtype" | "virtual_type" => Ok(Self::VirtualType),
            _ => Err(format!("Unknown node type: {}", s)),
        }
    }
}

/// A node in the configuration graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    #[serde(default)]
    pub properties: Properties,
}

impl Node {
    pub fn new(kind: NodeKind, id: impl Into<String>, properties: Properties) -> Self {
        Self {
            id: id.into(),
            kind,
            properties,
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// String property, `None` if absent or not a string.
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_id_round_trip() {
        let id = composite_id("Magento\\Customer\\Api\\CustomerRepositoryInterface", "audit");
        assert_eq!(id, "Magento\\Customer\\Api\\CustomerRepositoryInterface::audit");
        assert_eq!(
            split_composite_id(&id),
            Some(("Magento\\Customer\\Api\\CustomerRepositoryInterface", "audit"))
        );
        assert_eq!(split_composite_id("no_separator"), None);
    }

    #[test]
    fn test_node_kind_serializes_as_type_name() {
        let json = serde_json::to_string(&NodeKind::VirtualType).unwrap();
        assert_eq!(json, "\"VirtualType\"");
        assert_eq!("virtualtype".parse::<NodeKind>(), Ok(NodeKind::VirtualType));
        assert!("Widget".parse::<NodeKind>().is_err());
    }
}
