//! Edge types for the configuration graph.
//!
//! Edges are relationships extracted from configuration. They are kept
//! in the order they were produced and never deduplicated.

use crate::node::Properties;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Sort order assumed for an INTERCEPTS edge without a numeric `sortOrder`.
pub const DEFAULT_SORT_ORDER: i64 = 10;

/// The type of relationship between two configuration entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeKind {
    /// Interface is bound to an implementation.
    Prefers,

    /// Plugin wraps methods of a class.
    Intercepts,

    /// Observer listens to an event.
    Observes,

    /// Class receives another class through a constructor argument.
    Injects,

    /// Virtual type is a configured variant of a base type.
    ExtendsVirtual,

    /// Module loads after another module.
    DependsOn,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prefers => "PREFERS",
            Self::Intercepts => "INTERCEPTS",
            Self::Observes => "OBSERVES",
            Self::Injects => "INJECTS",
            Self::ExtendsVirtual => "EXTENDS_VIRTUAL",
            Self::DependsOn => "DEPENDS_ON",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "PREFERS" => Ok(Self::Prefers),
            "INTERCEPTS" => Ok(Self::Intercepts),
            "OBSERVES" => Ok(Self::Observes),
            "INJECTS" => Ok(Self::Injects),
            "EXTENDS_VIRTUAL" => Ok(Self::ExtendsVirtual),
            "DEPENDS_ON" => Ok(Self::DependsOn),
            _ => Err(format!("Unknown edge type: {}", s)),
        }
    }
}

/// A directed relationship between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,

    #[serde(rename = "type")]
    pub kind: EdgeKind,

    #[serde(default)]
    pub properties: Properties,
}

impl Edge {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: EdgeKind,
        properties: Properties,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            properties,
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }

    /// `sortOrder` of the edge, or [`DEFAULT_SORT_ORDER`] when absent or not an integer.
    pub fn sort_order(&self) -> i64 {
        self.properties
            .get("sortOrder")
            .and_then(Value::as_i64)
            .unwrap_or(DEFAULT_SORT_ORDER)
    }
}
