//! Extractor configuration.
//!
//! Default values that used to be implicit (sort order, observer method,
//! the area overlay list) live here and are handed to the extractors
//! explicitly.

use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Area overlays scanned after the global file, in this order.
pub const DEFAULT_AREAS: [&str; 6] = [
    "frontend",
    "adminhtml",
    "webapi_rest",
    "webapi_soap",
    "graphql",
    "crontab",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractorConfig {
    /// Area directories under `etc/`, scanned in declaration order.
    pub areas: Vec<String>,

    /// Label for records that come from the module-global file.
    pub global_area: String,

    /// Sort order given to plugins that don't declare one.
    pub default_sort_order: i64,

    /// Method invoked on observers that don't declare one.
    pub default_observer_method: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            areas: DEFAULT_AREAS.iter().map(|a| a.to_string()).collect(),
            global_area: "global".to_string(),
            default_sort_order: 10,
            default_observer_method: "execute".to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Loads a JSON configuration file. Keys that are absent keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| ParseError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|source| ParseError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
