//! Module-level scanning.
//!
//! Runs all three extractors over one module directory.

use crate::config::ExtractorConfig;
use crate::error::{ParseError, Result};
use crate::extract::{
    parse_module, DiConfig, DiExtractor, EventsConfig, EventsExtractor, ModuleConfig,
    ModuleExtractor,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// Records extracted from one module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleSource {
    pub path: PathBuf,
    pub di: DiConfig,
    pub events: EventsConfig,
    pub modules: ModuleConfig,
}

impl ModuleSource {
    /// Extracts dependency, event, and module configuration from `module_dir`.
    ///
    /// Fails before reading anything if `module_dir/etc` is missing, and
    /// on the first malformed document.
    pub fn scan(module_dir: &Path, config: &ExtractorConfig) -> Result<Self> {
        let etc = module_dir.join("etc");
        if !etc.is_dir() {
            return Err(ParseError::InvalidModulePath(etc));
        }

        let di = parse_module(&DiExtractor::new(config), module_dir, config)?;
        let events = parse_module(&EventsExtractor::new(config), module_dir, config)?;
        let modules = parse_module(&ModuleExtractor, module_dir, config)?;

        info!(
            "Scanned {}: {} di records, {} event records, {} module(s)",
            module_dir.display(),
            di.stats().total,
            events.stats().total,
            modules.stats().modules
        );

        Ok(Self {
            path: module_dir.to_path_buf(),
            di,
            events,
            modules,
        })
    }
}

/// Directory of a module inside a vendor package directory.
///
/// `Magento_CatalogInventory` lives in `<vendor_dir>/module-catalog-inventory`.
pub fn module_dir_for(vendor_dir: &Path, module_name: &str) -> PathBuf {
    let short = module_name
        .split_once('_')
        .map(|(_, rest)| rest)
        .unwrap_or(module_name);

    let mut dir = String::from("module-");
    for (i, ch) in short.chars().enumerate() {
        if ch.is_ascii_uppercase() && i > 0 {
            dir.push('-');
        }
        dir.push(ch.to_ascii_lowercase());
    }

    vendor_dir.join(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_dir_for() {
        let vendor = Path::new("vendor/magento");
        assert_eq!(
            module_dir_for(vendor, "Magento_Customer"),
            vendor.join("module-customer")
        );
        assert_eq!(
            module_dir_for(vendor, "Magento_CatalogInventory"),
            vendor.join("module-catalog-inventory")
        );
        assert_eq!(module_dir_for(vendor, "Cms"), vendor.join("module-cms"));
    }

    #[test]
    fn test_scan_requires_etc() {
        let err = ModuleSource::scan(Path::new("/nonexistent/module"), &ExtractorConfig::default())
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidModulePath(_)));
    }
}
