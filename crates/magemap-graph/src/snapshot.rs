//! Graph files on disk.
//!
//! A snapshot directory holds one `<name>-graph.json` per parsed module.
//! Queries that are not told which file to read pick one with [`SnapshotDir::find`].

use crate::error::{GraphError, Result};
use crate::graph::GraphStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const GRAPH_SUFFIX: &str = "-graph.json";

/// A directory of serialized graphs.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    dir: PathBuf,
}

impl SnapshotDir {
    /// Refers to `dir` without touching the filesystem.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Refers to `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| GraphError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Where the graph called `name` lives.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", name, GRAPH_SUFFIX))
    }

    /// Writes `graph` as pretty-printed JSON and returns the file path.
    pub fn save(&self, name: &str, graph: &GraphStore) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| GraphError::io(&self.dir, e))?;

        let path = self.path_for(name);
        let json = graph.to_json_string()?;
        fs::write(&path, json).map_err(|e| GraphError::io(&path, e))?;

        info!(
            "Saved graph {} ({} nodes, {} edges)",
            path.display(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(path)
    }

    /// Reads a graph file.
    pub fn load(path: &Path) -> Result<GraphStore> {
        let json = fs::read_to_string(path).map_err(|e| GraphError::io(path, e))?;
        let graph = GraphStore::from_json_str(&json)?;
        debug!(
            "Loaded graph {} ({} nodes, {} edges)",
            path.display(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Graph files in the directory, sorted by file name.
    ///
    /// A missing directory has no graphs. AppleDouble files (`._*`) are skipped.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(GraphError::io(&self.dir, e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| GraphError::io(&self.dir, e))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.ends_with(GRAPH_SUFFIX) && !name.starts_with("._") {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Picks the graph file a query should read.
    ///
    /// In order: `explicit` if that file exists; the module graph inferred
    /// from a `Vendor\Module\...` class name in `hint`; the first graph
    /// file in the directory.
    pub fn find(&self, explicit: Option<&Path>, hint: Option<&str>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.is_file() {
                return Ok(path.to_path_buf());
            }
            debug!("Graph file {} does not exist, searching {}", path.display(), self.dir.display());
        }

        if let Some(module) = hint.and_then(module_from_class) {
            let path = self.path_for(&module);
            if path.is_file() {
                return Ok(path);
            }
        }

        self.list()?
            .into_iter()
            .next()
            .ok_or_else(|| GraphError::SnapshotNotFound(self.dir.display().to_string()))
    }

    /// Deletes the graph called `name`. Returns whether a file was removed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(GraphError::io(&path, e)),
        }
    }
}

/// `Magento\Customer\Model\Customer` -> `Magento_Customer`.
fn module_from_class(class: &str) -> Option<String> {
    let mut parts = class.trim_start_matches('\\').split('\\');
    match (parts.next(), parts.next()) {
        (Some(vendor), Some(module)) if !vendor.is_empty() && !module.is_empty() => {
            Some(format!("{}_{}", vendor, module))
        }
        _ => None,
    }
}
