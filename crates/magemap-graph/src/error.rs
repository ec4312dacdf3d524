use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No graph file found in {0}")]
    SnapshotNotFound(String),

    #[error("Module '{0}' not found in graph")]
    UnknownModule(String),

    #[error("Dependency cycle involving module '{0}'")]
    DependencyCycle(String),

    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

impl GraphError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
