//! Error types for configuration extraction.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// Failures while locating, reading, or parsing configuration files.
///
/// `MissingFile` and `MissingRoot` are only returned for files a module
/// cannot do without (`module.xml`). For optional files the driver logs
/// them and moves on.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file not found: {0}")]
    MissingFile(PathBuf),

    #[error("no <{root}> root element in {path}")]
    MissingRoot { path: PathBuf, root: String },

    #[error("malformed document {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("module etc/ directory not found: {0}")]
    InvalidModulePath(PathBuf),

    #[error("invalid configuration file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ParseError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn malformed(path: &Path, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// True for the two conditions an optional file is allowed to hit.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::MissingFile(_) | Self::MissingRoot { .. })
    }
}
