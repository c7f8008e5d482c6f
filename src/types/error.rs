//! Error types for tidemark

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for tidemark operations
#[derive(Debug, Error)]
pub enum TidemarkError {
    /// IO error tied to the path it happened on
    #[error("{}: {}", .path.display(), .source)]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path was expected to be a directory
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TidemarkError {
    /// Attach a path to an IO error.
    pub fn at(path: &Path, source: std::io::Error) -> Self {
        TidemarkError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Check if this error happened while loading or validating configuration
    pub fn is_config_error(&self) -> bool {
        matches!(self, TidemarkError::Config(_))
    }

    /// Check if this error came from the filesystem
    pub fn is_filesystem_error(&self) -> bool {
        matches!(
            self,
            TidemarkError::Filesystem { .. } | TidemarkError::NotADirectory(_)
        )
    }
}
