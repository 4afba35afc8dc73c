//! Core error types.

use std::path::PathBuf;

/// Errors raised by the manifest store, cache layout, and reconciler.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An expected file does not exist.
    #[error("{} not found", path.display())]
    NotFound { path: PathBuf },

    /// The manifest already exists and must not be overwritten.
    #[error("{} already exists", path.display())]
    AlreadyExists { path: PathBuf },

    /// A required value was empty.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// A dependency name cannot be used as a cache key or module path.
    #[error("invalid dependency name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// The manifest file is not valid JSON of the expected shape.
    #[error("malformed manifest {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The module descriptor could not be parsed.
    #[error("malformed go.mod at line {line}: {detail}")]
    DescriptorParse { line: usize, detail: String },

    /// Filesystem operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
