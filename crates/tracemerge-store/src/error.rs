use std::path::PathBuf;

/// Errors from trace-set document I/O.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document exists at the requested location.
    #[error("series document not found: {0}")]
    NotFound(PathBuf),

    /// The document could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The temporary file could not be moved into place.
    #[error("failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The series name cannot be used as a file name.
    #[error("invalid series name for output: {0:?}")]
    InvalidName(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
