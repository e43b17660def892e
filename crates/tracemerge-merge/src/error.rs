//! Error types for the merge crate.

use tracemerge_geometry::GeometryError;
use tracemerge_store::StoreError;

/// Errors that can occur while building or resolving a merge.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// A shape comparison failed while categorizing a section.
    #[error("failed to categorize section {section}: {source}")]
    Categorize {
        section: String,
        #[source]
        source: GeometryError,
    },

    /// Contours cannot be resolved while potential duplicates await a choice.
    #[error("section {section} has {pending} unresolved potential duplicate(s)")]
    PendingConflicts { section: String, pending: usize },

    /// A potential-duplicate pair index was out of range.
    #[error("potential pair {index} out of range ({len} pairs) in section {section}")]
    PairOutOfRange {
        section: String,
        index: usize,
        len: usize,
    },

    /// The contour is neither unique nor an exact-duplicate representative.
    #[error("contour {index} in section {section} is not an output candidate")]
    NotACandidate { section: String, index: usize },

    /// A merge state index was out of range (0 is the series state).
    #[error("merge state {index} out of range ({len} states)")]
    StateOutOfRange { index: usize, len: usize },

    /// The merge configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output serializer failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
