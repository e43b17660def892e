//! Error types for the geometry crate.

use std::fmt;

use tracemerge_types::ShapeSignature;

/// The predicate that was being evaluated when an error occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Predicate {
    Contacting,
    ExactDuplicate,
    PotentialDuplicate,
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Predicate::Contacting => "is_contacting",
            Predicate::ExactDuplicate => "is_exact_duplicate",
            Predicate::PotentialDuplicate => "is_potential_duplicate",
        };
        f.write_str(s)
    }
}

/// Errors that can occur while comparing shapes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// The predicate has no comparison for this pair of shapes: mixed
    /// shape types, or an elevated polygon where only planar input works.
    #[error("{predicate}: no support for shape types {left} and {right}")]
    UnsupportedShapeCombination {
        predicate: Predicate,
        left: ShapeSignature,
        right: ShapeSignature,
    },
}

/// Convenience alias for geometry results.
pub type GeometryResult<T> = Result<T, GeometryError>;
