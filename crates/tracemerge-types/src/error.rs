use thiserror::Error;

/// Errors produced when constructing trace-set entities.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("elevation length mismatch: expected {expected} values, got {actual}")]
    ElevationLength { expected: usize, actual: usize },

    #[error("shape has no coordinates")]
    EmptyShape,
}
