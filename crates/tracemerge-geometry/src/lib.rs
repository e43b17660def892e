//! Geometric predicate library for tracemerge.
//!
//! Classifies pairs of same-type shapes as contacting, exact duplicates, or
//! potential duplicates. Polygon comparisons use the ratio of union area to
//! intersection area, which is scale-invariant and tolerant of the small
//! digitization noise found in hand-traced data.
//!
//! # Key Items
//!
//! - [`is_contacting`] -- cheap pre-filter (bounding boxes for polygons)
//! - [`is_exact_duplicate`] / [`is_potential_duplicate`] -- threshold tests
//! - [`overlap`] / [`Overlap`] -- the underlying area measurement
//! - [`GeometryError`] -- unsupported shape combinations

pub mod error;
pub mod overlap;
pub mod predicates;

pub use error::{GeometryError, GeometryResult, Predicate};
pub use overlap::{bounding_box, overlap, Overlap};
pub use predicates::{
    is_contacting, is_exact_duplicate, is_potential_duplicate, is_reverse, DEFAULT_THRESHOLD,
    LINE_TOLERANCE,
};
