//! Foundation types for tracemerge.
//!
//! This crate provides the in-memory trace-set entity graph consumed and
//! produced by the merge core. Every other tracemerge crate depends on
//! `tracemerge-types`.
//!
//! # Key Types
//!
//! - [`Shape`] — Point, LineString, or Polygon geometry of one trace
//! - [`Contour`] — A named trace within a section
//! - [`Section`] — One slice: images, contours, attributes
//! - [`Series`] — Ordered sections plus series-level contours and z-contours

pub mod error;
pub mod series;
pub mod shape;

pub use error::TypeError;
pub use series::{Attributes, Contour, Image, Section, Series, ZContour, ZPoint};
pub use shape::{Coord, Shape, ShapeKind, ShapeSignature};
