//! Pairwise shape classification.
//!
//! Each predicate is defined for pairs of the same shape type and fails with
//! [`GeometryError::UnsupportedShapeCombination`] otherwise.

use tracemerge_types::{Coord, Shape};

use crate::error::{GeometryError, GeometryResult, Predicate};
use crate::overlap::{boxes_contact, is_reverse_ring, overlap, rings_equal};

/// Default union-over-intersection threshold separating exact from
/// potential duplicates: `1 + 2^-17`.
pub const DEFAULT_THRESHOLD: f64 = 1.0 + 1.0 / 131_072.0;

/// Per-component difference under which two coordinates are "almost
/// equal" (six decimal places).
pub const LINE_TOLERANCE: f64 = 0.5e-6;

/// Are the two shapes close enough to be compared as duplicates?
///
/// Polygons use a bounding-box pre-filter that also accepts touching boxes.
pub fn is_contacting(a: &Shape, b: &Shape) -> GeometryResult<bool> {
    match (a, b) {
        (Shape::Point { at: pa }, Shape::Point { at: pb }) => Ok(pa == pb),
        (Shape::LineString { coords: ca }, Shape::LineString { coords: cb }) => {
            Ok(almost_equal(ca, cb))
        }
        (Shape::Polygon { exterior: ea, .. }, Shape::Polygon { exterior: eb, .. }) => {
            Ok(boxes_contact(ea, eb))
        }
        _ => Err(unsupported(Predicate::Contacting, a, b)),
    }
}

/// Are the two shapes the same trace within `threshold`?
///
/// Polygons that both carry elevation compare their exterior rings exactly.
/// Otherwise both must be valid, agree on reverse-trace orientation, share a
/// nonzero intersection, and have `area(union) / area(intersection)` strictly
/// below `threshold`.
pub fn is_exact_duplicate(a: &Shape, b: &Shape, threshold: f64) -> GeometryResult<bool> {
    match (a, b) {
        (Shape::Point { at: pa }, Shape::Point { at: pb }) => Ok(pa == pb),
        (Shape::LineString { coords: ca }, Shape::LineString { coords: cb }) => {
            Ok(same_line(ca, cb))
        }
        (
            Shape::Polygon {
                exterior: ea,
                elevation: Some(_),
            },
            Shape::Polygon {
                exterior: eb,
                elevation: Some(_),
            },
        ) => Ok(rings_equal(ea, eb)),
        (Shape::Polygon { exterior: ea, .. }, Shape::Polygon { exterior: eb, .. }) => {
            if is_reverse_ring(ea) != is_reverse_ring(eb) {
                return Ok(false);
            }
            Ok(overlap(ea, eb).ratio().is_some_and(|r| r < threshold))
        }
        _ => Err(unsupported(Predicate::ExactDuplicate, a, b)),
    }
}

/// Do the two shapes overlap meaningfully without being exact duplicates?
///
/// The polygon test mirrors [`is_exact_duplicate`] with the comparison
/// inverted: a nonzero intersection and a ratio at or above `threshold`.
/// Elevated polygons are rejected.
pub fn is_potential_duplicate(a: &Shape, b: &Shape, threshold: f64) -> GeometryResult<bool> {
    match (a, b) {
        (Shape::Point { at: pa }, Shape::Point { at: pb }) => {
            Ok(pa.within(pb, LINE_TOLERANCE) && pa != pb)
        }
        (Shape::LineString { coords: ca }, Shape::LineString { coords: cb }) => {
            Ok(almost_equal(ca, cb) && !same_line(ca, cb))
        }
        (Shape::Polygon { exterior: ea, .. }, Shape::Polygon { exterior: eb, .. }) => {
            if a.has_elevation() || b.has_elevation() {
                return Err(unsupported(Predicate::PotentialDuplicate, a, b));
            }
            if is_reverse_ring(ea) != is_reverse_ring(eb) {
                return Ok(false);
            }
            Ok(overlap(ea, eb).ratio().is_some_and(|r| r >= threshold))
        }
        _ => Err(unsupported(Predicate::PotentialDuplicate, a, b)),
    }
}

/// `true` when `shape` is a polygon traced clockwise.
pub fn is_reverse(shape: &Shape) -> bool {
    match shape {
        Shape::Polygon { exterior, .. } => is_reverse_ring(exterior),
        _ => false,
    }
}

fn unsupported(predicate: Predicate, a: &Shape, b: &Shape) -> GeometryError {
    GeometryError::UnsupportedShapeCombination {
        predicate,
        left: a.signature(),
        right: b.signature(),
    }
}

fn almost_equal(a: &[Coord], b: &[Coord]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| p.within(q, LINE_TOLERANCE))
}

/// Same vertex sequence, read in either direction.
fn same_line(a: &[Coord], b: &[Coord]) -> bool {
    a == b || (a.len() == b.len() && a.iter().eq(b.iter().rev()))
}
