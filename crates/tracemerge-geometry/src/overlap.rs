//! Planar polygon measurements backed by `geo`.
//!
//! Everything here works on exterior rings only and ignores elevation.

use geo::{Area, BooleanOps, BoundingRect, Intersects, Rect, Validation, Winding};
use tracemerge_types::Coord;

/// Convert an open exterior ring into a `geo` polygon (the ring is closed
/// by `geo` on construction).
pub(crate) fn to_geo_polygon(exterior: &[Coord]) -> geo::Polygon<f64> {
    let ring: Vec<(f64, f64)> = exterior.iter().map(|c| (c.x, c.y)).collect();
    geo::Polygon::new(geo::LineString::from(ring), vec![])
}

/// Axis-aligned bounding box of a ring, or `None` if it has no vertices.
pub fn bounding_box(exterior: &[Coord]) -> Option<Rect<f64>> {
    to_geo_polygon(exterior).bounding_rect()
}

/// `true` when the bounding boxes of two rings intersect or touch.
pub fn boxes_contact(a: &[Coord], b: &[Coord]) -> bool {
    match (bounding_box(a), bounding_box(b)) {
        (Some(ra), Some(rb)) => ra.intersects(&rb),
        _ => false,
    }
}

/// `true` when the ring is a reverse trace: RECONSTRUCT stores negative
/// areas with a clockwise exterior, the opposite of the usual convention.
pub fn is_reverse_ring(exterior: &[Coord]) -> bool {
    !to_geo_polygon(exterior).exterior().is_ccw()
}

/// `true` when the ring forms a valid simple polygon.
pub fn is_valid_ring(exterior: &[Coord]) -> bool {
    to_geo_polygon(exterior).is_valid()
}

/// Outcome of the union-over-intersection area measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Overlap {
    /// At least one polygon failed validation.
    Invalid,
    /// Intersection area is zero (possibly touching along an edge).
    Disjoint,
    /// `area(union) / area(intersection)`; always `>= 1.0`.
    Ratio(f64),
}

impl Overlap {
    pub fn ratio(self) -> Option<f64> {
        match self {
            Overlap::Ratio(r) => Some(r),
            _ => None,
        }
    }
}

/// Measure how completely two rings overlap.
///
/// A ratio of exactly 1.0 means the polygons cover the same area; larger
/// values mean more of the union lies outside the shared region.
pub fn overlap(a: &[Coord], b: &[Coord]) -> Overlap {
    let pa = to_geo_polygon(a);
    let pb = to_geo_polygon(b);
    if !pa.is_valid() || !pb.is_valid() {
        tracing::debug!("invalid polygon in overlap measurement");
        return Overlap::Invalid;
    }
    let intersection = pa.intersection(&pb).unsigned_area();
    if intersection <= 0.0 {
        return Overlap::Disjoint;
    }
    let union = pa.union(&pb).unsigned_area();
    Overlap::Ratio(union / intersection)
}

/// Closed-ring equality ignoring start vertex and winding direction.
pub fn rings_equal(a: &[Coord], b: &[Coord]) -> bool {
    let n = a.len();
    if n != b.len() {
        return false;
    }
    if n == 0 {
        return true;
    }
    (0..n).filter(|&k| b[k] == a[0]).any(|k| {
        let forward = (0..n).all(|i| a[i] == b[(k + i) % n]);
        let backward = (0..n).all(|i| a[i] == b[(k + n - i) % n]);
        forward || backward
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> Vec<Coord> {
        points.iter().copied().map(Coord::from).collect()
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<Coord> {
        ring(&[(x, y), (x + size, y), (x + size, y + size), (x, y + size)])
    }

    #[test]
    fn counter_clockwise_is_not_reverse() {
        assert!(!is_reverse_ring(&square(0.0, 0.0, 1.0)));
    }

    #[test]
    fn clockwise_is_reverse() {
        let mut cw = square(0.0, 0.0, 1.0);
        cw.reverse();
        assert!(is_reverse_ring(&cw));
    }

    #[test]
    fn touching_boxes_contact() {
        assert!(boxes_contact(&square(0.0, 0.0, 1.0), &square(1.0, 0.0, 1.0)));
        assert!(!boxes_contact(&square(0.0, 0.0, 1.0), &square(1.5, 0.0, 1.0)));
    }

    #[test]
    fn empty_ring_never_contacts() {
        assert!(!boxes_contact(&[], &square(0.0, 0.0, 1.0)));
    }

    #[test]
    fn overlap_of_identical_squares_is_one() {
        let ratio = overlap(&square(0.0, 0.0, 10.0), &square(0.0, 0.0, 10.0))
            .ratio()
            .unwrap();
        assert!((ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn overlap_of_partial_squares() {
        // Intersection 40, union 160.
        let ratio = overlap(&square(0.0, 0.0, 10.0), &square(6.0, 0.0, 10.0))
            .ratio()
            .unwrap();
        assert!((ratio - 4.0).abs() < 1e-9);
    }

    #[test]
    fn edge_touching_squares_are_disjoint() {
        assert_eq!(
            overlap(&square(0.0, 0.0, 1.0), &square(1.0, 0.0, 1.0)),
            Overlap::Disjoint
        );
    }

    #[test]
    fn bow_tie_is_invalid() {
        let bow_tie = ring(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        assert!(!is_valid_ring(&bow_tie));
        assert_eq!(overlap(&bow_tie, &square(0.0, 0.0, 2.0)), Overlap::Invalid);
    }

    #[test]
    fn rings_equal_ignores_rotation_and_winding() {
        let a = square(0.0, 0.0, 1.0);
        let mut rotated = a.clone();
        rotated.rotate_left(2);
        let mut reversed = a.clone();
        reversed.reverse();
        assert!(rings_equal(&a, &rotated));
        assert!(rings_equal(&a, &reversed));
        assert!(!rings_equal(&a, &square(0.0, 0.0, 2.0)));
    }
}
