use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A planar coordinate in section space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `true` when both components differ from `other` by strictly less
    /// than `tolerance`.
    pub fn within(&self, other: &Coord, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance && (self.y - other.y).abs() < tolerance
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// The geometry of a single trace.
///
/// A closed set of variants: every comparison in the predicate library
/// dispatches with a `match` over pairs of these, so an unknown pairing
/// is a compile-visible case rather than a runtime type probe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// A single marker.
    Point { at: Coord },
    /// An open curve.
    LineString { coords: Vec<Coord> },
    /// A closed curve. The exterior ring is stored without a repeated
    /// closing vertex. `elevation`, when present, holds one z value per
    /// exterior vertex.
    Polygon {
        exterior: Vec<Coord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        elevation: Option<Vec<f64>>,
    },
}

impl Shape {
    pub fn point(x: f64, y: f64) -> Self {
        Shape::Point { at: Coord::new(x, y) }
    }

    pub fn line_string(coords: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Shape::LineString {
            coords: coords.into_iter().map(Coord::from).collect(),
        }
    }

    /// Build a flat polygon. A trailing vertex equal to the first is dropped.
    pub fn polygon(coords: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Shape::Polygon {
            exterior: open_ring(coords.into_iter().map(Coord::from).collect()),
            elevation: None,
        }
    }

    /// Build a polygon carrying one elevation value per exterior vertex.
    pub fn polygon_with_elevation(
        coords: impl IntoIterator<Item = (f64, f64, f64)>,
    ) -> Result<Self, TypeError> {
        let (mut exterior, mut elevation): (Vec<Coord>, Vec<f64>) = coords
            .into_iter()
            .map(|(x, y, z)| (Coord::new(x, y), z))
            .unzip();
        if exterior.is_empty() {
            return Err(TypeError::EmptyShape);
        }
        if exterior.len() > 1 && exterior.first() == exterior.last() {
            exterior.pop();
            elevation.pop();
        }
        Ok(Shape::Polygon {
            exterior,
            elevation: Some(elevation),
        })
    }

    /// Attach per-vertex elevation to an existing polygon.
    pub fn with_elevation(self, z: Vec<f64>) -> Result<Self, TypeError> {
        match self {
            Shape::Polygon { exterior, .. } => {
                if z.len() != exterior.len() {
                    return Err(TypeError::ElevationLength {
                        expected: exterior.len(),
                        actual: z.len(),
                    });
                }
                Ok(Shape::Polygon {
                    exterior,
                    elevation: Some(z),
                })
            }
            other => Ok(other),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Point { .. } => ShapeKind::Point,
            Shape::LineString { .. } => ShapeKind::LineString,
            Shape::Polygon { .. } => ShapeKind::Polygon,
        }
    }

    /// Returns `true` for polygons that carry elevation.
    pub fn has_elevation(&self) -> bool {
        matches!(self, Shape::Polygon { elevation: Some(_), .. })
    }

    pub fn signature(&self) -> ShapeSignature {
        ShapeSignature {
            kind: self.kind(),
            elevated: self.has_elevation(),
        }
    }

    /// All planar coordinates of the shape, in storage order.
    pub fn coords(&self) -> &[Coord] {
        match self {
            Shape::Point { at } => std::slice::from_ref(at),
            Shape::LineString { coords } => coords,
            Shape::Polygon { exterior, .. } => exterior,
        }
    }
}

fn open_ring(mut coords: Vec<Coord>) -> Vec<Coord> {
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    coords
}

/// The shape-type tag used as a conflict-matching key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeKind {
    Point,
    LineString,
    Polygon,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShapeKind::Point => "Point",
            ShapeKind::LineString => "LineString",
            ShapeKind::Polygon => "Polygon",
        };
        f.write_str(s)
    }
}

/// Kind plus dimensionality, used to describe a shape in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShapeSignature {
    pub kind: ShapeKind,
    pub elevated: bool,
}

impl fmt::Display for ShapeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elevated {
            write!(f, "{}[z]", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}
