//! The decoded trace-set entity graph.
//!
//! A [`Series`] owns an ordered list of [`Section`]s; each section owns its
//! images and traced [`Contour`]s. Free-form metadata travels as
//! [`Attributes`] so the reader/writer can round-trip fields this crate does
//! not interpret.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shape::{Shape, ShapeKind};

/// Free-form attribute mapping with deterministic key order.
pub type Attributes = BTreeMap<String, Value>;

/// A named trace within a section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Conflict-matching key.
    pub name: String,
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl Contour {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            attributes: Attributes::new(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }
}

/// A section image reference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    /// Magnification (section units per pixel).
    pub mag: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl Image {
    pub fn new(src: impl Into<String>, mag: f64) -> Self {
        Self {
            src: src.into(),
            mag,
            attributes: Attributes::new(),
        }
    }
}

/// One vertex of a z-contour, pinned to a section index.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZPoint {
    pub x: f64,
    pub y: f64,
    pub section: u32,
}

/// An elevation-indexed trace spanning several sections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZContour {
    pub name: String,
    pub points: Vec<ZPoint>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,
}

impl ZContour {
    pub fn new(name: impl Into<String>, points: Vec<ZPoint>) -> Self {
        Self {
            name: name.into(),
            points,
            attributes: Attributes::new(),
        }
    }
}

/// One cross-sectional slice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub index: u32,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub contours: Vec<Contour>,
}

impl Section {
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
            ..Default::default()
        }
    }

    pub fn with_contours(mut self, contours: Vec<Contour>) -> Self {
        self.contours = contours;
        self
    }

    pub fn with_images(mut self, images: Vec<Image>) -> Self {
        self.images = images;
        self
    }
}

/// A full trace set: series-level data plus the ordered sections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    #[serde(default)]
    pub attributes: Attributes,
    /// Series-level contour palette.
    #[serde(default)]
    pub contours: Vec<Contour>,
    #[serde(default)]
    pub zcontours: Vec<ZContour>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    /// A copy of the series-level fields with no sections attached.
    pub fn header(&self) -> Series {
        Series {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            contours: self.contours.clone(),
            zcontours: self.zcontours.clone(),
            sections: Vec::new(),
        }
    }

    /// Total number of section contours across the series.
    pub fn contour_count(&self) -> usize {
        self.sections.iter().map(|s| s.contours.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Series {
        let section = Section::new("series.1", 1)
            .with_images(vec![Image::new("img1.tif", 0.00254)])
            .with_contours(vec![
                Contour::new("cell1", Shape::polygon([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)])),
                Contour::new("dot", Shape::point(2.0, 2.0)),
            ]);
        let mut series = Series::new("series.ser").with_sections(vec![section]);
        series.attributes.insert("thickness".into(), json!(0.05));
        series
            .zcontours
            .push(ZContour::new("axon", vec![ZPoint { x: 1.0, y: 1.0, section: 1 }]));
        series
    }

    #[test]
    fn header_drops_sections_only() {
        let series = sample();
        let header = series.header();
        assert!(header.sections.is_empty());
        assert_eq!(header.attributes, series.attributes);
        assert_eq!(header.zcontours, series.zcontours);
        assert_eq!(header.name, "series.ser");
    }

    #[test]
    fn contour_count_spans_sections() {
        assert_eq!(sample().contour_count(), 2);
    }

    #[test]
    fn json_document_round_trip() {
        let series = sample();
        let text = serde_json::to_string(&series).unwrap();
        let back: Series = serde_json::from_str(&text).unwrap();
        assert_eq!(back, series);
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let series: Series = serde_json::from_value(json!({ "name": "bare" })).unwrap();
        assert!(series.sections.is_empty());
        assert!(series.attributes.is_empty());
    }
}
