//! Resolution lifecycle of the series-level fields.

use tracemerge_types::{Attributes, Contour, Series, ZContour};

use crate::resolution::{Resolution, ResolutionStatus};

/// Merge state for the series-level attributes, contour palette and
/// z-contours.
///
/// Nothing is categorized here. Every field starts pending and
/// [`SeriesMergeState::to_series`] falls back to the source for pending
/// fields. Z-contours only count toward completion when the state was built
/// with `zcontours_gate_completion`.
#[derive(Clone, Debug)]
pub struct SeriesMergeState {
    source: Series,
    attributes: Resolution<Attributes>,
    contours: Resolution<Vec<Contour>>,
    zcontours: Resolution<Vec<ZContour>>,
    zcontours_gate_completion: bool,
}

impl SeriesMergeState {
    /// Build from the series header. Sections on `source` are ignored.
    pub fn new(source: &Series, zcontours_gate_completion: bool) -> Self {
        Self {
            source: source.header(),
            attributes: Resolution::Pending,
            contours: Resolution::Pending,
            zcontours: Resolution::Pending,
            zcontours_gate_completion,
        }
    }

    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn source(&self) -> &Series {
        &self.source
    }

    pub fn attributes(&self) -> &Resolution<Attributes> {
        &self.attributes
    }

    pub fn contours(&self) -> &Resolution<Vec<Contour>> {
        &self.contours
    }

    pub fn zcontours(&self) -> &Resolution<Vec<ZContour>> {
        &self.zcontours
    }

    pub fn zcontours_gate_completion(&self) -> bool {
        self.zcontours_gate_completion
    }

    pub fn resolve_attributes(&mut self, attributes: Attributes) {
        self.attributes.resolve(attributes);
    }

    pub fn clear_attributes(&mut self) {
        self.attributes.reset();
    }

    pub fn resolve_contours(&mut self, contours: Vec<Contour>) {
        self.contours.resolve(contours);
    }

    pub fn clear_contours(&mut self) {
        self.contours.reset();
    }

    pub fn resolve_zcontours(&mut self, zcontours: Vec<ZContour>) {
        self.zcontours.resolve(zcontours);
    }

    pub fn clear_zcontours(&mut self) {
        self.zcontours.reset();
    }

    /// Resolve every field to the source values.
    pub fn use_source(&mut self) {
        self.attributes.resolve(self.source.attributes.clone());
        self.contours.resolve(self.source.contours.clone());
        self.zcontours.resolve(self.source.zcontours.clone());
    }

    /// Number of fields that gate completion.
    pub fn field_count(&self) -> usize {
        if self.zcontours_gate_completion {
            3
        } else {
            2
        }
    }

    /// Resolved gating fields out of [`field_count`](Self::field_count).
    pub fn done_count(&self) -> usize {
        let mut done = usize::from(self.attributes.is_resolved())
            + usize::from(self.contours.is_resolved());
        if self.zcontours_gate_completion {
            done += usize::from(self.zcontours.is_resolved());
        }
        done
    }

    pub fn is_done(&self) -> bool {
        self.done_count() == self.field_count()
    }

    pub fn status(&self) -> ResolutionStatus {
        ResolutionStatus::from_counts(self.done_count(), self.field_count())
    }

    /// Build the output series header (no sections), using the source for
    /// any pending field.
    pub fn to_series(&self) -> Series {
        Series {
            name: self.source.name.clone(),
            attributes: self.attributes.or_source(&self.source.attributes),
            contours: self.contours.or_source(&self.source.contours),
            zcontours: self.zcontours.or_source(&self.source.zcontours),
            sections: Vec::new(),
        }
    }
}
