//! Resolution lifecycle of one section.
//!
//! A [`SectionMergeState`] categorizes its section's contours on
//! construction and then tracks three resolvable fields: attributes, images
//! and the output contour list. Attributes and images start resolved to the
//! source; contours start pending and are materialized by
//! [`SectionMergeState::resolve_contours`] once every potential-duplicate
//! pair has a [`PairChoice`]. Any change to a choice or inclusion flag
//! returns the contours to pending.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracemerge_types::{Attributes, Contour, Image, Section};

use crate::categorize::{Categorizer, ConflictPair, ContourCategories};
use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::quick::QuickMerge;
use crate::resolution::{Resolution, ResolutionStatus};

/// Number of resolvable fields on a section state.
pub const SECTION_FIELDS: usize = 3;

/// Disposition of one potential-duplicate pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairChoice {
    #[default]
    Pending,
    First,
    Second,
    Both,
    Neither,
}

impl PairChoice {
    /// Whether the (first, second) members survive into the output.
    pub fn keeps(self) -> (bool, bool) {
        match self {
            PairChoice::Pending | PairChoice::Neither => (false, false),
            PairChoice::First => (true, false),
            PairChoice::Second => (false, true),
            PairChoice::Both => (true, true),
        }
    }

    pub fn is_pending(self) -> bool {
        self == PairChoice::Pending
    }
}

/// Merge state for a single section.
#[derive(Clone, Debug)]
pub struct SectionMergeState {
    source: Section,
    categorizer: Categorizer,
    attributes: Resolution<Attributes>,
    images: Resolution<Vec<Image>>,
    contours: Resolution<Vec<Contour>>,
    categories: ContourCategories,
    /// One entry per potential pair, same order.
    choices: Vec<PairChoice>,
    /// Candidates the caller dropped from the output.
    excluded: BTreeSet<usize>,
}

impl SectionMergeState {
    /// Build the state and categorize the section's contours.
    pub fn new(source: Section, config: &MergeConfig) -> MergeResult<Self> {
        let mut state = Self {
            attributes: Resolution::Resolved(source.attributes.clone()),
            images: Resolution::Resolved(source.images.clone()),
            contours: Resolution::Pending,
            categories: ContourCategories::default(),
            choices: Vec::new(),
            excluded: BTreeSet::new(),
            categorizer: Categorizer::from_config(config),
            source,
        };
        state.check_conflicts()?;
        Ok(state)
    }

    /// Re-run categorization on the source contours.
    ///
    /// Discards every pair choice and inclusion flag and returns the contours
    /// to pending. On failure the previous categorization is kept.
    pub fn check_conflicts(&mut self) -> MergeResult<()> {
        let categories = self
            .categorizer
            .categorize(&self.source.contours)
            .map_err(|source| MergeError::Categorize {
                section: self.source.name.clone(),
                source,
            })?;

        tracing::debug!(
            section = %self.source.name,
            contours = self.source.contours.len(),
            unique = categories.unique.len(),
            exact = categories.exact_duplicates.len(),
            potential = categories.potential_pairs.len(),
            "categorized section"
        );

        self.choices = vec![PairChoice::Pending; categories.potential_pairs.len()];
        self.categories = categories;
        self.excluded.clear();
        self.contours.reset();
        Ok(())
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.source.name
    }

    pub fn source(&self) -> &Section {
        &self.source
    }

    pub fn categories(&self) -> &ContourCategories {
        &self.categories
    }

    pub fn potential_pairs(&self) -> &[ConflictPair] {
        &self.categories.potential_pairs
    }

    pub fn choices(&self) -> &[PairChoice] {
        &self.choices
    }

    pub fn attributes(&self) -> &Resolution<Attributes> {
        &self.attributes
    }

    pub fn images(&self) -> &Resolution<Vec<Image>> {
        &self.images
    }

    pub fn contours(&self) -> &Resolution<Vec<Contour>> {
        &self.contours
    }

    /// Number of potential pairs still awaiting a choice.
    pub fn pending_count(&self) -> usize {
        self.choices.iter().filter(|c| c.is_pending()).count()
    }

    // ---------------------------------------------------------------
    // Contour decisions
    // ---------------------------------------------------------------

    /// Set the disposition of potential pair `pair`.
    pub fn choose(&mut self, pair: usize, choice: PairChoice) -> MergeResult<()> {
        let len = self.choices.len();
        let slot = self
            .choices
            .get_mut(pair)
            .ok_or_else(|| MergeError::PairOutOfRange {
                section: self.source.name.clone(),
                index: pair,
                len,
            })?;
        *slot = choice;
        self.contours.reset();
        Ok(())
    }

    /// Set the disposition of every potential pair.
    pub fn choose_all(&mut self, choice: PairChoice) {
        self.choices.iter_mut().for_each(|c| *c = choice);
        self.contours.reset();
    }

    /// Include or drop a unique contour or exact-duplicate representative.
    pub fn set_included(&mut self, index: usize, included: bool) -> MergeResult<()> {
        if !self.categories.is_candidate(index) {
            return Err(MergeError::NotACandidate {
                section: self.source.name.clone(),
                index,
            });
        }
        if included {
            self.excluded.remove(&index);
        } else {
            self.excluded.insert(index);
        }
        self.contours.reset();
        Ok(())
    }

    pub fn is_included(&self, index: usize) -> bool {
        self.categories.is_candidate(index) && !self.excluded.contains(&index)
    }

    /// Materialize the output contours from the current decisions.
    ///
    /// The result holds each selected source contour once, in source order.
    /// When overlaps are not reported, every overlapping contour passes
    /// through from the source unchanged.
    pub fn resolve_contours(&mut self) -> MergeResult<&[Contour]> {
        let pending = self.pending_count();
        if pending > 0 {
            return Err(MergeError::PendingConflicts {
                section: self.source.name.clone(),
                pending,
            });
        }

        let mut selected: BTreeSet<usize> = self
            .categories
            .candidates()
            .filter(|idx| !self.excluded.contains(idx))
            .collect();
        if !self.categorizer.include_overlaps {
            let unique = &self.categories.unique;
            selected.extend((0..self.source.contours.len()).filter(|idx| !unique.contains(idx)));
        }
        for (pair, choice) in self.categories.potential_pairs.iter().zip(&self.choices) {
            let (first, second) = choice.keeps();
            if first {
                selected.insert(pair.first);
            }
            if second {
                selected.insert(pair.second);
            }
        }

        let contours = selected
            .into_iter()
            .filter_map(|idx| self.source.contours.get(idx).cloned())
            .collect();
        self.contours.resolve(contours);
        Ok(self.contours.value().map(Vec::as_slice).unwrap_or_default())
    }

    /// Resolve the contours to an explicit list, bypassing the categories.
    pub fn set_contours(&mut self, contours: Vec<Contour>) {
        self.contours.resolve(contours);
    }

    pub fn clear_contours(&mut self) {
        self.contours.reset();
    }

    // ---------------------------------------------------------------
    // Attributes and images
    // ---------------------------------------------------------------

    pub fn resolve_attributes(&mut self, attributes: Attributes) {
        self.attributes.resolve(attributes);
    }

    pub fn clear_attributes(&mut self) {
        self.attributes.reset();
    }

    pub fn resolve_images(&mut self, images: Vec<Image>) {
        self.images.resolve(images);
    }

    pub fn clear_images(&mut self) {
        self.images.reset();
    }

    // ---------------------------------------------------------------
    // Progress
    // ---------------------------------------------------------------

    pub fn is_done(&self) -> bool {
        self.done_count() == SECTION_FIELDS
    }

    /// Resolved fields out of [`SECTION_FIELDS`].
    pub fn done_count(&self) -> usize {
        [
            self.attributes.is_resolved(),
            self.images.is_resolved(),
            self.contours.is_resolved(),
        ]
        .into_iter()
        .filter(|done| *done)
        .count()
    }

    pub fn status(&self) -> ResolutionStatus {
        ResolutionStatus::from_counts(self.done_count(), SECTION_FIELDS)
    }

    /// Apply `policy` to every pair, keep every candidate, and resolve all
    /// fields.
    pub fn apply_quick_merge(&mut self, policy: QuickMerge) -> MergeResult<()> {
        self.choose_all(policy.pair_choice());
        self.excluded.clear();
        self.attributes.resolve(self.source.attributes.clone());
        self.images.resolve(self.source.images.clone());
        self.resolve_contours()?;
        Ok(())
    }

    /// Build the output section, using the source for any pending field.
    pub fn to_section(&self) -> Section {
        Section {
            name: self.source.name.clone(),
            index: self.source.index,
            attributes: self.attributes.or_source(&self.source.attributes),
            images: self.images.or_source(&self.source.images),
            contours: self.contours.or_source(&self.source.contours),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracemerge_types::Shape;

    fn square(name: &str, x: f64, size: f64) -> Contour {
        Contour::new(
            name,
            Shape::polygon([(x, 0.0), (x + size, 0.0), (x + size, size), (x, size)]),
        )
    }

    fn conflicted_section() -> Section {
        // 0 and 1 overlap partially, 2 is unique.
        let mut section = Section::new("series.7", 7)
            .with_images(vec![Image::new("s7.tif", 0.002)])
            .with_contours(vec![
                square("cell1", 0.0, 10.0),
                square("cell1", 6.0, 10.0),
                square("cell2", 100.0, 1.0),
            ]);
        section.attributes.insert("thickness".into(), json!(0.05));
        section
    }

    fn state(section: Section) -> SectionMergeState {
        SectionMergeState::new(section, &MergeConfig::default()).unwrap()
    }

    fn xs(contours: &[Contour]) -> Vec<f64> {
        contours.iter().map(|c| c.shape.coords()[0].x).collect()
    }

    #[test]
    fn construction_categorizes_and_resolves_source_fields() {
        let s = state(conflicted_section());
        assert_eq!(s.categories().unique, vec![2]);
        assert_eq!(s.potential_pairs(), &[ConflictPair::new(0, 1)]);
        assert_eq!(s.choices(), &[PairChoice::Pending]);
        assert!(s.attributes().is_resolved());
        assert!(s.images().is_resolved());
        assert!(s.contours().is_pending());
        assert_eq!(s.done_count(), 2);
        assert_eq!(s.status(), ResolutionStatus::Partial);
    }

    #[test]
    fn clean_section_resolves_immediately() {
        let mut s = state(Section::new("clean", 1).with_contours(vec![square("a", 0.0, 1.0)]));
        assert_eq!(s.resolve_contours().unwrap().len(), 1);
        assert!(s.is_done());
        assert_eq!(s.status(), ResolutionStatus::Done);
    }

    #[test]
    fn pending_pairs_block_resolution() {
        let mut s = state(conflicted_section());
        let err = s.resolve_contours().unwrap_err();
        assert!(matches!(err, MergeError::PendingConflicts { pending: 1, .. }));
        assert!(s.contours().is_pending());
    }

    #[test]
    fn choices_select_pair_members_in_source_order() {
        let mut s = state(conflicted_section());
        s.choose(0, PairChoice::Second).unwrap();
        assert_eq!(xs(s.resolve_contours().unwrap()), vec![6.0, 100.0]);

        s.choose(0, PairChoice::Both).unwrap();
        assert_eq!(xs(s.resolve_contours().unwrap()), vec![0.0, 6.0, 100.0]);

        s.choose(0, PairChoice::Neither).unwrap();
        assert_eq!(xs(s.resolve_contours().unwrap()), vec![100.0]);
    }

    #[test]
    fn choosing_resets_resolved_contours() {
        let mut s = state(conflicted_section());
        s.choose(0, PairChoice::First).unwrap();
        s.resolve_contours().unwrap();
        assert!(s.is_done());

        s.choose(0, PairChoice::Second).unwrap();
        assert!(s.contours().is_pending());
        assert_eq!(s.done_count(), 2);
    }

    #[test]
    fn choose_out_of_range() {
        let mut s = state(conflicted_section());
        let err = s.choose(3, PairChoice::First).unwrap_err();
        assert!(matches!(err, MergeError::PairOutOfRange { index: 3, len: 1, .. }));
    }

    #[test]
    fn excluding_a_unique_contour() {
        let mut s = state(conflicted_section());
        s.choose_all(PairChoice::First);
        s.set_included(2, false).unwrap();
        assert!(!s.is_included(2));
        assert_eq!(xs(s.resolve_contours().unwrap()), vec![0.0]);

        s.set_included(2, true).unwrap();
        assert!(s.contours().is_pending());
        assert_eq!(xs(s.resolve_contours().unwrap()), vec![0.0, 100.0]);
    }

    #[test]
    fn only_candidates_can_be_excluded() {
        let mut s = state(conflicted_section());
        let err = s.set_included(0, false).unwrap_err();
        assert!(matches!(err, MergeError::NotACandidate { index: 0, .. }));
    }

    #[test]
    fn exact_duplicates_emit_one_copy() {
        let mut s = state(Section::new("dups", 2).with_contours(vec![
            square("cell1", 0.0, 10.0),
            square("cell1", 0.0, 10.0),
        ]));
        assert_eq!(s.categories().exact_duplicates, vec![0]);
        assert_eq!(s.resolve_contours().unwrap().len(), 1);
    }

    #[test]
    fn done_count_tracks_each_field() {
        let mut s = state(Section::new("clean", 1));
        assert_eq!(s.done_count(), 2);
        s.resolve_contours().unwrap();
        assert_eq!(s.done_count(), 3);
        s.clear_attributes();
        assert_eq!(s.done_count(), 2);
        s.clear_images();
        assert_eq!(s.done_count(), 1);
        s.clear_contours();
        assert_eq!(s.done_count(), 0);
        assert_eq!(s.status(), ResolutionStatus::Untouched);
        s.resolve_images(Vec::new());
        assert_eq!(s.done_count(), 1);
        s.resolve_attributes(Attributes::new());
        assert_eq!(s.done_count(), 2);
    }

    #[test]
    fn to_section_falls_back_to_source() {
        let s = state(conflicted_section());
        let out = s.to_section();
        assert_eq!(out, conflicted_section());
    }

    #[test]
    fn to_section_uses_resolved_fields() {
        let mut s = state(conflicted_section());
        s.resolve_images(Vec::new());
        s.set_contours(vec![square("manual", 50.0, 2.0)]);
        let out = s.to_section();
        assert!(out.images.is_empty());
        assert_eq!(out.contours.len(), 1);
        assert_eq!(out.contours[0].name, "manual");
        assert_eq!(out.index, 7);
    }

    #[test]
    fn quick_merge_resolves_everything() {
        let mut s = state(conflicted_section());
        s.clear_attributes();
        s.set_included(2, false).unwrap();
        s.apply_quick_merge(QuickMerge::First).unwrap();
        assert!(s.is_done());
        assert_eq!(xs(s.contours().value().unwrap()), vec![0.0, 100.0]);
        assert_eq!(s.attributes().value(), Some(&conflicted_section().attributes));
    }

    #[test]
    fn check_conflicts_discards_decisions() {
        let mut s = state(conflicted_section());
        s.choose(0, PairChoice::Both).unwrap();
        s.set_included(2, false).unwrap();
        s.resolve_contours().unwrap();

        s.check_conflicts().unwrap();
        assert_eq!(s.choices(), &[PairChoice::Pending]);
        assert!(s.is_included(2));
        assert!(s.contours().is_pending());
    }

    #[test]
    fn overlaps_pass_through_when_not_reported() {
        let config = MergeConfig {
            include_overlaps: false,
            ..MergeConfig::default()
        };
        let section = Section::new("series.9", 9).with_contours(vec![
            square("cell1", 0.0, 10.0),
            square("cell1", 0.0, 10.0),
            square("cell2", 100.0, 1.0),
        ]);
        let mut s = SectionMergeState::new(section, &config).unwrap();
        assert_eq!(s.categories().unique, vec![2]);
        assert_eq!(s.pending_count(), 0);

        let out: Vec<&str> = s
            .resolve_contours()
            .unwrap()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(out, vec!["cell1", "cell1", "cell2"]);

        s.set_included(2, false).unwrap();
        assert_eq!(xs(s.resolve_contours().unwrap()), vec![0.0, 0.0]);
    }

    #[test]
    fn unsupported_comparison_fails_construction() {
        let elevated = |x: f64| {
            Contour::new(
                "cell1",
                Shape::polygon_with_elevation([
                    (x, 0.0, 1.0),
                    (x + 10.0, 0.0, 1.0),
                    (x + 10.0, 10.0, 1.0),
                    (x, 10.0, 1.0),
                ])
                .unwrap(),
            )
        };
        let section = Section::new("series.3", 3).with_contours(vec![elevated(0.0), elevated(5.0)]);
        let err = SectionMergeState::new(section.clone(), &MergeConfig::default()).unwrap_err();
        assert!(err.to_string().contains("series.3"));

        let lenient = MergeConfig {
            on_unsupported: crate::config::UnsupportedPolicy::SkipPair,
            ..MergeConfig::default()
        };
        let s = SectionMergeState::new(section, &lenient).unwrap();
        assert_eq!(s.categories().unique, vec![0, 1]);
    }
}
