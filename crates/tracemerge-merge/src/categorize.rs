//! Per-section duplicate detection.
//!
//! Partitions a section's contours into unique contours, exact-duplicate
//! representatives, and potential-duplicate pairs. Everything is reported as
//! indices into the input slice, so two structurally equal contours remain
//! distinct entries.

use std::collections::HashSet;

use tracemerge_geometry::{
    is_contacting, is_exact_duplicate, is_potential_duplicate, GeometryResult,
};
use tracemerge_types::Contour;

use crate::config::{MergeConfig, UnsupportedPolicy};

/// Two contours of the same name and shape type that overlap without being
/// exact duplicates. Member order is discovery order and carries no meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConflictPair {
    pub first: usize,
    pub second: usize,
}

impl ConflictPair {
    pub fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.first == index || self.second == index
    }
}

/// Result of categorizing one section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContourCategories {
    /// Contours not involved in any overlap.
    pub unique: Vec<usize>,
    /// One kept representative per group of exact duplicates.
    pub exact_duplicates: Vec<usize>,
    /// Overlapping pairs that need an explicit choice.
    pub potential_pairs: Vec<ConflictPair>,
}

impl ContourCategories {
    /// Returns `true` if nothing needs a manual decision.
    pub fn is_clean(&self) -> bool {
        self.potential_pairs.is_empty()
    }

    /// Indices that go to the output without a choice.
    pub fn candidates(&self) -> impl Iterator<Item = usize> + '_ {
        self.exact_duplicates.iter().chain(&self.unique).copied()
    }

    pub fn is_candidate(&self, index: usize) -> bool {
        self.unique.contains(&index) || self.exact_duplicates.contains(&index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PairClass {
    Exact,
    Potential,
}

/// Pairwise duplicate detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Categorizer {
    pub threshold: f64,
    pub include_overlaps: bool,
    pub on_unsupported: UnsupportedPolicy,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::from_config(&MergeConfig::default())
    }
}

impl Categorizer {
    pub fn from_config(config: &MergeConfig) -> Self {
        Self {
            threshold: config.threshold,
            include_overlaps: config.include_overlaps,
            on_unsupported: config.on_unsupported,
        }
    }

    /// Categorize `contours`.
    ///
    /// Every ordered pair `(a, b)` with equal name and shape type is tested
    /// once. An exact match consumes both contours and keeps `a` as the
    /// representative unless either side already belongs to an exact group;
    /// a potential match consumes
    /// both and records the pair (its mirror is then skipped). Pairs whose
    /// members are both representatives are dropped from the potential list.
    /// O(n²) in the section's contour count.
    pub fn categorize(&self, contours: &[Contour]) -> GeometryResult<ContourCategories> {
        let mut representatives: Vec<usize> = Vec::new();
        let mut rep_set: HashSet<usize> = HashSet::new();
        let mut consumed: HashSet<usize> = HashSet::new();
        let mut grouped: HashSet<usize> = HashSet::new();
        let mut potential: Vec<ConflictPair> = Vec::new();
        let mut seen_pairs: HashSet<(usize, usize)> = HashSet::new();

        for (i, a) in contours.iter().enumerate() {
            for (j, b) in contours.iter().enumerate() {
                if i == j || seen_pairs.contains(&(j, i)) {
                    continue;
                }
                if a.name != b.name || a.kind() != b.kind() {
                    continue;
                }

                let class = match self.classify(a, b) {
                    Ok(class) => class,
                    Err(err) => match self.on_unsupported {
                        UnsupportedPolicy::Abort => return Err(err),
                        UnsupportedPolicy::SkipPair => {
                            tracing::warn!(contour = %a.name, first = i, second = j, "skipping pair: {err}");
                            continue;
                        }
                    },
                };

                match class {
                    Some(PairClass::Exact) => {
                        consumed.insert(i);
                        consumed.insert(j);
                        if !grouped.contains(&i) && !grouped.contains(&j) {
                            rep_set.insert(i);
                            representatives.push(i);
                        }
                        grouped.insert(i);
                        grouped.insert(j);
                    }
                    Some(PairClass::Potential) => {
                        consumed.insert(i);
                        consumed.insert(j);
                        potential.push(ConflictPair::new(i, j));
                        seen_pairs.insert((i, j));
                    }
                    None => {}
                }
            }
        }

        let unique: Vec<usize> = (0..contours.len())
            .filter(|idx| !consumed.contains(idx))
            .collect();

        if !self.include_overlaps {
            return Ok(ContourCategories {
                unique,
                ..Default::default()
            });
        }

        potential.retain(|p| !(rep_set.contains(&p.first) && rep_set.contains(&p.second)));

        Ok(ContourCategories {
            unique,
            exact_duplicates: representatives,
            potential_pairs: potential,
        })
    }

    fn classify(&self, a: &Contour, b: &Contour) -> GeometryResult<Option<PairClass>> {
        if !is_contacting(&a.shape, &b.shape)? {
            return Ok(None);
        }
        if is_exact_duplicate(&a.shape, &b.shape, self.threshold)? {
            return Ok(Some(PairClass::Exact));
        }
        if is_potential_duplicate(&a.shape, &b.shape, self.threshold)? {
            return Ok(Some(PairClass::Potential));
        }
        Ok(None)
    }
}

/// Categorize, failing on the first unsupported comparison.
pub fn categorize(
    contours: &[Contour],
    threshold: f64,
    include_overlaps: bool,
) -> GeometryResult<ContourCategories> {
    Categorizer {
        threshold,
        include_overlaps,
        on_unsupported: UnsupportedPolicy::Abort,
    }
    .categorize(contours)
}
