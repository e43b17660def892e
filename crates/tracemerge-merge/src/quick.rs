//! Whole-state shortcuts for resolving without per-pair decisions.

use serde::{Deserialize, Serialize};

use crate::section::PairChoice;

/// Policy applied to every potential-duplicate pair of a state.
///
/// Unique contours and exact-duplicate representatives are always kept and
/// section attributes and images fall back to the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickMerge {
    /// Keep the first member of each pair.
    First,
    /// Keep the second member of each pair.
    Second,
    /// Keep both members of each pair.
    Both,
}

impl QuickMerge {
    pub fn pair_choice(self) -> PairChoice {
        match self {
            QuickMerge::First => PairChoice::First,
            QuickMerge::Second => PairChoice::Second,
            QuickMerge::Both => PairChoice::Both,
        }
    }
}

impl std::fmt::Display for QuickMerge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            QuickMerge::First => "first",
            QuickMerge::Second => "second",
            QuickMerge::Both => "both",
        };
        f.write_str(s)
    }
}
