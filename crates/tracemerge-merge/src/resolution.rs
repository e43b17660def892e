//! Resolution state for a single mergeable field.

use serde::{Deserialize, Serialize};

/// A field that is either awaiting a decision or resolved to a value.
///
/// `Resolved(Vec::new())` and `Pending` are distinct: an empty result is a
/// decision.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution<T> {
    Pending,
    Resolved(T),
}

impl<T> Default for Resolution<T> {
    fn default() -> Self {
        Resolution::Pending
    }
}

impl<T> Resolution<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn is_pending(&self) -> bool {
        !self.is_resolved()
    }

    /// The resolved value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Resolution::Resolved(v) => Some(v),
            Resolution::Pending => None,
        }
    }

    pub fn resolve(&mut self, value: T) {
        *self = Resolution::Resolved(value);
    }

    /// Return to `Pending`, dropping any resolved value.
    pub fn reset(&mut self) {
        *self = Resolution::Pending;
    }
}

impl<T: Clone> Resolution<T> {
    /// The resolved value, or a clone of `source` while pending.
    pub fn or_source(&self, source: &T) -> T {
        match self {
            Resolution::Resolved(v) => v.clone(),
            Resolution::Pending => source.clone(),
        }
    }
}

/// Coarse progress of a merge state, for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// Every gating field is resolved.
    Done,
    /// Some but not all gating fields are resolved.
    Partial,
    /// Nothing is resolved yet.
    Untouched,
}

impl ResolutionStatus {
    pub fn from_counts(done: usize, total: usize) -> Self {
        if done >= total {
            ResolutionStatus::Done
        } else if done > 0 {
            ResolutionStatus::Partial
        } else {
            ResolutionStatus::Untouched
        }
    }
}
