//! Merge engine for tracemerge.
//!
//! Detects duplicate and near-duplicate traces within each section of a
//! trace set, tracks how every conflict is resolved, and materializes the
//! resolved trace set for the output serializer.
//!
//! # Key Types
//!
//! - [`Categorizer`] — Splits a section's contours into unique contours,
//!   exact-duplicate representatives, and potential-duplicate pairs
//! - [`SectionMergeState`] — Resolution state of one section
//! - [`SeriesMergeState`] — Resolution state of the series-level fields
//! - [`MergeSession`] — All states of one source series; writes the result
//! - [`MergeConfig`] — Threshold and policy knobs, loadable from TOML

pub mod categorize;
pub mod config;
pub mod error;
pub mod quick;
pub mod resolution;
pub mod section;
pub mod series;
pub mod session;

pub use categorize::{categorize, Categorizer, ConflictPair, ContourCategories};
pub use config::{MergeConfig, UnsupportedPolicy};
pub use error::{MergeError, MergeResult};
pub use quick::QuickMerge;
pub use resolution::{Resolution, ResolutionStatus};
pub use section::{PairChoice, SectionMergeState, SECTION_FIELDS};
pub use series::SeriesMergeState;
pub use session::MergeSession;
