//! Trace-set document boundary for tracemerge.
//!
//! The merge core consumes a decoded [`Series`](tracemerge_types::Series)
//! and hands a fully materialized one back for encoding. This crate defines
//! that boundary and ships two backends.
//!
//! # Backends
//!
//! All backends implement [`SeriesReader`] and [`SeriesWriter`]:
//!
//! - [`JsonSeriesStore`] -- one JSON document per series, atomic replace
//! - [`InMemorySeriesStore`] -- `HashMap`-based store for tests and embedding

pub mod error;
pub mod json;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use json::{JsonSeriesStore, DOCUMENT_EXTENSION};
pub use memory::InMemorySeriesStore;
pub use traits::{SeriesReader, SeriesWriter};
