use std::path::{Path, PathBuf};

use tracemerge_types::Series;

use crate::error::StoreResult;

/// Decodes a trace-set document into the in-memory entity graph.
///
/// Readers must not deduplicate anything: raw, possibly duplicated contour
/// lists are the expected input to categorization.
pub trait SeriesReader {
    fn read_series(&self, path: &Path) -> StoreResult<Series>;
}

/// Encodes a fully materialized series (sections attached) to durable
/// storage.
///
/// Implementations own the on-disk format. A failed write must not leave a
/// partial document behind.
pub trait SeriesWriter {
    /// Write `series` under `output_dir` and return the location written.
    fn write_series(&self, series: &Series, output_dir: &Path) -> StoreResult<PathBuf>;
}
