use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracemerge_types::Series;

use crate::error::{StoreError, StoreResult};
use crate::json::JsonSeriesStore;
use crate::traits::{SeriesReader, SeriesWriter};

/// In-memory, HashMap-based series store.
///
/// Intended for tests and embedding. Documents are keyed by the path a
/// [`JsonSeriesStore`] would have used, and every write is also appended to
/// a log so repeated writes of the same series stay observable.
pub struct InMemorySeriesStore {
    documents: RwLock<HashMap<PathBuf, Series>>,
    log: RwLock<Vec<PathBuf>>,
}

impl InMemorySeriesStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            log: RwLock::new(Vec::new()),
        }
    }

    /// Seed a document at `path`.
    pub fn insert(&self, path: impl Into<PathBuf>, series: Series) {
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(path.into(), series);
    }

    /// Number of distinct documents held.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }

    /// Number of successful writes, including overwrites.
    pub fn write_count(&self) -> usize {
        self.log.read().expect("lock poisoned").len()
    }

    /// The most recently written series, if any.
    pub fn last_written(&self) -> Option<Series> {
        let path = self.log.read().expect("lock poisoned").last().cloned()?;
        self.documents
            .read()
            .expect("lock poisoned")
            .get(&path)
            .cloned()
    }
}

impl Default for InMemorySeriesStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesReader for InMemorySeriesStore {
    fn read_series(&self, path: &Path) -> StoreResult<Series> {
        self.documents
            .read()
            .expect("lock poisoned")
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
    }
}

impl SeriesWriter for InMemorySeriesStore {
    fn write_series(&self, series: &Series, output_dir: &Path) -> StoreResult<PathBuf> {
        let path = JsonSeriesStore::document_path(output_dir, &series.name)?;
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(path.clone(), series.clone());
        self.log.write().expect("lock poisoned").push(path.clone());
        Ok(path)
    }
}

impl std::fmt::Debug for InMemorySeriesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySeriesStore")
            .field("document_count", &self.len())
            .field("write_count", &self.write_count())
            .finish()
    }
}
