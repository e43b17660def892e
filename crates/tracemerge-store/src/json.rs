//! JSON trace-set documents.
//!
//! One file per series: `<output_dir>/<series name>.json`, holding the
//! series-level fields and every section. Writes go through a temporary
//! file in the destination directory and are renamed into place.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracemerge_types::Series;

use crate::error::{StoreError, StoreResult};
use crate::traits::{SeriesReader, SeriesWriter};

/// File extension of series documents.
pub const DOCUMENT_EXTENSION: &str = "json";

/// Filesystem backend storing each series as a single JSON document.
#[derive(Clone, Debug, Default)]
pub struct JsonSeriesStore {
    pretty: bool,
}

impl JsonSeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit indented JSON.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Document path for a series name inside `dir`.
    pub fn document_path(dir: &Path, name: &str) -> StoreResult<PathBuf> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(dir.join(format!("{name}.{DOCUMENT_EXTENSION}")))
    }
}

impl SeriesReader for JsonSeriesStore {
    fn read_series(&self, path: &Path) -> StoreResult<Series> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        let series: Series = serde_json::from_reader(reader)?;
        tracing::debug!(
            series = %series.name,
            sections = series.sections.len(),
            "read series document {}",
            path.display()
        );
        Ok(series)
    }
}

impl SeriesWriter for JsonSeriesStore {
    fn write_series(&self, series: &Series, output_dir: &Path) -> StoreResult<PathBuf> {
        let path = Self::document_path(output_dir, &series.name)?;
        fs::create_dir_all(output_dir)?;

        let tmp = tempfile::NamedTempFile::new_in(output_dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            if self.pretty {
                serde_json::to_writer_pretty(&mut writer, series)?;
            } else {
                serde_json::to_writer(&mut writer, series)?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Persist {
            path: path.clone(),
            source: e.error,
        })?;

        tracing::info!(
            series = %series.name,
            sections = series.sections.len(),
            "wrote series document {}",
            path.display()
        );
        Ok(path)
    }
}
