//! Enriched dataset store.
//!
//! Each run writes `<root>/<YYYY>/<MM>/<DD>/oneforall_<YYYY-MM-DD>.csv`,
//! replacing whatever an earlier run published for the same period. The
//! historical look-up reads the latest dataset of the reference month.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use ofa_core::{EnrichedDataset, EnrichedSink, HistoricalStore};
use ofa_model::{Period, Result};
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::IngestError;
use crate::layout;
use crate::loader::read_csv;

const FILE_PREFIX: &str = "oneforall";

#[derive(Debug, Clone)]
pub struct CsvDatasetStore {
    root: PathBuf,
}

impl CsvDatasetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the dataset of `period` is published.
    pub fn path_for(&self, period: Period) -> PathBuf {
        layout::day_dir(&self.root, period).join(format!("{FILE_PREFIX}_{period}.csv"))
    }
}

impl EnrichedSink for CsvDatasetStore {
    fn publish(&self, dataset: &EnrichedDataset) -> Result<()> {
        let path = self.path_for(dataset.period);
        let replaced = path.is_file();
        write_atomically(&path, &mut dataset.frame.clone())?;
        info!(
            period = %dataset.period,
            path = %path.display(),
            rows = dataset.height(),
            replaced,
            "enriched dataset published"
        );
        Ok(())
    }
}

impl HistoricalStore for CsvDatasetStore {
    fn load_enriched(&self, period: Period) -> Result<Option<DataFrame>> {
        let Some(path) = layout::latest_csv_in_month(&self.root, period)? else {
            return Ok(None);
        };
        let df = read_csv(&path, b',')?;
        debug!(
            reference = %period,
            path = %path.display(),
            rows = df.height(),
            "enriched history read"
        );
        Ok(Some(df))
    }
}

/// Writes a temporary file next to `path`, then renames it into place.
fn write_atomically(path: &Path, df: &mut DataFrame) -> std::result::Result<(), IngestError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| IngestError::Write {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("csv.tmp");
    let mut file = File::create(&temp_path).map_err(|e| IngestError::Write {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| IngestError::CsvWrite {
            path: temp_path.clone(),
            message: e.to_string(),
        })?;
    file.sync_all().map_err(|e| IngestError::Write {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| IngestError::Write {
        operation: "replace",
        path: path.to_path_buf(),
        source: e,
    })
}
