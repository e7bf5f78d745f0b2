//! CSV extract loader.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ofa_core::SourceLoader;
use ofa_model::{Cadence, OfaError, Period, Result, SourceConfig, SourceKind};
use polars::prelude::*;
use tracing::debug;

use crate::error::IngestError;
use crate::layout;

/// Rows sampled for schema inference.
const INFER_SCHEMA_ROWS: usize = 100;

/// Reads the cleaned extracts of a period from a date-partitioned tree.
#[derive(Debug, Clone)]
pub struct CsvSourceLoader {
    root: PathBuf,
    separator: u8,
}

impl CsvSourceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            separator: b',',
        }
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The period whose partition holds the source's extract.
    ///
    /// Quarterly extracts are published in the first month of the quarter.
    pub fn extract_period(source: &SourceConfig, period: Period) -> Period {
        match source.cadence {
            Cadence::Monthly => period,
            Cadence::Quarterly => period.quarter_start(),
        }
    }

    /// Path of the extract that would be loaded, if one exists.
    pub fn locate(&self, source: &SourceConfig, period: Period) -> Result<Option<PathBuf>> {
        let dir = layout::extract_dir(
            &self.root,
            &source.location,
            Self::extract_period(source, period),
        );
        Ok(layout::latest_csv(&dir)?)
    }
}

impl SourceLoader for CsvSourceLoader {
    fn load(&self, kind: SourceKind, source: &SourceConfig, period: Period) -> Result<DataFrame> {
        let extract_period = Self::extract_period(source, period);
        let Some(path) = self.locate(source, period)? else {
            return Err(OfaError::unavailable(
                &source.name,
                extract_period,
                format!(
                    "no extract under {}",
                    layout::extract_dir(&self.root, &source.location, extract_period).display()
                ),
            ));
        };

        let start = Instant::now();
        let df = read_csv(&path, self.separator)?;
        debug!(
            source = %kind,
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            duration_ms = start.elapsed().as_millis(),
            "extract read"
        );
        Ok(df)
    }
}

/// Reads a CSV file with a header row.
pub fn read_csv(path: &Path, separator: u8) -> std::result::Result<DataFrame, IngestError> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_parse_options(CsvParseOptions::default().with_separator(separator))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
