//! Interfaces to the systems around the engine.
//!
//! The engine never opens files, sockets or database connections itself.
//! Everything it reads or hands back goes through these traits, so a run is a
//! pure function of what the collaborators return.

use std::collections::BTreeMap;

use ofa_model::{OfaError, Period, Result, SourceConfig, SourceKind, ThresholdEntry};
use polars::prelude::DataFrame;

use crate::frame::EnrichedDataset;

/// Supplies the extract of one source for a period.
pub trait SourceLoader {
    /// Fails with [`OfaError::DataUnavailable`] when no extract exists.
    fn load(&self, kind: SourceKind, source: &SourceConfig, period: Period) -> Result<DataFrame>;
}

/// Read access to previously produced enriched datasets.
pub trait HistoricalStore {
    /// Returns `None` when nothing was produced for the period's cycle.
    fn load_enriched(&self, period: Period) -> Result<Option<DataFrame>>;
}

/// Receives the enriched dataset of a run.
///
/// Implementations replace whatever was stored for the dataset's period.
pub trait EnrichedSink {
    fn publish(&self, dataset: &EnrichedDataset) -> Result<()>;
}

/// External registry of threshold constants.
pub trait ThresholdRegistry {
    fn fetch_all(&self) -> Result<Vec<ThresholdEntry>>;
}

/// Registry with a fixed set of entries.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    entries: Vec<ThresholdEntry>,
}

impl StaticRegistry {
    pub fn new(entries: Vec<ThresholdEntry>) -> Self {
        Self { entries }
    }

    /// A registry without entries; every code resolves to its local default.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl ThresholdRegistry for StaticRegistry {
    fn fetch_all(&self) -> Result<Vec<ThresholdEntry>> {
        Ok(self.entries.clone())
    }
}

/// Sources held in memory, keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct InMemorySources {
    frames: BTreeMap<SourceKind, DataFrame>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: SourceKind, frame: DataFrame) -> Self {
        self.frames.insert(kind, frame);
        self
    }

    pub fn insert(&mut self, kind: SourceKind, frame: DataFrame) {
        self.frames.insert(kind, frame);
    }
}

impl SourceLoader for InMemorySources {
    fn load(&self, kind: SourceKind, source: &SourceConfig, period: Period) -> Result<DataFrame> {
        self.frames
            .get(&kind)
            .cloned()
            .ok_or_else(|| OfaError::unavailable(&source.name, period, "no extract loaded"))
    }
}

/// Enriched datasets held in memory, keyed by period.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    datasets: BTreeMap<Period, DataFrame>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, period: Period, frame: DataFrame) -> Self {
        self.datasets.insert(period, frame);
        self
    }
}

impl HistoricalStore for InMemoryHistory {
    fn load_enriched(&self, period: Period) -> Result<Option<DataFrame>> {
        Ok(self.datasets.get(&period).cloned())
    }
}
