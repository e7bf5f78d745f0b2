use std::collections::BTreeMap;

use ofa_model::{OfaError, Period, Result, SourceKind};
use polars::prelude::DataFrame;

/// The eight extracts of one reporting period.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    frames: BTreeMap<SourceKind, DataFrame>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: SourceKind, frame: DataFrame) {
        self.frames.insert(kind, frame);
    }

    pub fn with(mut self, kind: SourceKind, frame: DataFrame) -> Self {
        self.insert(kind, frame);
        self
    }

    pub fn get(&self, kind: SourceKind) -> Result<&DataFrame> {
        self.frames
            .get(&kind)
            .ok_or_else(|| OfaError::configuration(format!("source '{kind}' was not loaded")))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Where a physical column of the fused table came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOrigin {
    /// Column name in the fused table.
    pub physical: String,
    pub source: SourceKind,
    /// Column name in the source extract.
    pub label: String,
}

/// Physical columns of the fused table in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLineage {
    origins: Vec<ColumnOrigin>,
}

impl ColumnLineage {
    pub fn push(&mut self, physical: impl Into<String>, source: SourceKind, label: impl Into<String>) {
        self.origins.push(ColumnOrigin {
            physical: physical.into(),
            source,
            label: label.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnOrigin> {
        self.origins.iter()
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn contains_physical(&self, physical: &str) -> bool {
        self.origins.iter().any(|origin| origin.physical == physical)
    }

    /// Physical name of the column `label` contributed by `source`.
    pub fn physical_of(&self, source: SourceKind, label: &str) -> Option<&str> {
        self.origins
            .iter()
            .find(|origin| origin.source == source && origin.label == label)
            .map(|origin| origin.physical.as_str())
    }

    /// Physical name of the first column carrying `label`, whatever its source.
    pub fn first_with_label(&self, label: &str) -> Option<&str> {
        self.origins
            .iter()
            .find(|origin| origin.label == label)
            .map(|origin| origin.physical.as_str())
    }
}

/// Output of the join engine: one wide row per inventory row.
#[derive(Debug, Clone)]
pub struct FusedTable {
    pub frame: DataFrame,
    pub lineage: ColumnLineage,
}

impl FusedTable {
    pub fn height(&self) -> usize {
        self.frame.height()
    }
}

/// Final output of a run, handed to the persistence collaborator.
#[derive(Debug, Clone)]
pub struct EnrichedDataset {
    pub period: Period,
    pub frame: DataFrame,
}

impl EnrichedDataset {
    pub fn new(period: Period, frame: DataFrame) -> Self {
        Self { period, frame }
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lineage_lookups() {
        let mut lineage = ColumnLineage::default();
        lineage.push("o&m", SourceKind::TowerOperatorCost, "o&m");
        lineage.push("o&m_co-location-cost", SourceKind::CoLocationCost, "o&m");

        assert_eq!(
            lineage.physical_of(SourceKind::CoLocationCost, "o&m"),
            Some("o&m_co-location-cost")
        );
        assert_eq!(lineage.first_with_label("o&m"), Some("o&m"));
        assert_eq!(lineage.physical_of(SourceKind::Revenue, "o&m"), None);
        assert!(lineage.contains_physical("o&m_co-location-cost"));
    }

    #[test]
    fn missing_source_in_set_is_reported() {
        let set = SourceSet::new();
        assert!(set.get(SourceKind::Congestion).is_err());
        assert!(set.is_empty());
    }
}
