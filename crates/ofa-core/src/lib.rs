//! Fusion and enrichment of monthly cell-site extracts.
//!
//! Data flows source loader → [`join`] → [`reconcile`] → [`project`] →
//! [`metrics`] (using [`thresholds`]) → [`history`], orchestrated by
//! [`pipeline::run_enrichment`].

pub mod collaborators;
pub mod frame;
pub mod history;
pub mod join;
pub mod metrics;
pub mod pipeline;
pub mod project;
pub mod reconcile;
pub mod thresholds;

pub use collaborators::{
    EnrichedSink, HistoricalStore, InMemoryHistory, InMemorySources, SourceLoader,
    StaticRegistry, ThresholdRegistry,
};
pub use frame::{ColumnLineage, ColumnOrigin, EnrichedDataset, FusedTable, SourceSet};
pub use history::{HistoryState, SegmentIndex, attach_previous_segment};
pub use join::fuse;
pub use metrics::{derive_metrics, pareto_flags, ratio};
pub use pipeline::{EnrichmentContext, run_enrichment};
pub use project::{OUTPUT_COLUMNS, OutputColumn, project, project_subset};
pub use reconcile::{RECONCILED_FIELDS, collapse, reconcile};
pub use thresholds::{ResolvedThreshold, ThresholdOrigin, ThresholdProvider};
