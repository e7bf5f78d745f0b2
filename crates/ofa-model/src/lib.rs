//! Domain model for the oneforall fusion and enrichment engine.
//!
//! - **period**: reporting periods and the calendar arithmetic on them
//! - **source**: the eight extracts fused for a period
//! - **config**: pipeline configuration (sources, keys, thresholds, business rules)
//! - **thresholds**: threshold codes and the resolved rate set
//! - **labels**: classification labels written to the enriched dataset
//! - **error**: the error taxonomy shared by every crate

pub mod config;
pub mod error;
pub mod labels;
pub mod period;
pub mod source;
pub mod thresholds;

pub use config::{
    HistoryConfig, InventoryKeys, PipelineConfig, ProfitabilityRules, RevenueTiers, Rules,
    SegmentRules, SourceConfig,
};
pub use error::{OfaError, Result};
pub use labels::{CommercialSegment, ProfitabilityLevel, ProfitabilitySegment, Recommendation};
pub use period::Period;
pub use source::{Cadence, InventoryRole, SourceKind};
pub use thresholds::{ThresholdCode, ThresholdEntry, ThresholdSet};
