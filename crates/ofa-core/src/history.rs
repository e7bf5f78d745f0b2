//! Historical segment resolver.
//!
//! Carries each site's commercial segment over from the dataset produced one
//! cycle earlier into the `previous_segment` column.

use std::collections::HashMap;

use ofa_common::any_to_key;
use ofa_model::{HistoryConfig, OfaError, Period, Result};
use polars::prelude::*;
use tracing::{info, warn};

use crate::collaborators::HistoricalStore;

pub const SITE_COLUMN: &str = "code_oci";
pub const SEGMENT_COLUMN: &str = "segment";
pub const PREVIOUS_SEGMENT_COLUMN: &str = "previous_segment";

/// Whether a period has a previous cycle to look back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    /// The configured start period (or earlier): nothing to carry over.
    FirstRun,
    SteadyState { reference: Period },
}

impl HistoryState {
    pub fn for_period(period: Period, start: Period, lookback_weeks: u32) -> Self {
        if period <= start {
            HistoryState::FirstRun
        } else {
            HistoryState::SteadyState {
                reference: period.weeks_before(lookback_weeks),
            }
        }
    }
}

/// Site code to segment, built once from a reference dataset.
#[derive(Debug, Clone, Default)]
pub struct SegmentIndex {
    segments: HashMap<String, Option<String>>,
}

impl SegmentIndex {
    /// Indexes a reference dataset; the first row of a site wins.
    pub fn from_frame(reference: &DataFrame) -> Result<Self> {
        let sites = reference.column(SITE_COLUMN).map_err(|_| {
            OfaError::schema(format!("reference dataset has no '{SITE_COLUMN}' column"))
        })?;
        let segments = reference.column(SEGMENT_COLUMN).map_err(|_| {
            OfaError::schema(format!("reference dataset has no '{SEGMENT_COLUMN}' column"))
        })?;

        let mut index = HashMap::with_capacity(reference.height());
        for row in 0..reference.height() {
            let Some(site) = any_to_key(sites.get(row)?) else {
                continue;
            };
            let segment = any_to_key(segments.get(row)?);
            index.entry(site).or_insert(segment);
        }
        Ok(Self { segments: index })
    }

    pub fn get(&self, site: &str) -> Option<&str> {
        self.segments.get(site).and_then(|segment| segment.as_deref())
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Adds `previous_segment` to the enriched table.
pub fn attach_previous_segment(
    enriched: DataFrame,
    period: Period,
    start: Period,
    config: &HistoryConfig,
    store: &dyn HistoricalStore,
) -> Result<DataFrame> {
    let state = HistoryState::for_period(period, start, config.lookback_weeks);
    let previous = match state {
        HistoryState::FirstRun => {
            info!(period = %period, "first reporting period, no previous segment");
            vec![None; enriched.height()]
        }
        HistoryState::SteadyState { reference } => match store.load_enriched(reference)? {
            Some(frame) => {
                let index = SegmentIndex::from_frame(&frame)?;
                let previous = lookup(&enriched, &index)?;
                info!(
                    period = %period,
                    reference = %reference,
                    reference_sites = index.len(),
                    matched = previous.iter().filter(|s| s.is_some()).count(),
                    "previous segments attached"
                );
                previous
            }
            None if config.require_reference => {
                return Err(OfaError::unavailable(
                    "enriched history",
                    reference,
                    "no enriched dataset for the reference cycle",
                ));
            }
            None => {
                warn!(
                    period = %period,
                    reference = %reference,
                    "no enriched dataset for the reference cycle, previous segment left empty"
                );
                vec![None; enriched.height()]
            }
        },
    };

    let mut enriched = enriched;
    enriched.with_column(Column::new(PREVIOUS_SEGMENT_COLUMN.into(), previous))?;
    Ok(enriched)
}

fn lookup(enriched: &DataFrame, index: &SegmentIndex) -> Result<Vec<Option<String>>> {
    let sites = enriched.column(SITE_COLUMN).map_err(|_| {
        OfaError::schema(format!("enriched dataset has no '{SITE_COLUMN}' column"))
    })?;
    let mut previous = Vec::with_capacity(enriched.height());
    for row in 0..enriched.height() {
        let segment = any_to_key(sites.get(row)?)
            .and_then(|site| index.get(&site).map(str::to_string));
        previous.push(segment);
    }
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::InMemoryHistory;

    fn period(value: &str) -> Period {
        Period::parse(value).unwrap()
    }

    fn current() -> DataFrame {
        df! { "code_oci" => ["OCI1", "OCI2", "OCI3"] }.unwrap()
    }

    fn previous_segments(df: &DataFrame) -> Vec<Option<String>> {
        df.column(PREVIOUS_SEGMENT_COLUMN)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn state_machine() {
        let start = period("2023-01-06");
        assert_eq!(
            HistoryState::for_period(start, start, 4),
            HistoryState::FirstRun
        );
        assert_eq!(
            HistoryState::for_period(period("2023-03-06"), start, 4),
            HistoryState::SteadyState {
                reference: period("2023-02-06")
            }
        );
    }

    #[test]
    fn first_run_leaves_everything_empty() {
        let store = InMemoryHistory::new().with(
            period("2022-12-09"),
            df! { "code_oci" => ["OCI1"], "segment" => ["PREMIUM"] }.unwrap(),
        );
        let out = attach_previous_segment(
            current(),
            period("2023-01-06"),
            period("2023-01-06"),
            &HistoryConfig::default(),
            &store,
        )
        .unwrap();
        assert_eq!(previous_segments(&out), [None, None, None]);
    }

    #[test]
    fn steady_state_copies_reference_segment() {
        let reference = df! {
            "code_oci" => ["OCI2", "OCI1", "OCI1"],
            "segment" => [Some("NORMAL"), Some("PREMIUM"), Some("A DEVELOPER")],
        }
        .unwrap();
        let store = InMemoryHistory::new().with(period("2023-02-06"), reference);
        let out = attach_previous_segment(
            current(),
            period("2023-03-06"),
            period("2023-01-06"),
            &HistoryConfig::default(),
            &store,
        )
        .unwrap();
        assert_eq!(
            previous_segments(&out),
            [Some("PREMIUM".to_string()), Some("NORMAL".to_string()), None]
        );
    }

    #[test]
    fn absent_reference_is_tolerated_unless_required() {
        let store = InMemoryHistory::new();
        let out = attach_previous_segment(
            current(),
            period("2023-03-06"),
            period("2023-01-06"),
            &HistoryConfig::default(),
            &store,
        )
        .unwrap();
        assert_eq!(previous_segments(&out), [None, None, None]);

        let strict = HistoryConfig {
            require_reference: true,
            ..HistoryConfig::default()
        };
        let err = attach_previous_segment(
            current(),
            period("2023-03-06"),
            period("2023-01-06"),
            &strict,
            &store,
        )
        .unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"data unavailable: enriched history for period 2023-02-06: no enriched dataset for the reference cycle"
        );
    }

    #[test]
    fn malformed_reference_is_schema_error() {
        let store = InMemoryHistory::new().with(
            period("2023-02-06"),
            df! { "code_oci" => ["OCI1"] }.unwrap(),
        );
        let err = attach_previous_segment(
            current(),
            period("2023-03-06"),
            period("2023-01-06"),
            &HistoryConfig::default(),
            &store,
        )
        .unwrap_err();
        assert!(matches!(err, OfaError::Schema { .. }));
    }

    #[test]
    fn index_matches_numeric_codes() {
        let reference = df! {
            "code_oci" => [1203i64],
            "segment" => ["NORMAL"],
        }
        .unwrap();
        let index = SegmentIndex::from_frame(&reference).unwrap();
        assert_eq!(index.get("1203"), Some("NORMAL"));
    }
}
