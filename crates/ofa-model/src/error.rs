//! Error taxonomy for the enrichment engine.
//!
//! Structural failures (configuration, schema, missing data) abort a run and
//! are handed to the caller unmodified. Undefined arithmetic is not an error:
//! ratios with a zero denominator become `NaN` in the derived column.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fusing and enriching a reporting period.
#[derive(Debug, Error)]
pub enum OfaError {
    /// A source, threshold or config entry is missing or malformed.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// A declared source or historical dataset is absent for the period.
    #[error("data unavailable: {source_name} for period {period}: {reason}")]
    DataUnavailable {
        source_name: String,
        period: String,
        reason: String,
    },

    /// A join, reconciliation or projection references an absent column.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// A period string that is not `YYYY-MM-DD`.
    #[error("invalid period '{value}': expected YYYY-MM-DD")]
    InvalidPeriod { value: String },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataframe operation failed: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl OfaError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn unavailable(
        source_name: impl Into<String>,
        period: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::DataUnavailable {
            source_name: source_name.into(),
            period: period.to_string(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for errors caused by the inputs rather than the environment.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::DataUnavailable { .. }
                | Self::Schema { .. }
                | Self::InvalidPeriod { .. }
        )
    }
}

/// Result type for enrichment operations.
pub type Result<T> = std::result::Result<T, OfaError>;
