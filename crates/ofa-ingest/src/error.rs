//! Error types for the filesystem and HTTP collaborators.

use std::path::PathBuf;

use ofa_model::OfaError;
use thiserror::Error;

/// Errors raised while reading extracts, storing datasets or querying a registry.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create, write or replace a file.
    #[error("failed to {operation} {path}: {source}")]
    Write {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Errors ===
    /// Polars could not parse an extract.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Polars could not serialize a dataset.
    #[error("failed to write CSV {path}: {message}")]
    CsvWrite { path: PathBuf, message: String },

    // === Registry Errors ===
    /// The registry document is not a list of `{code, value}` entries.
    #[error("invalid threshold registry {origin}: {message}")]
    RegistryFormat { origin: String, message: String },

    /// The registry answered with a non-success status.
    #[error("threshold registry {url} answered HTTP {status}")]
    RegistryStatus { url: String, status: u16 },

    /// Network failure talking to the registry.
    #[error("threshold registry request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl From<IngestError> for OfaError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::DirectoryRead { path, source }
            | IngestError::FileRead { path, source }
            | IngestError::Write { path, source, .. } => OfaError::io(path, source),
            IngestError::CsvParse { .. } | IngestError::CsvWrite { .. } => {
                OfaError::schema(err.to_string())
            }
            IngestError::RegistryFormat { .. }
            | IngestError::RegistryStatus { .. }
            | IngestError::Network(_) => OfaError::configuration(err.to_string()),
        }
    }
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;
