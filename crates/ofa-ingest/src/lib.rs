//! Concrete collaborators of the enrichment pipeline.
//!
//! - [`CsvSourceLoader`] reads cleaned extracts from a date-partitioned tree
//! - [`CsvDatasetStore`] publishes enriched datasets and serves them back as history
//! - [`JsonFileRegistry`] and [`HttpRegistry`] supply threshold constants

pub mod error;
pub mod layout;
pub mod loader;
pub mod registry;
pub mod store;

pub use error::{IngestError, Result};
pub use loader::{CsvSourceLoader, read_csv};
pub use registry::{HttpRegistry, JsonFileRegistry};
pub use store::CsvDatasetStore;
