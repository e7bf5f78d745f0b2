//! Threshold registries backed by a JSON document.
//!
//! Both registries serve an array of `{"code": ..., "value": ...}` entries,
//! read from a local file or fetched over HTTP.

use std::path::PathBuf;
use std::time::Duration;

use ofa_core::ThresholdRegistry;
use ofa_model::{Result, ThresholdEntry};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::error::IngestError;

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

fn parse_entries(origin: &str, body: &str) -> std::result::Result<Vec<ThresholdEntry>, IngestError> {
    serde_json::from_str(body).map_err(|e| IngestError::RegistryFormat {
        origin: origin.to_string(),
        message: e.to_string(),
    })
}

/// Registry read from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileRegistry {
    path: PathBuf,
}

impl JsonFileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ThresholdRegistry for JsonFileRegistry {
    fn fetch_all(&self) -> Result<Vec<ThresholdEntry>> {
        let body = std::fs::read_to_string(&self.path).map_err(|e| IngestError::FileRead {
            path: self.path.clone(),
            source: e,
        })?;
        let entries = parse_entries(&self.path.display().to_string(), &body)?;
        debug!(path = %self.path.display(), entries = entries.len(), "threshold registry read");
        Ok(entries)
    }
}

/// Registry served by an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: Client,
    url: String,
}

impl HttpRegistry {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(IngestError::Network)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ThresholdRegistry for HttpRegistry {
    fn fetch_all(&self) -> Result<Vec<ThresholdEntry>> {
        debug!(url = %self.url, "fetching threshold registry");
        let response = self
            .client
            .get(self.url.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .map_err(IngestError::Network)?;

        if !response.status().is_success() {
            return Err(IngestError::RegistryStatus {
                url: self.url.clone(),
                status: response.status().as_u16(),
            }
            .into());
        }

        let body = response.text().map_err(IngestError::Network)?;
        Ok(parse_entries(&self.url, &body)?)
    }
}
