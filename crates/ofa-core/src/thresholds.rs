//! Threshold resolution with local fallback.

use std::collections::BTreeMap;

use ofa_common::parse_decimal;
use ofa_model::{OfaError, Result, ThresholdCode, ThresholdSet};
use tracing::{debug, warn};

use crate::collaborators::ThresholdRegistry;

/// Where a resolved threshold came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdOrigin {
    Registry,
    LocalDefault,
}

/// A resolved threshold, as a percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedThreshold {
    pub code: ThresholdCode,
    pub percent: f64,
    pub origin: ThresholdOrigin,
}

/// Resolves threshold codes against a registry, falling back to local defaults.
pub struct ThresholdProvider<'a> {
    registry: &'a dyn ThresholdRegistry,
    defaults: &'a BTreeMap<String, String>,
}

impl<'a> ThresholdProvider<'a> {
    pub fn new(registry: &'a dyn ThresholdRegistry, defaults: &'a BTreeMap<String, String>) -> Self {
        Self { registry, defaults }
    }

    /// Resolves one code to its percentage value.
    ///
    /// Queries the registry once. Only a code the registry does not publish
    /// falls back to the local default; a failing registry fails the call.
    pub fn resolve(&self, code: ThresholdCode) -> Result<f64> {
        self.resolve_detailed(code).map(|resolved| resolved.percent)
    }

    pub fn resolve_detailed(&self, code: ThresholdCode) -> Result<ResolvedThreshold> {
        let published = self
            .registry
            .fetch_all()?
            .into_iter()
            .find(|entry| entry.code.trim() == code.code())
            .map(|entry| entry.value);
        if published.is_none() {
            warn!(code = %code, "threshold absent from registry, using local default");
        }

        let (raw, origin) = match published {
            Some(value) => (value, ThresholdOrigin::Registry),
            None => match self.defaults.get(code.code()) {
                Some(value) => (value.clone(), ThresholdOrigin::LocalDefault),
                None => {
                    return Err(OfaError::configuration(format!(
                        "threshold '{code}' is defined neither by the registry nor locally"
                    )));
                }
            },
        };

        let percent = parse_decimal(&raw).ok_or_else(|| {
            OfaError::configuration(format!("threshold '{code}' has non-numeric value '{raw}'"))
        })?;
        debug!(code = %code, percent, ?origin, "threshold resolved");
        Ok(ResolvedThreshold {
            code,
            percent,
            origin,
        })
    }

    /// Resolves the four P&L rates as fractions.
    pub fn resolve_all(&self) -> Result<ThresholdSet> {
        Ok(ThresholdSet::from_percentages(
            self.resolve(ThresholdCode::Intercos)?,
            self.resolve(ThresholdCode::ImpotTaxe)?,
            self.resolve(ThresholdCode::FraisDistribution)?,
            self.resolve(ThresholdCode::SeuilRentabilite)?,
        ))
    }
}
