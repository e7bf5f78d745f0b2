//! Pipeline configuration.
//!
//! Everything the engine needs to know about its inputs and business rules
//! lives here: where each extract is found and how it is keyed, the local
//! threshold defaults and the classification constants. The configuration is
//! loaded from TOML and validated before any data is read.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OfaError, Result};
use crate::period::Period;
use crate::source::{Cadence, InventoryRole, SourceKind};
use crate::thresholds::ThresholdCode;

/// Top-level configuration of an enrichment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// First reporting period; it has no previous cycle to look back to.
    pub start_period: Period,
    pub inventory_keys: InventoryKeys,
    /// Declared extracts, keyed by source.
    pub sources: BTreeMap<SourceKind, SourceConfig>,
    /// Local threshold defaults (percentages, comma or dot decimals).
    pub thresholds: BTreeMap<String, String>,
    pub rules: Rules,
    pub history: HistoryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let sources = SourceKind::ALL
            .into_iter()
            .map(|kind| (kind, SourceConfig::for_kind(kind)))
            .collect();
        let thresholds = [
            (ThresholdCode::Intercos, "12"),
            (ThresholdCode::ImpotTaxe, "2"),
            (ThresholdCode::FraisDistribution, "5"),
            (ThresholdCode::SeuilRentabilite, "10"),
        ]
        .into_iter()
        .map(|(code, value)| (code.code().to_string(), value.to_string()))
        .collect();
        Self {
            start_period: default_start_period(),
            inventory_keys: InventoryKeys::default(),
            sources,
            thresholds,
            rules: Rules::default(),
            history: HistoryConfig::default(),
        }
    }
}

fn default_start_period() -> Period {
    Period::from_ymd(2023, 1, 6).unwrap_or(Period::new(chrono::NaiveDate::MIN))
}

impl PipelineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| OfaError::configuration(format!("invalid pipeline config: {e}")))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| OfaError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Looks up a declared source.
    pub fn source(&self, kind: SourceKind) -> Result<&SourceConfig> {
        self.sources.get(&kind).ok_or_else(|| {
            OfaError::configuration(format!("source '{kind}' is not declared in configuration"))
        })
    }

    /// Local default for a threshold code, if one is configured.
    pub fn threshold_default(&self, code: ThresholdCode) -> Option<&str> {
        self.thresholds.get(code.code()).map(String::as_str)
    }

    /// Checks the configuration is complete and coherent.
    ///
    /// Runs before any I/O: a run with an undeclared source or a join key
    /// list of the wrong length never touches the data.
    pub fn validate(&self) -> Result<()> {
        for kind in SourceKind::ALL {
            let source = self.source(kind)?;
            if source.location.trim().is_empty() {
                return Err(OfaError::configuration(format!(
                    "source '{kind}' has an empty location"
                )));
            }
            let expected = kind.left_roles().len();
            if source.join_keys.len() != expected {
                return Err(OfaError::configuration(format!(
                    "source '{kind}' declares {} join key(s), expected {expected}",
                    source.join_keys.len()
                )));
            }
            if source.join_keys.iter().any(|key| key.trim().is_empty()) {
                return Err(OfaError::configuration(format!(
                    "source '{kind}' declares a blank join key"
                )));
            }
        }
        for role in [
            InventoryRole::SiteId,
            InventoryRole::SiteCode,
            InventoryRole::AlternateId,
            InventoryRole::Period,
        ] {
            if self.inventory_keys.column(role).trim().is_empty() {
                return Err(OfaError::configuration(format!(
                    "inventory key '{}' is blank",
                    role.as_str()
                )));
            }
        }
        self.rules.validate()?;
        if self.history.lookback_weeks == 0 {
            return Err(OfaError::configuration(
                "history.lookback_weeks must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Column names of the inventory identity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryKeys {
    pub site_id: String,
    pub site_code: String,
    pub alternate_id: String,
    pub period: String,
}

impl Default for InventoryKeys {
    fn default() -> Self {
        Self {
            site_id: "code oci id".to_string(),
            site_code: "code oci".to_string(),
            alternate_id: "autre code".to_string(),
            period: "mois".to_string(),
        }
    }
}

impl InventoryKeys {
    pub fn column(&self, role: InventoryRole) -> &str {
        match role {
            InventoryRole::SiteId => &self.site_id,
            InventoryRole::SiteCode => &self.site_code,
            InventoryRole::AlternateId => &self.alternate_id,
            InventoryRole::Period => &self.period,
        }
    }
}

/// Where an extract lives and how it is keyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Table name, used in log and error messages.
    pub name: String,
    /// Folder holding the cleaned extracts.
    pub location: String,
    /// Right-hand key columns, in the order of the source's left roles.
    #[serde(default)]
    pub join_keys: Vec<String>,
    #[serde(default)]
    pub cadence: Cadence,
}

impl SourceConfig {
    /// Production defaults for a source.
    pub fn for_kind(kind: SourceKind) -> Self {
        Self {
            name: kind.default_table_name().to_string(),
            location: kind.default_location().to_string(),
            join_keys: kind
                .default_join_keys()
                .iter()
                .map(|key| (*key).to_string())
                .collect(),
            cadence: kind.default_cadence(),
        }
    }
}

/// Revenue cut-offs of one geography.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueTiers {
    /// Revenue at or above which a site is PREMIUM.
    pub premium: f64,
    /// Revenue at or above which a site is NORMAL.
    pub normal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentRules {
    pub capital: RevenueTiers,
    pub interior: RevenueTiers,
    /// Lowercase `localisation` values meaning the capital.
    pub capital_aliases: Vec<String>,
    /// Lowercase `localisation` values meaning the interior.
    pub interior_aliases: Vec<String>,
}

impl Default for SegmentRules {
    fn default() -> Self {
        Self {
            capital: RevenueTiers {
                premium: 20_000_000.0,
                normal: 10_000_000.0,
            },
            interior: RevenueTiers {
                premium: 10_000_000.0,
                normal: 4_000_000.0,
            },
            capital_aliases: vec!["abidjan".to_string()],
            interior_aliases: vec![
                "intérieur".to_string(),
                "interieur".to_string(),
                "interior".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfitabilityRules {
    pub arpu_threshold: f64,
    pub congestion_4g_threshold: f64,
}

impl Default for ProfitabilityRules {
    fn default() -> Self {
        Self {
            arpu_threshold: 3000.0,
            congestion_4g_threshold: 0.15,
        }
    }
}

/// Business constants of the derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub segment: SegmentRules,
    pub profitability: ProfitabilityRules,
    /// Total congestion rate at or below which monitoring is commercial.
    pub recommendation_threshold: f64,
    /// Share of total revenue covered by Pareto sites.
    pub pareto_share: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            segment: SegmentRules::default(),
            profitability: ProfitabilityRules::default(),
            recommendation_threshold: 0.5,
            pareto_share: 0.8,
        }
    }
}

impl Rules {
    fn validate(&self) -> Result<()> {
        if !(self.pareto_share > 0.0 && self.pareto_share <= 1.0) {
            return Err(OfaError::configuration(format!(
                "rules.pareto_share must be in (0, 1], got {}",
                self.pareto_share
            )));
        }
        for (name, tiers) in [
            ("capital", self.segment.capital),
            ("interior", self.segment.interior),
        ] {
            if tiers.normal > tiers.premium {
                return Err(OfaError::configuration(format!(
                    "rules.segment.{name}: normal tier {} exceeds premium tier {}",
                    tiers.normal, tiers.premium
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Distance to the cycle whose segments are carried over.
    pub lookback_weeks: u32,
    /// Fail the run when the reference dataset is missing.
    pub require_reference: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            lookback_weeks: 4,
            require_reference: false,
        }
    }
}
