//! Threshold codes and the rate set used by the P&L calculation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::OfaError;

/// Named percentage constants published by the threshold registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThresholdCode {
    /// Interconnection cost, as a share of voice revenue.
    #[serde(rename = "intercos")]
    Intercos,
    /// Tax, as a share of total revenue.
    #[serde(rename = "impot_taxe")]
    ImpotTaxe,
    /// Distribution fee, as a share of total revenue.
    #[serde(rename = "frais_distribution")]
    FraisDistribution,
    /// Margin above which a site is profitable.
    #[serde(rename = "seuil_rentabilite")]
    SeuilRentabilite,
}

impl ThresholdCode {
    pub const ALL: [ThresholdCode; 4] = [
        ThresholdCode::Intercos,
        ThresholdCode::ImpotTaxe,
        ThresholdCode::FraisDistribution,
        ThresholdCode::SeuilRentabilite,
    ];

    pub fn code(self) -> &'static str {
        match self {
            ThresholdCode::Intercos => "intercos",
            ThresholdCode::ImpotTaxe => "impot_taxe",
            ThresholdCode::FraisDistribution => "frais_distribution",
            ThresholdCode::SeuilRentabilite => "seuil_rentabilite",
        }
    }
}

impl fmt::Display for ThresholdCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ThresholdCode {
    type Err = OfaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        ThresholdCode::ALL
            .into_iter()
            .find(|candidate| candidate.code() == code)
            .ok_or_else(|| OfaError::configuration(format!("unknown threshold code '{s}'")))
    }
}

/// One `{code, value}` record as served by a threshold registry.
///
/// Registries publish the value as text with a comma decimal separator
/// (`"2,5"`), but plain JSON numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub code: String,
    #[serde(deserialize_with = "text_or_number")]
    pub value: String,
}

impl ThresholdEntry {
    pub fn new(code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
        }
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Resolved rates, stored as fractions (a registry value of `18` is `0.18`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub intercos: f64,
    pub impot: f64,
    pub frais_distribution: f64,
    pub seuil_rentabilite: f64,
}

impl ThresholdSet {
    /// Builds a set from percentage values.
    pub fn from_percentages(
        intercos: f64,
        impot: f64,
        frais_distribution: f64,
        seuil_rentabilite: f64,
    ) -> Self {
        Self {
            intercos: intercos / 100.0,
            impot: impot / 100.0,
            frais_distribution: frais_distribution / 100.0,
            seuil_rentabilite: seuil_rentabilite / 100.0,
        }
    }

    pub fn get(&self, code: ThresholdCode) -> f64 {
        match code {
            ThresholdCode::Intercos => self.intercos,
            ThresholdCode::ImpotTaxe => self.impot,
            ThresholdCode::FraisDistribution => self.frais_distribution,
            ThresholdCode::SeuilRentabilite => self.seuil_rentabilite,
        }
    }
}
