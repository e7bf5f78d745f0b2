//! Classification labels written to the enriched dataset.
//!
//! The label text is part of the public output schema and is matched by
//! downstream reporting, so it is kept verbatim (including the French).

use serde::{Deserialize, Serialize};

/// Commercial tier of a site from its geography and total revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommercialSegment {
    Premium,
    Normal,
    ToDevelop,
}

impl CommercialSegment {
    pub const ALL: [CommercialSegment; 3] = [
        CommercialSegment::Premium,
        CommercialSegment::Normal,
        CommercialSegment::ToDevelop,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CommercialSegment::Premium => "PREMIUM",
            CommercialSegment::Normal => "NORMAL",
            CommercialSegment::ToDevelop => "A DEVELOPER",
        }
    }
}

/// Monitoring focus derived from the total congestion rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Commercial,
    Technical,
}

impl Recommendation {
    pub fn label(self) -> &'static str {
        match self {
            Recommendation::Commercial => "Surveillance commerciale",
            Recommendation::Technical => "Surveillance technique",
        }
    }
}

/// ARPU crossed with 4G congestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfitabilitySegment {
    /// Low ARPU, low congestion.
    Seg1,
    /// High ARPU, low congestion.
    Seg2,
    /// High ARPU, high congestion.
    Seg3,
    /// Low ARPU, high congestion.
    Seg4,
    /// ARPU or congestion undefined.
    Unknown,
}

impl ProfitabilitySegment {
    pub fn classify(high_arpu: bool, congested: bool) -> Self {
        match (high_arpu, congested) {
            (false, false) => ProfitabilitySegment::Seg1,
            (true, false) => ProfitabilitySegment::Seg2,
            (true, true) => ProfitabilitySegment::Seg3,
            (false, true) => ProfitabilitySegment::Seg4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProfitabilitySegment::Seg1 => "Seg 1",
            ProfitabilitySegment::Seg2 => "Seg 2",
            ProfitabilitySegment::Seg3 => "Seg 3",
            ProfitabilitySegment::Seg4 => "Seg 4",
            ProfitabilitySegment::Unknown => "Unknown",
        }
    }
}

/// Margin band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfitabilityLevel {
    Negative,
    Unprofitable,
    Profitable,
}

impl ProfitabilityLevel {
    pub const ALL: [ProfitabilityLevel; 3] = [
        ProfitabilityLevel::Negative,
        ProfitabilityLevel::Unprofitable,
        ProfitabilityLevel::Profitable,
    ];

    /// Bands a margin against the profitability threshold.
    ///
    /// A threshold at or below zero makes the middle band empty.
    pub fn from_margin(margin: f64, threshold: f64) -> Self {
        if margin <= 0.0 {
            ProfitabilityLevel::Negative
        } else if margin >= threshold {
            ProfitabilityLevel::Profitable
        } else {
            ProfitabilityLevel::Unprofitable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProfitabilityLevel::Negative => "NEGATIF",
            ProfitabilityLevel::Unprofitable => "NON RENTABLE",
            ProfitabilityLevel::Profitable => "RENTABLE",
        }
    }
}
