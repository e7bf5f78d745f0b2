//! The eight monthly extracts fused into one record per site.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OfaError;

/// Logical name of a source extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Site inventory; the primary table every other source is joined onto.
    Inventory,
    /// Revenue and subscriber counts.
    Revenue,
    /// Quarterly tower-operator cost sheet.
    TowerOperatorCost,
    /// Co-location cost sheet.
    CoLocationCost,
    Congestion,
    TrafficV1,
    TrafficV2,
    /// Call-setup success rates.
    CallSuccess,
}

impl SourceKind {
    pub const ALL: [SourceKind; 8] = [
        SourceKind::Inventory,
        SourceKind::Revenue,
        SourceKind::TowerOperatorCost,
        SourceKind::CoLocationCost,
        SourceKind::Congestion,
        SourceKind::TrafficV1,
        SourceKind::TrafficV2,
        SourceKind::CallSuccess,
    ];

    /// Right-hand sources in the order they are joined onto the inventory.
    pub const JOIN_ORDER: [SourceKind; 7] = [
        SourceKind::Revenue,
        SourceKind::TowerOperatorCost,
        SourceKind::CoLocationCost,
        SourceKind::Congestion,
        SourceKind::TrafficV1,
        SourceKind::TrafficV2,
        SourceKind::CallSuccess,
    ];

    /// Key used in configuration files and as collision suffix.
    pub fn config_key(self) -> &'static str {
        match self {
            SourceKind::Inventory => "inventory",
            SourceKind::Revenue => "revenue",
            SourceKind::TowerOperatorCost => "tower-operator-cost",
            SourceKind::CoLocationCost => "co-location-cost",
            SourceKind::Congestion => "congestion",
            SourceKind::TrafficV1 => "traffic-v1",
            SourceKind::TrafficV2 => "traffic-v2",
            SourceKind::CallSuccess => "call-success",
        }
    }

    /// Table name of the extract in the production storage layout.
    pub fn default_table_name(self) -> &'static str {
        match self {
            SourceKind::Inventory => "BASE_SITES",
            SourceKind::Revenue => "caparc",
            SourceKind::TowerOperatorCost => "OPEX_IHS",
            SourceKind::CoLocationCost => "OPEX_ESCO",
            SourceKind::Congestion => "CONGESTION",
            SourceKind::TrafficV1 => "hourly_datas_radio_prod",
            SourceKind::TrafficV2 => "ks_tdb_radio_drsi",
            SourceKind::CallSuccess => "Taux_succes_2g",
        }
    }

    /// Folder holding the cleaned extracts.
    pub fn default_location(self) -> &'static str {
        match self {
            SourceKind::Inventory => "base-sites",
            SourceKind::Revenue => "caparc",
            SourceKind::TowerOperatorCost => "opex-ihs",
            SourceKind::CoLocationCost => "opex-esco",
            SourceKind::Congestion => "congestion",
            SourceKind::TrafficV1 => "trafic",
            SourceKind::TrafficV2 => "trafic-v2",
            SourceKind::CallSuccess => "cssr",
        }
    }

    /// Inventory columns (by role) matched against this source's keys.
    ///
    /// Empty for the inventory itself.
    pub fn left_roles(self) -> &'static [InventoryRole] {
        match self {
            SourceKind::Inventory => &[],
            SourceKind::Revenue | SourceKind::TrafficV2 => &[InventoryRole::SiteId],
            SourceKind::TowerOperatorCost => &[InventoryRole::AlternateId, InventoryRole::Period],
            SourceKind::CoLocationCost => &[InventoryRole::AlternateId],
            SourceKind::Congestion | SourceKind::TrafficV1 | SourceKind::CallSuccess => {
                &[InventoryRole::SiteCode]
            }
        }
    }

    /// Key column names used by the production extracts.
    pub fn default_join_keys(self) -> &'static [&'static str] {
        match self {
            SourceKind::Inventory => &[],
            SourceKind::Revenue | SourceKind::TrafficV2 => &["id_site"],
            SourceKind::TowerOperatorCost => &["site id ihs", "mois"],
            SourceKind::CoLocationCost => &["code site"],
            SourceKind::Congestion | SourceKind::TrafficV1 | SourceKind::CallSuccess => {
                &["code_site"]
            }
        }
    }

    pub fn default_cadence(self) -> Cadence {
        match self {
            SourceKind::TowerOperatorCost => Cadence::Quarterly,
            _ => Cadence::Monthly,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

impl FromStr for SourceKind {
    type Err = OfaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.config_key() == key)
            .ok_or_else(|| OfaError::configuration(format!("unknown source '{s}'")))
    }
}

/// Identity columns of the inventory used as left join keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryRole {
    /// Numeric site identifier shared with revenue and traffic v2.
    SiteId,
    /// Site code shared with the network extracts.
    SiteCode,
    /// Code used by the tower operators.
    AlternateId,
    /// Month column.
    Period,
}

impl InventoryRole {
    pub fn as_str(self) -> &'static str {
        match self {
            InventoryRole::SiteId => "site_id",
            InventoryRole::SiteCode => "site_code",
            InventoryRole::AlternateId => "alternate_id",
            InventoryRole::Period => "period",
        }
    }
}

/// Publication cadence of an extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    #[default]
    Monthly,
    /// Published once per quarter, in its first month.
    Quarterly,
}
