//! Fixture extracts shaped like the production files.
//!
//! Three sites for March 2023:
//! - OCI1: Abidjan, 25M revenue, tower-operator costs only
//! - OCI2: interior, 5M revenue, both cost sheets, no 4G cells
//! - OCI3: Abidjan, 1M revenue, co-location costs only, absent from congestion

#![allow(dead_code)]

use ofa_core::{InMemoryHistory, InMemorySources, StaticRegistry};
use ofa_model::{Period, SourceKind, ThresholdEntry};
use polars::prelude::*;

pub fn period() -> Period {
    Period::parse("2023-03-06").unwrap()
}

pub fn inventory() -> DataFrame {
    df! {
        "mois" => ["2023-03", "2023-03", "2023-03"],
        "code oci" => ["OCI1", "OCI2", "OCI3"],
        "code oci id" => [101i64, 102, 103],
        "site" => ["Plateau", "Bouake Nord", "Cocody"],
        "autre code" => ["IHS1", "IHS2", "IHS3"],
        "longitude" => [-4.02f64, -5.03, -3.98],
        "latitude" => [5.32f64, 7.69, 5.35],
        "type du site" => ["GREENFIELD", "ROOFTOP", "GREENFIELD"],
        "statut" => ["ACTIF", "ACTIF", "ACTIF"],
        "localisation" => ["ABIDJAN", "Intérieur", "Abidjan"],
        "commune" => ["PLATEAU", "BOUAKE", "COCODY"],
        "departement" => ["ABIDJAN", "BOUAKE", "ABIDJAN"],
        "region" => ["ABIDJAN", "GBEKE", "ABIDJAN"],
        "partenaires" => ["IHS", "ESCO", "ESCO"],
        "proprietaire" => ["IHS", "IHS", "ESCO"],
        "gestionnaire" => ["IHS", "ESCO", "ESCO"],
        "type geolocalite" => ["URBAIN", "URBAIN", "URBAIN"],
        "projet" => ["P1", "P2", "P3"],
        "clutter" => ["DENSE", "RURAL", "DENSE"],
        "position site" => ["CENTRE", "PERIPHERIE", "CENTRE"],
    }
    .unwrap()
}

pub fn revenue() -> DataFrame {
    df! {
        "mois" => ["2023-03", "2023-03", "2023-03"],
        "id_site" => [103i64, 101, 102],
        "ca_voix" => [600_000.0f64, 15_000_000.0, 3_000_000.0],
        "ca_data" => [400_000.0f64, 10_000_000.0, 2_000_000.0],
        "parc" => [1_000.0f64, 5_000.0, 2_500.0],
        "parc_data" => [600.0f64, 3_000.0, 1_000.0],
        "parc_2g" => [400.0f64, 1_500.0, 1_200.0],
        "parc_3g" => [300.0f64, 1_500.0, 800.0],
        "parc_4g" => [300.0f64, 1_900.0, 500.0],
        "parc_5g" => [0.0f64, 100.0, 0.0],
        "parc_other" => [0.0f64, 0.0, 0.0],
    }
    .unwrap()
}

pub fn tower_operator_cost() -> DataFrame {
    df! {
        "site id ihs" => ["IHS1", "IHS2", "IHS1"],
        "mois" => ["2023-03", "2023-03", "2023-02"],
        "o&m" => [100.0f64, 200.0, 999.0],
        "energy" => [110.0f64, 210.0, 999.0],
        "infra" => [120.0f64, 220.0, 999.0],
        "maintenance passive preventive" => [130.0f64, 230.0, 999.0],
        "gardes de securite" => [140.0f64, 240.0, 999.0],
        "discount" => [150.0f64, 250.0, 999.0],
        "volume discount" => [160.0f64, 260.0, 999.0],
        "tva : 18%" => [18.0f64, 36.0, 99.0],
    }
    .unwrap()
}

pub fn co_location_cost() -> DataFrame {
    df! {
        "code site" => ["IHS2", "IHS3"],
        "o&m" => [Some(250.0f64), Some(300.0)],
        "energy" => [None, Some(310.0f64)],
        "infra" => [Some(270.0f64), Some(320.0)],
        "maintenance passive preventive" => [Some(280.0f64), Some(330.0)],
        "gardes de securite" => [Some(290.0f64), Some(340.0)],
        "discount" => [Some(295.0f64), Some(350.0)],
        "volume discount" => [Some(296.0f64), Some(360.0)],
        "total redevances ht" => [1_000_000.0f64, 900_000.0],
    }
    .unwrap()
}

pub fn congestion() -> DataFrame {
    df! {
        "code_site" => ["OCI1", "OCI2"],
        "cellules_2g_congestionnees" => [1.0f64, 2.0],
        "cellules_2g" => [10.0f64, 4.0],
        "cellules_3g_congestionnees" => [2.0f64, 2.0],
        "cellules_3g" => [10.0f64, 4.0],
        "cellules_4g_congestionnees" => [1.0f64, 0.0],
        "cellules_4g" => [10.0f64, 0.0],
    }
    .unwrap()
}

pub fn traffic_v1() -> DataFrame {
    df! {
        "code_site" => ["OCI1", "OCI2", "OCI3"],
        "mois" => ["2023-03", "2023-03", "2023-03"],
        "trafic_voix_2G" => [100.0f64, 300.0, 600.0],
        "trafic_voix_3G" => [50.0f64, 50.0, 0.0],
        "trafic_voix_4G" => [10.0f64, 20.0, 30.0],
        "trafic_data_2G" => [1.0f64, 2.0, 3.0],
        "trafic_data_3G" => [10.0f64, 20.0, 30.0],
        "trafic_data_4G" => [100.0f64, 200.0, 300.0],
    }
    .unwrap()
}

pub fn traffic_v2() -> DataFrame {
    df! {
        "id_site" => ["101", "102", "103"],
        "trafic_data_go_2G" => [1.5f64, 2.5, 3.5],
        "trafic_data_go_3G" => [15.0f64, 25.0, 35.0],
        "trafic_data_go_4G" => [150.0f64, 250.0, 350.0],
        "trafic_voix_erl_2G" => [200.0f64, 200.0, 600.0],
        "trafic_voix_erl_3G" => [40.0f64, 40.0, 20.0],
        "trafic_voix_erl_4G" => [5.0f64, 5.0, 5.0],
        "nbre_cellule_2G" => [10.0f64, 5.0, 5.0],
        "nbre_cellule_congestionne_2G" => [0.0f64, 1.0, 0.0],
        "nbre_cellule_3G" => [10.0f64, 5.0, 5.0],
        "nbre_cellule_congestionne_3G" => [0.0f64, 1.0, 0.0],
        "nbre_cellule_4G" => [10.0f64, 5.0, 5.0],
        "nbre_cellule_congestionne_4G" => [2.0f64, 1.0, 0.0],
    }
    .unwrap()
}

pub fn call_success() -> DataFrame {
    df! {
        "code_site" => ["OCI1", "OCI2", "OCI3"],
        "avg_cssr_cs_2G" => [99.0f64, 98.0, 97.0],
        "avg_cssr_cs_3G" => [99.5f64, 98.5, 97.5],
    }
    .unwrap()
}

pub fn sources() -> InMemorySources {
    InMemorySources::new()
        .with(SourceKind::Inventory, inventory())
        .with(SourceKind::Revenue, revenue())
        .with(SourceKind::TowerOperatorCost, tower_operator_cost())
        .with(SourceKind::CoLocationCost, co_location_cost())
        .with(SourceKind::Congestion, congestion())
        .with(SourceKind::TrafficV1, traffic_v1())
        .with(SourceKind::TrafficV2, traffic_v2())
        .with(SourceKind::CallSuccess, call_success())
}

/// 12% interconnection, 2% tax, 5% distribution, 10% profitability threshold.
pub fn registry() -> StaticRegistry {
    StaticRegistry::new(vec![
        ThresholdEntry::new("intercos", "12"),
        ThresholdEntry::new("impot_taxe", "2"),
        ThresholdEntry::new("frais_distribution", "5"),
        ThresholdEntry::new("seuil_rentabilite", "10,0"),
    ])
}

pub fn history() -> InMemoryHistory {
    InMemoryHistory::new().with(
        Period::parse("2023-02-06").unwrap(),
        df! {
            "code_oci" => ["OCI3", "OCI1"],
            "segment" => ["A DEVELOPER", "NORMAL"],
        }
        .unwrap(),
    )
}

pub fn f64s(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
    df.column(column)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

pub fn strs(df: &DataFrame, column: &str) -> Vec<Option<String>> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

pub fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value present");
    assert!(
        (actual - expected).abs() < 1e-9 * expected.abs().max(1.0),
        "expected {expected}, got {actual}"
    );
}
