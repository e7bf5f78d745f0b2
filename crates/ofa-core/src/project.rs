//! Projection onto the public output schema.
//!
//! The output columns are enumerated explicitly. A declared column missing
//! from the fused table aborts the run: a drifted extract must never silently
//! drop a business field.

use ofa_common::parse_decimal;
use ofa_model::{OfaError, Result};
use polars::prelude::*;

/// Logical type of a projected column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
}

/// Where a projected column takes its values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// A column of the reconciled table.
    Field(&'static str),
    /// A constant zero; no extract feeds this column yet.
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputColumn {
    pub name: &'static str,
    pub source: ColumnSource,
    pub kind: ColumnKind,
}

const fn text(name: &'static str, field: &'static str) -> OutputColumn {
    OutputColumn {
        name,
        source: ColumnSource::Field(field),
        kind: ColumnKind::Text,
    }
}

const fn number(name: &'static str, field: &'static str) -> OutputColumn {
    OutputColumn {
        name,
        source: ColumnSource::Field(field),
        kind: ColumnKind::Number,
    }
}

const fn zero(name: &'static str) -> OutputColumn {
    OutputColumn {
        name,
        source: ColumnSource::Zero,
        kind: ColumnKind::Number,
    }
}

/// Projected columns, in output order.
pub const OUTPUT_COLUMNS: &[OutputColumn] = &[
    // identity
    text("mois", "mois"),
    text("code_oci", "code oci"),
    text("site", "site"),
    text("autre_code", "autre code"),
    number("longitude", "longitude"),
    number("latitude", "latitude"),
    text("type_du_site", "type du site"),
    text("statut", "statut"),
    text("localisation", "localisation"),
    text("commune", "commune"),
    text("departement", "departement"),
    text("region", "region"),
    text("partenaires", "partenaires"),
    text("proprietaire", "proprietaire"),
    text("gestionnaire", "gestionnaire"),
    text("type_geolocalite", "type geolocalite"),
    text("projet", "projet"),
    text("clutter", "clutter"),
    text("position_site", "position site"),
    // revenue and subscribers
    number("ca_voix", "ca_voix"),
    number("ca_data", "ca_data"),
    number("parc_global", "parc"),
    number("parc_data", "parc_data"),
    number("parc_2g", "parc_2g"),
    number("parc_3g", "parc_3g"),
    number("parc_4g", "parc_4g"),
    number("parc_5g", "parc_5g"),
    number("autre_parc", "parc_other"),
    // costs
    number("o_m", "o&m"),
    number("energie", "energy"),
    number("infra", "infra"),
    number("maintenance_passive_preventive", "maintenance passive preventive"),
    number("garde_de_securite", "gardes de securite"),
    number("discount", "discount"),
    number("volume_discount", "volume discount"),
    number("tva", "tva : 18%"),
    number("opex_itn", "month_total"),
    // unavailability
    zero("delay_2g"),
    zero("delay_3g"),
    zero("delay_4g"),
    zero("delaycellule_2g"),
    zero("delaycellule_3g"),
    zero("delaycellule_4g"),
    zero("nbrecellule_2g"),
    zero("nbrecellule_3g"),
    zero("nbrecellule_4g"),
    // traffic
    number("trafic_voix_2g", "trafic_voix_2G"),
    number("trafic_voix_3g", "trafic_voix_3G"),
    number("trafic_voix_4g", "trafic_voix_4G"),
    number("trafic_data_2g", "trafic_data_2G"),
    number("trafic_data_3g", "trafic_data_3G"),
    number("trafic_data_4g", "trafic_data_4G"),
    number("trafic_data_v2_2g", "trafic_data_go_2G"),
    number("trafic_data_v2_3g", "trafic_data_go_3G"),
    number("trafic_data_v2_4g", "trafic_data_go_4G"),
    number("trafic_voix_v2_2g", "trafic_voix_erl_2G"),
    number("trafic_voix_v2_3g", "trafic_voix_erl_3G"),
    number("trafic_voix_v2_4g", "trafic_voix_erl_4G"),
    // congestion
    number("cellules_2g_congestionnees", "cellules_2g_congestionnees"),
    number("cellules_2g", "cellules_2g"),
    number("cellules_3g_congestionnees", "cellules_3g_congestionnees"),
    number("cellules_3g", "cellules_3g"),
    number("cellules_4g_congestionnees", "cellules_4g_congestionnees"),
    number("cellules_4g", "cellules_4g"),
    number("cellules_v2_2g", "nbre_cellule_2G"),
    number("cellules_congestionne_v2_2g", "nbre_cellule_congestionne_2G"),
    number("cellules_v2_3g", "nbre_cellule_3G"),
    number("cellules_congestionne_v2_3g", "nbre_cellule_congestionne_3G"),
    number("cellules_v2_4g", "nbre_cellule_4G"),
    number("cellules_congestionne_v2_4g", "nbre_cellule_congestionne_4G"),
    // call success
    number("avg_cssr_cs_2g", "avg_cssr_cs_2G"),
    number("avg_cssr_cs_3g", "avg_cssr_cs_3G"),
];

/// Looks up a declared output column.
pub fn output_column(name: &str) -> Result<&'static OutputColumn> {
    OUTPUT_COLUMNS
        .iter()
        .find(|column| column.name == name)
        .ok_or_else(|| OfaError::schema(format!("'{name}' is not a declared output column")))
}

/// Selects, casts and renames the reconciled table to the output schema.
pub fn project(reconciled: &DataFrame) -> Result<DataFrame> {
    project_columns(reconciled, OUTPUT_COLUMNS)
}

/// Projects a subset of the declared columns, by output name.
pub fn project_subset(reconciled: &DataFrame, names: &[&str]) -> Result<DataFrame> {
    let columns = names
        .iter()
        .map(|name| output_column(name).copied())
        .collect::<Result<Vec<_>>>()?;
    project_columns(reconciled, &columns)
}

fn project_columns(reconciled: &DataFrame, columns: &[OutputColumn]) -> Result<DataFrame> {
    let missing: Vec<&str> = columns
        .iter()
        .filter_map(|column| match column.source {
            ColumnSource::Field(field) if reconciled.column(field).is_err() => Some(field),
            _ => None,
        })
        .collect();
    if !missing.is_empty() {
        return Err(OfaError::schema(format!(
            "fused table lacks projected column(s): {}",
            missing.join(", ")
        )));
    }

    let normalized = normalize_numeric_text(reconciled, columns)?;
    let exprs: Vec<Expr> = columns
        .iter()
        .map(|column| {
            let values = match column.source {
                ColumnSource::Field(field) => col(field),
                ColumnSource::Zero => lit(0.0f64),
            };
            let dtype = match column.kind {
                ColumnKind::Text => DataType::String,
                ColumnKind::Number => DataType::Float64,
            };
            values.cast(dtype).alias(column.name)
        })
        .collect();

    Ok(normalized.lazy().select(exprs).collect()?)
}

/// Parses text feeding numeric columns, accepting comma decimals.
fn normalize_numeric_text(reconciled: &DataFrame, columns: &[OutputColumn]) -> Result<DataFrame> {
    let mut frame = reconciled.clone();
    for column in columns {
        let (ColumnSource::Field(field), ColumnKind::Number) = (column.source, column.kind) else {
            continue;
        };
        let values = frame.column(field)?;
        if values.dtype() != &DataType::String {
            continue;
        }
        let parsed: Float64Chunked = values
            .str()?
            .into_iter()
            .map(|value| value.and_then(parse_decimal))
            .collect();
        frame.with_column(parsed.with_name(field.into()).into_column())?;
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn output_names_are_unique_snake_case() {
        let mut seen = HashSet::new();
        for column in OUTPUT_COLUMNS {
            assert!(seen.insert(column.name), "duplicate {}", column.name);
            assert!(
                column
                    .name
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "{}",
                column.name
            );
        }
        assert_eq!(OUTPUT_COLUMNS.len(), 72);
    }

    #[test]
    fn subset_projection_casts_and_renames() {
        let df = df! {
            "code oci" => [1203i64, 1204],
            "parc" => ["10", "x"],
        }
        .unwrap();
        let projected = project_subset(&df, &["code_oci", "parc_global", "delay_2g"]).unwrap();
        let codes = projected.column("code_oci").unwrap().str().unwrap();
        assert_eq!(codes.get(0), Some("1203"));
        let parc = projected.column("parc_global").unwrap().f64().unwrap();
        assert_eq!(parc.get(0), Some(10.0));
        assert_eq!(parc.get(1), None);
        let delay = projected.column("delay_2g").unwrap().f64().unwrap();
        assert_eq!(delay.get(1), Some(0.0));
    }

    #[test]
    fn comma_decimals_keep_their_value() {
        let df = df! {
            "code oci" => ["A", "B", "C"],
            "avg_cssr_cs_2G" => [Some("99,5"), Some(" 98.25 "), None],
            "longitude" => ["-4,02", "-5.03", "-6"],
        }
        .unwrap();
        let projected =
            project_subset(&df, &["code_oci", "avg_cssr_cs_2g", "longitude"]).unwrap();
        let cssr = projected.column("avg_cssr_cs_2g").unwrap().f64().unwrap();
        assert_eq!(cssr.get(0), Some(99.5));
        assert_eq!(cssr.get(1), Some(98.25));
        assert_eq!(cssr.get(2), None);
        let longitude = projected.column("longitude").unwrap().f64().unwrap();
        assert_eq!(longitude.get(0), Some(-4.02));
        assert_eq!(longitude.get(2), Some(-6.0));
    }

    #[test]
    fn absent_field_is_schema_error() {
        let df = df! { "code oci" => ["A"] }.unwrap();
        let err = project_subset(&df, &["code_oci", "ca_voix"]).unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"schema error: fused table lacks projected column(s): ca_voix"
        );
    }

    #[test]
    fn undeclared_column_is_schema_error() {
        let df = df! { "code oci" => ["A"] }.unwrap();
        assert!(matches!(
            project_subset(&df, &["chiffre_affaires"]),
            Err(OfaError::Schema { .. })
        ));
    }
}
