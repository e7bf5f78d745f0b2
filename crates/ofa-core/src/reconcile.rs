//! Column reconciliation.
//!
//! Cost fields published by both cost sheets are merged into one value per
//! site: the co-location sheet wins whenever it has a value, the tower
//! operator sheet fills the gaps. Afterwards every logical column is reduced
//! to its first physical occurrence and renamed back to its source label.

use ofa_model::{OfaError, Result, SourceKind};
use polars::prelude::*;

use crate::frame::{ColumnLineage, FusedTable};

/// A logical field and the sources that may supply it, by priority.
#[derive(Debug, Clone, Copy)]
pub struct ReconciledField {
    pub label: &'static str,
    pub candidates: &'static [(SourceKind, &'static str)],
}

macro_rules! cost_field {
    ($label:literal) => {
        ReconciledField {
            label: $label,
            candidates: &[
                (SourceKind::CoLocationCost, $label),
                (SourceKind::TowerOperatorCost, $label),
            ],
        }
    };
}

/// Fields shared by the two cost sheets.
pub const RECONCILED_FIELDS: &[ReconciledField] = &[
    cost_field!("o&m"),
    cost_field!("energy"),
    cost_field!("infra"),
    cost_field!("maintenance passive preventive"),
    cost_field!("gardes de securite"),
    cost_field!("discount"),
    cost_field!("volume discount"),
];

/// Monthly cost total; only the co-location sheet provides it.
pub const MONTH_TOTAL: ReconciledField = ReconciledField {
    label: "month_total",
    candidates: &[(SourceKind::CoLocationCost, "total redevances ht")],
};

/// Applies the reconciliation table to the fused table.
///
/// Each reconciled value is written to the first physical column carrying
/// the field's label, so it survives [`collapse`].
pub fn reconcile(fused: FusedTable) -> Result<FusedTable> {
    let FusedTable { frame, mut lineage } = fused;

    let mut exprs = Vec::with_capacity(RECONCILED_FIELDS.len() + 1);
    for field in RECONCILED_FIELDS {
        let target = lineage
            .first_with_label(field.label)
            .ok_or_else(|| missing(field.label, field.candidates[0].0))?
            .to_string();
        exprs.push(first_non_null(field, &lineage)?.alias(target));
    }

    let total = first_non_null(&MONTH_TOTAL, &lineage)?;
    let total_physical = if lineage.contains_physical(MONTH_TOTAL.label) {
        format!("{}_reconciled", MONTH_TOTAL.label)
    } else {
        MONTH_TOTAL.label.to_string()
    };
    exprs.push(total.alias(total_physical.as_str()));
    lineage.push(total_physical, SourceKind::CoLocationCost, MONTH_TOTAL.label);

    let frame = frame.lazy().with_columns(exprs).collect()?;
    Ok(FusedTable { frame, lineage })
}

/// `first non-null wins` over a field's candidate columns, as `Float64`.
fn first_non_null(field: &ReconciledField, lineage: &ColumnLineage) -> Result<Expr> {
    let mut physical = Vec::with_capacity(field.candidates.len());
    for (source, label) in field.candidates {
        let name = lineage
            .physical_of(*source, label)
            .ok_or_else(|| missing(label, *source))?;
        physical.push(col(name).cast(DataType::Float64));
    }

    let mut rest = physical.into_iter().rev();
    let mut expr = rest.next().unwrap_or_else(|| lit(NULL).cast(DataType::Float64));
    for candidate in rest {
        expr = when(candidate.clone().is_not_null())
            .then(candidate)
            .otherwise(expr);
    }
    Ok(expr)
}

fn missing(label: &str, source: SourceKind) -> OfaError {
    OfaError::schema(format!(
        "reconciliation needs column '{label}' from source '{source}'"
    ))
}

/// Keeps the first physical occurrence of every label and renames it back.
pub fn collapse(fused: FusedTable) -> Result<DataFrame> {
    let mut seen = std::collections::HashSet::new();
    let exprs: Vec<Expr> = fused
        .lineage
        .iter()
        .filter(|origin| seen.insert(origin.label.as_str()))
        .map(|origin| col(origin.physical.as_str()).alias(origin.label.as_str()))
        .collect();
    Ok(fused.frame.lazy().select(exprs).collect()?)
}
