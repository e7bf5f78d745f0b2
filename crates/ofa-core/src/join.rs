//! Join engine.
//!
//! Left-joins the seven right-hand extracts onto the inventory in a fixed
//! order. Keys are compared as trimmed strings so an integer site id in one
//! extract matches the same id stored as a float or text in another. Each
//! right side is reduced to one row per key before joining, which keeps the
//! fused row set identical to the inventory's.

use std::collections::HashSet;

use ofa_common::any_to_key;
use ofa_model::{InventoryKeys, InventoryRole, OfaError, PipelineConfig, Result, SourceKind};
use polars::prelude::*;
use tracing::{debug, warn};

use crate::frame::{ColumnLineage, FusedTable, SourceSet};

const ROW_INDEX: &str = "__ofa_row";

const KEY_ROLES: [InventoryRole; 4] = [
    InventoryRole::SiteId,
    InventoryRole::SiteCode,
    InventoryRole::AlternateId,
    InventoryRole::Period,
];

fn key_column(role: InventoryRole) -> String {
    format!("__ofa_key_{}", role.as_str())
}

/// Fuses the period's extracts into one wide table.
pub fn fuse(sources: &SourceSet, config: &PipelineConfig) -> Result<FusedTable> {
    let inventory = sources.get(SourceKind::Inventory)?;
    let (mut acc, mut lineage) = start(inventory, &config.inventory_keys)?;

    for kind in SourceKind::JOIN_ORDER {
        let source = config.source(kind)?;
        let right = sources.get(kind)?;
        let before = acc.height();
        acc = join_step(acc, &mut lineage, kind, right, &source.join_keys)?;
        debug!(
            source = %kind,
            right_rows = right.height(),
            rows = acc.height(),
            columns = acc.width(),
            "joined"
        );
        if acc.height() != before {
            return Err(OfaError::schema(format!(
                "join with '{kind}' changed the row count from {before} to {}",
                acc.height()
            )));
        }
    }

    Ok(FusedTable {
        frame: finish(acc)?,
        lineage,
    })
}

/// Seeds the accumulator with the inventory, a row index and normalized keys.
fn start(inventory: &DataFrame, keys: &InventoryKeys) -> Result<(DataFrame, ColumnLineage)> {
    let mut lineage = ColumnLineage::default();
    for name in inventory.get_column_names() {
        lineage.push(name.as_str(), SourceKind::Inventory, name.as_str());
    }

    let mut acc = inventory.with_row_index(ROW_INDEX.into(), None)?;
    for role in KEY_ROLES {
        let name = keys.column(role);
        let column = inventory.column(name).map_err(|_| {
            OfaError::schema(format!(
                "inventory has no '{name}' column ({} key)",
                role.as_str()
            ))
        })?;
        let values = normalized_keys(column)?;
        acc.with_column(Column::new(key_column(role).into(), values))?;
    }
    Ok((acc, lineage))
}

fn join_step(
    acc: DataFrame,
    lineage: &mut ColumnLineage,
    kind: SourceKind,
    right: &DataFrame,
    right_keys: &[String],
) -> Result<DataFrame> {
    let roles = kind.left_roles();
    if roles.len() != right_keys.len() {
        return Err(OfaError::configuration(format!(
            "source '{kind}' declares {} join key(s), expected {}",
            right_keys.len(),
            roles.len()
        )));
    }

    let mut key_values = Vec::with_capacity(right_keys.len());
    for name in right_keys {
        let column = right.column(name).map_err(|_| {
            OfaError::schema(format!("source '{kind}' has no join key column '{name}'"))
        })?;
        key_values.push(normalized_keys(column)?);
    }

    let kept = first_rows_per_key(&key_values, right.height());
    let dropped = right.height() - kept.len();
    if dropped > 0 {
        warn!(
            source = %kind,
            dropped,
            "right-side rows with duplicate or blank join keys ignored"
        );
    }

    let idx = IdxCa::from_vec(
        "idx".into(),
        kept.iter().map(|&row| row as IdxSize).collect(),
    );
    let mut prepared = right.take(&idx)?;
    for name in right_keys {
        prepared.drop_in_place(name)?;
    }

    let existing: HashSet<String> = acc
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let labels: Vec<String> = prepared
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    for label in labels {
        let physical = unique_name(&label, kind, &existing, lineage);
        if physical != label {
            prepared.rename(&label, physical.as_str().into())?;
        }
        lineage.push(physical, kind, label);
    }

    for (role, values) in roles.iter().zip(key_values) {
        let selected: Vec<Option<String>> = kept.iter().map(|&row| values[row].clone()).collect();
        prepared.with_column(Column::new(key_column(*role).into(), selected))?;
    }

    let on: Vec<Expr> = roles.iter().map(|role| col(key_column(*role))).collect();
    let joined = acc
        .lazy()
        .join(
            prepared.lazy(),
            on.clone(),
            on,
            JoinArgs::new(JoinType::Left).with_coalesce(JoinCoalesce::CoalesceColumns),
        )
        .collect()?;
    Ok(joined)
}

/// Restores inventory order and removes the helper columns.
fn finish(acc: DataFrame) -> Result<DataFrame> {
    let mut fused = acc.sort([ROW_INDEX], SortMultipleOptions::default())?;
    fused.drop_in_place(ROW_INDEX)?;
    for role in KEY_ROLES {
        fused.drop_in_place(&key_column(role))?;
    }
    Ok(fused)
}

/// Normalizes a key column to trimmed strings; blank cells become null.
fn normalized_keys(column: &Column) -> Result<Vec<Option<String>>> {
    let mut values = Vec::with_capacity(column.len());
    for idx in 0..column.len() {
        values.push(any_to_key(column.get(idx)?));
    }
    Ok(values)
}

/// Indices of the first row of every complete key, in row order.
///
/// Rows with a blank key part can never match and are skipped.
fn first_rows_per_key(key_values: &[Vec<Option<String>>], height: usize) -> Vec<usize> {
    let mut seen: HashSet<Vec<&str>> = HashSet::with_capacity(height);
    let mut kept = Vec::with_capacity(height);
    for row in 0..height {
        let key: Option<Vec<&str>> = key_values
            .iter()
            .map(|values| values[row].as_deref())
            .collect();
        if let Some(key) = key
            && seen.insert(key)
        {
            kept.push(row);
        }
    }
    kept
}

/// Picks a physical name for a right-hand column, suffixing on collision.
fn unique_name(
    label: &str,
    kind: SourceKind,
    existing: &HashSet<String>,
    lineage: &ColumnLineage,
) -> String {
    let taken = |name: &str| existing.contains(name) || lineage.contains_physical(name);
    if !taken(label) {
        return label.to_string();
    }
    let base = format!("{label}_{kind}");
    let mut candidate = base.clone();
    let mut counter = 2;
    while taken(&candidate) {
        candidate = format!("{base}_{counter}");
        counter += 1;
    }
    candidate
}
