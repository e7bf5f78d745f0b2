//! Console tables printed by the subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use ofa_common::any_to_key;
use ofa_core::{EnrichedDataset, ResolvedThreshold, ThresholdOrigin};
use ofa_model::{CommercialSegment, Period, PipelineConfig, ProfitabilityLevel, SourceKind};
use polars::prelude::DataFrame;

/// Label used for rows without a classification.
const UNCLASSIFIED: &str = "(unclassified)";

/// Counts reported after an `enrich` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichSummary {
    pub period: Period,
    pub rows: usize,
    pub pareto: usize,
    /// Row count per commercial segment, in label order, unclassified last.
    pub segments: Vec<(String, usize)>,
    /// Row count per profitability level, in label order, unclassified last.
    pub levels: Vec<(String, usize)>,
    /// Where the dataset was published; `None` on a dry run.
    pub published: Option<PathBuf>,
}

impl EnrichSummary {
    pub fn from_dataset(dataset: &EnrichedDataset) -> Result<Self> {
        let frame = &dataset.frame;
        let pareto = frame
            .column("pareto")
            .context("enriched dataset has no pareto column")?
            .bool()
            .context("pareto column is not boolean")?
            .into_iter()
            .filter(|flag| *flag == Some(true))
            .count();
        let segment_labels: Vec<&str> = CommercialSegment::ALL
            .into_iter()
            .map(CommercialSegment::label)
            .collect();
        let level_labels: Vec<&str> = ProfitabilityLevel::ALL
            .into_iter()
            .map(ProfitabilityLevel::label)
            .collect();
        Ok(Self {
            period: dataset.period,
            rows: dataset.height(),
            pareto,
            segments: distribution(frame, "segment", &segment_labels)?,
            levels: distribution(frame, "niveau_rentabilite", &level_labels)?,
            published: None,
        })
    }
}

/// Counts the values of a label column, known labels first.
fn distribution(frame: &DataFrame, column: &str, labels: &[&str]) -> Result<Vec<(String, usize)>> {
    let values = frame
        .column(column)
        .with_context(|| format!("enriched dataset has no {column} column"))?;
    let mut counts: Vec<(String, usize)> = labels.iter().map(|l| ((*l).to_string(), 0)).collect();
    let mut unclassified = 0;
    for idx in 0..values.len() {
        let value = any_to_key(values.get(idx)?);
        match value.and_then(|v| counts.iter_mut().find(|(label, _)| *label == v)) {
            Some((_, count)) => *count += 1,
            None => unclassified += 1,
        }
    }
    counts.push((UNCLASSIFIED.to_string(), unclassified));
    Ok(counts)
}

pub fn print_enrich_summary(summary: &EnrichSummary) {
    println!("Period: {}", summary.period);
    match &summary.published {
        Some(path) => println!("Published: {}", path.display()),
        None => println!("Published: no (dry run)"),
    }
    println!("{}", enrich_table(summary));
}

pub fn enrich_table(summary: &EnrichSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Value"),
        header_cell("Sites"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);

    table.add_row(vec![
        group_cell("Total"),
        dim_cell("-"),
        Cell::new(summary.rows).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        group_cell("Pareto"),
        Cell::new("top revenue sites"),
        Cell::new(summary.pareto),
    ]);
    for (label, count) in &summary.segments {
        table.add_row(vec![group_cell("Segment"), label_cell(label), count_cell(*count)]);
    }
    for (label, count) in &summary.levels {
        table.add_row(vec![group_cell("Profitability"), label_cell(label), count_cell(*count)]);
    }
    table
}

pub fn sources_table(config: &PipelineConfig) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Table"),
        header_cell("Location"),
        header_cell("Cadence"),
        header_cell("Join keys"),
        header_cell("Inventory columns"),
    ]);
    apply_table_style(&mut table);

    for kind in SourceKind::ALL {
        let Some(source) = config.sources.get(&kind) else {
            table.add_row(vec![
                Cell::new(kind.config_key()).fg(Color::Red),
                dim_cell("(not declared)"),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
                dim_cell("-"),
            ]);
            continue;
        };
        let inventory_columns: Vec<&str> = kind
            .left_roles()
            .iter()
            .map(|role| config.inventory_keys.column(*role))
            .collect();
        table.add_row(vec![
            Cell::new(kind.config_key())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&source.name),
            Cell::new(format!("{}-cleaned", source.location)),
            Cell::new(format!("{:?}", source.cadence).to_lowercase()),
            Cell::new(or_dash(&source.join_keys.join(", "))),
            Cell::new(or_dash(&inventory_columns.join(", "))),
        ]);
    }
    table
}

pub fn thresholds_table(resolved: &[ResolvedThreshold]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Percent"),
        header_cell("Fraction"),
        header_cell("Origin"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);

    for threshold in resolved {
        let origin = match threshold.origin {
            ThresholdOrigin::Registry => Cell::new("registry").fg(Color::Green),
            ThresholdOrigin::LocalDefault => Cell::new("local default").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(threshold.code.code()),
            Cell::new(format!("{}", threshold.percent)),
            Cell::new(format!("{:.4}", threshold.percent / 100.0)),
            origin,
        ]);
    }
    table
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn group_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn label_cell(label: &str) -> Cell {
    if label == UNCLASSIFIED {
        dim_cell(label)
    } else {
        Cell::new(label)
    }
}

fn count_cell(count: usize) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
