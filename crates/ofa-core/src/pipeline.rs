//! Enrichment pipeline with explicit stages.
//!
//! The stages run in order for one reporting period:
//! 1. **Validate**: configuration is checked before any I/O
//! 2. **Thresholds**: the P&L rates are resolved
//! 3. **Load**: the eight extracts are fetched
//! 4. **Join**: extracts are left-joined onto the inventory
//! 5. **Reconcile**: cost fields are merged and duplicates collapsed
//! 6. **Project**: the public schema is selected
//! 7. **Metrics**: KPIs and classifications are derived
//! 8. **History**: the previous cycle's segment is attached
//!
//! A failing stage aborts the run; nothing is returned for publication.

use std::time::Instant;

use ofa_model::{OfaError, Period, PipelineConfig, Result, SourceKind, ThresholdSet};
use tracing::{debug, info, info_span};

use crate::collaborators::{HistoricalStore, SourceLoader, ThresholdRegistry};
use crate::frame::{EnrichedDataset, SourceSet};
use crate::history::attach_previous_segment;
use crate::join::fuse;
use crate::metrics::derive_metrics;
use crate::project::project;
use crate::reconcile::{collapse, reconcile};
use crate::thresholds::ThresholdProvider;

/// Collaborators and configuration of a run.
pub struct EnrichmentContext<'a> {
    pub config: &'a PipelineConfig,
    pub sources: &'a dyn SourceLoader,
    pub history: &'a dyn HistoricalStore,
    pub registry: &'a dyn ThresholdRegistry,
}

impl<'a> EnrichmentContext<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        sources: &'a dyn SourceLoader,
        history: &'a dyn HistoricalStore,
        registry: &'a dyn ThresholdRegistry,
    ) -> Self {
        Self {
            config,
            sources,
            history,
            registry,
        }
    }

    pub fn thresholds(&self) -> ThresholdProvider<'a> {
        ThresholdProvider::new(self.registry, &self.config.thresholds)
    }
}

/// Produces the enriched dataset of one reporting period.
pub fn run_enrichment(ctx: &EnrichmentContext<'_>, period: Period) -> Result<EnrichedDataset> {
    let run_span = info_span!("enrich", period = %period);
    let _run_guard = run_span.enter();
    let run_start = Instant::now();

    ctx.config.validate()?;

    let thresholds = info_span!("thresholds").in_scope(|| -> Result<ThresholdSet> {
        let set = ctx.thresholds().resolve_all()?;
        debug!(
            intercos = set.intercos,
            impot = set.impot,
            frais_distribution = set.frais_distribution,
            seuil_rentabilite = set.seuil_rentabilite,
            "thresholds resolved"
        );
        Ok(set)
    })?;

    let sources = info_span!("load").in_scope(|| load_sources(ctx, period))?;

    let fused = info_span!("join").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let fused = fuse(&sources, ctx.config)?;
        info!(
            rows = fused.height(),
            columns = fused.frame.width(),
            duration_ms = start.elapsed().as_millis(),
            "join complete"
        );
        Ok(fused)
    })?;

    if fused.height() == 0 {
        return Err(OfaError::unavailable(
            &ctx.config.source(SourceKind::Inventory)?.name,
            period,
            "no data for period",
        ));
    }

    let reconciled = info_span!("reconcile").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let frame = collapse(reconcile(fused)?)?;
        debug!(
            columns = frame.width(),
            duration_ms = start.elapsed().as_millis(),
            "reconcile complete"
        );
        Ok(frame)
    })?;

    let projected = info_span!("project").in_scope(|| project(&reconciled))?;

    let enriched = info_span!("metrics").in_scope(|| -> Result<_> {
        let start = Instant::now();
        let frame = derive_metrics(&projected, &ctx.config.rules, &thresholds, period)?;
        info!(
            rows = frame.height(),
            columns = frame.width(),
            duration_ms = start.elapsed().as_millis(),
            "metrics complete"
        );
        Ok(frame)
    })?;

    let frame = info_span!("history").in_scope(|| {
        attach_previous_segment(
            enriched,
            period,
            ctx.config.start_period,
            &ctx.config.history,
            ctx.history,
        )
    })?;

    info!(
        rows = frame.height(),
        duration_ms = run_start.elapsed().as_millis(),
        "enrichment complete"
    );
    Ok(EnrichedDataset::new(period, frame))
}

fn load_sources(ctx: &EnrichmentContext<'_>, period: Period) -> Result<SourceSet> {
    let mut set = SourceSet::new();
    for kind in SourceKind::ALL {
        let source = ctx.config.source(kind)?;
        let start = Instant::now();
        let frame = ctx.sources.load(kind, source, period)?;
        debug!(
            source = %kind,
            table = %source.name,
            rows = frame.height(),
            columns = frame.width(),
            duration_ms = start.elapsed().as_millis(),
            "source loaded"
        );
        set.insert(kind, frame);
    }
    info!(sources = set.len(), "sources loaded");
    Ok(set)
}
