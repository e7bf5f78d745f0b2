use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use ofa_core::{
    EnrichedSink, EnrichmentContext, StaticRegistry, ThresholdProvider, ThresholdRegistry,
    run_enrichment,
};
use ofa_ingest::{CsvDatasetStore, CsvSourceLoader, HttpRegistry, JsonFileRegistry};
use ofa_model::{PipelineConfig, ThresholdCode};
use tracing::{info, info_span};

use crate::cli::{ConfigArgs, EnrichArgs, RegistryArgs, ThresholdsArgs};
use crate::summary::{EnrichSummary, sources_table, thresholds_table};

/// Loads and validates the pipeline configuration.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    config.validate().context("validate config")?;
    Ok(config)
}

/// Registry selected on the command line; an empty one leaves every
/// threshold on its local default.
pub fn build_registry(args: &RegistryArgs) -> Result<Box<dyn ThresholdRegistry>> {
    if let Some(path) = &args.thresholds_file {
        return Ok(Box::new(JsonFileRegistry::new(path)));
    }
    if let Some(url) = &args.thresholds_url {
        let registry = HttpRegistry::new(url.as_str()).context("build registry client")?;
        return Ok(Box::new(registry));
    }
    Ok(Box::new(StaticRegistry::empty()))
}

pub fn run_enrich(args: &EnrichArgs) -> Result<EnrichSummary> {
    let span = info_span!("cli_enrich", period = %args.period, dry_run = args.dry_run);
    let _guard = span.enter();
    let started = Instant::now();

    if !args.separator.is_ascii() {
        bail!("separator must be a single ASCII character, got {:?}", args.separator);
    }
    let separator = args.separator as u8;

    let config = load_config(args.config.config.as_deref())?;
    let registry = build_registry(&args.registry)?;
    let loader = CsvSourceLoader::new(&args.data_dir).with_separator(separator);
    let store = CsvDatasetStore::new(&args.store_dir);
    let ctx = EnrichmentContext::new(&config, &loader, &store, registry.as_ref());

    let dataset = run_enrichment(&ctx, args.period)
        .with_context(|| format!("enrich period {}", args.period))?;
    let mut summary = EnrichSummary::from_dataset(&dataset)?;

    if !args.dry_run {
        store
            .publish(&dataset)
            .with_context(|| format!("publish period {}", args.period))?;
        summary.published = Some(store.path_for(args.period));
    }

    info!(
        rows = summary.rows,
        published = summary.published.is_some(),
        duration_ms = started.elapsed().as_millis(),
        "enrich command complete"
    );
    Ok(summary)
}

pub fn run_sources(args: &ConfigArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    println!("{}", sources_table(&config));
    Ok(())
}

pub fn run_thresholds(args: &ThresholdsArgs) -> Result<()> {
    let config = load_config(args.config.config.as_deref())?;
    let registry = build_registry(&args.registry)?;
    let provider = ThresholdProvider::new(registry.as_ref(), &config.thresholds);
    let resolved = ThresholdCode::ALL
        .into_iter()
        .map(|code| {
            provider
                .resolve_detailed(code)
                .with_context(|| format!("resolve threshold {}", code.code()))
        })
        .collect::<Result<Vec<_>>>()?;
    println!("{}", thresholds_table(&resolved));
    Ok(())
}
