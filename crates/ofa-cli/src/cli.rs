//! CLI argument definitions for oneforall.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use ofa_model::Period;

#[derive(Parser)]
#[command(
    name = "oneforall",
    version,
    about = "Fuse and enrich the monthly cell-site extracts",
    long_about = "Fuse the eight monthly cell-site extracts into one enriched dataset.\n\n\
                  Joins inventory, revenue, costs, congestion, traffic and call success,\n\
                  then derives commercial segments, P&L and network KPIs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Produce the enriched dataset of one reporting period.
    Enrich(EnrichArgs),

    /// List the declared source extracts and their join keys.
    Sources(ConfigArgs),

    /// Resolve the P&L thresholds and show where each value came from.
    Thresholds(ThresholdsArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Pipeline configuration file (TOML). Built-in defaults when omitted.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
#[group(multiple = false)]
pub struct RegistryArgs {
    /// JSON file holding the threshold registry.
    #[arg(long = "thresholds-file", value_name = "PATH")]
    pub thresholds_file: Option<PathBuf>,

    /// HTTP endpoint serving the threshold registry.
    #[arg(long = "thresholds-url", value_name = "URL")]
    pub thresholds_url: Option<String>,
}

#[derive(Args)]
pub struct EnrichArgs {
    /// Reporting period (YYYY-MM-DD).
    #[arg(value_name = "PERIOD")]
    pub period: Period,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Root of the cleaned extracts (`<location>-cleaned/YYYY/MM/DD`).
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Root of the enriched datasets, read for history and written on success.
    #[arg(long = "store-dir", value_name = "DIR")]
    pub store_dir: PathBuf,

    #[command(flatten)]
    pub registry: RegistryArgs,

    /// Field separator of the extracts.
    #[arg(long = "separator", value_name = "CHAR", default_value_t = ',')]
    pub separator: char,

    /// Run the pipeline and report without publishing the dataset.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ThresholdsArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub registry: RegistryArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
