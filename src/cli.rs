//! CLI argument parsing for Atasco

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the long-task report
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "atasco")]
#[command(version)]
#[command(about = "Page-load trace analyzer that attributes main-thread blocking time", long_about = None)]
pub struct Cli {
    /// Path to the trace JSON (bare event array or {"traceEvents": [...]})
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Network records JSON used to confirm script URLs
    #[arg(short = 'n', long = "network", value_name = "FILE")]
    pub network: Option<PathBuf>,

    /// Long-task threshold in milliseconds
    #[arg(short = 't', long = "threshold", value_name = "MS", default_value = "50")]
    pub threshold_ms: f64,

    /// Maximum number of reported tasks
    #[arg(long = "max-tasks", value_name = "N", default_value = "20")]
    pub max_tasks: usize,

    /// Output format (text, json, or csv)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
