use anyhow::{Context, Result};
use atasco::audit::{AuditConfig, LongTaskAudit};
use atasco::cli::{Cli, OutputFormat};
use atasco::csv_output::CsvOutput;
use atasco::json_output::JsonReport;
use atasco::report::render_table;
use clap::Parser;
use std::fs;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let trace_bytes = fs::read(&cli.trace)
        .with_context(|| format!("failed to read trace file {}", cli.trace.display()))?;
    let network_bytes = match &cli.network {
        Some(path) => Some(
            fs::read(path)
                .with_context(|| format!("failed to read network records {}", path.display()))?,
        ),
        None => None,
    };

    let mut audit = LongTaskAudit::new(AuditConfig {
        threshold_ms: cli.threshold_ms,
        max_tasks: cli.max_tasks,
    });
    let report = audit.run(&trace_bytes, network_bytes.as_deref())?;

    match cli.format {
        OutputFormat::Text => {
            print!("{}", render_table(&report.rows));
            if let Some(summary) = &report.summary {
                println!("{}", summary);
            }
        }
        OutputFormat::Json => {
            let json = JsonReport::new(report.threshold_ms, report.rows, report.summary);
            println!("{}", json.render()?);
        }
        OutputFormat::Csv => {
            let csv: CsvOutput = report.rows.into_iter().collect();
            print!("{}", csv.render());
        }
    }

    Ok(())
}
