//! sysfacts agent entry point.
//!
//! Collects one snapshot and writes it to stdout as JSON. Logs go to stderr.

mod config;

use std::io::Write;

use sysfacts_telemetry::Collector;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting sysfacts agent");

    let config = config::Config::load()?;
    let collector = Collector::new(&config.collector);
    tracing::info!(platform = %collector.platform(), "configuration loaded");

    let rt = tokio::runtime::Runtime::new()?;
    let snapshot = rt.block_on(collector.collect(&config.collector.facts));

    let json = if config.pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    Ok(())
}
