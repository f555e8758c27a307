//! ## quayside
//! Command-line frontend for the container terminal simulator.
//!
//! The simulated event log goes to stdout, one `<time>: <message>` line per
//! record. Diagnostics go to stderr, filtered by `RUST_LOG` or the configured
//! `telemetry.log_level`.

use clap::Parser;
use quayside_telemetry::EventLogger;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_ref())?;
    EventLogger::init(&config.telemetry.log_level, config.telemetry.json);
    commands::run_command(cli, config).await
}
