//! `certimus-fetch` binary entry point.

mod cli;
mod commands;
mod config;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Command::Fetch { from, to } => commands::fetch(&config, from, to).await,
        Command::Daily { days_before } => commands::daily(&config, days_before).await,
        Command::ScanGaps { from, to, out } => {
            commands::scan(&config, from, to, out.as_deref())
        }
        Command::Backfill { gap_file } => {
            commands::backfill(&config, gap_file.as_deref()).await
        }
        Command::Rename { from, to } => commands::rename(&config, from, to),
    }
}
