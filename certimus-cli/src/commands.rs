//! Subcommand implementations.

use std::path::Path;

use anyhow::{Context, bail};
use certimus_rs_client::fetch::{FetchClient, FetchReport};
use certimus_rs_client::{RenameOutcome, StationRegistry, gap_requests, read_gap_file, rename_range, scan_gaps, write_gap_file};
use certimus_rs_core::{ChannelId, TimeWindow, expand_selection, plan_requests};
use chrono::{DateTime, TimeDelta, Timelike, Utc};
use tracing::{info, warn};

use crate::config::Config;

fn selection_requests(
    config: &Config,
    window: TimeWindow,
) -> anyhow::Result<Vec<(ChannelId, TimeWindow)>> {
    let s = &config.selection;
    let requests =
        expand_selection(&s.networks, &s.stations, &s.locations, &s.channels, window)
            .context("invalid channel selection")?;
    if requests.is_empty() {
        bail!("channel selection is empty");
    }
    Ok(requests)
}

async fn run_fetch(
    config: &Config,
    requests: &[(ChannelId, TimeWindow)],
) -> anyhow::Result<FetchReport> {
    let registry = StationRegistry::from_json_file(&config.station_file)
        .context("loading station addresses")?;
    let plans = plan_requests(&config.plan_config(), requests)?;
    let client = FetchClient::new(config.fetch_config())?;
    let report = client.fetch_plan(&registry, &plans).await?;
    if report.failed() > 0 {
        warn!(failed = report.failed(), "some chunks failed; rerun or backfill later");
    }
    Ok(report)
}

/// `fetch`: download the configured selection over an explicit window.
pub async fn fetch(config: &Config, from: DateTime<Utc>, to: DateTime<Utc>) -> anyhow::Result<()> {
    let window = TimeWindow::new(from, to)?;
    let requests = selection_requests(config, window)?;
    run_fetch(config, &requests).await?;
    Ok(())
}

/// `daily`: download the last `days_before` days up to last midnight UTC.
pub async fn daily(config: &Config, days_before: i64) -> anyhow::Result<()> {
    if days_before < 1 {
        bail!("days-before must be at least 1");
    }
    let end = last_midnight(Utc::now())?;
    let start = end - TimeDelta::days(days_before);
    info!(%start, %end, "daily window");
    let requests = selection_requests(config, TimeWindow::new(start, end)?)?;
    run_fetch(config, &requests).await?;
    Ok(())
}

fn last_midnight(now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    now.with_hour(0)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .context("truncating to midnight")
}

/// `scan-gaps`: find uncovered days and record them for backfilling.
pub fn scan(
    config: &Config,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let window = TimeWindow::new(from, to)?;
    let requests = selection_requests(config, window)?;
    let gaps = scan_gaps(&config.data_dir, &requests)?;
    let out = out.unwrap_or(config.gap_file.as_path());
    write_gap_file(out, &gaps)?;
    for gap in &gaps {
        info!(channel = %gap.channel, window = %gap.window, "gap");
    }
    Ok(())
}

/// `backfill`: re-download everything a gap file records.
pub async fn backfill(config: &Config, gap_file: Option<&Path>) -> anyhow::Result<()> {
    let path = gap_file.unwrap_or(config.gap_file.as_path());
    let gaps = read_gap_file(path)
        .with_context(|| format!("reading gap file {}", path.display()))?;
    if gaps.is_empty() {
        info!("gap file is empty, nothing to do");
        return Ok(());
    }
    let report = run_fetch(config, &gap_requests(&gaps)).await?;
    info!(
        gaps = gaps.len(),
        written = report.written(),
        "backfill complete"
    );
    Ok(())
}

/// `rename`: build SEED-compliant day files for the window.
pub fn rename(config: &Config, from: DateTime<Utc>, to: DateTime<Utc>) -> anyhow::Result<()> {
    let window = TimeWindow::new(from, to)?;
    let requests = selection_requests(config, window)?;
    let outcomes = rename_range(
        &config.data_dir,
        &config.archive_dir,
        &requests,
        config.rename.target_network.as_deref(),
    )?;
    let written = outcomes
        .iter()
        .filter(|(_, _, o)| matches!(o, RenameOutcome::Written { .. }))
        .count();
    let no_data = outcomes
        .iter()
        .filter(|(_, _, o)| matches!(o, RenameOutcome::NoData))
        .count();
    info!(written, no_data, total = outcomes.len(), "rename complete");
    Ok(())
}
