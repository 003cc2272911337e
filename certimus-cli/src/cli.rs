//! Command-line interface definition.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

/// miniSEED download pipeline for Certimus/Minimus sensors.
#[derive(Debug, Parser)]
#[command(name = "certimus-fetch", version, about)]
pub struct Cli {
    /// Pipeline configuration file.
    #[arg(short, long, global = true, default_value = "certimus.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the configured selection over an explicit window.
    Fetch {
        /// Window start (RFC 3339 or YYYY-MM-DD).
        #[arg(long, value_parser = parse_instant)]
        from: DateTime<Utc>,
        /// Window end, exclusive (RFC 3339 or YYYY-MM-DD).
        #[arg(long, value_parser = parse_instant)]
        to: DateTime<Utc>,
    },
    /// Download recent days, for running from cron.
    ///
    /// Fetches from `days-before` days ago up to last midnight UTC,
    /// skipping anything already on disk.
    Daily {
        /// How many days back to start.
        #[arg(long, default_value_t = 2)]
        days_before: i64,
    },
    /// Scan the archive for days with no data and write a gap file.
    ScanGaps {
        /// Window start (RFC 3339 or YYYY-MM-DD).
        #[arg(long, value_parser = parse_instant)]
        from: DateTime<Utc>,
        /// Window end, exclusive (RFC 3339 or YYYY-MM-DD).
        #[arg(long, value_parser = parse_instant)]
        to: DateTime<Utc>,
        /// Write the gap list here instead of the configured gap_file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Re-download every gap recorded in a gap file.
    Backfill {
        /// Gap file to read instead of the configured gap_file.
        #[arg(long)]
        gap_file: Option<PathBuf>,
    },
    /// Re-lay chunk files out as SEED-compliant day files.
    Rename {
        /// Window start (RFC 3339 or YYYY-MM-DD).
        #[arg(long, value_parser = parse_instant)]
        from: DateTime<Utc>,
        /// Window end, exclusive (RFC 3339 or YYYY-MM-DD).
        #[arg(long, value_parser = parse_instant)]
        to: DateTime<Utc>,
    },
}

/// Accept either a full RFC 3339 timestamp or a bare date (midnight UTC).
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        && let Some(midnight) = day.and_hms_opt(0, 0, 0)
    {
        return Ok(midnight.and_utc());
    }
    Err(format!("not an RFC 3339 timestamp or YYYY-MM-DD date: {s:?}"))
}
