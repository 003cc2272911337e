//! TOML pipeline configuration.
//!
//! One file describes the whole deployment: archive locations, the
//! channel selection, and request tuning. Station addresses live in a
//! separate JSON file referenced by `station_file`, so the config can
//! be committed while addresses stay private.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use certimus_rs_client::fetch::FetchConfig;
use certimus_rs_core::{DEFAULT_BUFFER_SECS, DEFAULT_CHUNK_HOURS, PlanConfig};
use chrono::TimeDelta;
use serde::Deserialize;

/// Top-level pipeline configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the date-partitioned chunk archive.
    pub data_dir: PathBuf,
    /// Root of the SEED-compliant day-file archive.
    pub archive_dir: PathBuf,
    /// JSON file mapping station codes to sensor addresses.
    pub station_file: PathBuf,
    /// Where gap scans are written and backfills read from.
    #[serde(default = "default_gap_file")]
    pub gap_file: PathBuf,
    /// Channel selection to fetch.
    pub selection: Selection,
    /// Request tuning.
    #[serde(default)]
    pub request: Request,
    /// SEED re-layout settings.
    #[serde(default)]
    pub rename: Rename,
}

/// Cartesian channel selection.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Selection {
    pub networks: Vec<String>,
    pub stations: Vec<String>,
    pub locations: Vec<String>,
    pub channels: Vec<String>,
}

/// Request tuning, all optional.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Request {
    pub chunk_hours: i64,
    pub buffer_secs: i64,
    pub max_per_sensor: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub validate_records: bool,
}

impl Default for Request {
    fn default() -> Self {
        let fetch = FetchConfig::default();
        Self {
            chunk_hours: DEFAULT_CHUNK_HOURS,
            buffer_secs: DEFAULT_BUFFER_SECS,
            max_per_sensor: fetch.max_per_sensor,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            validate_records: fetch.validate_records,
        }
    }
}

/// SEED re-layout settings.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Rename {
    /// Permanent network code to write into record headers, if any.
    pub target_network: Option<String>,
}

fn default_gap_file() -> PathBuf {
    PathBuf::from("gaps.json")
}

impl Config {
    /// Load and parse a TOML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Planner settings derived from this config.
    pub fn plan_config(&self) -> PlanConfig {
        PlanConfig {
            data_dir: self.data_dir.clone(),
            chunk: TimeDelta::hours(self.request.chunk_hours),
            buffer: TimeDelta::seconds(self.request.buffer_secs),
        }
    }

    /// Fetch engine settings derived from this config.
    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            max_per_sensor: self.request.max_per_sensor,
            connect_timeout: Duration::from_secs(self.request.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request.request_timeout_secs),
            validate_records: self.request.validate_records,
        }
    }
}
