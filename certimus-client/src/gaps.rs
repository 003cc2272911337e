//! Day-granularity coverage scanning.
//!
//! A day is considered covered for a channel when its date directory
//! holds at least one chunk file for that channel. Runs of uncovered
//! days coalesce into one [`Gap`], which feeds straight back into the
//! request planner for backfilling.

use std::path::Path;

use certimus_rs_core::{ChannelId, TimeWindow, path::day_dir};
use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

/// A contiguous run of days with no data on disk for one channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    /// Channel the data is missing for.
    pub channel: ChannelId,
    /// Day-aligned window covering the missing run.
    pub window: TimeWindow,
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap_or_default())
}

fn day_covered(data_dir: &Path, id: &ChannelId, day: DateTime<Utc>) -> Result<bool> {
    let dir = day_dir(data_dir, day);
    if !dir.is_dir() {
        return Ok(false);
    }
    let prefix = format!("{id}.");
    for entry in std::fs::read_dir(&dir)? {
        let name = entry?.file_name();
        if let Some(name) = name.to_str()
            && name.starts_with(&prefix)
            && name.ends_with(".mseed")
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Scan the archive for days with no data in each requested window.
///
/// Windows are widened to whole days before scanning; consecutive
/// missing days merge into a single gap.
pub fn scan_gaps(
    data_dir: &Path,
    requests: &[(ChannelId, TimeWindow)],
) -> Result<Vec<Gap>> {
    let mut gaps = Vec::new();
    for (id, window) in requests {
        let mut run_start: Option<DateTime<Utc>> = None;
        let mut day = midnight(window.start().date_naive());
        while day < window.end() {
            let next = day + TimeDelta::days(1);
            if day_covered(data_dir, id, day)? {
                if let Some(start) = run_start.take() {
                    gaps.push(Gap {
                        channel: id.clone(),
                        window: TimeWindow::new(start, day)?,
                    });
                }
            } else {
                debug!(channel = %id, day = %day.date_naive(), "no data for day");
                run_start.get_or_insert(day);
            }
            day = next;
        }
        if let Some(start) = run_start {
            gaps.push(Gap {
                channel: id.clone(),
                window: TimeWindow::new(start, day)?,
            });
        }
    }
    info!(gaps = gaps.len(), "archive scan complete");
    Ok(gaps)
}

/// Turn gaps back into planner requests for backfilling.
pub fn gap_requests(gaps: &[Gap]) -> Vec<(ChannelId, TimeWindow)> {
    gaps.iter().map(|g| (g.channel.clone(), g.window)).collect()
}

/// Persist a gap list as pretty-printed JSON.
pub fn write_gap_file(path: &Path, gaps: &[Gap]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(gaps)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), gaps = gaps.len(), "wrote gap file");
    Ok(())
}

/// Load a gap list written by [`write_gap_file`].
pub fn read_gap_file(path: &Path) -> Result<Vec<Gap>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
