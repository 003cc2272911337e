//! Request planning: turn channel selections and time windows into the
//! chunked requests the fetch engine will issue.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};

use crate::channel::ChannelId;
use crate::error::Result;
use crate::path::chunk_path;
use crate::time::TimeWindow;

/// Default chunk length: one hour per request.
pub const DEFAULT_CHUNK_HOURS: i64 = 1;

/// Default query buffer added to each side of a chunk, in seconds.
pub const DEFAULT_BUFFER_SECS: i64 = 150;

/// Planning parameters: where files go and how requests are chunked.
#[derive(Clone, Debug)]
pub struct PlanConfig {
    /// Root of the date-partitioned archive.
    pub data_dir: PathBuf,
    /// Length of each chunked request.
    pub chunk: TimeDelta,
    /// Buffer added to both ends of each query window.
    pub buffer: TimeDelta,
}

impl PlanConfig {
    /// Defaults (1 h chunks, 150 s buffer) rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            chunk: TimeDelta::hours(DEFAULT_CHUNK_HOURS),
            buffer: TimeDelta::seconds(DEFAULT_BUFFER_SECS),
        }
    }
}

/// One planned chunk request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkPlan {
    /// Stream the chunk belongs to.
    pub channel: ChannelId,
    /// Nominal chunk start (names the output file).
    pub chunk_start: DateTime<Utc>,
    /// Buffered window actually queried from the sensor.
    pub query: TimeWindow,
    /// Destination file under the archive tree.
    pub outfile: PathBuf,
}

/// Expand a cartesian selection of SEED codes into per-channel requests.
///
/// Every combination of network, station, location, and channel is
/// paired with `window`. Invalid codes fail the whole expansion.
pub fn expand_selection(
    networks: &[String],
    stations: &[String],
    locations: &[String],
    channels: &[String],
    window: TimeWindow,
) -> Result<Vec<(ChannelId, TimeWindow)>> {
    let mut requests = Vec::new();
    for network in networks {
        for station in stations {
            for location in locations {
                for channel in channels {
                    let id = ChannelId::new(network, station, location, channel)?;
                    requests.push((id, window));
                }
            }
        }
    }
    Ok(requests)
}

/// Chunk every request and compute query windows and output paths.
///
/// Pure: no filesystem checks happen here. The fetch engine filters out
/// plans whose outfile already exists.
pub fn plan_requests(
    config: &PlanConfig,
    requests: &[(ChannelId, TimeWindow)],
) -> Result<Vec<ChunkPlan>> {
    let mut plans = Vec::new();
    for (id, window) in requests {
        for chunk_start in window.chunks(config.chunk)? {
            let nominal = TimeWindow::new(chunk_start, chunk_start + config.chunk)?;
            plans.push(ChunkPlan {
                channel: id.clone(),
                chunk_start,
                query: nominal.buffered(config.buffer),
                outfile: chunk_path(&config.data_dir, id, chunk_start),
            });
        }
    }
    Ok(plans)
}
