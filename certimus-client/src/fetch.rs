//! Concurrent chunk retrieval over the sensor HTTP API.
//!
//! Certimus-class digitizers serve at most a handful of simultaneous
//! data requests, so downloads are throttled per sensor with a
//! semaphore while different sensors proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use certimus_rs_core::{ChannelId, ChunkPlan, SensorAddr, data_url};
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{ClientError, Result};
use crate::registry::StationRegistry;
use crate::writer;

/// Hard ceiling on simultaneous requests a single sensor will serve.
pub const SENSOR_MAX_CONCURRENT: usize = 3;

/// Fetch engine configuration.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    /// Simultaneous requests per sensor, `1..=3`.
    pub max_per_sensor: usize,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout, including the body.
    pub request_timeout: Duration,
    /// Decode the first record of each payload before writing.
    pub validate_records: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_per_sensor: SENSOR_MAX_CONCURRENT,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            validate_records: true,
        }
    }
}

/// What happened to one planned chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Payload written to the outfile.
    Written {
        /// Bytes written.
        bytes: usize,
    },
    /// Outfile already existed; the sensor was not contacted.
    SkippedExisting,
    /// Sensor answered with an empty body; nothing written.
    Empty,
    /// Request or write failed; the batch carries on.
    Failed {
        /// Human-readable failure cause.
        reason: String,
    },
}

/// Per-chunk result, one per input plan.
#[derive(Clone, Debug)]
pub struct FetchOutcome {
    /// Stream the chunk belongs to.
    pub channel: ChannelId,
    /// Nominal chunk start.
    pub chunk_start: DateTime<Utc>,
    /// Destination file.
    pub outfile: std::path::PathBuf,
    /// What happened.
    pub kind: OutcomeKind,
}

impl FetchOutcome {
    fn new(plan: &ChunkPlan, kind: OutcomeKind) -> Self {
        Self {
            channel: plan.channel.clone(),
            chunk_start: plan.chunk_start,
            outfile: plan.outfile.clone(),
            kind,
        }
    }
}

/// Summary of a completed batch.
#[derive(Clone, Debug, Default)]
pub struct FetchReport {
    /// All per-chunk outcomes, in completion order.
    pub outcomes: Vec<FetchOutcome>,
}

impl FetchReport {
    /// Chunks written to disk.
    pub fn written(&self) -> usize {
        self.count(|k| matches!(k, OutcomeKind::Written { .. }))
    }

    /// Chunks skipped because the outfile already existed.
    pub fn skipped(&self) -> usize {
        self.count(|k| matches!(k, OutcomeKind::SkippedExisting))
    }

    /// Chunks the sensor had no data for.
    pub fn empty(&self) -> usize {
        self.count(|k| matches!(k, OutcomeKind::Empty))
    }

    /// Chunks that failed.
    pub fn failed(&self) -> usize {
        self.count(|k| matches!(k, OutcomeKind::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&OutcomeKind) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.kind)).count()
    }
}

struct Job {
    url: String,
    plan: ChunkPlan,
    semaphore: Arc<Semaphore>,
}

pub(crate) struct PreparedBatch {
    pub(crate) skipped: Vec<FetchOutcome>,
    jobs: Vec<Job>,
}

/// HTTP fetch engine.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Clone, Debug)]
pub struct FetchClient {
    http: reqwest::Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Build a client, validating the per-sensor concurrency cap.
    pub fn new(config: FetchConfig) -> Result<Self> {
        if config.max_per_sensor == 0 || config.max_per_sensor > SENSOR_MAX_CONCURRENT {
            return Err(ClientError::ConcurrencyLimit {
                requested: config.max_per_sensor,
                max: SENSOR_MAX_CONCURRENT,
            });
        }
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Resolve addresses, filter out plans whose outfile already exists,
    /// and attach one semaphore per sensor.
    ///
    /// An unregistered station is a planning error and fails the whole
    /// batch before any request is issued.
    pub(crate) fn prepare(
        &self,
        registry: &StationRegistry,
        plans: &[ChunkPlan],
    ) -> Result<PreparedBatch> {
        let mut semaphores: HashMap<SensorAddr, Arc<Semaphore>> = HashMap::new();
        let mut skipped = Vec::new();
        let mut jobs = Vec::new();

        for plan in plans {
            let addr = registry.get(&plan.channel.station)?;
            if plan.outfile.exists() {
                debug!(outfile = %plan.outfile.display(), "outfile exists, skipping");
                skipped.push(FetchOutcome::new(plan, OutcomeKind::SkippedExisting));
                continue;
            }
            let semaphore = semaphores
                .entry(addr.clone())
                .or_insert_with(|| Arc::new(Semaphore::new(self.config.max_per_sensor)))
                .clone();
            jobs.push(Job {
                url: data_url(addr, &plan.channel, &plan.query),
                plan: plan.clone(),
                semaphore,
            });
        }

        info!(
            total = plans.len(),
            skipped = skipped.len(),
            sensors = semaphores.len(),
            "prepared fetch batch"
        );
        Ok(PreparedBatch { skipped, jobs })
    }

    pub(crate) fn spawn_jobs(&self, batch: PreparedBatch) -> (Vec<FetchOutcome>, JoinSet<FetchOutcome>) {
        let mut set = JoinSet::new();
        for job in batch.jobs {
            let http = self.http.clone();
            let validate = self.config.validate_records;
            set.spawn(async move {
                fetch_one(http, job.semaphore, job.url, job.plan, validate).await
            });
        }
        (batch.skipped, set)
    }

    /// Download every plan in the batch, returning when all are done.
    ///
    /// Per-chunk failures are recorded in the report, not propagated; a
    /// dead sensor must not sink the rest of the network.
    pub async fn fetch_plan(
        &self,
        registry: &StationRegistry,
        plans: &[ChunkPlan],
    ) -> Result<FetchReport> {
        let batch = self.prepare(registry, plans)?;
        let (mut outcomes, mut set) = self.spawn_jobs(batch);
        while let Some(joined) = set.join_next().await {
            outcomes.push(joined?);
        }
        let report = FetchReport { outcomes };
        info!(
            written = report.written(),
            skipped = report.skipped(),
            empty = report.empty(),
            failed = report.failed(),
            "fetch batch complete"
        );
        Ok(report)
    }
}

/// Run one download to completion under the sensor's semaphore.
///
/// Infallible by construction: every error becomes a `Failed` outcome.
async fn fetch_one(
    http: reqwest::Client,
    semaphore: Arc<Semaphore>,
    url: String,
    plan: ChunkPlan,
    validate: bool,
) -> FetchOutcome {
    // Closed only if the semaphore is dropped, which we never do
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            return FetchOutcome::new(
                &plan,
                OutcomeKind::Failed {
                    reason: "sensor semaphore closed".to_owned(),
                },
            );
        }
    };
    debug!(%url, "requesting chunk");
    let kind = match request_bytes(&http, &url).await {
        Ok(data) if data.is_empty() => {
            warn!(channel = %plan.channel, chunk = %plan.chunk_start, "sensor returned no data");
            OutcomeKind::Empty
        }
        Ok(data) => match writer::write_chunk(&plan.outfile, &data, validate).await {
            Ok(bytes) => OutcomeKind::Written { bytes },
            Err(err) => {
                warn!(outfile = %plan.outfile.display(), %err, "write failed");
                OutcomeKind::Failed {
                    reason: err.to_string(),
                }
            }
        },
        Err(err) => {
            warn!(%url, %err, "request failed");
            OutcomeKind::Failed {
                reason: err.to_string(),
            }
        }
    };
    FetchOutcome::new(&plan, kind)
}

async fn request_bytes(http: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = http.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}
