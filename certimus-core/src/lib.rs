//! Conventions shared by the Certimus retrieval pipeline.
//!
//! Station identity, time windows and chunk iteration, request URL
//! forming, and the date-partitioned archive path scheme. This crate
//! does no I/O; the client and CLI crates build on it.

pub mod channel;
pub mod error;
pub mod path;
pub mod plan;
pub mod request;
pub mod time;

pub use channel::ChannelId;
pub use error::{CoreError, Result};
pub use path::{chunk_path, parse_chunk_filename, seed_day_path};
pub use plan::{
    ChunkPlan, DEFAULT_BUFFER_SECS, DEFAULT_CHUNK_HOURS, PlanConfig, expand_selection,
    plan_requests,
};
pub use request::{SensorAddr, data_url, fdsnws_url};
pub use time::TimeWindow;
