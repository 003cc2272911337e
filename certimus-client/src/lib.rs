//! Async retrieval client for Certimus/Minimus seismometers.
//!
//! Fetches miniSEED chunks over the sensor HTTP API into a
//! date-partitioned archive, scans the archive for coverage gaps, and
//! re-lays chunk files out under SEED-compliant day-file names.

pub mod archive;
pub mod error;
pub mod fetch;
pub mod gaps;
pub mod mock;
pub mod registry;
pub mod stream;
pub mod writer;

pub use archive::{RenameOutcome, rename_day, rename_range};
pub use error::{ClientError, Result};
pub use fetch::{FetchClient, FetchConfig, FetchOutcome, FetchReport, OutcomeKind};
pub use gaps::{Gap, gap_requests, read_gap_file, scan_gaps, write_gap_file};
pub use registry::StationRegistry;
pub use stream::outcome_stream;
