use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A half-open UTC time interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window, rejecting `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(CoreError::WindowOrder { start, end });
        }
        Ok(Self { start, end })
    }

    /// Start of the window.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End of the window.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Length of the window.
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// True if `t` lies within `[start, end)`.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }

    /// Iterate over chunk start times at `chunk` intervals.
    ///
    /// Yields `start`, `start + chunk`, ... while strictly before `end`;
    /// the final chunk may be partial. Fails on non-positive `chunk`.
    pub fn chunks(&self, chunk: TimeDelta) -> Result<ChunkIter> {
        if chunk <= TimeDelta::zero() {
            return Err(CoreError::NonPositiveChunk(chunk.num_seconds()));
        }
        Ok(ChunkIter {
            next: self.start,
            end: self.end,
            chunk,
        })
    }

    /// Iterate over day start times covered by this window.
    pub fn days(&self) -> ChunkIter {
        ChunkIter {
            next: self.start,
            end: self.end,
            chunk: TimeDelta::days(1),
        }
    }

    /// Expand both ends by `buffer`.
    ///
    /// Chunk queries are buffered so adjacent chunks overlap and no
    /// samples are lost at chunk boundaries.
    pub fn buffered(&self, buffer: TimeDelta) -> Self {
        Self {
            start: self.start - buffer,
            end: self.end + buffer,
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// Iterator over chunk start times, produced by [`TimeWindow::chunks`].
#[derive(Clone, Debug)]
pub struct ChunkIter {
    next: DateTime<Utc>,
    end: DateTime<Utc>,
    chunk: TimeDelta,
}

impl Iterator for ChunkIter {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<DateTime<Utc>> {
        if self.next >= self.end {
            return None;
        }
        let current = self.next;
        self.next += self.chunk;
        Some(current)
    }
}
