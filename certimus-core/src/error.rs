use chrono::{DateTime, Utc};

/// Errors from the conventions layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A SEED code field failed validation (bad length or characters).
    #[error("invalid channel id: {0}")]
    InvalidChannelId(String),

    /// Sensor address is not a dotted-quad IPv4 with optional port.
    #[error("invalid sensor address: {0}")]
    InvalidSensorAddr(String),

    /// Window start lies after its end.
    #[error("window start {start} is after end {end}")]
    WindowOrder {
        /// Requested start of the window.
        start: DateTime<Utc>,
        /// Requested end of the window.
        end: DateTime<Utc>,
    },

    /// Chunk size must be strictly positive.
    #[error("chunk size must be positive, got {0} seconds")]
    NonPositiveChunk(i64),

    /// A file name does not follow the chunk naming convention.
    #[error("invalid chunk filename: {0}")]
    InvalidFilename(String),
}

/// Convenience alias for `Result<T, CoreError>`.
pub type Result<T> = std::result::Result<T, CoreError>;
