/// Errors that can occur during retrieval and archive operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Filesystem I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error or error status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid JSON in a station address file or gap file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid channel id, address, or window from the conventions layer.
    #[error(transparent)]
    Core(#[from] certimus_rs_core::CoreError),

    /// Downloaded payload is not a decodable miniSEED record.
    #[error("miniseed error: {0}")]
    Miniseed(#[from] miniseed_rs::MseedError),

    /// Station has no address in the registry.
    #[error("no sensor address registered for station {0:?}")]
    UnknownStation(String),

    /// Requested per-sensor concurrency exceeds what the hardware supports.
    #[error("max_per_sensor {requested} outside supported range 1..={max}")]
    ConcurrencyLimit {
        /// The configured value.
        requested: usize,
        /// Hard limit of the sensor hardware.
        max: usize,
    },

    /// Refusing to write a zero-byte chunk file.
    #[error("empty payload for {0}")]
    EmptyPayload(String),

    /// A spawned download task panicked or was cancelled.
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Convenience alias for `Result<T, ClientError>`.
pub type Result<T> = std::result::Result<T, ClientError>;
