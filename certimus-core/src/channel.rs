use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// SEED stream identity: network, station, location, and channel codes.
///
/// Textual form is `NET.STA.LOC.CHA`, e.g. `OX.STA1.00.HHZ`. The same
/// 4-tuple keys every file the pipeline writes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId {
    /// FDSN network code, 1-2 chars (e.g. `"OX"`).
    pub network: String,
    /// Station code, 1-5 chars (e.g. `"STA1"`).
    pub station: String,
    /// Location code, 0-2 chars (e.g. `"00"`, may be empty).
    pub location: String,
    /// Channel code, 1-3 chars (e.g. `"HHZ"`).
    pub channel: String,
}

fn valid_code(code: &str, min: usize, max: usize) -> bool {
    code.len() >= min && code.len() <= max && code.chars().all(|c| c.is_ascii_alphanumeric())
}

impl ChannelId {
    /// Build a validated channel id from its four SEED codes.
    pub fn new(network: &str, station: &str, location: &str, channel: &str) -> Result<Self> {
        if !valid_code(network, 1, 2) {
            return Err(CoreError::InvalidChannelId(format!(
                "network {network:?} must be 1-2 alphanumeric chars"
            )));
        }
        if !valid_code(station, 1, 5) {
            return Err(CoreError::InvalidChannelId(format!(
                "station {station:?} must be 1-5 alphanumeric chars"
            )));
        }
        if !valid_code(location, 0, 2) {
            return Err(CoreError::InvalidChannelId(format!(
                "location {location:?} must be 0-2 alphanumeric chars"
            )));
        }
        if !valid_code(channel, 1, 3) {
            return Err(CoreError::InvalidChannelId(format!(
                "channel {channel:?} must be 1-3 alphanumeric chars"
            )));
        }
        Ok(Self {
            network: network.to_owned(),
            station: station.to_owned(),
            location: location.to_owned(),
            channel: channel.to_owned(),
        })
    }

    /// Parse the dotted form `NET.STA.LOC.CHA`.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 4 {
            return Err(CoreError::InvalidChannelId(format!(
                "expected NET.STA.LOC.CHA, got {s:?}"
            )));
        }
        Self::new(parts[0], parts[1], parts[2], parts[3])
    }

    /// Return a copy with the network code replaced.
    ///
    /// Used when re-archiving data recorded under an internal network
    /// code (e.g. `OX`) under its registered FDSN code (e.g. `3N`).
    pub fn with_network(&self, network: &str) -> Result<Self> {
        Self::new(network, &self.station, &self.location, &self.channel)
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }
}
