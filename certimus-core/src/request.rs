//! Request URL forming for the two supported services.
//!
//! Certimus-like sensors answer a plain HTTP data endpoint:
//! `http://<addr>/data?channel=<NET.STA.LOC.CHA>&from=<unix>&to=<unix>`
//!
//! FDSNWS dataselect (v1.1) uses named query parameters with ISO-8601
//! timestamps instead. The two are not interchangeable.

use serde::{Deserialize, Serialize};

use crate::channel::ChannelId;
use crate::error::{CoreError, Result};
use crate::time::TimeWindow;

/// Validated sensor address: dotted-quad IPv4 with optional `:port`.
///
/// The port carries any forwarding needed to reach a remotely deployed
/// instrument.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SensorAddr(String);

impl SensorAddr {
    /// Parse and validate `a.b.c.d` or `a.b.c.d:port`.
    pub fn parse(s: &str) -> Result<Self> {
        let (host, port) = match s.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (s, None),
        };
        if let Some(port) = port
            && port.parse::<u16>().is_err()
        {
            return Err(CoreError::InvalidSensorAddr(format!(
                "bad port in {s:?}"
            )));
        }
        let octets: Vec<&str> = host.split('.').collect();
        if octets.len() != 4 || octets.iter().any(|o| o.parse::<u8>().is_err()) {
            return Err(CoreError::InvalidSensorAddr(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }

    /// The address as given, including any port.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SensorAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SensorAddr {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<SensorAddr> for String {
    fn from(addr: SensorAddr) -> String {
        addr.0
    }
}

/// Form a Certimus data request URL for a channel and query window.
pub fn data_url(addr: &SensorAddr, id: &ChannelId, window: &TimeWindow) -> String {
    format!(
        "http://{addr}/data?channel={id}&from={}&to={}",
        window.start().timestamp(),
        window.end().timestamp()
    )
}

/// Form an FDSNWS dataselect query URL.
///
/// `nodata=404` makes empty selections an HTTP error rather than an
/// empty 204 body, so they surface as per-chunk failures.
pub fn fdsnws_url(base: &str, id: &ChannelId, window: &TimeWindow) -> String {
    let base = base.trim_end_matches('/');
    format!(
        "{base}/query?network={}&station={}&location={}&channel={}&starttime={}&endtime={}&nodata=404",
        id.network,
        id.station,
        id.location,
        id.channel,
        window.start().format("%Y-%m-%dT%H:%M:%S"),
        window.end().format("%Y-%m-%dT%H:%M:%S")
    )
}
