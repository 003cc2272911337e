use std::collections::HashMap;
use std::path::Path;

use certimus_rs_core::SensorAddr;
use tracing::info;

use crate::error::{ClientError, Result};

/// Station code → sensor address map.
///
/// Deployments usually keep the map in a JSON object file
/// (`{"STA1": "192.168.1.1", ...}`) so addresses stay out of version
/// control. Every address is validated on load.
#[derive(Clone, Debug, Default)]
pub struct StationRegistry {
    addrs: HashMap<String, SensorAddr>,
}

impl StationRegistry {
    /// Build a registry from raw station → address strings.
    pub fn from_map(raw: HashMap<String, String>) -> Result<Self> {
        let mut addrs = HashMap::with_capacity(raw.len());
        for (station, addr) in raw {
            let addr = SensorAddr::parse(&addr)?;
            addrs.insert(station, addr);
        }
        Ok(Self { addrs })
    }

    /// Load a registry from a JSON object file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let raw: HashMap<String, String> = serde_json::from_str(&text)?;
        let registry = Self::from_map(raw)?;
        info!(path = %path.display(), stations = registry.len(), "loaded station addresses");
        Ok(registry)
    }

    /// Add or replace one station's address.
    pub fn insert(&mut self, station: &str, addr: SensorAddr) {
        self.addrs.insert(station.to_owned(), addr);
    }

    /// Look up the sensor address for a station.
    pub fn get(&self, station: &str) -> Result<&SensorAddr> {
        self.addrs
            .get(station)
            .ok_or_else(|| ClientError::UnknownStation(station.to_owned()))
    }

    /// Number of registered stations.
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// True if no stations are registered.
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// Iterate over registered station codes.
    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.addrs.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn from_map_validates_addresses() {
        let mut raw = HashMap::new();
        raw.insert("NYM1".to_owned(), "192.168.1.1".to_owned());
        raw.insert("NYM2".to_owned(), "10.0.0.2:8080".to_owned());
        let registry = StationRegistry::from_map(raw).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("NYM1").unwrap().as_str(), "192.168.1.1");
    }

    #[test]
    fn from_map_rejects_bad_address() {
        let mut raw = HashMap::new();
        raw.insert("NYM1".to_owned(), "not-an-ip".to_owned());
        assert!(StationRegistry::from_map(raw).is_err());
    }

    #[test]
    fn unknown_station() {
        let registry = StationRegistry::default();
        let err = registry.get("NYM9").unwrap_err();
        assert!(matches!(err, ClientError::UnknownStation(_)));
    }

    #[test]
    fn from_json_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"NYM1": "192.168.1.1", "NYM2": "192.168.1.2:8080"}}"#).unwrap();
        let registry = StationRegistry::from_json_file(file.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("NYM2").unwrap().as_str(), "192.168.1.2:8080");
    }

    #[test]
    fn from_json_file_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            StationRegistry::from_json_file(file.path()),
            Err(ClientError::Json(_))
        ));
    }

    #[test]
    fn from_json_file_missing() {
        let result = StationRegistry::from_json_file(Path::new("/nonexistent/ips.json"));
        assert!(matches!(result, Err(ClientError::Io(_))));
    }
}
