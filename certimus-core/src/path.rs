//! Archive path conventions.
//!
//! Downloaded chunks live in a date-partitioned tree:
//! `<data_dir>/<YYYY>/<MM>/<DD>/<NET>.<STA>.<LOC>.<CHA>.<YYYYMMDD>T<HHMMSS>.mseed`
//!
//! The SEED-compliant re-layout used by the renamer groups day files by
//! station instead:
//! `<archive>/<YYYY>/<NET>/<STA>/<CHA>/<NET>.<STA>.<LOC>.<CHA>.<YYYY>.<DDD>.mseed`

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::channel::ChannelId;
use crate::error::{CoreError, Result};

/// Compact `YYYYMMDDTHHMMSS` timestamp used in chunk file names.
pub fn chunk_timestamp(t: DateTime<Utc>) -> String {
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}",
        t.year(),
        t.month(),
        t.day(),
        t.hour(),
        t.minute(),
        t.second()
    )
}

/// Day directory `<data_dir>/<YYYY>/<MM>/<DD>` for a given instant.
pub fn day_dir(data_dir: &Path, t: DateTime<Utc>) -> PathBuf {
    data_dir
        .join(format!("{:04}", t.year()))
        .join(format!("{:02}", t.month()))
        .join(format!("{:02}", t.day()))
}

/// Full path of the chunk file starting at `start`.
pub fn chunk_path(data_dir: &Path, id: &ChannelId, start: DateTime<Utc>) -> PathBuf {
    day_dir(data_dir, start).join(format!("{id}.{}.mseed", chunk_timestamp(start)))
}

/// Parse a chunk file name back into its channel id and start time.
pub fn parse_chunk_filename(name: &str) -> Result<(ChannelId, DateTime<Utc>)> {
    let stem = name
        .strip_suffix(".mseed")
        .ok_or_else(|| CoreError::InvalidFilename(name.to_owned()))?;
    // NET.STA.LOC.CHA.YYYYMMDDTHHMMSS — timestamp is the fifth dot field
    let (codes, stamp) = stem
        .rsplit_once('.')
        .ok_or_else(|| CoreError::InvalidFilename(name.to_owned()))?;
    let id = ChannelId::parse(codes)?;
    let naive = NaiveDateTime::parse_from_str(stamp, "%Y%m%dT%H%M%S")
        .map_err(|_| CoreError::InvalidFilename(name.to_owned()))?;
    Ok((id, Utc.from_utc_datetime(&naive)))
}

/// SEED-compliant day file path:
/// `<archive>/<YYYY>/<NET>/<STA>/<CHA>/<NET>.<STA>.<LOC>.<CHA>.<YYYY>.<DDD>.mseed`.
pub fn seed_day_path(archive_dir: &Path, id: &ChannelId, day: NaiveDate) -> PathBuf {
    archive_dir
        .join(format!("{:04}", day.year()))
        .join(&id.network)
        .join(&id.station)
        .join(&id.channel)
        .join(format!("{id}.{:04}.{:03}.mseed", day.year(), day.ordinal()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn chunk_path_matches_convention() {
        let id = ChannelId::new("OX", "STA1", "00", "HHZ").unwrap();
        let path = chunk_path(Path::new("/data"), &id, utc(2026, 1, 1, 12, 0, 0));
        assert_eq!(
            path,
            PathBuf::from("/data/2026/01/01/OX.STA1.00.HHZ.20260101T120000.mseed")
        );
    }

    #[test]
    fn chunk_path_zero_pads() {
        let id = ChannelId::new("OX", "NYM2", "00", "HHN").unwrap();
        let path = chunk_path(Path::new("/data"), &id, utc(2026, 3, 5, 1, 2, 3));
        assert_eq!(
            path,
            PathBuf::from("/data/2026/03/05/OX.NYM2.00.HHN.20260305T010203.mseed")
        );
    }

    #[test]
    fn parse_chunk_filename_roundtrip() {
        let id = ChannelId::new("OX", "STA1", "00", "HHZ").unwrap();
        let start = utc(2026, 1, 1, 12, 0, 0);
        let path = chunk_path(Path::new("/data"), &id, start);
        let name = path.file_name().unwrap().to_str().unwrap();
        let (parsed_id, parsed_start) = parse_chunk_filename(name).unwrap();
        assert_eq!(parsed_id, id);
        assert_eq!(parsed_start, start);
    }

    #[test]
    fn parse_chunk_filename_empty_location() {
        let (id, _) = parse_chunk_filename("IU.ANMO..BHZ.20260101T000000.mseed").unwrap();
        assert_eq!(id.location, "");
    }

    #[test]
    fn parse_chunk_filename_rejects_garbage() {
        assert!(parse_chunk_filename("notes.txt").is_err());
        assert!(parse_chunk_filename("OX.STA1.00.HHZ.mseed").is_err());
        assert!(parse_chunk_filename("OX.STA1.00.HHZ.20261301T000000.mseed").is_err());
        assert!(parse_chunk_filename("OX.STA1.00.HHZ.20260101T120000").is_err());
    }

    #[test]
    fn seed_day_path_layout() {
        let id = ChannelId::new("3N", "NYM1", "00", "HHZ").unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let path = seed_day_path(Path::new("/archive"), &id, day);
        assert_eq!(
            path,
            PathBuf::from("/archive/2026/3N/NYM1/HHZ/3N.NYM1.00.HHZ.2026.032.mseed")
        );
    }
}
