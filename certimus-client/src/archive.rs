//! SEED-compliant archive re-layout.
//!
//! Hourly chunk files are concatenated, in time order, into one file
//! per channel per day under
//! `<archive>/<YYYY>/<NET>/<STA>/<CHA>/<NET>.<STA>.<LOC>.<CHA>.<YYYY>.<DDD>.mseed`.
//! Temporary network codes assigned before a deployment is registered
//! can be rewritten to the permanent code in the record headers on the
//! way through.

use std::path::Path;

use certimus_rs_core::{ChannelId, TimeWindow, parse_chunk_filename, path::day_dir, seed_day_path};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::writer::RECORD_LEN;

/// Network code field of the miniSEED v2 fixed header.
const NETWORK_RANGE: std::ops::Range<usize> = 18..20;

/// What happened to one channel-day.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Day file written.
    Written {
        /// Number of 512-byte records in the day file.
        records: usize,
    },
    /// Day file already existed; nothing touched.
    SkippedExisting,
    /// No chunk files found for this channel-day.
    NoData,
}

/// Overwrite the network field of every record with `network`,
/// space-padded to the 2-byte header field.
fn remap_network(data: &mut [u8], network: &str) {
    let mut field = [b' '; 2];
    for (dst, src) in field.iter_mut().zip(network.bytes()) {
        *dst = src;
    }
    for record in data.chunks_exact_mut(RECORD_LEN) {
        record[NETWORK_RANGE].copy_from_slice(&field);
    }
}

fn chunk_files_for_day(
    data_dir: &Path,
    id: &ChannelId,
    day: NaiveDate,
) -> Result<Vec<(DateTime<Utc>, std::path::PathBuf)>> {
    let dir = day_dir(data_dir, midnight(day));
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Ok((file_id, start)) = parse_chunk_filename(name) else {
            continue;
        };
        if file_id == *id {
            files.push((start, entry.path()));
        }
    }
    files.sort();
    Ok(files)
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
}

/// Build the SEED day file for one channel and day.
///
/// Chunks whose size is not a whole number of records are skipped with
/// a warning rather than corrupting the day file. Existing day files
/// are never overwritten.
pub fn rename_day(
    data_dir: &Path,
    archive_dir: &Path,
    id: &ChannelId,
    target_network: Option<&str>,
    day: NaiveDate,
) -> Result<RenameOutcome> {
    let out_id = match target_network {
        Some(network) => id.with_network(network)?,
        None => id.clone(),
    };
    let outfile = seed_day_path(archive_dir, &out_id, day);
    if outfile.exists() {
        debug!(outfile = %outfile.display(), "day file exists, skipping");
        return Ok(RenameOutcome::SkippedExisting);
    }

    let mut data = Vec::new();
    for (start, path) in chunk_files_for_day(data_dir, id, day)? {
        let chunk = std::fs::read(&path)?;
        if chunk.is_empty() || !chunk.len().is_multiple_of(RECORD_LEN) {
            warn!(
                path = %path.display(),
                len = chunk.len(),
                "chunk is not whole records, skipping"
            );
            continue;
        }
        debug!(chunk = %start, bytes = chunk.len(), "appending chunk");
        data.extend_from_slice(&chunk);
    }
    if data.is_empty() {
        return Ok(RenameOutcome::NoData);
    }
    if target_network.is_some() {
        remap_network(&mut data, &out_id.network);
    }

    if let Some(parent) = outfile.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&outfile, &data)?;
    let records = data.len() / RECORD_LEN;
    info!(outfile = %outfile.display(), records, "wrote day file");
    Ok(RenameOutcome::Written { records })
}

/// Re-layout every channel-day covered by the requests.
///
/// Returns one outcome per channel-day, in scan order.
pub fn rename_range(
    data_dir: &Path,
    archive_dir: &Path,
    requests: &[(ChannelId, TimeWindow)],
    target_network: Option<&str>,
) -> Result<Vec<(ChannelId, NaiveDate, RenameOutcome)>> {
    let mut outcomes = Vec::new();
    for (id, window) in requests {
        for day_start in window.days() {
            let day = day_start.date_naive();
            let outcome = rename_day(data_dir, archive_dir, id, target_network, day)?;
            outcomes.push((id.clone(), day, outcome));
        }
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use certimus_rs_core::chunk_path;
    use chrono::{TimeZone, Utc};

    // A fake 512-byte record carrying the channel codes at the v2
    // fixed-header offsets (station 8..13, network 18..20).
    fn record(id: &ChannelId, fill: u8) -> Vec<u8> {
        let mut rec = vec![fill; RECORD_LEN];
        rec[0..6].copy_from_slice(b"000001");
        rec[6] = b'D';
        rec[8..13].copy_from_slice(b"     ");
        rec[8..8 + id.station.len()].copy_from_slice(id.station.as_bytes());
        rec[18..20].copy_from_slice(b"  ");
        rec[18..18 + id.network.len()].copy_from_slice(id.network.as_bytes());
        rec
    }

    fn write_chunk_file(data_dir: &Path, id: &ChannelId, hour: u32, records: usize) {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap();
        let path = chunk_path(data_dir, id, start);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut data = Vec::new();
        for _ in 0..records {
            data.extend_from_slice(&record(id, hour as u8));
        }
        std::fs::write(path, data).unwrap();
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    #[test]
    fn concatenates_chunks_in_time_order() {
        let dir = tempfile::tempdir().unwrap();
        let id = ChannelId::new("OX", "NYM1", "00", "HHZ").unwrap();
        // written out of order on purpose
        write_chunk_file(dir.path(), &id, 2, 1);
        write_chunk_file(dir.path(), &id, 0, 1);
        write_chunk_file(dir.path(), &id, 1, 1);

        let archive = dir.path().join("archive");
        let outcome = rename_day(dir.path(), &archive, &id, None, day()).unwrap();
        assert_eq!(outcome, RenameOutcome::Written { records: 3 });

        let outfile = seed_day_path(&archive, &id, day());
        let data = std::fs::read(outfile).unwrap();
        // fill byte encodes the source hour
        assert_eq!(data[RECORD_LEN - 1], 0);
        assert_eq!(data[2 * RECORD_LEN - 1], 1);
        assert_eq!(data[3 * RECORD_LEN - 1], 2);
    }

    #[test]
    fn remaps_network_in_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let id = ChannelId::new("OX", "NYM1", "00", "HHZ").unwrap();
        write_chunk_file(dir.path(), &id, 0, 3);

        let archive = dir.path().join("archive");
        rename_day(dir.path(), &archive, &id, Some("3N"), day()).unwrap();

        let out_id = id.with_network("3N").unwrap();
        let data = std::fs::read(seed_day_path(&archive, &out_id, day())).unwrap();
        for rec in data.chunks_exact(RECORD_LEN) {
            assert_eq!(&rec[18..20], b"3N");
            // station field untouched
            assert_eq!(&rec[8..13], b"NYM1 ");
        }
    }

    #[test]
    fn existing_day_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let id = ChannelId::new("OX", "NYM1", "00", "HHZ").unwrap();
        write_chunk_file(dir.path(), &id, 0, 1);

        let archive = dir.path().join("archive");
        let outfile = seed_day_path(&archive, &id, day());
        std::fs::create_dir_all(outfile.parent().unwrap()).unwrap();
        std::fs::write(&outfile, b"existing").unwrap();

        let outcome = rename_day(dir.path(), &archive, &id, None, day()).unwrap();
        assert_eq!(outcome, RenameOutcome::SkippedExisting);
        assert_eq!(std::fs::read(outfile).unwrap(), b"existing");
    }

    #[test]
    fn missing_day_reports_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let id = ChannelId::new("OX", "NYM1", "00", "HHZ").unwrap();
        let outcome =
            rename_day(dir.path(), dir.path().join("archive").as_path(), &id, None, day())
                .unwrap();
        assert_eq!(outcome, RenameOutcome::NoData);
    }

    #[test]
    fn ragged_chunks_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let id = ChannelId::new("OX", "NYM1", "00", "HHZ").unwrap();
        write_chunk_file(dir.path(), &id, 0, 2);
        // truncated chunk at 01:00
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 1, 0, 0).unwrap();
        let path = chunk_path(dir.path(), &id, start);
        std::fs::write(path, vec![0u8; 100]).unwrap();

        let archive = dir.path().join("archive");
        let outcome = rename_day(dir.path(), &archive, &id, None, day()).unwrap();
        assert_eq!(outcome, RenameOutcome::Written { records: 2 });
    }

    #[test]
    fn rename_range_covers_all_days() {
        let dir = tempfile::tempdir().unwrap();
        let id = ChannelId::new("OX", "NYM1", "00", "HHZ").unwrap();
        write_chunk_file(dir.path(), &id, 0, 1);

        let window = TimeWindow::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 3, 0, 0, 0).unwrap(),
        )
        .unwrap();
        let archive = dir.path().join("archive");
        let outcomes =
            rename_range(dir.path(), &archive, &[(id, window)], None).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].2, RenameOutcome::Written { records: 1 });
        assert_eq!(outcomes[1].2, RenameOutcome::NoData);
    }
}
