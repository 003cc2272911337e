use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ClientError, Result};

/// miniSEED v2 record length produced by Certimus-class digitizers.
pub(crate) const RECORD_LEN: usize = 512;

/// Sanity-check a downloaded payload as miniSEED.
///
/// Payloads that are a whole number of 512-byte records must have a
/// decodable first record. Other sizes (variable record length) are
/// accepted with a warning rather than rejected.
pub fn validate_payload(data: &[u8]) -> Result<()> {
    if data.len() >= RECORD_LEN && data.len() % RECORD_LEN == 0 {
        miniseed_rs::decode(&data[..RECORD_LEN])?;
    } else {
        warn!(len = data.len(), "payload is not a multiple of 512 bytes, skipping validation");
    }
    Ok(())
}

/// Write one downloaded chunk beneath the archive tree.
///
/// Creates the date directories as needed. Refuses zero-byte payloads;
/// an empty response must never leave a zero-byte file behind.
pub async fn write_chunk(outfile: &Path, data: &[u8], validate: bool) -> Result<usize> {
    if data.is_empty() {
        return Err(ClientError::EmptyPayload(outfile.display().to_string()));
    }
    if validate {
        validate_payload(data)?;
    }
    if let Some(parent) = outfile.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(outfile, data).await?;
    debug!(outfile = %outfile.display(), bytes = data.len(), "wrote chunk");
    Ok(data.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_creates_date_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let outfile = dir
            .path()
            .join("2026/01/01/OX.STA1.00.HHZ.20260101T000000.mseed");
        let data = vec![1u8; 64];
        let n = write_chunk(&outfile, &data, false).await.unwrap();
        assert_eq!(n, 64);
        assert_eq!(std::fs::read(&outfile).unwrap(), data);
    }

    #[tokio::test]
    async fn write_rejects_empty_payload() {
        let dir = tempfile::tempdir().unwrap();
        let outfile = dir.path().join("chunk.mseed");
        let err = write_chunk(&outfile, &[], false).await.unwrap_err();
        assert!(matches!(err, ClientError::EmptyPayload(_)));
        assert!(!outfile.exists());
    }

    #[test]
    fn validate_accepts_unusual_length_with_warning() {
        // Not a multiple of 512 — validation is skipped, not failed
        assert!(validate_payload(&[0u8; 100]).is_ok());
    }
}
