//! Gzip payload handling

use crate::error::{IngestError, IngestResult};
use flate2::read::GzDecoder;
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns true if the payload starts with the gzip magic bytes
pub fn is_gzip(payload: &[u8]) -> bool {
    payload.starts_with(&GZIP_MAGIC)
}

/// Decompress a complete gzip payload.
pub fn gunzip(payload: &[u8]) -> IngestResult<Vec<u8>> {
    if !is_gzip(payload) {
        return Err(IngestError::NotGzip(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "missing gzip header",
        )));
    }
    let mut decoded = Vec::new();
    GzDecoder::new(payload)
        .read_to_end(&mut decoded)
        .map_err(IngestError::NotGzip)?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_gunzip() {
        let payload = gzip(br#"{"processId": "p"}"#);
        assert!(is_gzip(&payload));
        assert_eq!(gunzip(&payload).unwrap(), br#"{"processId": "p"}"#);
    }

    #[test]
    fn test_plain_payload_is_rejected() {
        let err = gunzip(b"{}").unwrap_err();
        assert!(matches!(err, IngestError::NotGzip(_)));
        assert!(err.to_string().starts_with("[I001]"));
    }

    #[test]
    fn test_truncated_payload_is_rejected() {
        let payload = gzip(b"some lineage payload that gets cut short");
        assert!(gunzip(&payload[..payload.len() / 2]).is_err());
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert!(!is_gzip(&[]));
        assert!(gunzip(&[]).is_err());
    }
}
