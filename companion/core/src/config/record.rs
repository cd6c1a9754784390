//! Persisted Record
//!
//! Fixed little-endian layout, CRC32 over everything before the trailer:
//!
//! ```text
//! offset  size  field
//!      0     1  version
//!      1     1  brightness
//!      2     2  dim timeout (s)
//!      4     2  sleep timeout (s)
//!      6     1  last display mode
//!      7     4  crc32
//! ```

use thiserror::Error;

use super::{DeviceConfig, CONFIG_VERSION};
use crate::mode::DisplayMode;

/// Encoded size in bytes
pub const RECORD_LEN: usize = 11;

const PAYLOAD_LEN: usize = RECORD_LEN - 4;

/// Why a stored record was rejected
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Fewer bytes than a full record
    #[error("record truncated: {len} of {RECORD_LEN} bytes")]
    Truncated {
        /// Bytes available
        len: usize,
    },

    /// Trailer does not match the payload
    #[error("record checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    Checksum {
        /// Trailer value
        stored: u32,
        /// Checksum of the payload
        computed: u32,
    },

    /// Written by a different layout version
    #[error("record version {found} does not match {expected}")]
    Version {
        /// Stored version
        found: u8,
        /// Version this build reads
        expected: u8,
    },
}

/// Serialise a config
#[must_use]
pub fn encode(config: &DeviceConfig) -> [u8; RECORD_LEN] {
    let mut buf = [0u8; RECORD_LEN];
    buf[0] = config.version;
    buf[1] = config.brightness;
    buf[2..4].copy_from_slice(&config.dim_timeout_secs.to_le_bytes());
    buf[4..6].copy_from_slice(&config.sleep_timeout_secs.to_le_bytes());
    buf[6] = config.last_mode.index();
    let crc = crc32fast::hash(&buf[..PAYLOAD_LEN]);
    buf[PAYLOAD_LEN..].copy_from_slice(&crc.to_le_bytes());
    buf
}

/// Parse a stored record
///
/// Trailing bytes past [`RECORD_LEN`] are ignored. An out-of-range mode
/// is read as `Face`.
pub fn decode(bytes: &[u8]) -> Result<DeviceConfig, RecordError> {
    let Some(record) = bytes.get(..RECORD_LEN) else {
        return Err(RecordError::Truncated { len: bytes.len() });
    };

    let (payload, trailer) = record.split_at(PAYLOAD_LEN);
    let stored = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    let computed = crc32fast::hash(payload);
    if stored != computed {
        return Err(RecordError::Checksum { stored, computed });
    }

    if payload[0] != CONFIG_VERSION {
        return Err(RecordError::Version {
            found: payload[0],
            expected: CONFIG_VERSION,
        });
    }

    Ok(DeviceConfig {
        version: payload[0],
        brightness: payload[1],
        dim_timeout_secs: u16::from_le_bytes([payload[2], payload[3]]),
        sleep_timeout_secs: u16::from_le_bytes([payload[4], payload[5]]),
        last_mode: DisplayMode::from_persisted(payload[6]),
    })
}
