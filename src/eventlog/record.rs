//! Event record definitions
//!
//! Defines the structure and framing of individual log records.

use serde::{Deserialize, Serialize};

use crate::error::{ParkError, Result};
use crate::store::EventKind;

/// Frame header: seq (8) + crc (4) + len (4)
pub const HEADER_SIZE: usize = 16;

/// Upper bound on a record body; larger lengths mean a corrupt header
pub const MAX_RECORD_SIZE: usize = 64 * 1024;

/// A single entry in the event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Sequence number - monotonically increasing
    pub seq: u64,

    pub slot_id: String,

    pub kind: EventKind,

    /// Timestamp (unix millis) when the record was created
    pub timestamp_ms: u64,
}

impl EventRecord {
    pub fn new(seq: u64, slot_id: impl Into<String>, kind: EventKind) -> Self {
        Self {
            seq,
            slot_id: slot_id.into(),
            kind,
            timestamp_ms: crate::now_millis(),
        }
    }

    /// Encode the record body
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| ParkError::Serialization(e.to_string()))
    }

    /// Decode a record body
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| ParkError::Serialization(e.to_string()))
    }

    /// Checksum over the sequence number and body
    pub fn compute_crc(seq: u64, body: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&seq.to_be_bytes());
        hasher.update(body);
        hasher.finalize()
    }

    /// Full on-disk frame: header followed by body
    pub fn to_frame(&self) -> Result<Vec<u8>> {
        let body = self.serialize()?;
        let crc = Self::compute_crc(self.seq, &body);

        let mut frame = Vec::with_capacity(HEADER_SIZE + body.len());
        frame.extend_from_slice(&self.seq.to_be_bytes());
        frame.extend_from_slice(&crc.to_be_bytes());
        frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
        frame.extend_from_slice(&body);
        Ok(frame)
    }
}
