//! Event log recovery
//!
//! Replays the log on startup and trims a torn tail left by a crash.

use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::error::Result;
use super::{EventLogReader, EventRecord, Frame};

/// Handles log replay after restart
pub struct EventLogRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of records successfully recovered
    pub records_recovered: u64,

    /// Number of complete but corrupted records skipped
    pub records_corrupted: u64,

    /// Highest valid sequence number (0 if none)
    pub last_seq: u64,

    /// Whether a torn tail was (or, for verify, would be) removed
    pub was_truncated: bool,
}

impl EventLogRecovery {
    /// Recover records from a log file
    ///
    /// This will:
    /// 1. Read all valid records
    /// 2. Skip complete records whose checksum fails
    /// 3. Truncate a partial record at the end
    /// 4. Return all valid records in order
    ///
    /// A missing file recovers to an empty history.
    pub fn recover(path: &Path) -> Result<(Vec<EventRecord>, RecoveryResult)> {
        if !path.exists() {
            return Ok((Vec::new(), RecoveryResult::default()));
        }

        let (records, result, valid_len) = Self::scan(path)?;
        if result.was_truncated {
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(valid_len)?;
            file.sync_all()?;
            tracing::warn!(
                "Event log {} truncated to {} bytes after torn record",
                path.display(),
                valid_len
            );
        }

        Ok((records, result))
    }

    /// Verify integrity of a log file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        let (_, result, _) = Self::scan(path)?;
        Ok(result)
    }

    fn scan(path: &Path) -> Result<(Vec<EventRecord>, RecoveryResult, u64)> {
        let file_len = fs::metadata(path)?.len();
        let mut reader = EventLogReader::open(path)?;
        let mut records = Vec::new();
        let mut result = RecoveryResult::default();

        while let Some(frame) = reader.next_frame()? {
            match frame {
                Frame::Record(record) => {
                    result.records_recovered += 1;
                    result.last_seq = result.last_seq.max(record.seq);
                    records.push(record);
                }
                Frame::Corrupt { seq } => {
                    tracing::warn!("Skipping corrupt event record {}", seq);
                    result.records_corrupted += 1;
                }
                Frame::Torn => break,
            }
        }

        let valid_len = reader.offset();
        result.was_truncated = valid_len < file_len;
        Ok((records, result, valid_len))
    }
}
