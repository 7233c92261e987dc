//! Event log writer
//!
//! Handles appending records to the log file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::config::EventSyncStrategy;
use crate::error::{ParkError, Result};
use crate::store::EventKind;
use super::EventRecord;

/// Appends records to the event log
///
/// The file never holds bytes past the last acknowledged record when an
/// append starts: a failed write or sync is rolled back, and any stray tail
/// found before the next append is cut off first.
pub struct EventLogWriter {
    file: File,

    /// Byte length up to the end of the last acknowledged record
    len: u64,

    /// Sequence number of the next record
    next_seq: u64,

    sync_strategy: EventSyncStrategy,

    /// Records written since the last fsync
    unsynced: usize,
}

impl EventLogWriter {
    /// Open or create a log file for appending
    ///
    /// `next_seq` continues numbering after any recovered records.
    pub fn open(path: &Path, sync_strategy: EventSyncStrategy, next_seq: u64) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            len,
            next_seq: next_seq.max(1),
            sync_strategy,
            unsynced: 0,
        })
    }

    /// Append one event, returning its record
    ///
    /// On error nothing is left on disk for this record and the sequence
    /// number is not consumed.
    pub fn append(&mut self, slot_id: &str, kind: EventKind) -> Result<EventRecord> {
        let record = EventRecord::new(self.next_seq, slot_id, kind);
        let frame = record.to_frame()?;

        self.discard_stray_tail()?;

        if let Err(e) = self.write_frame(&frame) {
            self.rollback();
            return Err(e);
        }

        self.len += frame.len() as u64;
        self.next_seq += 1;
        Ok(record)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Sequence number the next record will get
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Length of the acknowledged part of the file
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        // Single write so a crash leaves at most one torn frame at the tail
        self.file.write_all(frame)?;
        let unsynced = self.unsynced + 1;

        match self.sync_strategy {
            EventSyncStrategy::EveryWrite => self.sync(),
            EventSyncStrategy::EveryNEntries { count } if unsynced >= count => self.sync(),
            EventSyncStrategy::EveryNEntries { .. } => {
                self.unsynced = unsynced;
                Ok(())
            }
        }
    }

    /// Cut the file back to the last acknowledged record
    fn rollback(&mut self) {
        if let Err(e) = self.file.set_len(self.len) {
            // The next append retries through discard_stray_tail
            tracing::error!("Event log rollback to {} bytes failed: {}", self.len, e);
        }
    }

    /// Remove bytes past the last acknowledged record (e.g. a fragment of a
    /// failed write whose rollback also failed)
    fn discard_stray_tail(&mut self) -> Result<()> {
        let on_disk = self.file.metadata()?.len();
        if on_disk == self.len {
            return Ok(());
        }
        if on_disk < self.len {
            return Err(ParkError::EventLogCorruption(format!(
                "log shrank to {} bytes, expected at least {}",
                on_disk, self.len
            )));
        }

        tracing::warn!(
            "Discarding {} stray bytes at the end of the event log",
            on_disk - self.len
        );
        self.file.set_len(self.len)?;
        Ok(())
    }
}
