//! Event Log
//!
//! The persistence collaborator: couples the append-only writer with the
//! per-slot counter table so both change in one critical section.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

use crate::config::EventSyncStrategy;
use crate::error::Result;
use crate::store::{EventKind, EventSink};
use super::{EventLogReader, EventLogRecovery, EventLogWriter, EventRecord, Frame, RecoveryResult};

/// Aggregate counters for one slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotStats {
    /// Entered events ever recorded
    pub total_cars: u64,

    /// Unix millis of the last Entered event
    pub last_updated_ms: u64,
}

struct EventLogInner {
    writer: EventLogWriter,
    stats: BTreeMap<String, SlotStats>,
}

/// Durable event history with derived per-slot counters
pub struct EventLog {
    path: PathBuf,
    inner: Mutex<EventLogInner>,
    recovery: RecoveryResult,
}

impl EventLog {
    /// Default file name inside a data directory
    pub const FILENAME: &'static str = "events.log";

    /// Open or create a log, replaying existing records
    ///
    /// On startup:
    /// 1. Recover valid records (torn tail is truncated)
    /// 2. Rebuild the counter table from Entered records
    /// 3. Continue sequence numbers after the last valid record
    pub fn open(path: &Path, sync_strategy: EventSyncStrategy) -> Result<Self> {
        let (records, recovery) = EventLogRecovery::recover(path)?;

        if recovery.records_recovered > 0 || recovery.records_corrupted > 0 {
            tracing::info!(
                "Event log recovery: {} records recovered, {} corrupted, last_seq={}",
                recovery.records_recovered,
                recovery.records_corrupted,
                recovery.last_seq
            );
        }

        let mut stats = BTreeMap::new();
        for record in &records {
            apply(&mut stats, record);
        }

        let writer = EventLogWriter::open(path, sync_strategy, recovery.last_seq + 1)?;

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(EventLogInner { writer, stats }),
            recovery,
        })
    }

    /// Open `{data_dir}/events.log`, creating the directory if needed
    pub fn open_in(data_dir: &Path, sync_strategy: EventSyncStrategy) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        Self::open(&data_dir.join(Self::FILENAME), sync_strategy)
    }

    /// Append one event and update counters
    pub fn append(&self, slot_id: &str, kind: EventKind) -> Result<EventRecord> {
        let mut inner = self.inner.lock();
        let record = inner.writer.append(slot_id, kind)?;
        apply(&mut inner.stats, &record);
        Ok(record)
    }

    /// Counters for one slot (zero if never entered)
    pub fn stats(&self, slot_id: &str) -> SlotStats {
        self.inner
            .lock()
            .stats
            .get(slot_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Counters for every slot that has entries
    pub fn all_stats(&self) -> BTreeMap<String, SlotStats> {
        self.inner.lock().stats.clone()
    }

    /// Full history, oldest first; corrupt records are skipped
    pub fn events(&self) -> Result<Vec<EventRecord>> {
        // Hold the lock so no append is half-visible while reading
        let _inner = self.inner.lock();
        let mut reader = EventLogReader::open(&self.path)?;
        let mut records = Vec::new();
        while let Some(frame) = reader.next_frame()? {
            match frame {
                Frame::Record(record) => records.push(record),
                Frame::Corrupt { .. } => continue,
                Frame::Torn => break,
            }
        }
        Ok(records)
    }

    /// Check a log file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        EventLogRecovery::verify(path)
    }

    /// Force pending records to disk
    pub fn sync(&self) -> Result<()> {
        self.inner.lock().writer.sync()
    }

    /// What recovery found when this log was opened
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for EventLog {
    fn record_event(&self, slot_id: &str, kind: EventKind) -> Result<()> {
        self.append(slot_id, kind).map(|_| ())
    }
}

fn apply(stats: &mut BTreeMap<String, SlotStats>, record: &EventRecord) {
    if record.kind == EventKind::Entered {
        let entry = stats.entry(record.slot_id.clone()).or_default();
        entry.total_cars += 1;
        entry.last_updated_ms = record.timestamp_ms;
    }
}
