//! Event Log Tests
//!
//! These tests verify:
//! - Appending and reading back records
//! - Per-slot counters (Entered only)
//! - Recovery across reopen, torn tails and corrupt records
//! - Use as the slot store's event sink

use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::sync::Arc;

use parkwatch::config::EventSyncStrategy;
use parkwatch::eventlog::{
    EventLog, EventLogReader, EventLogRecovery, EventLogWriter, EventRecord, HEADER_SIZE,
};
use parkwatch::store::{EventKind, SlotStore};
use parkwatch::ParkError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, EventLog) {
    let temp_dir = TempDir::new().unwrap();
    let log = EventLog::open_in(temp_dir.path(), EventSyncStrategy::EveryWrite).unwrap();
    (temp_dir, log)
}

fn log_path(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join(EventLog::FILENAME)
}

// =============================================================================
// Append Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (temp_dir, log) = setup_temp_log();

    assert!(log_path(&temp_dir).exists());
    assert_eq!(log.recovery().records_recovered, 0);
    assert!(log.events().unwrap().is_empty());
}

#[test]
fn test_append_assigns_increasing_seq() {
    let (_temp, log) = setup_temp_log();

    let first = log.append("slot1", EventKind::Entered).unwrap();
    let second = log.append("slot1", EventKind::Exited).unwrap();

    assert_eq!(first.seq, 1);
    assert_eq!(second.seq, 2);
    assert!(second.timestamp_ms >= first.timestamp_ms);
}

#[test]
fn test_events_read_back_in_order() {
    let (_temp, log) = setup_temp_log();

    log.append("slot1", EventKind::Entered).unwrap();
    log.append("slot2", EventKind::Entered).unwrap();
    log.append("slot1", EventKind::Exited).unwrap();

    let events: Vec<(String, EventKind)> = log
        .events()
        .unwrap()
        .into_iter()
        .map(|r| (r.slot_id, r.kind))
        .collect();

    assert_eq!(
        events,
        vec![
            ("slot1".to_string(), EventKind::Entered),
            ("slot2".to_string(), EventKind::Entered),
            ("slot1".to_string(), EventKind::Exited),
        ]
    );
}

#[test]
fn test_stats_count_entries_only() {
    let (_temp, log) = setup_temp_log();

    log.append("slot1", EventKind::Entered).unwrap();
    log.append("slot1", EventKind::Exited).unwrap();
    log.append("slot1", EventKind::Entered).unwrap();
    log.append("slot2", EventKind::Exited).unwrap();

    assert_eq!(log.stats("slot1").total_cars, 2);
    assert!(log.stats("slot1").last_updated_ms > 0);
    assert_eq!(log.stats("slot2").total_cars, 0);
    assert_eq!(log.all_stats().len(), 1);
}

#[test]
fn test_every_n_entries_strategy() {
    let temp_dir = TempDir::new().unwrap();
    let log = EventLog::open_in(
        temp_dir.path(),
        EventSyncStrategy::EveryNEntries { count: 3 },
    )
    .unwrap();

    for _ in 0..5 {
        log.append("slot1", EventKind::Entered).unwrap();
    }
    log.sync().unwrap();

    assert_eq!(log.events().unwrap().len(), 5);
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_reopen_rebuilds_stats_and_seq() {
    let temp_dir = TempDir::new().unwrap();
    {
        let log = EventLog::open_in(temp_dir.path(), EventSyncStrategy::EveryWrite).unwrap();
        log.append("slot1", EventKind::Entered).unwrap();
        log.append("slot1", EventKind::Exited).unwrap();
        log.append("slot3", EventKind::Entered).unwrap();
    }

    let log = EventLog::open_in(temp_dir.path(), EventSyncStrategy::EveryWrite).unwrap();

    assert_eq!(log.recovery().records_recovered, 3);
    assert_eq!(log.recovery().last_seq, 3);
    assert!(!log.recovery().was_truncated);
    assert_eq!(log.stats("slot1").total_cars, 1);
    assert_eq!(log.stats("slot3").total_cars, 1);

    let next = log.append("slot2", EventKind::Entered).unwrap();
    assert_eq!(next.seq, 4);
}

#[test]
fn test_torn_tail_is_truncated() {
    let temp_dir = TempDir::new().unwrap();
    let path = log_path(&temp_dir);
    {
        let log = EventLog::open(&path, EventSyncStrategy::EveryWrite).unwrap();
        log.append("slot1", EventKind::Entered).unwrap();
        log.append("slot2", EventKind::Entered).unwrap();
    }
    let intact_len = fs::metadata(&path).unwrap().len();

    // Simulate a crash halfway through the header of a third record
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0u8; HEADER_SIZE / 2]).unwrap();
    }

    let report = EventLog::verify(&path).unwrap();
    assert!(report.was_truncated);
    assert_eq!(fs::metadata(&path).unwrap().len(), intact_len + (HEADER_SIZE / 2) as u64);

    let log = EventLog::open(&path, EventSyncStrategy::EveryWrite).unwrap();
    assert!(log.recovery().was_truncated);
    assert_eq!(log.recovery().records_recovered, 2);
    assert_eq!(fs::metadata(&path).unwrap().len(), intact_len);

    let next = log.append("slot3", EventKind::Entered).unwrap();
    assert_eq!(next.seq, 3);
    assert_eq!(log.events().unwrap().len(), 3);
}

#[test]
fn test_corrupt_record_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let path = log_path(&temp_dir);
    let first_len;
    {
        let log = EventLog::open(&path, EventSyncStrategy::EveryWrite).unwrap();
        log.append("slot1", EventKind::Entered).unwrap();
        first_len = fs::metadata(&path).unwrap().len();
        log.append("slot2", EventKind::Entered).unwrap();
        log.append("slot3", EventKind::Entered).unwrap();
    }

    // Flip a byte inside the body of the second record
    {
        let mut file = OpenOptions::new().write(true).open(&path).unwrap();
        file.seek(SeekFrom::Start(first_len + HEADER_SIZE as u64 + 2))
            .unwrap();
        file.write_all(&[0xEE]).unwrap();
    }

    let (records, result) = EventLogRecovery::recover(&path).unwrap();

    assert_eq!(result.records_recovered, 2);
    assert_eq!(result.records_corrupted, 1);
    assert_eq!(result.last_seq, 3);
    let slots: Vec<&str> = records.iter().map(|r| r.slot_id.as_str()).collect();
    assert_eq!(slots, vec!["slot1", "slot3"]);

    let mut reader = EventLogReader::open(&path).unwrap();
    assert!(reader.read_all().is_err());
}

#[test]
fn test_append_after_failed_write_discards_fragment() {
    let temp_dir = TempDir::new().unwrap();
    let path = log_path(&temp_dir);
    {
        let log = EventLog::open(&path, EventSyncStrategy::EveryWrite).unwrap();
        log.append("slot1", EventKind::Entered).unwrap();

        // Leftover of a write that failed halfway through its frame
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[0xAB; 10]).unwrap();

        log.append("slot2", EventKind::Entered).unwrap();
        log.append("slot3", EventKind::Entered).unwrap();
    }

    let log = EventLog::open(&path, EventSyncStrategy::EveryWrite).unwrap();

    assert_eq!(log.recovery().records_recovered, 3);
    assert_eq!(log.recovery().records_corrupted, 0);
    assert!(!log.recovery().was_truncated);
    let seqs: Vec<u64> = log.events().unwrap().iter().map(|r| r.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
    assert_eq!(log.stats("slot2").total_cars, 1);
    assert_eq!(log.stats("slot3").total_cars, 1);
    assert_eq!(log.append("slot4", EventKind::Entered).unwrap().seq, 4);
}

#[test]
fn test_writer_tracks_acknowledged_length() {
    let temp_dir = TempDir::new().unwrap();
    let path = log_path(&temp_dir);
    let mut writer = EventLogWriter::open(&path, EventSyncStrategy::EveryWrite, 1).unwrap();
    assert!(writer.is_empty());

    writer.append("slot1", EventKind::Entered).unwrap();
    let acknowledged = writer.len();
    assert_eq!(fs::metadata(&path).unwrap().len(), acknowledged);

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[0u8; 3]).unwrap();

    let record = writer.append("slot1", EventKind::Exited).unwrap();
    assert_eq!(record.seq, 2);
    assert_eq!(fs::metadata(&path).unwrap().len(), writer.len());
    assert_eq!(EventLogRecovery::verify(&path).unwrap().records_recovered, 2);
}

#[test]
fn test_failed_append_consumes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let path = log_path(&temp_dir);
    let log = Arc::new(EventLog::open(&path, EventSyncStrategy::EveryWrite).unwrap());
    log.append("slot1", EventKind::Entered).unwrap();
    log.append("slot2", EventKind::Entered).unwrap();

    // Something outside the writer cut the file short
    OpenOptions::new()
        .write(true)
        .open(&path)
        .unwrap()
        .set_len(5)
        .unwrap();

    let store = SlotStore::new(["slot3"], log.clone());
    let result = store.transition("slot3", true);

    assert!(matches!(result, Err(ParkError::EventLogCorruption(_))));
    assert!(!store.snapshot().slots["slot3"].occupied);
    assert_eq!(log.stats("slot3").total_cars, 0);
    assert_eq!(fs::metadata(&path).unwrap().len(), 5);
}

#[test]
fn test_recover_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let (records, result) = EventLogRecovery::recover(&log_path(&temp_dir)).unwrap();

    assert!(records.is_empty());
    assert_eq!(result.records_recovered, 0);
}

#[test]
fn test_record_frame_layout() {
    let record = EventRecord::new(7, "slot1", EventKind::Exited);
    let frame = record.to_frame().unwrap();
    let body = record.serialize().unwrap();

    assert_eq!(&frame[0..8], &7u64.to_be_bytes());
    assert_eq!(
        &frame[8..12],
        &EventRecord::compute_crc(7, &body).to_be_bytes()
    );
    assert_eq!(&frame[12..16], &(body.len() as u32).to_be_bytes());
    assert_eq!(&frame[HEADER_SIZE..], body.as_slice());
    assert_eq!(EventRecord::deserialize(&body).unwrap(), record);
}

// =============================================================================
// Store Integration Tests
// =============================================================================

#[test]
fn test_store_writes_through_to_log() {
    let (_temp, log) = setup_temp_log();
    let log = Arc::new(log);
    let store = SlotStore::new(["slot1", "slot2"], log.clone());

    store.transition("slot1", true).unwrap();
    store.transition("slot1", true).unwrap();
    store.transition("slot1", false).unwrap();
    store.transition("slot2", false).unwrap();

    let kinds: Vec<EventKind> = log.events().unwrap().into_iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![EventKind::Entered, EventKind::Exited]);
    assert_eq!(log.stats("slot1").total_cars, 1);
    assert_eq!(
        store.snapshot().slots["slot1"].car_count,
        log.stats("slot1").total_cars
    );
}
