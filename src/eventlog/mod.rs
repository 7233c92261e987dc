//! Event Log Module
//!
//! Durable, append-only history of occupancy edges plus a per-slot counter
//! table derived from it.
//!
//! ## Responsibilities
//! - Append one record per `Entered`/`Exited` edge
//! - CRC32 checksums for corruption detection
//! - Sequence numbers for ordering
//! - Rebuild the counter table on open, trimming a torn tail
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Record 1                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ Seq (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Record 2                                │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ Seq (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! `Data` is the bincode encoding of [`EventRecord`]; the CRC covers the
//! sequence number bytes followed by `Data`.

mod record;
mod writer;
mod reader;
mod recovery;
mod event_log;

pub use record::{EventRecord, HEADER_SIZE, MAX_RECORD_SIZE};
pub use writer::EventLogWriter;
pub use reader::{EventLogReader, Frame};
pub use recovery::{EventLogRecovery, RecoveryResult};
pub use event_log::{EventLog, SlotStats};
