//! Event log reader
//!
//! Sequential frame reader used by recovery and history queries.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{ParkError, Result};
use super::{EventRecord, HEADER_SIZE, MAX_RECORD_SIZE};

/// Outcome of reading one frame
#[derive(Debug)]
pub enum Frame {
    /// A valid record
    Record(EventRecord),

    /// A complete frame whose checksum or body did not verify
    Corrupt { seq: u64 },

    /// The file ends inside a frame (torn write) or the header is garbage
    Torn,
}

/// Reads frames from an event log file in order
pub struct EventLogReader {
    reader: BufReader<File>,

    /// Byte offset just past the last complete frame
    offset: u64,
}

impl EventLogReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            offset: 0,
        })
    }

    /// Offset just past the last complete frame read
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next frame; `Ok(None)` at a clean end of file
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        let mut header = [0u8; HEADER_SIZE];
        match read_full(&mut self.reader, &mut header)? {
            0 => return Ok(None),
            n if n < HEADER_SIZE => return Ok(Some(Frame::Torn)),
            _ => {}
        }

        let seq = u64::from_be_bytes(header[0..8].try_into().map_err(|_| torn_header())?);
        let crc = u32::from_be_bytes(header[8..12].try_into().map_err(|_| torn_header())?);
        let len = u32::from_be_bytes(header[12..16].try_into().map_err(|_| torn_header())?) as usize;

        if len > MAX_RECORD_SIZE {
            return Ok(Some(Frame::Torn));
        }

        let mut body = vec![0u8; len];
        if read_full(&mut self.reader, &mut body)? < len {
            return Ok(Some(Frame::Torn));
        }
        self.offset += (HEADER_SIZE + len) as u64;

        if EventRecord::compute_crc(seq, &body) != crc {
            return Ok(Some(Frame::Corrupt { seq }));
        }
        match EventRecord::deserialize(&body) {
            Ok(record) if record.seq == seq => Ok(Some(Frame::Record(record))),
            _ => Ok(Some(Frame::Corrupt { seq })),
        }
    }

    /// Read every valid record, failing on the first bad frame
    pub fn read_all(&mut self) -> Result<Vec<EventRecord>> {
        let mut records = Vec::new();
        while let Some(frame) = self.next_frame()? {
            match frame {
                Frame::Record(record) => records.push(record),
                Frame::Corrupt { seq } => {
                    return Err(ParkError::EventLogCorruption(format!(
                        "checksum mismatch in record {}",
                        seq
                    )))
                }
                Frame::Torn => {
                    return Err(ParkError::EventLogCorruption(format!(
                        "torn record at offset {}",
                        self.offset
                    )))
                }
            }
        }
        Ok(records)
    }
}

fn torn_header() -> ParkError {
    ParkError::EventLogCorruption("short record header".to_string())
}

/// Read until `buf` is full or EOF; returns bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
