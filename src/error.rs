//! Error types for parkwatch
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using ParkError
pub type Result<T> = std::result::Result<T, ParkError>;

/// Unified error type for parkwatch operations
#[derive(Debug, Error)]
pub enum ParkError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Decode failure: {0}")]
    Decode(String),

    #[error("Encode failure: {0}")]
    Encode(String),

    // -------------------------------------------------------------------------
    // Slot Errors
    // -------------------------------------------------------------------------
    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    // -------------------------------------------------------------------------
    // Event Log Errors
    // -------------------------------------------------------------------------
    #[error("Event log corruption detected: {0}")]
    EventLogCorruption(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ParkError {
    /// True when a receive gave up because no datagram arrived in time.
    ///
    /// Non-blocking sockets report `WouldBlock`; sockets with a read timeout
    /// report `WouldBlock` on Unix and `TimedOut` on Windows.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ParkError::Transport(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut
        )
    }
}
