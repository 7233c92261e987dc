//! # parkwatch
//!
//! Parking-slot occupancy monitoring with:
//! - Distance-sensor nodes with edge-triggered occupancy detection
//! - A minimal CoAP-style request/response protocol over UDP
//! - An aggregator holding per-slot occupancy and car counters
//! - An append-only event log for durable entry/exit history
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────┐          ┌──────────────────────────────┐
//! │            Node              │   UDP    │          Aggregator          │
//! │                              │  :5683   │                              │
//! │ DistanceSensor ─► Detector   │          │  Server (recv + workers)     │
//! │                     │        │          │          │                   │
//! │                     ▼        │  NON PUT │          ▼                   │
//! │            NotificationSender├─────────►│  ResourceHandler             │
//! │                              │          │          │                   │
//! │ RequestDispatcher ◄──────────┤◄─────────┤          ▼                   │
//! │        │                     │  control │  SlotStore (Mutex) ─► EventLog│
//! │        ▼                     │          │                              │
//! │ ActuatorRegistry             │          │                              │
//! └──────────────────────────────┘          └──────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod transport;
pub mod client;
pub mod node;
pub mod store;
pub mod eventlog;
pub mod aggregator;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ParkError, Result};
pub use config::{Config, NodeConfig};
pub use store::SlotStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of parkwatch
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current Unix time in milliseconds (0 if the clock is before the epoch)
pub(crate) fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
