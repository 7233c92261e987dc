//! Store Module
//!
//! Aggregator-side slot table.
//!
//! ## Responsibilities
//! - Hold occupancy, last update time and car counter per registered slot
//! - Apply edge transitions atomically (one critical section per call)
//! - Hand each edge to the persistence collaborator inside that section,
//!   so the durable log orders events exactly like the in-memory state

mod slot;
mod slot_store;

pub use slot::{EventKind, OccupancyEvent, SlotState, Snapshot, TransitionOutcome};
pub use slot_store::SlotStore;

use crate::error::Result;

/// Persistence collaborator notified of every occupancy edge
pub trait EventSink: Send + Sync {
    /// Durably record one event; an error aborts the transition
    fn record_event(&self, slot_id: &str, kind: EventKind) -> Result<()>;
}

/// Sink that drops every event (for stores without persistence)
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardEvents;

impl EventSink for DiscardEvents {
    fn record_event(&self, _slot_id: &str, _kind: EventKind) -> Result<()> {
        Ok(())
    }
}
