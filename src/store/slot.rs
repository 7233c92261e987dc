//! Slot state and event definitions

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// State of one parking slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotState {
    /// Slot identifier (the map key in serialized snapshots)
    #[serde(skip)]
    pub id: String,

    pub occupied: bool,

    /// Unix millis of the last transition call (0 = never)
    pub last_updated: u64,

    /// Number of free → occupied edges seen; never decreases
    pub car_count: u64,
}

impl SlotState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            occupied: false,
            last_updated: 0,
            car_count: 0,
        }
    }
}

/// Kind of occupancy edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// free → occupied
    Entered,

    /// occupied → free
    Exited,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Entered => "car_entered",
            EventKind::Exited => "car_exited",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One occupancy edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyEvent {
    pub slot_id: String,
    pub kind: EventKind,
    pub timestamp_ms: u64,
}

/// Immutable copy of the whole table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub slots: BTreeMap<String, SlotState>,
    pub available_slots: usize,
    pub total_slots: usize,
}

/// Result of a transition on a known slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub slot_id: String,
    pub occupied: bool,
    pub car_count: u64,

    /// The edge, if the occupied flag actually changed
    pub event: Option<OccupancyEvent>,
}
