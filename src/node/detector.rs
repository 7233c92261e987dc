//! Occupancy detection
//!
//! Per-slot state machine over {Unknown, Free, Occupied}. A single threshold
//! crossing flips the state; there is no hysteresis band, so a reading that
//! jitters around the threshold produces an edge on every crossing.

use std::collections::HashMap;
use std::fmt;

/// Occupancy of one slot as seen by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    /// No successful reading yet
    Unknown,
    Free,
    Occupied,
}

impl Occupancy {
    /// Textual state name sent on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Occupancy::Unknown => "unknown",
            Occupancy::Free => "free",
            Occupancy::Occupied => "occupied",
        }
    }

    pub fn is_occupied(self) -> bool {
        self == Occupancy::Occupied
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One distance measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Distance in centimetres
    Distance(f32),

    /// The sensor did not answer within its hard timeout
    Timeout,
}

/// Map a reading to a state, `None` meaning "hold the last known state"
///
/// A timeout (or a non-finite distance) is evidence of neither occupancy
/// nor vacancy.
pub fn decide(reading: Reading, threshold_cm: f32) -> Option<Occupancy> {
    match reading {
        Reading::Distance(cm) if cm.is_finite() => Some(if cm < threshold_cm {
            Occupancy::Occupied
        } else {
            Occupancy::Free
        }),
        _ => None,
    }
}

/// An edge detected for one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub slot_id: String,
    pub previous: Occupancy,
    pub current: Occupancy,
}

/// Edge detector over all slots of a node
#[derive(Debug, Clone)]
pub struct OccupancyDetector {
    threshold_cm: f32,
    states: HashMap<String, Occupancy>,
}

impl OccupancyDetector {
    pub fn new(threshold_cm: f32) -> Self {
        Self {
            threshold_cm,
            states: HashMap::new(),
        }
    }

    pub fn threshold_cm(&self) -> f32 {
        self.threshold_cm
    }

    /// Last recorded state of `slot_id` (Unknown if never seen)
    pub fn state(&self, slot_id: &str) -> Occupancy {
        self.states
            .get(slot_id)
            .copied()
            .unwrap_or(Occupancy::Unknown)
    }

    /// Feed one reading; returns the edge if the state changed
    ///
    /// The new state is recorded before returning, so a failed notification
    /// for this edge is never retried.
    pub fn observe(&mut self, slot_id: &str, reading: Reading) -> Option<StateChange> {
        let current = decide(reading, self.threshold_cm)?;
        let previous = self.state(slot_id);
        if current == previous {
            return None;
        }

        self.states.insert(slot_id.to_string(), current);
        Some(StateChange {
            slot_id: slot_id.to_string(),
            previous,
            current,
        })
    }
}
