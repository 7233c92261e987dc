//! Slot Store
//!
//! Concurrency-safe table of per-slot state for a fixed set of slots.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ParkError, Result};
use super::{EventKind, EventSink, OccupancyEvent, SlotState, Snapshot, TransitionOutcome};

/// The aggregator's slot table
///
/// ## Concurrency:
/// - `slots`: one Mutex; `snapshot` and `transition` each hold it for their
///   whole read-modify-write, including the event-sink call
/// - `slot_ids`: fixed at construction, read without locking
pub struct SlotStore {
    /// Registered slot identifiers, sorted
    slot_ids: Vec<String>,

    /// Slot id → state
    slots: Mutex<BTreeMap<String, SlotState>>,

    /// Persistence collaborator
    sink: Arc<dyn EventSink>,
}

impl SlotStore {
    /// Register `slot_ids`, all initially free with zero counters
    pub fn new<I, S>(slot_ids: I, sink: Arc<dyn EventSink>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots: BTreeMap<String, SlotState> = slot_ids
            .into_iter()
            .map(Into::into)
            .map(|id: String| (id.clone(), SlotState::new(id)))
            .collect();

        Self {
            slot_ids: slots.keys().cloned().collect(),
            slots: Mutex::new(slots),
            sink,
        }
    }

    /// Copy of every slot plus derived counts
    pub fn snapshot(&self) -> Snapshot {
        let slots = self.slots.lock().clone();
        let available_slots = slots.values().filter(|s| !s.occupied).count();
        Snapshot {
            total_slots: slots.len(),
            available_slots,
            slots,
        }
    }

    /// Set `slot_id`'s occupied flag
    ///
    /// A free → occupied edge bumps `car_count` and records `Entered`; an
    /// occupied → free edge records `Exited`; a repeat records nothing.
    /// `last_updated` is refreshed whenever the slot is known. If the sink
    /// fails, the slot is left untouched and the error is returned.
    pub fn transition(&self, slot_id: &str, occupied: bool) -> Result<TransitionOutcome> {
        let mut slots = self.slots.lock();
        let slot = slots
            .get_mut(slot_id)
            .ok_or_else(|| ParkError::UnknownSlot(slot_id.to_string()))?;

        let kind = match (slot.occupied, occupied) {
            (false, true) => Some(EventKind::Entered),
            (true, false) => Some(EventKind::Exited),
            _ => None,
        };

        // Persist first so the log never misses an edge the table shows
        if let Some(kind) = kind {
            self.sink.record_event(slot_id, kind)?;
        }

        let now = crate::now_millis();
        if kind == Some(EventKind::Entered) {
            slot.car_count = slot.car_count.saturating_add(1);
        }
        slot.occupied = occupied;
        slot.last_updated = now;

        if let Some(kind) = kind {
            tracing::info!("{} {} (car_count={})", slot_id, kind, slot.car_count);
        } else {
            tracing::debug!("{} unchanged (occupied={})", slot_id, occupied);
        }

        Ok(TransitionOutcome {
            slot_id: slot_id.to_string(),
            occupied: slot.occupied,
            car_count: slot.car_count,
            event: kind.map(|kind| OccupancyEvent {
                slot_id: slot_id.to_string(),
                kind,
                timestamp_ms: now,
            }),
        })
    }

    /// Whether `slot_id` is registered
    pub fn contains(&self, slot_id: &str) -> bool {
        self.slot_ids.binary_search_by(|id| id.as_str().cmp(slot_id)).is_ok()
    }

    /// Registered slot identifiers, sorted
    pub fn slot_ids(&self) -> &[String] {
        &self.slot_ids
    }

    pub fn len(&self) -> usize {
        self.slot_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_ids.is_empty()
    }
}
