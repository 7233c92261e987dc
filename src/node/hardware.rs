//! Hardware traits
//!
//! The node only needs two capabilities from its board: a distance sensor
//! and a binary digital output. Real drivers live outside this crate; the
//! scripted doubles here drive simulations and tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Reading;

/// Distance-sensing capability
pub trait DistanceSensor: Send {
    /// Take one measurement; must return within the sensor's hard timeout
    fn measure(&mut self) -> Reading;
}

/// Binary digital output (indicator LED, relay, ...)
pub trait DigitalOutput: Send {
    fn set(&mut self, on: bool);
}

/// Sensor replaying a fixed list of readings, then timing out forever
#[derive(Debug, Clone, Default)]
pub struct ScriptedSensor {
    readings: VecDeque<Reading>,
}

impl ScriptedSensor {
    pub fn new(readings: impl IntoIterator<Item = Reading>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }

    /// Append a reading to the script
    pub fn push(&mut self, reading: Reading) {
        self.readings.push_back(reading);
    }
}

impl DistanceSensor for ScriptedSensor {
    fn measure(&mut self) -> Reading {
        self.readings.pop_front().unwrap_or(Reading::Timeout)
    }
}

/// Output whose level can be observed through any clone
#[derive(Debug, Clone, Default)]
pub struct SharedOutput {
    level: Arc<AtomicBool>,
}

impl SharedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self) -> bool {
        self.level.load(Ordering::Relaxed)
    }
}

impl DigitalOutput for SharedOutput {
    fn set(&mut self, on: bool) {
        self.level.store(on, Ordering::Relaxed);
    }
}
