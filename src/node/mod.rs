//! Node Module
//!
//! Sensor-node side: turns distance readings into occupancy edges, notifies
//! the aggregator, and serves inbound actuator control requests.
//!
//! ## Loop Structure
//! One cooperative loop, no parallelism. Each tick:
//! 1. Poll every sensor (bounded hardware measurement)
//! 2. For each state change: drive the slot's indicator, send a notification
//! 3. For the rest of the poll interval: receive with a bounded wait,
//!    dispatch, sleep briefly, repeat
//!
//! Decision ([`decide`]) is pure; all I/O lives in [`Node`].

mod detector;
mod hardware;
mod notifier;
mod dispatcher;
mod runner;

pub use detector::{decide, Occupancy, OccupancyDetector, Reading, StateChange};
pub use hardware::{DigitalOutput, DistanceSensor, ScriptedSensor, SharedOutput};
pub use notifier::NotificationSender;
pub use dispatcher::{ActuatorRegistry, RequestDispatcher};
pub use runner::Node;
