//! Node loop
//!
//! [`Node`] is the device context: it owns the transport, sensors,
//! actuators, detector, notifier and dispatcher, and threads them through
//! every step of the loop.

use std::net::{SocketAddr, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::NodeConfig;
use crate::error::{ParkError, Result};
use crate::transport::DatagramTransport;
use super::{
    ActuatorRegistry, DigitalOutput, DistanceSensor, NotificationSender, OccupancyDetector,
    Reading, RequestDispatcher, StateChange,
};

/// A sensor bound to the slot it watches
struct SensorSlot {
    slot_id: String,
    sensor: Box<dyn DistanceSensor>,
    /// Actuator mirroring this slot's occupancy, if any
    indicator: Option<String>,
}

/// A sensor node
pub struct Node<T: DatagramTransport> {
    config: NodeConfig,
    transport: T,
    sensors: Vec<SensorSlot>,
    actuators: ActuatorRegistry,
    detector: OccupancyDetector,
    notifier: NotificationSender,
    dispatcher: RequestDispatcher,
}

impl Node<UdpSocket> {
    /// Bind a UDP socket on `config.bind_addr` and build a node on it
    pub fn bind(config: NodeConfig) -> Result<Self> {
        let socket = UdpSocket::bind(&config.bind_addr)?;
        tracing::info!("Node listening on {}", socket.local_addr()?);
        Self::new(config, socket)
    }
}

impl<T: DatagramTransport> Node<T> {
    /// Build a node over an existing transport
    pub fn new(config: NodeConfig, transport: T) -> Result<Self> {
        let aggregator: SocketAddr = config.aggregator_addr.parse().map_err(|e| {
            ParkError::Config(format!(
                "invalid aggregator address {:?}: {}",
                config.aggregator_addr, e
            ))
        })?;

        Ok(Self {
            detector: OccupancyDetector::new(config.threshold_cm),
            notifier: NotificationSender::new(aggregator, config.notify_path.clone()),
            dispatcher: RequestDispatcher::new(&config.actuator_prefix),
            actuators: ActuatorRegistry::new(),
            sensors: Vec::new(),
            transport,
            config,
        })
    }

    /// Watch `slot_id` with `sensor`; `indicator` names an actuator that
    /// follows the slot's occupancy
    pub fn add_sensor(
        &mut self,
        slot_id: impl Into<String>,
        sensor: Box<dyn DistanceSensor>,
        indicator: Option<&str>,
    ) {
        self.sensors.push(SensorSlot {
            slot_id: slot_id.into(),
            sensor,
            indicator: indicator.map(str::to_string),
        });
    }

    /// Expose an output for remote control
    pub fn add_actuator(&mut self, name: impl Into<String>, output: Box<dyn DigitalOutput>) {
        self.actuators.register(name, output);
    }

    pub fn actuators(&self) -> &ActuatorRegistry {
        &self.actuators
    }

    pub fn detector(&self) -> &OccupancyDetector {
        &self.detector
    }

    pub fn notifier(&self) -> &NotificationSender {
        &self.notifier
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Poll every sensor once, acting on each edge
    ///
    /// Send failures are logged and dropped; the edge still counts as seen.
    pub fn poll_sensors(&mut self) -> Vec<StateChange> {
        let mut changes = Vec::new();

        for slot in self.sensors.iter_mut() {
            let reading = slot.sensor.measure();
            if reading == Reading::Timeout {
                tracing::debug!("Sensor for {} timed out, holding state", slot.slot_id);
            }

            let Some(change) = self.detector.observe(&slot.slot_id, reading) else {
                continue;
            };
            tracing::info!(
                "Slot {}: {} -> {}",
                change.slot_id,
                change.previous,
                change.current
            );

            if let Some(indicator) = &slot.indicator {
                if !self.actuators.set(indicator, change.current.is_occupied()) {
                    tracing::warn!("Indicator {} for {} is not registered", indicator, slot.slot_id);
                }
            }

            if let Err(e) = self.notifier.notify(&self.transport, &change) {
                tracing::warn!("Notification for {} not sent: {}", change.slot_id, e);
            }

            changes.push(change);
        }

        changes
    }

    /// Serve inbound requests until `deadline`
    ///
    /// Returns the number of datagrams received. Transport errors are
    /// logged and the window continues.
    pub fn serve_until(&mut self, deadline: Instant) -> usize {
        let wait = Duration::from_millis(self.config.receive_wait_ms);
        let idle = Duration::from_millis(self.config.idle_sleep_ms);
        let mut received = 0;

        while Instant::now() < deadline {
            match self
                .dispatcher
                .poll(&self.transport, wait, &mut self.actuators)
            {
                Ok(true) => received += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!("Receive failed: {}", e),
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            thread::sleep(idle.min(remaining));
        }

        received
    }

    /// One loop iteration: sensors, then the receive window
    pub fn tick(&mut self) -> Vec<StateChange> {
        let started = Instant::now();
        let changes = self.poll_sensors();
        self.serve_until(started + Duration::from_millis(self.config.poll_interval_ms));
        changes
    }

    /// Run until the process is terminated
    pub fn run(&mut self) -> ! {
        tracing::info!(
            "Node loop started: {} sensors, {} actuators, aggregator {}",
            self.sensors.len(),
            self.actuators.len(),
            self.notifier.aggregator()
        );
        loop {
            self.tick();
        }
    }
}
