//! Configuration for parkwatch
//!
//! Centralized configuration with sensible defaults, one struct per process
//! role: [`Config`] for the aggregator and [`NodeConfig`] for a sensor node.

use std::path::PathBuf;

use crate::protocol::DEFAULT_PORT;

/// Main configuration for an aggregator instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── events.log       (append-only occupancy event log)
    pub data_dir: PathBuf,

    /// Sync strategy: how often to fsync the event log
    pub event_sync_strategy: EventSyncStrategy,

    // -------------------------------------------------------------------------
    // Slot Configuration
    // -------------------------------------------------------------------------
    /// Identifiers of the registered parking slots
    pub slots: Vec<String>,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// UDP listen address
    pub listen_addr: String,

    /// Number of worker threads handling decoded requests
    pub worker_threads: usize,

    /// Receive timeout (milliseconds); bounds how long shutdown can go unnoticed
    pub recv_timeout_ms: u64,
}

/// Event log sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSyncStrategy {
    /// fsync after every record (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced records
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./parkwatch_data"),
            event_sync_strategy: EventSyncStrategy::EveryWrite,
            slots: (1..=4).map(|i| format!("slot{}", i)).collect(),
            listen_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            worker_threads: 4,
            recv_timeout_ms: 100,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the event log sync strategy
    pub fn event_sync_strategy(mut self, strategy: EventSyncStrategy) -> Self {
        self.config.event_sync_strategy = strategy;
        self
    }

    /// Replace the registered slot identifiers
    pub fn slots<I, S>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.slots = slots.into_iter().map(Into::into).collect();
        self
    }

    /// Set the UDP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the receive timeout (in milliseconds)
    pub fn recv_timeout_ms(mut self, ms: u64) -> Self {
        self.config.recv_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Configuration for a sensor node
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Aggregator address notifications are sent to
    pub aggregator_addr: String,

    /// Local UDP bind address for inbound control requests
    pub bind_addr: String,

    /// Readings strictly below this distance (cm) mean "occupied"
    pub threshold_cm: f32,

    /// Length of one loop iteration (milliseconds)
    pub poll_interval_ms: u64,

    /// Bounded wait for a single receive (milliseconds)
    pub receive_wait_ms: u64,

    /// Sleep between receives inside the serve window (milliseconds)
    pub idle_sleep_ms: u64,

    /// Control paths are `/<actuator_prefix><identifier>`
    pub actuator_prefix: String,

    /// Resource path segment on the aggregator; notifications go to
    /// `/<notify_path>/<slot_id>`
    pub notify_path: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            aggregator_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            bind_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            threshold_cm: 10.0,
            poll_interval_ms: 1000,
            receive_wait_ms: 50,
            idle_sleep_ms: 10,
            actuator_prefix: "led".to_string(),
            notify_path: "parking".to_string(),
        }
    }
}

impl NodeConfig {
    /// Create a new node config builder
    pub fn builder() -> NodeConfigBuilder {
        NodeConfigBuilder::default()
    }
}

/// Builder for NodeConfig
#[derive(Default)]
pub struct NodeConfigBuilder {
    config: NodeConfig,
}

impl NodeConfigBuilder {
    pub fn aggregator_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.aggregator_addr = addr.into();
        self
    }

    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    pub fn threshold_cm(mut self, cm: f32) -> Self {
        self.config.threshold_cm = cm;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn receive_wait_ms(mut self, ms: u64) -> Self {
        self.config.receive_wait_ms = ms;
        self
    }

    pub fn idle_sleep_ms(mut self, ms: u64) -> Self {
        self.config.idle_sleep_ms = ms;
        self
    }

    pub fn actuator_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.actuator_prefix = prefix.into();
        self
    }

    pub fn notify_path(mut self, path: impl Into<String>) -> Self {
        self.config.notify_path = path.into();
        self
    }

    pub fn build(self) -> NodeConfig {
        self.config
    }
}
