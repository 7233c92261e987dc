//! Request dispatcher
//!
//! Handles inbound datagrams on the node: actuator control via
//! `PUT /<prefix><id>`, "Not Found" for everything else. Corrupt or
//! undersized datagrams are dropped without a reply.
//!
//! The prefix only decides which paths are control requests. The actuator
//! is looked up by the whole path minus its leading '/', matched exactly, so
//! `/ledger` is a control request that matches no actuator named `led1`.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{
    code_class, decode_message, encode_message, Message, MessageType, Method, ResponseCode,
    MAX_DATAGRAM_SIZE,
};
use crate::transport::DatagramTransport;
use super::DigitalOutput;

/// Named digital outputs a node exposes for remote control
#[derive(Default)]
pub struct ActuatorRegistry {
    outputs: BTreeMap<String, Box<dyn DigitalOutput>>,
}

impl ActuatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an output under `name`
    pub fn register(&mut self, name: impl Into<String>, output: Box<dyn DigitalOutput>) {
        self.outputs.insert(name.into(), output);
    }

    /// Drive output `name`; false if no such output exists
    pub fn set(&mut self, name: &str, on: bool) -> bool {
        match self.outputs.get_mut(name) {
            Some(output) => {
                output.set(on);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.outputs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outputs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Routes inbound requests on the node
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    /// `/` followed by the actuator prefix
    control_prefix: String,
}

impl RequestDispatcher {
    pub fn new(actuator_prefix: &str) -> Self {
        Self {
            control_prefix: format!("/{}", actuator_prefix.trim_start_matches('/')),
        }
    }

    /// Receive at most one datagram and answer it
    ///
    /// Returns `Ok(false)` when nothing arrived within `wait`.
    pub fn poll<T: DatagramTransport + ?Sized>(
        &self,
        transport: &T,
        wait: Duration,
        actuators: &mut ActuatorRegistry,
    ) -> Result<bool> {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        let (len, peer) = match transport.recv_from(&mut buf, wait)? {
            Some(received) => received,
            None => return Ok(false),
        };

        tracing::trace!("Received {} bytes from {}", len, peer);
        if let Some(reply) = self.handle_datagram(&buf[..len], actuators) {
            transport.send_to(&reply, peer)?;
        }
        Ok(true)
    }

    /// Process one datagram, returning the encoded reply if one is due
    pub fn handle_datagram(
        &self,
        bytes: &[u8],
        actuators: &mut ActuatorRegistry,
    ) -> Option<Vec<u8>> {
        let request = match decode_message(bytes) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("Dropping datagram: {}", e);
                return None;
            }
        };

        // Only requests are answered; responses, acks, resets and pings are not
        if request.is_empty_message()
            || code_class(request.code) != 0
            || matches!(
                request.message_type,
                MessageType::Acknowledgement | MessageType::Reset
            )
        {
            tracing::trace!(
                "Ignoring non-request message mid={} code=0x{:02x}",
                request.message_id,
                request.code
            );
            return None;
        }

        let code = self.route(&request, actuators);
        match encode_message(&Message::ack(&request, code)) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::warn!("Failed to encode reply: {}", e);
                None
            }
        }
    }

    fn route(&self, request: &Message, actuators: &mut ActuatorRegistry) -> ResponseCode {
        let path = request.path();
        if request.method() != Some(Method::Put) || !path.starts_with(&self.control_prefix) {
            tracing::debug!("No route for code=0x{:02x} {}", request.code, path);
            return ResponseCode::NotFound;
        }

        // The registry key is the whole path minus its leading slash
        let key = path.strip_prefix('/').unwrap_or(&path);
        let command = String::from_utf8_lossy(&request.payload)
            .trim()
            .to_ascii_lowercase();
        let level = match command.as_str() {
            "on" => Some(true),
            "off" => Some(false),
            _ => None,
        };

        match level {
            Some(on) if actuators.set(key, on) => {
                tracing::info!("Actuator {} -> {}", key, command);
            }
            Some(_) => tracing::debug!("No actuator registered as {}", key),
            None => tracing::warn!("Ignoring control payload {:?} for {}", command, key),
        }

        ResponseCode::Changed
    }
}
