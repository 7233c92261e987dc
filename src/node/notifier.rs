//! Notification sender
//!
//! Turns a detected edge into a non-confirmable PUT to the aggregator.

use std::net::SocketAddr;

use crate::error::Result;
use crate::protocol::{encode_request, MessageIdGenerator, Method};
use crate::transport::DatagramTransport;
use super::StateChange;

/// Sends state-change notifications to one aggregator
#[derive(Debug, Clone)]
pub struct NotificationSender {
    aggregator: SocketAddr,
    notify_path: String,
    ids: MessageIdGenerator,
}

impl NotificationSender {
    /// Notifications go to `/<notify_path>/<slot_id>`
    pub fn new(aggregator: SocketAddr, notify_path: impl Into<String>) -> Self {
        Self {
            aggregator,
            notify_path: notify_path.into().trim_matches('/').to_string(),
            ids: MessageIdGenerator::new(),
        }
    }

    pub fn aggregator(&self) -> SocketAddr {
        self.aggregator
    }

    /// Path a notification for `slot_id` is sent to
    pub fn path_for(&self, slot_id: &str) -> String {
        if self.notify_path.is_empty() {
            format!("/{}", slot_id)
        } else {
            format!("/{}/{}", self.notify_path, slot_id)
        }
    }

    /// Send one notification, returning the message id used
    ///
    /// The id counter advances even when encoding or sending fails. Nothing
    /// is retried; the caller decides whether to log and move on.
    pub fn notify<T: DatagramTransport + ?Sized>(
        &mut self,
        transport: &T,
        change: &StateChange,
    ) -> Result<u16> {
        let message_id = self.ids.next_id();
        let path = self.path_for(&change.slot_id);
        let frame = encode_request(
            message_id,
            Method::Put,
            &path,
            change.current.as_str().as_bytes(),
            false,
        )?;

        transport.send_to(&frame, self.aggregator)?;
        tracing::debug!(
            "Sent notification mid={} {} -> {} to {}",
            message_id,
            path,
            change.current,
            self.aggregator
        );
        Ok(message_id)
    }

    /// Last message id handed out
    pub fn last_message_id(&self) -> u16 {
        self.ids.last()
    }
}
