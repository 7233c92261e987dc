//! Endpoint
//!
//! Turns one inbound datagram into at most one outbound datagram:
//! decoding, message-type rules, and response framing around the
//! [`ResourceHandler`]. A reply that would not fit in
//! [`MAX_DATAGRAM_SIZE`] is replaced by a 5.00 error reply.

use parking_lot::Mutex;

use crate::protocol::{
    code_class, decode_message, encode_message, Message, MessageIdGenerator, MessageType,
    ResponseCode, CONTENT_FORMAT_JSON, MAX_DATAGRAM_SIZE,
};
use super::ResourceHandler;

/// Protocol endpoint shared by all worker threads
pub struct Endpoint {
    handler: ResourceHandler,

    /// Ids for non-confirmable responses
    ids: Mutex<MessageIdGenerator>,
}

impl Endpoint {
    pub fn new(handler: ResourceHandler) -> Self {
        Self {
            handler,
            ids: Mutex::new(MessageIdGenerator::new()),
        }
    }

    pub fn handler(&self) -> &ResourceHandler {
        &self.handler
    }

    /// Process one datagram, returning the encoded reply if one is due
    ///
    /// Undecodable datagrams are dropped without a reply.
    pub fn handle_datagram(&self, bytes: &[u8]) -> Option<Vec<u8>> {
        let request = match decode_message(bytes) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("Dropping datagram: {}", e);
                return None;
            }
        };

        tracing::trace!("Received {:?}", request);
        let reply = self.respond(&request)?;
        let frame = encode_message(&reply).and_then(|frame| {
            if frame.len() <= MAX_DATAGRAM_SIZE {
                return Ok(frame);
            }
            tracing::warn!(
                "Reply to mid={} is {} bytes (max {}), sending 5.00",
                request.message_id,
                frame.len(),
                MAX_DATAGRAM_SIZE
            );
            encode_message(&oversized(reply, frame.len()))
        });

        match frame {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::warn!("Failed to encode reply to mid={}: {}", request.message_id, e);
                None
            }
        }
    }

    /// Build the reply for a decoded message
    ///
    /// - Acknowledgements and resets are never answered
    /// - An empty confirmable message (ping) gets a reset
    /// - Confirmable requests get a piggybacked acknowledgement
    /// - Non-confirmable requests get a non-confirmable response
    pub fn respond(&self, request: &Message) -> Option<Message> {
        match request.message_type {
            MessageType::Acknowledgement | MessageType::Reset => return None,
            MessageType::Confirmable if request.is_empty_message() => {
                return Some(Message::reset(request))
            }
            _ => {}
        }
        if request.is_empty_message() || code_class(request.code) != 0 {
            return None;
        }

        let response = self.handler.handle(request);
        tracing::debug!(
            "{} {} -> {}",
            request.method().map(|m| format!("{:?}", m)).unwrap_or_default(),
            request.path(),
            response.code
        );

        let message = match request.message_type {
            MessageType::Confirmable => Message::ack(request, response.code),
            _ => Message::response(
                MessageType::NonConfirmable,
                response.code,
                self.ids.lock().next_id(),
                &request.token,
            ),
        };
        Some(message.with_content(CONTENT_FORMAT_JSON, response.to_payload()))
    }
}

/// Same exchange as `reply`, carrying a 5.00 error instead of its body
fn oversized(reply: Message, size: usize) -> Message {
    let body = serde_json::json!({
        "status": "error",
        "message": format!("Response of {} bytes exceeds {} bytes", size, MAX_DATAGRAM_SIZE),
    });
    Message {
        code: ResponseCode::InternalServerError.code(),
        ..reply
    }
    .with_content(CONTENT_FORMAT_JSON, body.to_string().into_bytes())
}
