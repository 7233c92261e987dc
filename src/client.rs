//! Request client
//!
//! One confirmable exchange: send a request, wait for the reply carrying
//! the same message id. Unrelated or undecodable datagrams are skipped, but
//! never past the overall deadline.

use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::error::{ParkError, Result};
use crate::protocol::{decode_message, encode_request, Message, Method, MAX_DATAGRAM_SIZE};
use crate::transport::DatagramTransport;

/// Send a confirmable request to `server` and wait at most `timeout` in
/// total for the matching reply
pub fn exchange<T: DatagramTransport + ?Sized>(
    transport: &T,
    server: SocketAddr,
    method: Method,
    path: &str,
    payload: &[u8],
    message_id: u16,
    timeout: Duration,
) -> Result<Message> {
    let frame = encode_request(message_id, method, path, payload, true)?;
    transport.send_to(&frame, server)?;

    let deadline = Instant::now() + timeout;
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ParkError::Transport(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("no reply from {} within {} ms", server, timeout.as_millis()),
            )));
        }

        let Some((len, peer)) = transport.recv_from(&mut buf, remaining)? else {
            continue;
        };
        match decode_message(&buf[..len]) {
            Ok(reply) if reply.message_id == message_id => return Ok(reply),
            Ok(other) => tracing::debug!(
                "Skipping mid={} from {} while waiting for mid={}",
                other.message_id,
                peer,
                message_id
            ),
            Err(e) => tracing::debug!("Skipping datagram from {}: {}", peer, e),
        }
    }
}
