//! Mock transport for testing

use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::DatagramTransport;
use crate::error::Result;

/// In-memory datagram transport
///
/// Clones share the same queues, so a test can keep a handle while the
/// node owns another.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    inbound: VecDeque<(Vec<u8>, SocketAddr)>,
    sent: Vec<(Vec<u8>, SocketAddr)>,
    fail_sends: bool,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a datagram to be received
    pub fn inject(&self, data: &[u8], from: SocketAddr) {
        self.inner.lock().inbound.push_back((data.to_vec(), from));
    }

    /// All datagrams sent so far
    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.inner.lock().sent.clone()
    }

    /// Forget recorded sends
    pub fn clear_sent(&self) {
        self.inner.lock().sent.clear();
    }

    /// Make every subsequent send fail with `ConnectionRefused`
    pub fn fail_sends(&self, fail: bool) {
        self.inner.lock().fail_sends = fail;
    }

    /// Datagrams still waiting to be received
    pub fn pending(&self) -> usize {
        self.inner.lock().inbound.len()
    }
}

impl DatagramTransport for MockTransport {
    fn send_to(&self, data: &[u8], addr: SocketAddr) -> Result<usize> {
        let mut inner = self.inner.lock();
        if inner.fail_sends {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "mock send failure").into());
        }
        inner.sent.push((data.to_vec(), addr));
        Ok(data.len())
    }

    fn recv_from(
        &self,
        buffer: &mut [u8],
        _wait: Duration,
    ) -> Result<Option<(usize, SocketAddr)>> {
        let mut inner = self.inner.lock();
        match inner.inbound.pop_front() {
            Some((data, from)) => {
                let len = data.len().min(buffer.len());
                buffer[..len].copy_from_slice(&data[..len]);
                Ok(Some((len, from)))
            }
            None => Ok(None),
        }
    }
}
