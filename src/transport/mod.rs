//! Transport Module
//!
//! Datagram I/O abstraction. Nodes and clients talk through
//! [`DatagramTransport`] so the protocol logic can be driven by a real
//! `UdpSocket` or by [`MockTransport`] in tests.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use crate::error::{ParkError, Result};

mod mock;

pub use mock::MockTransport;

/// Smallest receive wait; a zero read timeout is rejected by the OS
const MIN_WAIT: Duration = Duration::from_millis(1);

/// Datagram transport trait
pub trait DatagramTransport: Send {
    /// Send one datagram to `addr`, returns number of bytes sent
    fn send_to(&self, data: &[u8], addr: SocketAddr) -> Result<usize>;

    /// Wait at most `wait` for one datagram
    ///
    /// Returns `Ok(None)` when nothing arrived in time.
    fn recv_from(&self, buffer: &mut [u8], wait: Duration)
        -> Result<Option<(usize, SocketAddr)>>;
}

impl DatagramTransport for UdpSocket {
    fn send_to(&self, data: &[u8], addr: SocketAddr) -> Result<usize> {
        Ok(UdpSocket::send_to(self, data, addr)?)
    }

    fn recv_from(
        &self,
        buffer: &mut [u8],
        wait: Duration,
    ) -> Result<Option<(usize, SocketAddr)>> {
        self.set_read_timeout(Some(wait.max(MIN_WAIT)))?;
        match UdpSocket::recv_from(self, buffer) {
            Ok(received) => Ok(Some(received)),
            Err(e) => {
                let err = ParkError::Transport(e);
                if err.is_timeout() {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }
}
