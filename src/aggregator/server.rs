//! UDP Server
//!
//! Receives datagrams and dispatches them to worker threads.

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};

use crate::config::Config;
use crate::error::{ParkError, Result};
use crate::protocol::MAX_DATAGRAM_SIZE;
use super::Endpoint;

/// Queued datagrams per worker before the receive thread starts dropping
const QUEUE_DEPTH_PER_WORKER: usize = 64;

/// UDP server for the aggregator
pub struct Server {
    config: Config,
    endpoint: Arc<Endpoint>,
    socket: UdpSocket,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind `config.listen_addr`
    pub fn bind(config: Config, endpoint: Arc<Endpoint>) -> Result<Self> {
        if config.worker_threads == 0 {
            return Err(ParkError::Config("worker_threads must be at least 1".to_string()));
        }

        let socket = UdpSocket::bind(&config.listen_addr)?;
        socket.set_read_timeout(Some(Duration::from_millis(config.recv_timeout_ms.max(1))))?;

        Ok(Self {
            config,
            endpoint,
            socket,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Flag that stops `run` when set; may be shared with a signal handler
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        tracing::info!(
            "Serving {} on {} with {} workers",
            super::RESOURCE_PATH,
            self.local_addr()?,
            self.config.worker_threads
        );

        let (tx, rx) =
            channel::bounded::<(Vec<u8>, SocketAddr)>(self.config.worker_threads * QUEUE_DEPTH_PER_WORKER);

        let workers = (0..self.config.worker_threads)
            .map(|id| self.spawn_worker(id, rx.clone()))
            .collect::<Result<Vec<_>>>()?;
        drop(rx);

        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        while !self.shutdown.load(Ordering::Relaxed) {
            match self.socket.recv_from(&mut buf) {
                Ok((len, peer)) => match tx.try_send((buf[..len].to_vec(), peer)) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!("Request queue full, dropping datagram from {}", peer)
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        tracing::error!("All workers exited");
                        break;
                    }
                },
                Err(e) => {
                    let err = ParkError::Transport(e);
                    if !err.is_timeout() {
                        // e.g. ICMP port-unreachable surfacing on the next recv
                        tracing::warn!("Receive failed: {}", err);
                    }
                }
            }
        }

        // Closing the channel lets workers drain and exit
        drop(tx);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    fn spawn_worker(
        &self,
        id: usize,
        rx: Receiver<(Vec<u8>, SocketAddr)>,
    ) -> Result<JoinHandle<()>> {
        let socket = self.socket.try_clone()?;
        let endpoint = Arc::clone(&self.endpoint);

        let handle = thread::Builder::new()
            .name(format!("parkwatch-worker-{}", id))
            .spawn(move || {
                for (datagram, peer) in rx.iter() {
                    let Some(reply) = endpoint.handle_datagram(&datagram) else {
                        continue;
                    };
                    if let Err(e) = socket.send_to(&reply, peer) {
                        tracing::warn!("Error replying to {}: {}", peer, e);
                    }
                }
            })?;
        Ok(handle)
    }
}
