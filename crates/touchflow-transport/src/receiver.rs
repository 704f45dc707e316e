//! TUIO/UDP receive loop
//!
//! [`TuioReceiver`] owns one UDP socket and one dedicated thread. The thread
//! drives a single-threaded tokio runtime that receives datagrams, decodes
//! them and reconciles them into a shared [`TrackingState`], strictly one
//! datagram at a time.
//!
//! ## Shutdown
//!
//! `stop()` clears the running flag. Every receive is bounded by
//! `recv_timeout`, so the loop notices the flag within one timeout and then
//! closes the socket.
//!
//! ## Failure handling
//!
//! Undecodable datagrams are dropped. Socket errors are counted and logged
//! up to `max_logged_errors` times, after which they are counted silently.
//! Nothing here ends the loop except `stop()`.

use parking_lot::RwLock;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};
use touchflow_core::{decode_datagram, CursorSnapshot, SessionId, TrackingState};

use crate::config::ReceiverConfig;
use crate::error::{Result, TransportError};

/// Counters maintained by the receive loop
#[derive(Debug, Default)]
pub struct ReceiverStats {
    datagrams: AtomicU64,
    decode_errors: AtomicU64,
    socket_errors: AtomicU64,
    rebinds: AtomicU64,
}

impl ReceiverStats {
    /// Datagrams received, decodable or not
    pub fn datagrams(&self) -> u64 {
        self.datagrams.load(Ordering::Relaxed)
    }

    /// Datagrams dropped because they failed to decode
    pub fn decode_errors(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }

    pub fn socket_errors(&self) -> u64 {
        self.socket_errors.load(Ordering::Relaxed)
    }

    pub fn rebinds(&self) -> u64 {
        self.rebinds.load(Ordering::Relaxed)
    }
}

/// TUIO receiver with an explicit start/stop lifecycle
pub struct TuioReceiver {
    config: ReceiverConfig,
    state: Arc<TrackingState>,
    running: Arc<RwLock<bool>>,
    stats: Arc<ReceiverStats>,
    local_addr: Option<SocketAddr>,
    handle: Option<JoinHandle<()>>,
}

impl TuioReceiver {
    /// Create a receiver with its own tracking state
    pub fn new(config: ReceiverConfig) -> Self {
        Self::with_state(config, Arc::new(TrackingState::new()))
    }

    /// Create a receiver feeding an existing tracking state
    pub fn with_state(config: ReceiverConfig, state: Arc<TrackingState>) -> Self {
        Self {
            config,
            state,
            running: Arc::new(RwLock::new(false)),
            stats: Arc::new(ReceiverStats::default()),
            local_addr: None,
            handle: None,
        }
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Shared tracking state, safe to read from any thread
    pub fn state(&self) -> Arc<TrackingState> {
        Arc::clone(&self.state)
    }

    pub fn stats(&self) -> Arc<ReceiverStats> {
        Arc::clone(&self.stats)
    }

    /// Copy of the current cursor set
    pub fn snapshot(&self) -> Vec<(SessionId, CursorSnapshot)> {
        self.state.snapshot()
    }

    /// Forget every cursor (e.g. after the TUIO source restarted)
    pub fn force_refresh(&self) -> usize {
        let cleared = self.state.force_refresh();
        info!("TUIO state refreshed, {} cursors dropped", cleared);
        cleared
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }

    /// Address actually bound, available while running
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Bind the socket and spawn the receive thread.
    ///
    /// Calling `start` on a running receiver does nothing.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            debug!("TUIO receiver already running");
            return Ok(());
        }
        self.join_thread()?;
        self.config.validate()?;

        let addr = self.config.socket_addr();
        let std_socket = std::net::UdpSocket::bind(&addr).map_err(|source| {
            TransportError::Bind {
                addr: addr.clone(),
                source,
            }
        })?;
        std_socket.set_nonblocking(true)?;
        let local_addr = std_socket.local_addr()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let socket = {
            let _guard = runtime.enter();
            UdpSocket::from_std(std_socket)?
        };

        *self.running.write() = true;

        let receive_loop = ReceiveLoop {
            socket,
            local_addr,
            state: Arc::clone(&self.state),
            running: Arc::clone(&self.running),
            stats: Arc::clone(&self.stats),
            recv_timeout: self.config.recv_timeout(),
            errors: ErrorLog::new(self.config.max_logged_errors),
            buf: vec![0u8; self.config.max_packet_size],
        };

        let spawned = thread::Builder::new()
            .name("tuio-receiver".to_string())
            .spawn(move || runtime.block_on(receive_loop.run()));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                self.local_addr = Some(local_addr);
                info!("TUIO receiver listening on {}", local_addr);
                Ok(())
            }
            Err(e) => {
                *self.running.write() = false;
                Err(TransportError::Thread(e.to_string()))
            }
        }
    }

    /// Signal the loop to exit and wait for it.
    ///
    /// Returns after at most one receive timeout.
    pub fn stop(&mut self) -> Result<()> {
        *self.running.write() = false;
        self.join_thread()?;
        self.local_addr = None;
        Ok(())
    }

    fn join_thread(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| TransportError::Thread("receive thread panicked".to_string()))?;
            info!("TUIO receiver stopped");
        }
        Ok(())
    }
}

impl Drop for TuioReceiver {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Logs the first `limit` socket errors, then goes quiet
struct ErrorLog {
    limit: u32,
    logged: u32,
}

impl ErrorLog {
    fn new(limit: u32) -> Self {
        Self { limit, logged: 0 }
    }

    fn record(&mut self, err: &std::io::Error) {
        if self.logged >= self.limit {
            return;
        }
        self.logged += 1;
        warn!("TUIO socket error: {}", err);
        if self.logged == self.limit {
            warn!(
                "{} TUIO socket errors logged, suppressing further reports",
                self.limit
            );
        }
    }
}

/// State owned by the receive thread
struct ReceiveLoop {
    socket: UdpSocket,
    local_addr: SocketAddr,
    state: Arc<TrackingState>,
    running: Arc<RwLock<bool>>,
    stats: Arc<ReceiverStats>,
    recv_timeout: Duration,
    errors: ErrorLog,
    buf: Vec<u8>,
}

impl ReceiveLoop {
    async fn run(mut self) {
        while *self.running.read() {
            if self.socket.local_addr().is_err() {
                warn!("TUIO socket no longer bound, rebinding {}", self.local_addr);
                self.rebind().await;
                continue;
            }

            let received =
                tokio::time::timeout(self.recv_timeout, self.socket.recv_from(&mut self.buf)).await;

            match received {
                // Timed out, re-check the running flag
                Err(_) => {}
                Ok(Ok((len, from))) => self.handle_datagram(len, from),
                Ok(Err(e)) => self.socket_error(&e),
            }
        }

        debug!("TUIO receive loop on {} exiting", self.local_addr);
    }

    fn handle_datagram(&mut self, len: usize, from: SocketAddr) {
        self.stats.datagrams.fetch_add(1, Ordering::Relaxed);

        let result = decode_datagram(&self.buf[..len]).and_then(|bundle| self.state.reconcile(&bundle));

        match result {
            Ok(report) => {
                if !report.is_empty() {
                    debug!(
                        "TUIO frame {:?} from {}: {} events",
                        report.sequence,
                        from,
                        report.events.len()
                    );
                }
            }
            Err(e) => {
                self.stats.decode_errors.fetch_add(1, Ordering::Relaxed);
                debug!("dropping TUIO datagram from {}: {}", from, e);
            }
        }
    }

    fn socket_error(&mut self, err: &std::io::Error) {
        self.stats.socket_errors.fetch_add(1, Ordering::Relaxed);
        self.errors.record(err);
    }

    async fn rebind(&mut self) {
        match UdpSocket::bind(self.local_addr).await {
            Ok(socket) => {
                self.socket = socket;
                self.stats.rebinds.fetch_add(1, Ordering::Relaxed);
                info!("TUIO socket rebound to {}", self.local_addr);
            }
            Err(e) => {
                self.socket_error(&e);
                tokio::time::sleep(self.recv_timeout).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_log_caps() {
        let mut log = ErrorLog::new(3);
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        for _ in 0..10 {
            log.record(&err);
        }
        assert_eq!(log.logged, 3);
    }

    #[test]
    fn test_stop_without_start() {
        let mut receiver = TuioReceiver::new(ReceiverConfig::with_port(0));
        assert!(!receiver.is_running());
        receiver.stop().unwrap();
        assert!(receiver.local_addr().is_none());
    }
}
