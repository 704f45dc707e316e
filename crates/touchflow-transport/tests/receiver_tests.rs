//! TUIO receiver tests
//!
//! Tests for the background receive loop including:
//! - Binding and lifecycle (start/stop/idempotence)
//! - Reconciliation of real UDP datagrams
//! - Survival of malformed datagrams
//! - Bounded shutdown latency

use rosc::encoder;
use rosc::{OscMessage, OscPacket, OscType};
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};
use touchflow_core::decoder::tuio_bundle;
use touchflow_core::{CursorSnapshot, SessionId};
use touchflow_transport::{ReceiverConfig, TransportError, TuioReceiver};

const WAIT: Duration = Duration::from_secs(5);

fn local_config() -> ReceiverConfig {
    ReceiverConfig {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        recv_timeout_ms: 20,
        ..Default::default()
    }
}

fn start_receiver() -> (TuioReceiver, SocketAddr) {
    let mut receiver = TuioReceiver::new(local_config());
    receiver.start().expect("receiver should start");
    let addr = receiver.local_addr().expect("bound address");
    (receiver, addr)
}

fn send_bundle(target: SocketAddr, alive: &[SessionId], cursors: &[CursorSnapshot], seq: i32) {
    let packet = OscPacket::Bundle(tuio_bundle(alive, cursors, seq));
    send_raw(target, &encoder::encode(&packet).expect("encode"));
}

fn send_raw(target: SocketAddr, bytes: &[u8]) {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("sender socket");
    socket.send_to(bytes, target).expect("send");
}

/// Poll until `check` holds or the timeout expires
fn wait_until(check: impl Fn() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < WAIT {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

fn session_ids(receiver: &TuioReceiver) -> Vec<SessionId> {
    receiver.snapshot().into_iter().map(|(id, _)| id).collect()
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_start_binds_ephemeral_port() {
    let (receiver, addr) = start_receiver();
    assert!(receiver.is_running());
    assert!(addr.port() > 0);
}

#[test]
fn test_start_twice_is_noop() {
    let (mut receiver, addr) = start_receiver();
    receiver.start().expect("second start should be a no-op");
    assert_eq!(receiver.local_addr(), Some(addr));
}

#[test]
fn test_bind_conflict_reports_error() {
    let taken = UdpSocket::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let mut receiver = TuioReceiver::new(ReceiverConfig {
        port,
        ..local_config()
    });

    assert!(matches!(
        receiver.start(),
        Err(TransportError::Bind { .. })
    ));
    assert!(!receiver.is_running());
}

#[test]
fn test_stop_is_prompt() {
    let (mut receiver, _) = start_receiver();

    let start = Instant::now();
    receiver.stop().expect("stop");

    assert!(!receiver.is_running());
    assert!(receiver.local_addr().is_none());
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn test_restart_after_stop() {
    let (mut receiver, _) = start_receiver();
    receiver.stop().unwrap();
    receiver.start().expect("restart");
    let addr = receiver.local_addr().unwrap();

    send_bundle(addr, &[1], &[CursorSnapshot::at(1, 0.5, 0.5)], 1);
    assert!(wait_until(|| session_ids(&receiver) == vec![1]));
}

// ============================================================================
// Reconciliation over UDP
// ============================================================================

#[test]
fn test_cursor_lifecycle_over_udp() {
    let (receiver, addr) = start_receiver();

    send_bundle(
        addr,
        &[1, 2],
        &[CursorSnapshot::at(1, 0.1, 0.1), CursorSnapshot::at(2, 0.9, 0.9)],
        1,
    );
    assert!(wait_until(|| session_ids(&receiver) == vec![1, 2]));

    send_bundle(addr, &[1], &[], 2);
    assert!(wait_until(|| session_ids(&receiver) == vec![1]));

    assert_eq!(receiver.force_refresh(), 1);
    assert!(receiver.snapshot().is_empty());
}

#[test]
fn test_malformed_datagrams_are_dropped() {
    let (receiver, addr) = start_receiver();
    let stats = receiver.stats();

    send_raw(addr, b"not osc at all");

    let short_set = OscPacket::Message(OscMessage {
        addr: "/tuio/2Dcur".to_string(),
        args: vec![OscType::String("set".to_string()), OscType::Int(3)],
    });
    send_raw(addr, &encoder::encode(&short_set).unwrap());

    assert!(wait_until(|| stats.decode_errors() >= 2));

    // Loop still alive
    send_bundle(addr, &[4], &[CursorSnapshot::at(4, 0.4, 0.4)], 3);
    assert!(wait_until(|| session_ids(&receiver) == vec![4]));
    assert!(stats.datagrams() >= 3);
    assert!(receiver.is_running());
}

#[test]
fn test_silence_keeps_last_cursors() {
    let (receiver, addr) = start_receiver();

    send_bundle(addr, &[7], &[CursorSnapshot::at(7, 0.7, 0.7)], 1);
    assert!(wait_until(|| session_ids(&receiver) == vec![7]));

    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(session_ids(&receiver), vec![7]);
}
