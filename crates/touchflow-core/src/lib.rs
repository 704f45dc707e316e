//! touchflow core
//!
//! TUIO 1.0 cursor ingestion primitives:
//! - Cursor snapshots ([`CursorSnapshot`])
//! - `/tuio/2Dcur` bundle decoding ([`decoder`])
//! - Alive/set reconciliation into a shared cursor map ([`TrackingState`])

pub mod cursor;
pub mod decoder;
pub mod error;
pub mod state;

pub use cursor::{CursorComparator, CursorSnapshot, SessionId};
pub use decoder::{decode_datagram, CursorFrame};
pub use error::{DecodeError, Result};
pub use state::{CursorEvent, ReconcileReport, TrackingState};

/// OSC address of the TUIO 2D cursor profile
pub const TUIO_2DCUR_ADDRESS: &str = "/tuio/2Dcur";

/// Default TUIO UDP port
pub const DEFAULT_TUIO_PORT: u16 = 3333;
