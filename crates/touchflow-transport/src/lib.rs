//! touchflow transport
//!
//! Network side of TUIO ingestion: a UDP receiver running on its own
//! thread that keeps a shared [`touchflow_core::TrackingState`] current.

pub mod config;
pub mod error;
pub mod receiver;

pub use config::ReceiverConfig;
pub use error::{Result, TransportError};
pub use receiver::{ReceiverStats, TuioReceiver};
