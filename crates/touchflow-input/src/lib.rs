//! touchflow input
//!
//! Unified touch handling for three backends:
//! - TUIO cursors from a shared [`touchflow_core::TrackingState`]
//! - Native OS touch contacts pushed through an [`OsTouchFeed`]
//! - Mouse emulation via a [`MouseProvider`]
//!
//! Every backend feeds the same [`Touch`] state machine through a
//! [`TouchTracker`]; only the coordinate mapping and the removal policy
//! differ per backend.

pub mod mapping;
pub mod source;
pub mod touch;
pub mod tracker;

pub use mapping::{CoordinateMapping, Display, MouseMapping, OsTouchMapping, TuioMapping};
pub use source::{
    Backend, MouseProvider, MouseSource, MouseState, OsTouchFeed, OsTouchSource, RawTouchSample,
    SharedMouse, TouchSource, TuioSource, MOUSE_TOUCH_ID,
};
pub use touch::{Point, Touch, TouchPhase};
pub use tracker::{PrunePolicy, TouchTracker};
