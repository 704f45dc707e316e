//! Touch sources
//!
//! A [`TouchSource`] produces the raw samples of one backend for one frame.
//! Ids are only unique within a backend; trackers never mix sources.

use parking_lot::Mutex;
use std::sync::Arc;
use touchflow_core::TrackingState;

use crate::touch::Point;

/// Id used for the single emulated mouse touch
pub const MOUSE_TOUCH_ID: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Tuio,
    OsTouch,
    Mouse,
}

/// One contact as reported by a backend, in device space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawTouchSample {
    pub id: i64,
    pub position: Point,
}

impl RawTouchSample {
    pub fn new(id: i64, position: Point) -> Self {
        Self { id, position }
    }
}

/// Per-frame sample producer
pub trait TouchSource {
    fn backend(&self) -> Backend;

    /// Contacts currently reported by the backend
    fn poll_touches(&mut self) -> Vec<RawTouchSample>;
}

/// TUIO cursors read from the shared tracking state
#[derive(Debug, Clone)]
pub struct TuioSource {
    state: Arc<TrackingState>,
}

impl TuioSource {
    pub fn new(state: Arc<TrackingState>) -> Self {
        Self { state }
    }
}

impl TouchSource for TuioSource {
    fn backend(&self) -> Backend {
        Backend::Tuio
    }

    fn poll_touches(&mut self) -> Vec<RawTouchSample> {
        self.state
            .snapshot()
            .into_iter()
            .map(|(id, cursor)| RawTouchSample::new(id as i64, cursor.position.into()))
            .collect()
    }
}

/// Handle the platform touch layer uses to publish its current contacts.
///
/// Each `publish` replaces the previous contact set. Coordinates are client
/// pixels, already transformed from screen space by the platform layer.
#[derive(Debug, Clone, Default)]
pub struct OsTouchFeed {
    contacts: Arc<Mutex<Vec<RawTouchSample>>>,
}

impl OsTouchFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, contacts: Vec<RawTouchSample>) {
        *self.contacts.lock() = contacts;
    }

    pub fn clear(&self) {
        self.contacts.lock().clear();
    }

    /// Source reading from this feed
    pub fn source(&self) -> OsTouchSource {
        OsTouchSource { feed: self.clone() }
    }
}

/// Native touch contacts read from an [`OsTouchFeed`]
#[derive(Debug, Clone)]
pub struct OsTouchSource {
    feed: OsTouchFeed,
}

impl TouchSource for OsTouchSource {
    fn backend(&self) -> Backend {
        Backend::OsTouch
    }

    fn poll_touches(&mut self) -> Vec<RawTouchSample> {
        self.feed.contacts.lock().clone()
    }
}

/// Cursor position and primary button
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseState {
    pub position: Point,
    pub button_down: bool,
}

/// Supplies the current mouse state
pub trait MouseProvider {
    fn mouse_state(&self) -> MouseState;
}

impl<F> MouseProvider for F
where
    F: Fn() -> MouseState,
{
    fn mouse_state(&self) -> MouseState {
        self()
    }
}

/// Mouse state shared with whatever handles window events
#[derive(Debug, Clone, Default)]
pub struct SharedMouse {
    state: Arc<Mutex<MouseState>>,
}

impl SharedMouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, state: MouseState) {
        *self.state.lock() = state;
    }

    pub fn move_to(&self, position: Point) {
        self.state.lock().position = position;
    }

    pub fn set_button(&self, down: bool) {
        self.state.lock().button_down = down;
    }
}

impl MouseProvider for SharedMouse {
    fn mouse_state(&self) -> MouseState {
        *self.state.lock()
    }
}

/// Emulates a single touch while the mouse button is held
pub struct MouseSource<P> {
    provider: P,
}

impl<P: MouseProvider> MouseSource<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: MouseProvider> TouchSource for MouseSource<P> {
    fn backend(&self) -> Backend {
        Backend::Mouse
    }

    fn poll_touches(&mut self) -> Vec<RawTouchSample> {
        let state = self.provider.mouse_state();
        if state.button_down {
            vec![RawTouchSample::new(MOUSE_TOUCH_ID, state.position)]
        } else {
            Vec::new()
        }
    }
}
