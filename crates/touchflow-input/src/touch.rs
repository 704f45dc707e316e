//! Touch phase state machine
//!
//! A [`Touch`] is owned by exactly one tracker and only ever mutated on the
//! consumer thread. Phases move `Began -> {Moved, Stationary}*`, and the
//! owning tracker may finish a touch with `Ended` or `Canceled`.

use serde::Serialize;
use std::ops::{Add, Sub};
use std::time::{Duration, Instant};

/// 2D point in either device or screen space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point::new(x, y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Began,
    Moved,
    Stationary,
    Ended,
    Canceled,
}

impl TouchPhase {
    /// Ended or Canceled
    pub fn is_finished(&self) -> bool {
        matches!(self, TouchPhase::Ended | TouchPhase::Canceled)
    }
}

/// Backend-independent touch
#[derive(Debug, Clone)]
pub struct Touch {
    touch_id: i64,
    phase: TouchPhase,
    position: Point,
    raw_position: Point,
    delta_distance: Point,
    delta_time: Duration,
    is_current: bool,
    created_at: Instant,
    last_update: Instant,
}

impl Touch {
    /// First sighting of a backend id
    pub fn new(touch_id: i64, position: Point, raw_position: Point) -> Self {
        let now = Instant::now();
        Self {
            touch_id,
            phase: TouchPhase::Began,
            position,
            raw_position,
            delta_distance: Point::ZERO,
            delta_time: Duration::ZERO,
            is_current: true,
            created_at: now,
            last_update: now,
        }
    }

    /// Feed a new sample and recompute the phase.
    ///
    /// An unchanged position yields `Stationary` and keeps the previous
    /// `delta_distance`.
    pub fn update(&mut self, position: Point, raw_position: Point) -> TouchPhase {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_update);
        self.last_update = now;

        if position != self.position {
            self.phase = TouchPhase::Moved;
            self.delta_distance = position - self.position;
            self.position = position;
        } else {
            self.phase = TouchPhase::Stationary;
        }
        self.raw_position = raw_position;
        self.is_current = true;

        self.phase
    }

    /// Flag as not yet seen in the current poll
    pub fn mark_stale(&mut self) {
        self.is_current = false;
    }

    /// The backend stopped reporting this touch
    pub fn end(&mut self) {
        self.phase = TouchPhase::Ended;
    }

    /// The backend aborted this touch
    pub fn cancel(&mut self) {
        self.phase = TouchPhase::Canceled;
    }

    pub fn touch_id(&self) -> i64 {
        self.touch_id
    }

    pub fn phase(&self) -> TouchPhase {
        self.phase
    }

    /// Screen-space position
    pub fn position(&self) -> Point {
        self.position
    }

    /// Device-space position
    pub fn raw_position(&self) -> Point {
        self.raw_position
    }

    pub fn delta_distance(&self) -> Point {
        self.delta_distance
    }

    /// Time between the last two updates
    pub fn delta_time(&self) -> Duration {
        self.delta_time
    }

    pub fn is_current(&self) -> bool {
        self.is_current
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}
