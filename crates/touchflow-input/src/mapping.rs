//! Device to screen coordinate mapping
//!
//! Each backend reports positions in its own space and with its own y axis
//! convention. The conventions differ on purpose and are kept separate:
//!
//! | Backend  | Raw space          | Screen y                          |
//! |----------|--------------------|-----------------------------------|
//! | TUIO     | normalized [0, 1]² | `(0.5 + (0.5 - y)) * h` if flipped |
//! | OS touch | client pixels      | `h - y`                           |
//! | Mouse    | screen pixels      | unchanged                         |

use serde::{Deserialize, Serialize};

use crate::touch::Point;

/// Target screen dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Display {
    pub width: f32,
    pub height: f32,
    /// Flip TUIO's y axis
    pub flip_y: bool,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            flip_y: true,
        }
    }
}

impl Display {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

/// Maps a backend's raw position to screen space
pub trait CoordinateMapping: Send {
    fn to_screen(&self, raw: Point, display: &Display) -> Point;
}

/// TUIO: normalized input scaled to the display, y optionally flipped
#[derive(Debug, Clone, Copy, Default)]
pub struct TuioMapping;

impl CoordinateMapping for TuioMapping {
    fn to_screen(&self, raw: Point, display: &Display) -> Point {
        let y = if display.flip_y {
            (0.5 + (0.5 - raw.y)) * display.height
        } else {
            raw.y * display.height
        };
        Point::new(raw.x * display.width, y)
    }
}

/// OS touch: client pixel coordinates, y measured from the bottom
#[derive(Debug, Clone, Copy, Default)]
pub struct OsTouchMapping;

impl CoordinateMapping for OsTouchMapping {
    fn to_screen(&self, raw: Point, display: &Display) -> Point {
        Point::new(raw.x, display.height - raw.y)
    }
}

/// Mouse: the cursor position is already in screen space
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseMapping;

impl CoordinateMapping for MouseMapping {
    fn to_screen(&self, raw: Point, _display: &Display) -> Point {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuio_flipped() {
        let display = Display::new(1000.0, 500.0);
        let p = TuioMapping.to_screen(Point::new(0.25, 0.2), &display);
        assert_eq!(p.x, 250.0);
        assert!((p.y - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_tuio_unflipped() {
        let display = Display {
            flip_y: false,
            ..Display::new(1000.0, 500.0)
        };
        let p = TuioMapping.to_screen(Point::new(0.25, 0.2), &display);
        assert_eq!(p, Point::new(250.0, 100.0));
    }

    #[test]
    fn test_os_touch_flip() {
        let display = Display::new(800.0, 600.0);
        let p = OsTouchMapping.to_screen(Point::new(120.0, 100.0), &display);
        assert_eq!(p, Point::new(120.0, 500.0));
    }

    #[test]
    fn test_mouse_identity() {
        let display = Display::new(800.0, 600.0);
        let raw = Point::new(33.0, 44.0);
        assert_eq!(MouseMapping.to_screen(raw, &display), raw);
    }
}
