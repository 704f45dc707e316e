//! TUIO 2D cursor snapshot

use rosc::{OscMessage, OscType};
use serde::Serialize;

use crate::TUIO_2DCUR_ADDRESS;

/// Session identifier assigned by the TUIO source
pub type SessionId = i32;

/// One cursor as reported by a single `set` message.
///
/// Snapshots are never mutated; an update replaces the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CursorSnapshot {
    pub session_id: SessionId,
    /// Normalized position in [0, 1]²
    pub position: (f32, f32),
    pub velocity: (f32, f32),
    pub acceleration: f32,
}

impl CursorSnapshot {
    pub fn new(
        session_id: SessionId,
        position: (f32, f32),
        velocity: (f32, f32),
        acceleration: f32,
    ) -> Self {
        Self {
            session_id,
            position,
            velocity,
            acceleration,
        }
    }

    /// Cursor at rest at `(x, y)`
    pub fn at(session_id: SessionId, x: f32, y: f32) -> Self {
        Self::new(session_id, (x, y), (0.0, 0.0), 0.0)
    }

    /// Encode as a `/tuio/2Dcur set` message
    pub fn to_set_message(&self) -> OscMessage {
        OscMessage {
            addr: TUIO_2DCUR_ADDRESS.to_string(),
            args: vec![
                OscType::String("set".to_string()),
                OscType::Int(self.session_id),
                OscType::Float(self.position.0),
                OscType::Float(self.position.1),
                OscType::Float(self.velocity.0),
                OscType::Float(self.velocity.1),
                OscType::Float(self.acceleration),
            ],
        }
    }
}

/// Held vs updated comparison policy.
///
/// `Exact` compares every component bit-for-bit (modulo float `==`) and is
/// the default. `Epsilon` treats snapshots whose components all differ by
/// at most the tolerance as unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CursorComparator {
    #[default]
    Exact,
    Epsilon(f32),
}

impl CursorComparator {
    /// Whether `new` should be treated as identical to `stored`
    pub fn same(&self, stored: &CursorSnapshot, new: &CursorSnapshot) -> bool {
        match *self {
            CursorComparator::Exact => stored == new,
            CursorComparator::Epsilon(tolerance) => {
                let close = |a: f32, b: f32| (a - b).abs() <= tolerance;
                stored.session_id == new.session_id
                    && close(stored.position.0, new.position.0)
                    && close(stored.position.1, new.position.1)
                    && close(stored.velocity.0, new.velocity.0)
                    && close(stored.velocity.1, new.velocity.1)
                    && close(stored.acceleration, new.acceleration)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_message_layout() {
        let msg = CursorSnapshot::new(7, (0.25, 0.5), (0.1, -0.1), 2.0).to_set_message();
        assert_eq!(msg.addr, "/tuio/2Dcur");
        assert_eq!(msg.args.len(), 7);
        assert_eq!(msg.args[0], OscType::String("set".to_string()));
        assert_eq!(msg.args[1], OscType::Int(7));
        assert_eq!(msg.args[3], OscType::Float(0.5));
    }

    #[test]
    fn test_exact_comparator() {
        let a = CursorSnapshot::at(1, 0.5, 0.5);
        let b = CursorSnapshot::at(1, 0.5, 0.500001);
        assert!(CursorComparator::Exact.same(&a, &a));
        assert!(!CursorComparator::Exact.same(&a, &b));
    }

    #[test]
    fn test_epsilon_comparator() {
        let a = CursorSnapshot::at(1, 0.5, 0.5);
        let b = CursorSnapshot::at(1, 0.5, 0.5001);
        let c = CursorSnapshot::at(1, 0.6, 0.5);
        let cmp = CursorComparator::Epsilon(0.001);
        assert!(cmp.same(&a, &b));
        assert!(!cmp.same(&a, &c));
    }
}
