//! Cursor tracking state
//!
//! Keeps the set of live TUIO cursors in sync with the alive/set stream.
//! One mutex covers every mutation and every bulk read, so a reader never
//! sees a half-applied bundle.

use parking_lot::Mutex;
use rosc::OscBundle;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::cursor::{CursorComparator, CursorSnapshot, SessionId};
use crate::decoder::CursorFrame;
use crate::error::Result;

/// What happened to one session during a reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorEvent {
    Added(SessionId),
    Updated(SessionId),
    Held(SessionId),
    Removed(SessionId),
}

impl CursorEvent {
    pub fn session_id(&self) -> SessionId {
        match *self {
            CursorEvent::Added(id)
            | CursorEvent::Updated(id)
            | CursorEvent::Held(id)
            | CursorEvent::Removed(id) => id,
        }
    }
}

/// Outcome of reconciling one bundle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Events in the order they were applied (removals first)
    pub events: Vec<CursorEvent>,
    /// The bundle's `fseq`, if any
    pub sequence: Option<i32>,
}

impl ReconcileReport {
    pub fn added(&self) -> Vec<SessionId> {
        self.select(|e| matches!(e, CursorEvent::Added(_)))
    }

    pub fn updated(&self) -> Vec<SessionId> {
        self.select(|e| matches!(e, CursorEvent::Updated(_)))
    }

    pub fn held(&self) -> Vec<SessionId> {
        self.select(|e| matches!(e, CursorEvent::Held(_)))
    }

    pub fn removed(&self) -> Vec<SessionId> {
        self.select(|e| matches!(e, CursorEvent::Removed(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn select(&self, pred: impl Fn(&CursorEvent) -> bool) -> Vec<SessionId> {
        self.events
            .iter()
            .filter(|&e| pred(e))
            .map(CursorEvent::session_id)
            .collect()
    }
}

/// Thread-safe map of session id to the latest cursor snapshot
#[derive(Debug, Default)]
pub struct TrackingState {
    cursors: Mutex<HashMap<SessionId, CursorSnapshot>>,
    comparator: CursorComparator,
}

impl TrackingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a non-default held/updated comparison
    pub fn with_comparator(comparator: CursorComparator) -> Self {
        Self {
            cursors: Mutex::new(HashMap::new()),
            comparator,
        }
    }

    pub fn comparator(&self) -> CursorComparator {
        self.comparator
    }

    /// Reconcile one decoded bundle.
    ///
    /// Bundles without `/tuio/2Dcur` messages leave the state untouched and
    /// yield an empty report. Decode errors leave the state untouched too.
    pub fn reconcile(&self, bundle: &OscBundle) -> Result<ReconcileReport> {
        match CursorFrame::decode(bundle)? {
            Some(frame) => Ok(self.apply(&frame)),
            None => Ok(ReconcileReport::default()),
        }
    }

    /// Apply an already decoded frame.
    ///
    /// Removals are applied before updates and additions. A session that is
    /// missing from `alive` is never (re)created by a `set` in the same frame.
    pub fn apply(&self, frame: &CursorFrame) -> ReconcileReport {
        let alive: HashSet<SessionId> = frame.alive.iter().copied().collect();
        let mut events = Vec::new();

        let mut cursors = self.cursors.lock();

        // Remove not alive
        let mut gone: Vec<SessionId> = cursors
            .keys()
            .filter(|id| !alive.contains(*id))
            .copied()
            .collect();
        gone.sort_unstable();
        for id in gone {
            cursors.remove(&id);
            events.push(CursorEvent::Removed(id));
        }

        // Update or hold existing
        let mut seen = HashSet::with_capacity(alive.len());
        for &id in &frame.alive {
            if !seen.insert(id) {
                continue;
            }
            let Some(stored) = cursors.get_mut(&id) else {
                continue;
            };
            match frame.snapshots.get(&id) {
                Some(new) if !self.comparator.same(stored, new) => {
                    *stored = *new;
                    events.push(CursorEvent::Updated(id));
                }
                _ => events.push(CursorEvent::Held(id)),
            }
        }

        // Add new
        for (id, snapshot) in &frame.snapshots {
            if alive.contains(id) && !cursors.contains_key(id) {
                cursors.insert(*id, *snapshot);
                events.push(CursorEvent::Added(*id));
            }
        }

        drop(cursors);

        if !events.is_empty() {
            debug!(
                sequence = ?frame.sequence,
                events = events.len(),
                "reconciled cursor frame"
            );
        }

        ReconcileReport {
            events,
            sequence: frame.sequence,
        }
    }

    /// Drop every tracked cursor.
    ///
    /// Used after a TUIO source restart, which resets its session ids
    /// without ever removing the old ones.
    pub fn force_refresh(&self) -> usize {
        let mut cursors = self.cursors.lock();
        let cleared = cursors.len();
        cursors.clear();
        debug!(cleared, "forced cursor refresh");
        cleared
    }

    /// Point-in-time copy of all cursors, ordered by session id
    pub fn snapshot(&self) -> Vec<(SessionId, CursorSnapshot)> {
        let mut out: Vec<_> = self
            .cursors
            .lock()
            .iter()
            .map(|(id, c)| (*id, *c))
            .collect();
        out.sort_unstable_by_key(|(id, _)| *id);
        out
    }

    pub fn get(&self, id: SessionId) -> Option<CursorSnapshot> {
        self.cursors.lock().get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.cursors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::tuio_bundle;

    #[test]
    fn test_alive_without_set_is_not_added() {
        let state = TrackingState::new();
        let report = state.reconcile(&tuio_bundle(&[4], &[], 1)).unwrap();
        assert!(report.is_empty());
        assert!(state.is_empty());
    }

    #[test]
    fn test_duplicate_alive_ids_reported_once() {
        let state = TrackingState::new();
        let c = CursorSnapshot::at(1, 0.5, 0.5);
        state.reconcile(&tuio_bundle(&[1], &[c], 1)).unwrap();

        let report = state.reconcile(&tuio_bundle(&[1, 1], &[], 2)).unwrap();
        assert_eq!(report.events, vec![CursorEvent::Held(1)]);
    }

    #[test]
    fn test_epsilon_comparator_holds() {
        let state = TrackingState::with_comparator(CursorComparator::Epsilon(0.01));
        state
            .reconcile(&tuio_bundle(&[1], &[CursorSnapshot::at(1, 0.5, 0.5)], 1))
            .unwrap();
        let report = state
            .reconcile(&tuio_bundle(&[1], &[CursorSnapshot::at(1, 0.505, 0.5)], 2))
            .unwrap();
        assert_eq!(report.held(), vec![1]);
        assert_eq!(state.get(1).unwrap().position, (0.5, 0.5));
    }
}
