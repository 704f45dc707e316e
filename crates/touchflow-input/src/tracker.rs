//! Per-frame touch tracking
//!
//! [`TouchTracker`] is the one place where backend samples become
//! [`Touch`]es. It is generic over the source and takes the coordinate
//! mapping as a strategy, so the three backends share the same update
//! logic.
//!
//! ## Removal
//!
//! TUIO trackers prune touches whose id disappears (`PrunePolicy::PruneStale`).
//! OS touch and mouse trackers keep them (`PrunePolicy::Retain`): a touch that
//! is no longer reported simply stays in the table with `is_current() ==
//! false` and its last phase. The two behaviours are not unified.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use touchflow_core::TrackingState;
use tracing::trace;

use crate::mapping::{CoordinateMapping, Display, MouseMapping, OsTouchMapping, TuioMapping};
use crate::source::{
    Backend, MouseProvider, MouseSource, OsTouchFeed, OsTouchSource, TouchSource, TuioSource,
};
use crate::touch::Touch;

/// What happens to touches a poll did not revisit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrunePolicy {
    /// Report them once as `Ended`, then drop them
    PruneStale,
    /// Keep them, marked stale
    Retain,
}

/// Touch table for one backend
pub struct TouchTracker<S> {
    source: S,
    mapping: Box<dyn CoordinateMapping>,
    display: Display,
    prune: PrunePolicy,
    touches: BTreeMap<i64, Touch>,
}

impl<S: TouchSource> TouchTracker<S> {
    pub fn new(
        source: S,
        mapping: impl CoordinateMapping + 'static,
        display: Display,
        prune: PrunePolicy,
    ) -> Self {
        Self {
            source,
            mapping: Box::new(mapping),
            display,
            prune,
            touches: BTreeMap::new(),
        }
    }

    pub fn backend(&self) -> Backend {
        self.source.backend()
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Change the target display, e.g. after a window resize
    pub fn set_display(&mut self, display: Display) {
        self.display = display;
    }

    /// Run one polling pass.
    ///
    /// New ids start as `Began`; known ids are updated to `Moved` or
    /// `Stationary`. Returns the touches seen this pass, plus any touches
    /// pruned this pass (with phase `Ended`).
    pub fn poll(&mut self) -> Vec<Touch> {
        for touch in self.touches.values_mut() {
            touch.mark_stale();
        }

        let samples = self.source.poll_touches();
        let mut frame = Vec::with_capacity(samples.len());

        for sample in samples {
            let screen = self.mapping.to_screen(sample.position, &self.display);

            let touch = match self.touches.entry(sample.id) {
                Entry::Occupied(entry) => {
                    let touch = entry.into_mut();
                    touch.update(screen, sample.position);
                    touch
                }
                Entry::Vacant(entry) => {
                    trace!("{:?} touch {} began", self.source.backend(), sample.id);
                    entry.insert(Touch::new(sample.id, screen, sample.position))
                }
            };
            frame.push(touch.clone());
        }

        if self.prune == PrunePolicy::PruneStale {
            let stale: Vec<i64> = self
                .touches
                .iter()
                .filter(|(_, t)| !t.is_current())
                .map(|(id, _)| *id)
                .collect();

            for id in stale {
                if let Some(mut touch) = self.touches.remove(&id) {
                    trace!("{:?} touch {} ended", self.source.backend(), id);
                    touch.end();
                    frame.push(touch);
                }
            }
        }

        frame
    }

    /// Every touch in the table, stale ones included
    pub fn touches(&self) -> impl Iterator<Item = &Touch> {
        self.touches.values()
    }

    pub fn get(&self, id: i64) -> Option<&Touch> {
        self.touches.get(&id)
    }

    pub fn len(&self) -> usize {
        self.touches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touches.is_empty()
    }

    /// Drop every touch without reporting it
    pub fn clear(&mut self) {
        self.touches.clear();
    }
}

impl TouchTracker<TuioSource> {
    /// TUIO tracker over a shared tracking state
    pub fn tuio(state: Arc<TrackingState>, display: Display) -> Self {
        Self::new(
            TuioSource::new(state),
            TuioMapping,
            display,
            PrunePolicy::PruneStale,
        )
    }
}

impl TouchTracker<OsTouchSource> {
    /// Native touch tracker reading from `feed`
    pub fn os_touch(feed: &OsTouchFeed, display: Display) -> Self {
        Self::new(feed.source(), OsTouchMapping, display, PrunePolicy::Retain)
    }
}

impl<P: MouseProvider> TouchTracker<MouseSource<P>> {
    /// Mouse emulation tracker
    pub fn mouse(provider: P, display: Display) -> Self {
        Self::new(
            MouseSource::new(provider),
            MouseMapping,
            display,
            PrunePolicy::Retain,
        )
    }
}
