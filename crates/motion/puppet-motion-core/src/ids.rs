//! Identifiers and a simple allocator for scheduled tracks.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle for a play request, valid both while queued and once active.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track#{}", self.0)
    }
}

/// Monotonic allocator for TrackId. Wraps at `u32::MAX`; callers skip ids still in use.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_track: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_track(&mut self) -> TrackId {
        let id = TrackId(self.next_track);
        self.next_track = self.next_track.wrapping_add(1);
        id
    }

    #[cfg(test)]
    pub(crate) fn starting_at(next_track: u32) -> Self {
        Self { next_track }
    }
}
