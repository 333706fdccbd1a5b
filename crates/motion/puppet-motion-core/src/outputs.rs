//! Output contracts from the scheduler.
//!
//! Outputs carry the blended parameter values for this tick, keyed by target
//! kind and id, and a separate list of semantic events. The host applies the
//! changes to its model; targets absent from `changes` keep their previous value.

use serde::{Deserialize, Serialize};

use crate::curve::TargetKind;
use crate::ids::TrackId;

/// One blended target value for this tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub target_kind: TargetKind,
    pub target_id: String,
    pub value: f64,
}

/// Discrete signals emitted by submit/tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MotionEvent {
    Started {
        track: TrackId,
        priority: i32,
    },
    Queued {
        track: TrackId,
        priority: i32,
    },
    /// A higher (or equal, non-blending) priority request pushed this track into fade-out.
    Preempted {
        track: TrackId,
        by: TrackId,
    },
    Looped {
        track: TrackId,
        played_count: u32,
    },
    /// The track reached `Stopped` and was retired.
    Finished {
        track: TrackId,
    },
    IdleStarted {
        track: TrackId,
    },
    /// A motion user-data marker was crossed.
    UserData {
        track: TrackId,
        time: f64,
        value: String,
    },
}

/// Outputs returned by `Scheduler::tick()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<MotionEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: MotionEvent) {
        self.events.push(event);
    }

    /// Look up the blended value for a target, if it was written this tick.
    pub fn value(&self, kind: TargetKind, target_id: &str) -> Option<f64> {
        self.changes
            .iter()
            .find(|c| c.target_kind == kind && c.target_id == target_id)
            .map(|c| c.value)
    }

    /// Convenience for `value(TargetKind::Parameter, id)`.
    pub fn parameter(&self, target_id: &str) -> Option<f64> {
        self.value(TargetKind::Parameter, target_id)
    }
}
