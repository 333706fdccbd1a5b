//! Puppet Motion Core (renderer-agnostic)
//!
//! Keyframe motion engine for puppet avatars. Motions are parsed into validated
//! [`MotionDocument`]s, played as [`PlaybackTrack`]s by a [`Scheduler`] that
//! resolves priorities and falls back to an idle motion, and blended per target
//! into a flat list of parameter values each tick. Time is supplied by the host;
//! nothing here samples a clock, touches files or talks to a renderer.

pub mod accumulate;
pub mod config;
pub mod curve;
pub mod error;
pub mod ids;
pub mod interp;
pub mod loader;
pub mod motion;
pub mod outputs;
pub mod sampling;
pub mod scheduler;
pub mod track;

// Re-exports for hosts
pub use accumulate::Accumulator;
pub use config::{Config, FadeEasing};
pub use curve::{ControlPoint, Curve, CurveBuilder, Segment, SegmentKind, TargetKind};
pub use error::{CurveError, LoadError, LoadErrorKind};
pub use ids::TrackId;
pub use loader::{motion_from_tree, parse_motion_json};
pub use motion::{MotionBuilder, MotionDocument, MotionEventDef};
pub use outputs::{Change, MotionEvent, Outputs};
pub use sampling::{evaluate, sample};
pub use scheduler::{PlayRequest, Scheduler, SubmitStatus, Submission};
pub use track::{PlaybackState, PlaybackTrack, TrackSettings, TrackStep};
