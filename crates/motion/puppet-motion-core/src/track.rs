//! Runtime playback state for one scheduled motion.
//!
//! State machine: `Playing <-> Paused`, `Playing | Paused -> Stopped` (terminal).
//! `stop()` does not jump to `Stopped`; it starts a fade-out from the current
//! weight and the track reaches `Stopped` once that fade has elapsed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::FadeEasing;
use crate::curve::Curve;
use crate::ids::TrackId;
use crate::interp::functions::ease;
use crate::motion::{MotionDocument, MotionEventDef};

/// Playback state of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    Playing,
    Paused,
    /// Terminal; the scheduler retires the track on the next tick.
    Stopped,
}

impl PlaybackState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    #[inline]
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Playing)
    }

    #[inline]
    pub fn can_resume(&self) -> bool {
        matches!(self, Self::Paused)
    }

    #[inline]
    pub fn can_stop(&self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

/// Effective playback parameters for a track (motion defaults with request overrides applied).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSettings {
    pub looping: bool,
    pub fade_in_seconds: f64,
    pub fade_out_seconds: f64,
    pub easing: FadeEasing,
}

impl TrackSettings {
    pub fn from_motion(motion: &MotionDocument, easing: FadeEasing) -> Self {
        Self {
            looping: motion.is_loop(),
            fade_in_seconds: motion.fade_in_seconds(),
            fade_out_seconds: motion.fade_out_seconds(),
            easing,
        }
    }
}

/// Fade-out started by `stop()`, anchored at the timeline position where it began.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StopFade {
    elapsed: f64,
    duration: f64,
    at_time: f64,
    at_played: u32,
}

/// What happened during one [`PlaybackTrack::advance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackStep {
    /// Number of loop wraps in this step.
    pub wraps: u32,
    /// Indices into `motion.events()` crossed in this step, in firing order.
    pub fired: Vec<usize>,
    /// The track entered `Stopped` in this step.
    pub stopped: bool,
}

#[derive(Debug, Clone)]
pub struct PlaybackTrack {
    id: TrackId,
    motion: Arc<MotionDocument>,
    priority: i32,
    settings: TrackSettings,
    local_time: f64,
    state: PlaybackState,
    fade_weight: f64,
    played_count: u32,
    stop_fade: Option<StopFade>,
    started: bool,
}

impl PlaybackTrack {
    pub fn new(
        id: TrackId,
        motion: Arc<MotionDocument>,
        priority: i32,
        settings: TrackSettings,
    ) -> Self {
        let mut track = Self {
            id,
            motion,
            priority,
            settings,
            local_time: 0.0,
            state: PlaybackState::Playing,
            fade_weight: 0.0,
            played_count: 0,
            stop_fade: None,
            started: false,
        };
        track.fade_weight = track.compute_weight(settings.fade_in_seconds, settings.fade_out_seconds);
        track
    }

    #[inline]
    pub fn id(&self) -> TrackId {
        self.id
    }

    #[inline]
    pub fn motion(&self) -> &Arc<MotionDocument> {
        &self.motion
    }

    #[inline]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[inline]
    pub fn settings(&self) -> &TrackSettings {
        &self.settings
    }

    #[inline]
    pub fn is_loop(&self) -> bool {
        self.settings.looping
    }

    #[inline]
    pub fn local_time(&self) -> f64 {
        self.local_time
    }

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn fade_weight(&self) -> f64 {
        self.fade_weight
    }

    #[inline]
    pub fn played_count(&self) -> u32 {
        self.played_count
    }

    /// A stop was requested and the track is fading out.
    #[inline]
    pub fn is_stopping(&self) -> bool {
        self.stop_fade.is_some() && self.state != PlaybackState::Stopped
    }

    /// Playing or paused, and not on its way out.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.state != PlaybackState::Stopped && self.stop_fade.is_none()
    }

    pub fn pause(&mut self) -> bool {
        if !self.state.can_pause() {
            return false;
        }
        self.state = PlaybackState::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if !self.state.can_resume() {
            return false;
        }
        self.state = PlaybackState::Playing;
        true
    }

    /// Begin fading out over `fade_out_seconds`. Repeated calls keep the running fade.
    pub fn stop(&mut self) -> bool {
        if !self.state.can_stop() {
            return false;
        }
        if self.stop_fade.is_none() {
            self.stop_fade = Some(StopFade {
                elapsed: 0.0,
                duration: self.settings.fade_out_seconds,
                at_time: self.local_time,
                at_played: self.played_count,
            });
        }
        true
    }

    /// Advance by `delta_seconds`. Negative or non-finite deltas count as zero.
    ///
    /// A paused track keeps its position, but a pending stop fade still runs.
    pub fn advance(&mut self, delta_seconds: f64) -> TrackStep {
        let mut step = TrackStep::default();
        if self.state == PlaybackState::Stopped {
            return step;
        }
        let dt = if delta_seconds.is_finite() && delta_seconds > 0.0 {
            delta_seconds
        } else {
            0.0
        };

        if let Some(fade) = self.stop_fade.as_mut() {
            fade.elapsed += dt;
        }

        if self.state == PlaybackState::Playing {
            self.advance_time(dt, &mut step);
        }

        if let Some(fade) = self.stop_fade {
            // A zero-length fade lands on the first advance after stop().
            if self.state != PlaybackState::Stopped
                && (fade.duration <= 0.0 || fade.elapsed >= fade.duration)
            {
                self.state = PlaybackState::Stopped;
            }
        }

        if self.state == PlaybackState::Stopped {
            step.stopped = true;
        }
        self.fade_weight =
            self.compute_weight(self.settings.fade_in_seconds, self.settings.fade_out_seconds);
        step
    }

    fn advance_time(&mut self, dt: f64, step: &mut TrackStep) {
        let duration = self.motion.duration_seconds();
        let events = self.motion.events();
        let prev = self.local_time;
        let first = !self.started;
        self.started = true;
        self.local_time += dt;

        if self.local_time < duration {
            collect_events(events, prev, first, self.local_time, &mut step.fired);
            return;
        }

        collect_events(events, prev, first, duration, &mut step.fired);
        if !self.settings.looping {
            self.local_time = duration;
            self.state = PlaybackState::Stopped;
            return;
        }

        let mut wraps = (self.local_time / duration).floor() as u32;
        self.local_time -= f64::from(wraps) * duration;
        if self.local_time >= duration {
            self.local_time -= duration;
            wraps += 1;
        }
        if self.local_time < 0.0 {
            self.local_time = 0.0;
        }
        self.played_count = self.played_count.saturating_add(wraps);
        step.wraps = wraps;
        // Intermediate full passes inside one step collapse into the final pass.
        collect_events(events, 0.0, true, self.local_time, &mut step.fired);
    }

    /// Weight for one curve of this track, honouring per-curve fade windows.
    pub fn weight_for(&self, curve: &Curve) -> f64 {
        if curve.fade_in_seconds.is_none() && curve.fade_out_seconds.is_none() {
            return self.fade_weight;
        }
        self.compute_weight(
            curve.fade_in_seconds.unwrap_or(self.settings.fade_in_seconds),
            curve.fade_out_seconds.unwrap_or(self.settings.fade_out_seconds),
        )
    }

    /// Weight while stopping is `min(timeline, from * (1 - ease(progress)))`, where
    /// `from` is the timeline weight at the moment of `stop()`. It never rises.
    fn compute_weight(&self, fade_in: f64, fade_out: f64) -> f64 {
        if self.state == PlaybackState::Stopped {
            return 0.0;
        }
        let timeline =
            self.timeline_weight(fade_in, fade_out, self.local_time, self.played_count);
        let w = match self.stop_fade {
            Some(f) => {
                let from = self.timeline_weight(fade_in, fade_out, f.at_time, f.at_played);
                let ramp = if f.duration > 0.0 {
                    1.0 - ease(self.settings.easing, f.elapsed / f.duration)
                } else {
                    1.0
                };
                timeline.min(from * ramp)
            }
            None => timeline,
        };
        w.clamp(0.0, 1.0)
    }

    fn timeline_weight(&self, fade_in: f64, fade_out: f64, time: f64, played_count: u32) -> f64 {
        let easing = self.settings.easing;
        let w_in = if fade_in > 0.0 && played_count == 0 {
            ease(easing, time / fade_in)
        } else {
            1.0
        };
        let w_out = if fade_out > 0.0 && !self.settings.looping {
            ease(easing, (self.motion.duration_seconds() - time) / fade_out)
        } else {
            1.0
        };
        w_in * w_out
    }
}

fn collect_events(
    events: &[MotionEventDef],
    lo: f64,
    lo_inclusive: bool,
    hi: f64,
    out: &mut Vec<usize>,
) {
    for (i, ev) in events.iter().enumerate() {
        let after_lo = ev.time > lo || (lo_inclusive && ev.time == lo);
        if after_lo && ev.time <= hi {
            out.push(i);
        }
    }
}
