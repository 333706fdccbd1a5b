//! Scheduler: owns active tracks, the pending queue and the idle fallback.
//!
//! Per tick: advance every track → retire `Stopped` tracks → refill from the
//! queue (or the idle motion) when no live track remains → evaluate curves →
//! accumulate → blend → emit `Outputs`.
//!
//! The scheduler is single-writer. Hosts that drive it from several threads wrap
//! it in their own lock; motion documents are shared read-only through `Arc`.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::accumulate::Accumulator;
use crate::config::Config;
use crate::ids::{IdAllocator, TrackId};
use crate::motion::MotionDocument;
use crate::outputs::{MotionEvent, Outputs};
use crate::sampling::sample;
use crate::track::{PlaybackState, PlaybackTrack, TrackSettings};

/// A request to play a motion.
#[derive(Clone, Debug)]
pub struct PlayRequest {
    pub motion: Arc<MotionDocument>,
    /// Higher preempts lower. Clamped into `i32` when scheduled.
    pub priority: i64,
    pub loop_override: Option<bool>,
    pub fade_in_override: Option<f64>,
    pub fade_out_override: Option<f64>,
    /// Keep equal-priority tracks playing and cross-fade with them.
    pub blend: bool,
}

impl PlayRequest {
    pub fn new(motion: Arc<MotionDocument>, priority: impl Into<i64>) -> Self {
        Self {
            motion,
            priority: priority.into(),
            loop_override: None,
            fade_in_override: None,
            fade_out_override: None,
            blend: false,
        }
    }

    #[inline]
    pub fn looping(mut self, looping: bool) -> Self {
        self.loop_override = Some(looping);
        self
    }

    #[inline]
    pub fn fade_in(mut self, seconds: f64) -> Self {
        self.fade_in_override = Some(seconds);
        self
    }

    #[inline]
    pub fn fade_out(mut self, seconds: f64) -> Self {
        self.fade_out_override = Some(seconds);
        self
    }

    #[inline]
    pub fn blend(mut self, blend: bool) -> Self {
        self.blend = blend;
        self
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SubmitStatus {
    Started,
    Queued,
}

/// Result of [`Scheduler::submit`]. The id stays valid once a queued request starts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub id: TrackId,
    pub status: SubmitStatus,
}

#[derive(Debug)]
struct Pending {
    id: TrackId,
    priority: i32,
    request: PlayRequest,
}

#[derive(Debug)]
pub struct Scheduler {
    cfg: Config,
    ids: IdAllocator,
    active: Vec<PlaybackTrack>,
    /// Highest priority first; FIFO within equal priority.
    pending: VecDeque<Pending>,
    idle: Option<Arc<MotionDocument>>,
    idle_track: Option<TrackId>,

    accum: Accumulator,
    /// Events raised outside tick(), delivered with the next tick.
    deferred: Vec<MotionEvent>,
    outputs: Outputs,
}

fn clamp_priority(priority: i64) -> i32 {
    let clamped = priority.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    if clamped != priority {
        log::warn!("priority {priority} out of range, clamped to {clamped}");
    }
    clamped as i32
}

impl Scheduler {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            active: Vec::new(),
            pending: VecDeque::new(),
            idle: None,
            idle_track: None,
            accum: Accumulator::new(),
            deferred: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    /// Set the motion played (looped, at `idle_priority`) whenever nothing else is live.
    pub fn set_idle_motion(&mut self, motion: Option<Arc<MotionDocument>>) {
        self.idle = motion;
    }

    /// Active tracks in start order, including paused and fading-out ones.
    #[inline]
    pub fn active_tracks(&self) -> &[PlaybackTrack] {
        &self.active
    }

    pub fn track(&self, id: TrackId) -> Option<&PlaybackTrack> {
        self.active.iter().find(|t| t.id() == id)
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Queued request ids in the order they would start.
    pub fn pending_ids(&self) -> Vec<TrackId> {
        self.pending.iter().map(|p| p.id).collect()
    }

    /// The live track holding the primary slot: highest priority, most recently started.
    pub fn primary(&self) -> Option<TrackId> {
        self.active
            .iter()
            .filter(|t| t.is_live())
            .max_by_key(|t| (t.priority(), t.id()))
            .map(PlaybackTrack::id)
    }

    /// The idle fallback currently holds the primary slot.
    pub fn is_idle(&self) -> bool {
        self.idle_track.is_some() && self.primary() == self.idle_track
    }

    fn max_live_priority(&self) -> Option<i32> {
        self.active
            .iter()
            .filter(|t| t.is_live())
            .map(PlaybackTrack::priority)
            .max()
    }

    fn id_in_use(&self, id: TrackId) -> bool {
        self.active.iter().any(|t| t.id() == id) || self.pending.iter().any(|p| p.id == id)
    }

    /// Next id not held by an active track or a queued request.
    fn next_id(&mut self) -> TrackId {
        loop {
            let id = self.ids.alloc_track();
            if !self.id_in_use(id) {
                return id;
            }
            log::debug!("skipping {id}: still in use after id wrap-around");
        }
    }

    /// Start the request now if it can take the primary slot, otherwise queue it.
    pub fn submit(&mut self, request: PlayRequest) -> Submission {
        let priority = clamp_priority(request.priority);
        let id = self.next_id();

        if let Some(max) = self.max_live_priority() {
            if priority < max {
                let at = self.pending.partition_point(|p| p.priority >= priority);
                self.pending.insert(
                    at,
                    Pending {
                        id,
                        priority,
                        request,
                    },
                );
                log::debug!("{id} queued at priority {priority} (live max {max})");
                self.deferred.push(MotionEvent::Queued { track: id, priority });
                return Submission {
                    id,
                    status: SubmitStatus::Queued,
                };
            }
        }

        let started = self.start(id, priority, request);
        self.deferred.extend(started);
        Submission {
            id,
            status: SubmitStatus::Started,
        }
    }

    /// Promote a request to an active track, fading out whatever it preempts.
    fn start(&mut self, id: TrackId, priority: i32, request: PlayRequest) -> Vec<MotionEvent> {
        let mut events = Vec::new();
        for t in self.active.iter_mut().filter(|t| t.is_live()) {
            let lower = t.priority() < priority;
            let replaced = !request.blend && t.priority() == priority;
            if lower || replaced {
                t.stop();
                log::debug!("{} preempted by {id}", t.id());
                events.push(MotionEvent::Preempted {
                    track: t.id(),
                    by: id,
                });
            }
        }

        let settings = self.settings_for(&request);
        log::debug!(
            "{id} started: motion '{}', priority {priority}, loop={}",
            request.motion.name(),
            settings.looping
        );
        self.active
            .push(PlaybackTrack::new(id, request.motion, priority, settings));
        events.push(MotionEvent::Started { track: id, priority });
        events
    }

    fn settings_for(&self, request: &PlayRequest) -> TrackSettings {
        let motion = &request.motion;
        let mut s = TrackSettings::from_motion(motion, self.cfg.fade_easing);
        if let Some(looping) = request.loop_override {
            s.looping = looping;
        }
        if let Some(fi) = request.fade_in_override {
            if fi.is_finite() && fi >= 0.0 {
                s.fade_in_seconds = fi;
            } else {
                log::warn!("ignoring fade-in override {fi}");
            }
        }
        if let Some(fo) = request.fade_out_override {
            if fo.is_finite() && fo >= 0.0 {
                s.fade_out_seconds = fo;
            } else {
                log::warn!("ignoring fade-out override {fo}");
            }
        }

        let duration = motion.duration_seconds();
        let total = s.fade_in_seconds + s.fade_out_seconds;
        if !s.looping && total > duration {
            let k = duration / total;
            log::warn!(
                "fades ({} + {}) exceed duration {duration}; scaling by {k:.3}",
                s.fade_in_seconds,
                s.fade_out_seconds
            );
            s.fade_in_seconds *= k;
            s.fade_out_seconds *= k;
        }
        s
    }

    pub fn pause(&mut self, id: TrackId) -> bool {
        match self.active.iter_mut().find(|t| t.id() == id) {
            Some(t) => t.pause(),
            None => {
                log::debug!("pause: unknown {id}");
                false
            }
        }
    }

    pub fn resume(&mut self, id: TrackId) -> bool {
        match self.active.iter_mut().find(|t| t.id() == id) {
            Some(t) => t.resume(),
            None => {
                log::debug!("resume: unknown {id}");
                false
            }
        }
    }

    /// Fade out an active track, or drop a queued request.
    pub fn stop(&mut self, id: TrackId) -> bool {
        if let Some(t) = self.active.iter_mut().find(|t| t.id() == id) {
            return t.stop();
        }
        if let Some(pos) = self.pending.iter().position(|p| p.id == id) {
            self.pending.remove(pos);
            log::debug!("{id} removed from queue");
            return true;
        }
        log::debug!("stop: unknown {id}");
        false
    }

    /// Fade out every active track and clear the queue.
    pub fn stop_all(&mut self) {
        for t in &mut self.active {
            t.stop();
        }
        if !self.pending.is_empty() {
            log::debug!("stop_all: dropping {} queued requests", self.pending.len());
        }
        self.pending.clear();
    }

    /// Advance all tracks by `delta_seconds` and produce this tick's outputs.
    pub fn tick(&mut self, delta_seconds: f64) -> &Outputs {
        self.outputs.clear();
        self.outputs.events.append(&mut self.deferred);

        let dt = if delta_seconds.is_finite() && delta_seconds >= 0.0 {
            delta_seconds
        } else {
            log::warn!("tick delta {delta_seconds} treated as 0");
            0.0
        };

        // 1) Advance
        for t in &mut self.active {
            let step = t.advance(dt);
            if step.wraps > 0 {
                self.outputs.push_event(MotionEvent::Looped {
                    track: t.id(),
                    played_count: t.played_count(),
                });
            }
            for &i in &step.fired {
                let ev = &t.motion().events()[i];
                self.outputs.push_event(MotionEvent::UserData {
                    track: t.id(),
                    time: ev.time,
                    value: ev.value.clone(),
                });
            }
        }

        // 2) Retire
        let events = &mut self.outputs.events;
        self.active.retain(|t| {
            if t.state() == PlaybackState::Stopped {
                log::debug!("{} retired", t.id());
                events.push(MotionEvent::Finished { track: t.id() });
                false
            } else {
                true
            }
        });
        if let Some(idle_id) = self.idle_track {
            if !self.active.iter().any(|t| t.id() == idle_id) {
                self.idle_track = None;
            }
        }

        // 3) Refill
        if !self.active.iter().any(PlaybackTrack::is_live) {
            self.refill();
        }

        // 4) Evaluate → accumulate → blend
        for t in &self.active {
            let time = t.local_time();
            for curve in t.motion().curves() {
                let w = t.weight_for(curve);
                self.accum
                    .add(curve.target_kind, &curve.target_id, sample(curve, time), w);
            }
        }
        self.outputs.changes.extend(self.accum.drain());

        let cap = self.cfg.max_events_per_tick;
        if self.outputs.events.len() > cap {
            log::warn!(
                "dropping {} events over the per-tick limit of {cap}",
                self.outputs.events.len() - cap
            );
            self.outputs.events.truncate(cap);
        }

        &self.outputs
    }

    fn refill(&mut self) {
        if let Some(next) = self.pending.pop_front() {
            log::debug!("{} promoted from queue", next.id);
            let events = self.start(next.id, next.priority, next.request);
            self.outputs.events.extend(events);
            return;
        }
        let Some(idle) = self.idle.clone() else {
            return;
        };
        let id = self.next_id();
        let request = PlayRequest::new(idle, self.cfg.idle_priority).looping(true);
        let events = self.start(id, self.cfg.idle_priority, request);
        self.outputs.events.extend(events);
        self.outputs.push_event(MotionEvent::IdleStarted { track: id });
        self.idle_track = Some(id);
        log::debug!("idle fallback started as {id}");
    }
}
