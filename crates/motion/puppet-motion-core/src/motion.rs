//! Validated, immutable motion clip.
//!
//! A [`MotionDocument`] can only be produced through [`MotionBuilder`] (directly
//! or via the loader), so every document in circulation satisfies:
//! - `duration > 0`, `fps >= 0`, fades `>= 0`, all finite;
//! - for non-looping motions, `fade_in + fade_out <= duration` (motion and per curve);
//! - each curve is non-empty with sorted, contiguous segments;
//! - user-data events lie within `[0, duration]`, sorted by time.

use serde::Serialize;

use crate::config::Config;
use crate::curve::Curve;
use crate::error::LoadError;

/// Slack for fade budgets that were scaled to fit the timeline.
const FADE_EPS: f64 = 1e-9;

/// A time-stamped user-data marker carried by a motion.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MotionEventDef {
    pub time: f64,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MotionDocument {
    name: String,
    duration_seconds: f64,
    fps: f64,
    looping: bool,
    fade_in_seconds: f64,
    fade_out_seconds: f64,
    curves: Vec<Curve>,
    events: Vec<MotionEventDef>,
}

impl MotionDocument {
    pub fn builder(duration_seconds: f64) -> MotionBuilder {
        MotionBuilder::new(duration_seconds)
    }

    /// Free-form label used in logs; empty when the asset has none.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// Informational only; evaluation is time based.
    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    #[inline]
    pub fn is_loop(&self) -> bool {
        self.looping
    }

    #[inline]
    pub fn fade_in_seconds(&self) -> f64 {
        self.fade_in_seconds
    }

    #[inline]
    pub fn fade_out_seconds(&self) -> f64 {
        self.fade_out_seconds
    }

    #[inline]
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    #[inline]
    pub fn events(&self) -> &[MotionEventDef] {
        &self.events
    }
}

/// Collects motion fields and validates them on [`MotionBuilder::build`].
#[derive(Clone, Debug)]
pub struct MotionBuilder {
    name: String,
    duration_seconds: f64,
    fps: f64,
    looping: bool,
    fade_in_seconds: Option<f64>,
    fade_out_seconds: Option<f64>,
    curves: Vec<Curve>,
    events: Vec<MotionEventDef>,
}

impl MotionBuilder {
    fn new(duration_seconds: f64) -> Self {
        Self {
            name: String::new(),
            duration_seconds,
            fps: 30.0,
            looping: false,
            fade_in_seconds: None,
            fade_out_seconds: None,
            curves: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Explicit fade-in. Left unset, the config default applies.
    pub fn fade_in(mut self, seconds: f64) -> Self {
        self.fade_in_seconds = Some(seconds);
        self
    }

    /// Explicit fade-out. Left unset, the config default applies.
    pub fn fade_out(mut self, seconds: f64) -> Self {
        self.fade_out_seconds = Some(seconds);
        self
    }

    pub fn curve(mut self, curve: Curve) -> Self {
        self.curves.push(curve);
        self
    }

    pub fn curves(mut self, curves: impl IntoIterator<Item = Curve>) -> Self {
        self.curves.extend(curves);
        self
    }

    pub fn event(mut self, time: f64, value: impl Into<String>) -> Self {
        self.events.push(MotionEventDef {
            time,
            value: value.into(),
        });
        self
    }

    /// Validate using the default [`Config`].
    pub fn build(self) -> Result<MotionDocument, LoadError> {
        self.build_with(&Config::default())
    }

    /// Validate, filling omitted fades from `cfg`.
    ///
    /// Explicit fades that overrun a non-looping timeline are an error. Defaulted
    /// fades are shrunk to whatever the timeline leaves room for.
    pub fn build_with(mut self, cfg: &Config) -> Result<MotionDocument, LoadError> {
        let duration = self.duration_seconds;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(LoadError::invalid_timing(format!(
                "duration must be > 0, got {duration}"
            )));
        }
        if !self.fps.is_finite() || self.fps < 0.0 {
            return Err(LoadError::invalid_timing(format!(
                "fps must be >= 0, got {}",
                self.fps
            )));
        }
        for (label, fade) in [("fade-in", self.fade_in_seconds), ("fade-out", self.fade_out_seconds)] {
            if let Some(s) = fade {
                check_fade(label, s)?;
            }
        }

        let (fade_in, fade_out) = resolve_fades(
            self.fade_in_seconds,
            self.fade_out_seconds,
            cfg.default_fade_in_seconds.max(0.0),
            cfg.default_fade_out_seconds.max(0.0),
            duration,
            self.looping,
        )?;

        for curve in &self.curves {
            curve.validate()?;
            if !self.looping {
                let fi = curve.fade_in_seconds.unwrap_or(fade_in);
                let fo = curve.fade_out_seconds.unwrap_or(fade_out);
                if fi + fo > duration + FADE_EPS {
                    return Err(LoadError::invalid_timing(format!(
                        "curve '{}' fades ({fi} + {fo}) exceed duration {duration}",
                        curve.target_id
                    )));
                }
            }
        }

        for ev in &self.events {
            if !ev.time.is_finite() || ev.time < 0.0 || ev.time > duration {
                return Err(LoadError::invalid_timing(format!(
                    "event '{}' at {} lies outside [0, {duration}]",
                    ev.value, ev.time
                )));
            }
        }
        self.events.sort_by(|a, b| a.time.total_cmp(&b.time));

        Ok(MotionDocument {
            name: self.name,
            duration_seconds: duration,
            fps: self.fps,
            looping: self.looping,
            fade_in_seconds: fade_in,
            fade_out_seconds: fade_out,
            curves: self.curves,
            events: self.events,
        })
    }
}

fn check_fade(label: &str, seconds: f64) -> Result<(), LoadError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(LoadError::invalid_timing(format!(
            "{label} must be >= 0, got {seconds}"
        )));
    }
    Ok(())
}

fn resolve_fades(
    fade_in: Option<f64>,
    fade_out: Option<f64>,
    default_in: f64,
    default_out: f64,
    duration: f64,
    looping: bool,
) -> Result<(f64, f64), LoadError> {
    let fi = fade_in.unwrap_or(default_in);
    let fo = fade_out.unwrap_or(default_out);
    if looping || fi + fo <= duration + FADE_EPS {
        return Ok((fi, fo));
    }

    let explicit = fade_in.unwrap_or(0.0) + fade_out.unwrap_or(0.0);
    let defaulted = fade_in.map_or(default_in, |_| 0.0) + fade_out.map_or(default_out, |_| 0.0);
    if explicit > duration || defaulted <= 0.0 {
        return Err(LoadError::invalid_timing(format!(
            "fades ({fi} + {fo}) exceed duration {duration}"
        )));
    }
    let scale = (duration - explicit) / defaulted;
    Ok((
        fade_in.unwrap_or(default_in * scale),
        fade_out.unwrap_or(default_out * scale),
    ))
}
