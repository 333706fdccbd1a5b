//! Curve evaluation.
//!
//! Model:
//! - Time is clamped into `[first.start.time, last.end.time]`; no extrapolation.
//! - The segment containing the time yields `ratio = (t - t0) / (t1 - t0)`.
//! - Linear lerps, Stepped holds the start value, InverseStepped holds the end value.
//! - Bezier uses `ratio` directly as the curve parameter and evaluates only the
//!   value axis. The control points' time coordinates are not solved against, so
//!   a segment's timing stays linear in `ratio`. Motion assets are authored for
//!   this convention; solving on the time axis would shift their timing.
//!
//! API:
//! - evaluate(&Curve, time) -> Result<f64, CurveError>
//! - sample(&Curve, time) -> f64 (neutral value on error)

use crate::curve::{Curve, Segment};
use crate::error::CurveError;
use crate::interp::functions::{cubic_bezier, lerp};

/// Evaluate a curve at `time` (seconds).
pub fn evaluate(curve: &Curve, time: f64) -> Result<f64, CurveError> {
    let segments = &curve.segments;
    let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
        return Err(CurveError::Empty {
            target_id: curve.target_id.clone(),
        });
    };

    let lo = first.start().time;
    let hi = last.end().time;
    if time.is_nan() || time <= lo {
        return Ok(first.start().value);
    }
    if time >= hi {
        return Ok(last.end().value);
    }

    Ok(evaluate_segment(&segments[find_segment(segments, time)], time))
}

/// Evaluate a curve, substituting the neutral value for curves that cannot be evaluated.
pub fn sample(curve: &Curve, time: f64) -> f64 {
    evaluate(curve, time).unwrap_or_else(|e| {
        log::trace!("{e}; using neutral value");
        e.neutral_value()
    })
}

/// Index of the segment whose `[t0, t1)` holds `time`. Caller guarantees `time` is in range.
fn find_segment(segments: &[Segment], time: f64) -> usize {
    // First segment whose end lies strictly after `time`.
    let idx = segments.partition_point(|s| s.end().time <= time);
    idx.min(segments.len() - 1)
}

fn evaluate_segment(seg: &Segment, time: f64) -> f64 {
    let start = seg.start();
    let end = seg.end();
    let span = end.time - start.time;
    if span <= 0.0 {
        return start.value;
    }
    let ratio = ((time - start.time) / span).clamp(0.0, 1.0);
    match seg {
        Segment::Linear { .. } => lerp(start.value, end.value, ratio),
        Segment::Stepped { .. } => start.value,
        Segment::InverseStepped { .. } => end.value,
        Segment::Bezier { c1, c2, .. } => {
            cubic_bezier(start.value, c1.value, c2.value, end.value, ratio)
        }
    }
}
