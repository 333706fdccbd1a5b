//! Curve data model: one target's value over time, split into typed segments.

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// What kind of model property a curve drives. The renderer resolves the id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Parameter,
    PartOpacity,
    Model,
}

impl TargetKind {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Parameter => "Parameter",
            Self::PartOpacity => "PartOpacity",
            Self::Model => "Model",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "Parameter" => Some(Self::Parameter),
            "PartOpacity" => Some(Self::PartOpacity),
            "Model" => Some(Self::Model),
            _ => None,
        }
    }
}

/// Interpolation used across one segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    Linear,
    Bezier,
    Stepped,
    InverseStepped,
}

impl SegmentKind {
    /// Decode the numeric kind tag used by flat segment arrays.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Linear),
            1 => Some(Self::Bezier),
            2 => Some(Self::Stepped),
            3 => Some(Self::InverseStepped),
            _ => None,
        }
    }

    #[inline]
    pub fn code(&self) -> u32 {
        match self {
            Self::Linear => 0,
            Self::Bezier => 1,
            Self::Stepped => 2,
            Self::InverseStepped => 3,
        }
    }

    /// Control points a segment of this kind needs, endpoints included.
    #[inline]
    pub fn point_count(&self) -> usize {
        match self {
            Self::Bezier => 4,
            Self::Linear | Self::Stepped | Self::InverseStepped => 2,
        }
    }
}

/// A `(time, value)` pair. Time is in seconds from the motion start.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub time: f64,
    pub value: f64,
}

impl ControlPoint {
    #[inline]
    pub const fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }

    #[inline]
    fn is_finite(&self) -> bool {
        self.time.is_finite() && self.value.is_finite()
    }
}

impl From<(f64, f64)> for ControlPoint {
    fn from((time, value): (f64, f64)) -> Self {
        Self { time, value }
    }
}

/// One time interval `[start.time, end.time)` of a curve.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Segment {
    Linear {
        start: ControlPoint,
        end: ControlPoint,
    },
    Bezier {
        start: ControlPoint,
        c1: ControlPoint,
        c2: ControlPoint,
        end: ControlPoint,
    },
    Stepped {
        start: ControlPoint,
        end: ControlPoint,
    },
    InverseStepped {
        start: ControlPoint,
        end: ControlPoint,
    },
}

impl Segment {
    /// Build a segment from its full point list (start point first).
    pub fn from_points(kind: SegmentKind, points: &[ControlPoint]) -> Result<Self, LoadError> {
        if points.len() != kind.point_count() {
            return Err(LoadError::malformed(format!(
                "{kind:?} segment needs {} points, got {}",
                kind.point_count(),
                points.len()
            )));
        }
        let seg = match kind {
            SegmentKind::Linear => Segment::Linear {
                start: points[0],
                end: points[1],
            },
            SegmentKind::Stepped => Segment::Stepped {
                start: points[0],
                end: points[1],
            },
            SegmentKind::InverseStepped => Segment::InverseStepped {
                start: points[0],
                end: points[1],
            },
            SegmentKind::Bezier => Segment::Bezier {
                start: points[0],
                c1: points[1],
                c2: points[2],
                end: points[3],
            },
        };
        Ok(seg)
    }

    #[inline]
    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Linear { .. } => SegmentKind::Linear,
            Segment::Bezier { .. } => SegmentKind::Bezier,
            Segment::Stepped { .. } => SegmentKind::Stepped,
            Segment::InverseStepped { .. } => SegmentKind::InverseStepped,
        }
    }

    #[inline]
    pub fn start(&self) -> ControlPoint {
        match self {
            Segment::Linear { start, .. }
            | Segment::Bezier { start, .. }
            | Segment::Stepped { start, .. }
            | Segment::InverseStepped { start, .. } => *start,
        }
    }

    #[inline]
    pub fn end(&self) -> ControlPoint {
        match self {
            Segment::Linear { end, .. }
            | Segment::Bezier { end, .. }
            | Segment::Stepped { end, .. }
            | Segment::InverseStepped { end, .. } => *end,
        }
    }

    fn points_finite(&self) -> bool {
        match self {
            Segment::Bezier { start, c1, c2, end } => {
                start.is_finite() && c1.is_finite() && c2.is_finite() && end.is_finite()
            }
            _ => self.start().is_finite() && self.end().is_finite(),
        }
    }
}

/// A single target's animation within a motion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub target_kind: TargetKind,
    pub target_id: String,
    /// Overrides the motion's fade-in for this curve only.
    #[serde(default)]
    pub fade_in_seconds: Option<f64>,
    /// Overrides the motion's fade-out for this curve only.
    #[serde(default)]
    pub fade_out_seconds: Option<f64>,
    pub segments: Vec<Segment>,
}

impl Curve {
    /// An empty curve; add segments directly or use [`Curve::builder`].
    pub fn new(target_kind: TargetKind, target_id: impl Into<String>) -> Self {
        Self {
            target_kind,
            target_id: target_id.into(),
            fade_in_seconds: None,
            fade_out_seconds: None,
            segments: Vec::new(),
        }
    }

    pub fn builder(target_kind: TargetKind, target_id: impl Into<String>) -> CurveBuilder {
        CurveBuilder::new(Self::new(target_kind, target_id))
    }

    /// Shorthand for a linear parameter curve through `points`.
    pub fn linear(target_id: impl Into<String>, points: &[(f64, f64)]) -> Result<Self, LoadError> {
        let mut b = Self::builder(TargetKind::Parameter, target_id);
        let mut iter = points.iter();
        if let Some(&(t, v)) = iter.next() {
            b = b.start(t, v);
        }
        for &(t, v) in iter {
            b = b.linear(t, v);
        }
        b.build()
    }

    #[inline]
    pub fn start_time(&self) -> Option<f64> {
        self.segments.first().map(|s| s.start().time)
    }

    #[inline]
    pub fn end_time(&self) -> Option<f64> {
        self.segments.last().map(|s| s.end().time)
    }

    /// Check that points are finite and segments are time-sorted and contiguous.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.segments.is_empty() {
            return Err(LoadError::empty(format!(
                "segments of curve '{}'",
                self.target_id
            )));
        }
        for (label, fade) in [("fade-in", self.fade_in_seconds), ("fade-out", self.fade_out_seconds)] {
            if let Some(s) = fade {
                if !s.is_finite() || s < 0.0 {
                    return Err(LoadError::invalid_timing(format!(
                        "curve '{}' has invalid {label} {s}",
                        self.target_id
                    )));
                }
            }
        }
        let mut prev_end: Option<f64> = None;
        for (i, seg) in self.segments.iter().enumerate() {
            if !seg.points_finite() {
                return Err(LoadError::malformed(format!(
                    "curve '{}' segment {i} has non-finite points",
                    self.target_id
                )));
            }
            let (t0, t1) = (seg.start().time, seg.end().time);
            if t1 < t0 {
                return Err(LoadError::invalid_timing(format!(
                    "curve '{}' segment {i} runs backwards ({t0} -> {t1})",
                    self.target_id
                )));
            }
            if let Some(prev) = prev_end {
                if t0 != prev {
                    return Err(LoadError::invalid_timing(format!(
                        "curve '{}' segment {i} starts at {t0} but previous ends at {prev}",
                        self.target_id
                    )));
                }
            }
            prev_end = Some(t1);
        }
        Ok(())
    }
}

/// Incremental curve construction mirroring the flat segment layout:
/// a start point followed by segments that each continue from the last end point.
#[derive(Debug)]
pub struct CurveBuilder {
    curve: Curve,
    cursor: Option<ControlPoint>,
    error: Option<LoadError>,
}

impl CurveBuilder {
    fn new(curve: Curve) -> Self {
        Self {
            curve,
            cursor: None,
            error: None,
        }
    }

    pub fn fade_in(mut self, seconds: f64) -> Self {
        self.curve.fade_in_seconds = Some(seconds);
        self
    }

    pub fn fade_out(mut self, seconds: f64) -> Self {
        self.curve.fade_out_seconds = Some(seconds);
        self
    }

    pub fn start(mut self, time: f64, value: f64) -> Self {
        if self.cursor.is_some() && self.error.is_none() {
            self.error = Some(LoadError::malformed(format!(
                "curve '{}' has more than one start point",
                self.curve.target_id
            )));
        }
        self.cursor = Some(ControlPoint::new(time, value));
        self
    }

    pub fn linear(self, time: f64, value: f64) -> Self {
        self.push(SegmentKind::Linear, &[ControlPoint::new(time, value)])
    }

    pub fn stepped(self, time: f64, value: f64) -> Self {
        self.push(SegmentKind::Stepped, &[ControlPoint::new(time, value)])
    }

    pub fn inverse_stepped(self, time: f64, value: f64) -> Self {
        self.push(SegmentKind::InverseStepped, &[ControlPoint::new(time, value)])
    }

    /// Cubic segment with two interior control points, ending at `end`.
    pub fn bezier(self, c1: (f64, f64), c2: (f64, f64), end: (f64, f64)) -> Self {
        self.push(SegmentKind::Bezier, &[c1.into(), c2.into(), end.into()])
    }

    /// Append a segment given the points that follow the current cursor.
    pub fn push(mut self, kind: SegmentKind, rest: &[ControlPoint]) -> Self {
        if self.error.is_some() {
            return self;
        }
        let Some(start) = self.cursor else {
            self.error = Some(LoadError::malformed(format!(
                "curve '{}' has a segment before its start point",
                self.curve.target_id
            )));
            return self;
        };
        let mut points = Vec::with_capacity(rest.len() + 1);
        points.push(start);
        points.extend_from_slice(rest);
        match Segment::from_points(kind, &points) {
            Ok(seg) => {
                self.cursor = Some(seg.end());
                self.curve.segments.push(seg);
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Finish the curve. A lone start point becomes a zero-length constant segment.
    pub fn build(mut self) -> Result<Curve, LoadError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.curve.segments.is_empty() {
            if let Some(p) = self.cursor {
                self.curve.segments.push(Segment::Linear { start: p, end: p });
            }
        }
        self.curve.validate()?;
        Ok(self.curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadErrorKind;

    #[test]
    fn builder_chains_segments_end_to_start() {
        let curve = Curve::builder(TargetKind::Parameter, "ParamAngleX")
            .start(0.0, 0.0)
            .linear(1.0, 10.0)
            .bezier((1.5, 10.0), (2.0, 0.0), (2.5, 0.0))
            .stepped(3.0, 5.0)
            .build()
            .expect("valid curve");
        assert_eq!(curve.segments.len(), 3);
        assert_eq!(curve.segments[1].start(), ControlPoint::new(1.0, 10.0));
        assert_eq!(curve.segments[2].kind(), SegmentKind::Stepped);
        assert_eq!(curve.start_time(), Some(0.0));
        assert_eq!(curve.end_time(), Some(3.0));
    }

    #[test]
    fn lone_start_point_is_constant() {
        let curve = Curve::builder(TargetKind::Model, "Opacity")
            .start(0.0, 1.0)
            .build()
            .expect("constant curve");
        assert_eq!(curve.segments.len(), 1);
        assert_eq!(curve.segments[0].start(), curve.segments[0].end());
    }

    #[test]
    fn segment_needs_start_point() {
        let err = Curve::builder(TargetKind::Parameter, "P")
            .linear(1.0, 1.0)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Malformed);
    }

    #[test]
    fn wrong_point_count_is_malformed() {
        let pts = [ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 1.0)];
        let err = Segment::from_points(SegmentKind::Bezier, &pts).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Malformed);
    }

    #[test]
    fn backwards_segment_is_invalid_timing() {
        let err = Curve::linear("P", &[(1.0, 0.0), (0.5, 1.0)]).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::InvalidTiming);
    }

    #[test]
    fn gap_between_segments_is_invalid_timing() {
        let mut curve = Curve::linear("P", &[(0.0, 0.0), (1.0, 1.0)]).expect("curve");
        curve.segments.push(Segment::Linear {
            start: ControlPoint::new(1.5, 1.0),
            end: ControlPoint::new(2.0, 0.0),
        });
        assert_eq!(curve.validate().unwrap_err().kind(), LoadErrorKind::InvalidTiming);
    }

    #[test]
    fn empty_curve_fails_validation() {
        let curve = Curve::new(TargetKind::PartOpacity, "PartArmL");
        assert_eq!(curve.validate().unwrap_err().kind(), LoadErrorKind::Empty);
        assert_eq!(TargetKind::from_name("PartOpacity"), Some(TargetKind::PartOpacity));
        assert_eq!(TargetKind::from_name("Bone"), None);
    }

    #[test]
    fn kind_codes_round_trip() {
        for code in 0..4 {
            let kind = SegmentKind::from_code(code).expect("known code");
            assert_eq!(kind.code(), code);
        }
        assert_eq!(SegmentKind::from_code(9), None);
    }
}
