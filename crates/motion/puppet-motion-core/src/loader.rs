//! motion3 asset decoding: generic JSON tree to validated [`MotionDocument`].

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::curve::{ControlPoint, Curve, SegmentKind, TargetKind};
use crate::error::LoadError;
use crate::motion::MotionDocument;

/// Public API: map an already-decoded motion3-style tree onto a validated [`MotionDocument`].
///
/// Notes:
/// - Times are in seconds; `Meta.Duration` is authoritative.
/// - `Segments` is a flat number list: a start point `(t, v)`, then for each segment a
///   kind code followed by its remaining points (Linear/Stepped/InverseStepped: 1, Bezier: 3).
/// - Negative `FadeInTime`/`FadeOutTime` mean "not set" (motion defaults / motion-level fades).
/// - Counts in `Meta` (`CurveCount`, `TotalSegmentCount`, ...) are informational and ignored.
pub fn motion_from_tree(
    name: &str,
    tree: &JsonValue,
    cfg: &Config,
) -> Result<MotionDocument, LoadError> {
    if !tree.is_object() {
        return Err(LoadError::empty("motion root is not an object"));
    }
    let raw = RawMotion::deserialize(tree)?;

    let meta = raw.meta.ok_or_else(|| LoadError::empty("Meta section"))?;
    let raw_curves = raw.curves.ok_or_else(|| LoadError::empty("Curves section"))?;

    let mut builder = MotionDocument::builder(meta.duration)
        .name(name)
        .fps(meta.fps)
        .looping(meta.r#loop);
    if let Some(s) = non_negative(meta.fade_in_time) {
        builder = builder.fade_in(s);
    }
    if let Some(s) = non_negative(meta.fade_out_time) {
        builder = builder.fade_out(s);
    }

    let mut curves = Vec::with_capacity(raw_curves.len());
    for rc in raw_curves {
        curves.push(decode_curve(rc)?);
    }
    builder = builder.curves(curves);

    for ud in raw.user_data {
        builder = builder.event(ud.time, ud.value);
    }

    let doc = builder.build_with(cfg)?;
    log::debug!(
        "loaded motion '{}': {:.3}s, {} curves, loop={}",
        doc.name(),
        doc.duration_seconds(),
        doc.curves().len(),
        doc.is_loop()
    );
    Ok(doc)
}

/// Convenience wrapper: decode JSON text, then [`motion_from_tree`].
pub fn parse_motion_json(name: &str, s: &str, cfg: &Config) -> Result<MotionDocument, LoadError> {
    let tree: JsonValue = serde_json::from_str(s)?;
    motion_from_tree(name, &tree, cfg)
}

fn non_negative(v: Option<f64>) -> Option<f64> {
    v.filter(|s| *s >= 0.0)
}

fn decode_curve(rc: RawCurve) -> Result<Curve, LoadError> {
    let kind = TargetKind::from_name(&rc.target).ok_or_else(|| {
        LoadError::malformed(format!("curve '{}' has unknown target '{}'", rc.id, rc.target))
    })?;

    let flat = &rc.segments;
    if flat.is_empty() {
        return Err(LoadError::empty(format!("segments of curve '{}'", rc.id)));
    }
    if flat.len() < 2 {
        return Err(LoadError::malformed(format!(
            "curve '{}' start point is truncated",
            rc.id
        )));
    }

    let mut b = Curve::builder(kind, rc.id.as_str()).start(flat[0], flat[1]);
    if let Some(s) = non_negative(rc.fade_in_time) {
        b = b.fade_in(s);
    }
    if let Some(s) = non_negative(rc.fade_out_time) {
        b = b.fade_out(s);
    }

    let mut i = 2;
    while i < flat.len() {
        let code = flat[i];
        let seg_kind = (code >= 0.0 && code.fract() == 0.0)
            .then(|| SegmentKind::from_code(code as u32))
            .flatten()
            .ok_or_else(|| {
                LoadError::malformed(format!(
                    "curve '{}' has unknown segment kind {code} at index {i}",
                    rc.id
                ))
            })?;

        let needed = (seg_kind.point_count() - 1) * 2;
        let Some(data) = flat.get(i + 1..i + 1 + needed) else {
            return Err(LoadError::malformed(format!(
                "curve '{}' {seg_kind:?} segment at index {i} is truncated",
                rc.id
            )));
        };
        let points: Vec<ControlPoint> = data
            .chunks_exact(2)
            .map(|c| ControlPoint::new(c[0], c[1]))
            .collect();
        b = b.push(seg_kind, &points);
        i += 1 + needed;
    }
    b.build()
}

// ----- motion3 schema (serde) -----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawMotion {
    #[serde(default)]
    meta: Option<RawMeta>,
    #[serde(default)]
    curves: Option<Vec<RawCurve>>,
    #[serde(default)]
    user_data: Vec<RawUserData>,
}

fn default_fps() -> f64 {
    30.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawMeta {
    duration: f64,
    #[serde(default = "default_fps")]
    fps: f64,
    #[serde(default)]
    r#loop: bool,
    #[serde(default)]
    fade_in_time: Option<f64>,
    #[serde(default)]
    fade_out_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawCurve {
    target: String,
    id: String,
    #[serde(default)]
    fade_in_time: Option<f64>,
    #[serde(default)]
    fade_out_time: Option<f64>,
    segments: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawUserData {
    time: f64,
    value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Segment;
    use crate::error::LoadErrorKind;
    use serde_json::json;

    fn tree(segments: JsonValue) -> JsonValue {
        json!({
            "Version": 3,
            "Meta": { "Duration": 2.0, "Fps": 30.0, "Loop": false, "FadeInTime": 0.5, "FadeOutTime": 0.5 },
            "Curves": [ { "Target": "Parameter", "Id": "ParamAngleX", "Segments": segments } ]
        })
    }

    #[test]
    fn decodes_all_segment_kinds() {
        let t = tree(json!([
            0.0, 0.0,
            0, 0.5, 10.0,
            1, 0.7, 10.0, 0.9, 0.0, 1.0, 0.0,
            2, 1.5, 5.0,
            3, 2.0, -5.0
        ]));
        let doc = motion_from_tree("all-kinds", &t, &Config::default()).expect("motion");
        let curve = &doc.curves()[0];
        let kinds: Vec<_> = curve.segments.iter().map(Segment::kind).collect();
        assert_eq!(
            kinds,
            [
                SegmentKind::Linear,
                SegmentKind::Bezier,
                SegmentKind::Stepped,
                SegmentKind::InverseStepped
            ]
        );
        assert_eq!(curve.segments[1].start(), ControlPoint::new(0.5, 10.0));
        assert_eq!(curve.end_time(), Some(2.0));
    }

    #[test]
    fn truncated_bezier_is_malformed() {
        let t = tree(json!([0.0, 0.0, 1, 0.3, 1.0, 0.6]));
        let err = motion_from_tree("bad", &t, &Config::default()).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Malformed);
    }

    #[test]
    fn unknown_kind_code_is_malformed() {
        for code in [json!(7), json!(1.5), json!(-1)] {
            let t = tree(json!([0.0, 0.0, code, 1.0, 1.0]));
            let err = motion_from_tree("bad", &t, &Config::default()).unwrap_err();
            assert_eq!(err.kind(), LoadErrorKind::Malformed);
        }
    }

    #[test]
    fn empty_segments_and_missing_sections_are_empty() {
        let err = motion_from_tree("e", &tree(json!([])), &Config::default()).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Empty);

        let err = motion_from_tree("e", &json!({ "Meta": { "Duration": 1.0 } }), &Config::default())
            .unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Empty);

        let err = motion_from_tree("e", &json!([1, 2, 3]), &Config::default()).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Empty);
    }

    #[test]
    fn negative_fades_fall_back_to_defaults() {
        let t = json!({
            "Meta": { "Duration": 3.0, "FadeInTime": -1.0 },
            "Curves": [ { "Target": "Model", "Id": "Opacity", "FadeOutTime": -1, "Segments": [0.0, 1.0] } ]
        });
        let cfg = Config {
            default_fade_in_seconds: 0.25,
            ..Config::default()
        };
        let doc = motion_from_tree("fades", &t, &cfg).expect("motion");
        assert_eq!(doc.fade_in_seconds(), 0.25);
        assert_eq!(doc.fade_out_seconds(), 1.0);
        assert_eq!(doc.fps(), 30.0);
        assert_eq!(doc.curves()[0].fade_out_seconds, None);
    }

    #[test]
    fn unknown_target_is_malformed() {
        let t = json!({
            "Meta": { "Duration": 1.0 },
            "Curves": [ { "Target": "Bone", "Id": "Arm", "Segments": [0.0, 0.0] } ]
        });
        let err = motion_from_tree("bone", &t, &Config::default()).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Malformed);
    }

    #[test]
    fn text_entry_point_reports_syntax_errors() {
        let err = parse_motion_json("broken", "{ \"Meta\": ", &Config::default()).unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Malformed);
    }
}
