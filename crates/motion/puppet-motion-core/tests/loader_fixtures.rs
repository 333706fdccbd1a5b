use approx::assert_abs_diff_eq;
use puppet_motion_core::{
    evaluate, motion_from_tree, parse_motion_json, Config, SegmentKind, TargetKind,
};

fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

#[test]
fn every_manifest_fixture_loads_or_fails_as_declared() {
    let cfg = Config::default();
    for key in puppet_test_fixtures::motions::keys() {
        let tree = puppet_test_fixtures::motions::tree(&key).expect("fixture tree");
        let expected = puppet_test_fixtures::motions::expected_error(&key).expect("entry");
        let result = motion_from_tree(&key, &tree, &cfg);
        match (expected, result) {
            (None, Ok(doc)) => assert_eq!(doc.name(), key),
            (Some(kind), Err(err)) => assert_eq!(err.kind().name(), kind, "fixture '{key}': {err}"),
            (None, Err(err)) => panic!("fixture '{key}' should load: {err}"),
            (Some(kind), Ok(_)) => panic!("fixture '{key}' should fail with {kind}"),
        }
    }
}

#[test]
fn idle_breath_fixture_decodes_curves_and_meta() {
    let json = puppet_test_fixtures::motions::json("idle-breath").expect("idle-breath json");
    let doc = parse_motion_json("idle-breath", &json, &Config::default()).expect("motion");

    assert!(doc.is_loop());
    assert_eq!(doc.duration_seconds(), 4.0);
    assert_eq!(doc.fade_in_seconds(), 0.5);
    assert_eq!(doc.curves().len(), 4);
    assert_eq!(doc.events().len(), 1);
    assert_eq!(doc.events()[0].value, "breath");

    let breath = &doc.curves()[0];
    assert_eq!(breath.target_id, "ParamBreath");
    assert_eq!(breath.segments.len(), 2);
    assert!(breath
        .segments
        .iter()
        .all(|s| s.kind() == SegmentKind::Bezier));
    assert_abs_diff_eq!(evaluate(breath, 1.0).unwrap(), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(evaluate(breath, 0.5).unwrap(), 0.15625, epsilon = 1e-12);
    assert_abs_diff_eq!(evaluate(breath, 2.0).unwrap(), 1.0, epsilon = 1e-12);

    let angle = &doc.curves()[1];
    approx(evaluate(angle, 1.0).unwrap(), 2.0, 1e-12);
    approx(evaluate(angle, 3.0).unwrap(), 2.0, 1e-12);

    assert_eq!(doc.curves()[2].target_kind, TargetKind::PartOpacity);
    assert_eq!(doc.curves()[3].target_kind, TargetKind::Model);
    assert_eq!(evaluate(&doc.curves()[2], 2.5).unwrap(), 1.0);
}

#[test]
fn wave_fixture_keeps_per_curve_fade() {
    let tree = puppet_test_fixtures::motions::tree("wave").expect("wave tree");
    let doc = motion_from_tree("wave", &tree, &Config::default()).expect("motion");
    let arm = doc
        .curves()
        .iter()
        .find(|c| c.target_id == "ParamArmR")
        .expect("ParamArmR curve");
    assert_eq!(arm.fade_in_seconds, Some(0.1));
    assert_eq!(arm.fade_out_seconds, None);
    let kinds: Vec<_> = arm.segments.iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        [
            SegmentKind::Stepped,
            SegmentKind::InverseStepped,
            SegmentKind::Linear
        ]
    );
    assert_eq!(evaluate(arm, 0.25).unwrap(), 0.0);
    assert_eq!(evaluate(arm, 0.75).unwrap(), 0.5);
}

#[test]
fn nod_fixture_shrinks_default_fades_to_fit() {
    let tree = puppet_test_fixtures::motions::tree("nod").expect("nod tree");
    let doc = motion_from_tree("nod", &tree, &Config::default()).expect("motion");
    assert!(!doc.is_loop());
    approx(doc.fade_in_seconds(), 0.75, 1e-12);
    approx(doc.fade_out_seconds(), 0.75, 1e-12);
    assert_eq!(doc.fps(), 60.0);
}

#[test]
fn shared_config_fixture_changes_defaults() {
    let cfg: Config = puppet_test_fixtures::configs::load("linear-fast").expect("config");
    assert_eq!(cfg.default_fade_in_seconds, 0.2);
    assert_eq!(cfg.max_events_per_tick, 64);
    assert_eq!(cfg.idle_priority, 0);

    let tree = puppet_test_fixtures::motions::tree("nod").expect("nod tree");
    let doc = motion_from_tree("nod", &tree, &cfg).expect("motion");
    assert_eq!(doc.fade_in_seconds(), 0.2);
    assert_eq!(doc.fade_out_seconds(), 0.2);
}

#[test]
fn silence_fixture_has_no_curves() {
    let tree = puppet_test_fixtures::motions::tree("silence").expect("silence tree");
    let doc = motion_from_tree("silence", &tree, &Config::default()).expect("motion");
    assert!(doc.curves().is_empty());
    assert_eq!(doc.fade_out_seconds(), 0.0);
}
