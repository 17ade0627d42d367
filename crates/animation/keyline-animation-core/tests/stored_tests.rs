use keyline_animation_core::{
    export_clip_json, parse_clip_json, AnimationTarget, Clip, ControllerTarget, CurveType,
    FloatParamTarget, Quat, Vec3,
};

fn mk_clip() -> Clip {
    let mut clip = Clip::new("walk", 2.0);
    clip.looping = true;

    let mut head = ControllerTarget::new("head", None);
    head.set_keyframe(0.0, Vec3::new(0.1, 0.2, 0.3), Quat::IDENTITY);
    head.set_keyframe(0.75, Vec3::new(1.0, -2.0, 0.5), Quat::new(0.0, 1.0, 0.0, 0.0));
    head.set_keyframe(2.0, Vec3::new(0.1, 0.2, 0.3), Quat::IDENTITY);
    head.change_curve_type(0.75, CurveType::Bounce);
    head.reapply_curve_types(true);
    head.smooth_loop();
    clip.add_controller(head);

    let mut smile = FloatParamTarget::new("smile", None);
    smile.set_keyframe(0.0, 0.0);
    smile.set_keyframe(1.0, 0.8);
    smile.set_keyframe(2.0, 0.0);
    smile.change_curve_type(1.0, CurveType::Flat);
    smile.reapply_curve_types(true);
    clip.add_float_param(smile);

    clip
}

/// it should round-trip a clip through the JSON form bit-exactly
#[test]
fn json_round_trip_is_exact() {
    let clip = mk_clip();
    let json = export_clip_json(&clip).to_string();
    let restored = parse_clip_json(&json).expect("parse");

    assert_eq!(restored.name, clip.name);
    assert_eq!(restored.animation_length, clip.animation_length);
    assert_eq!(restored.looping, clip.looping);

    let head = clip.controller("head").unwrap();
    let restored_head = restored.controller("head").unwrap();
    assert_eq!(restored_head.curves(), head.curves());
    assert_eq!(restored_head.settings(), head.settings());

    let smile = clip.float_param("smile").unwrap();
    let restored_smile = restored.float_param("smile").unwrap();
    assert_eq!(restored_smile.curve(), smile.curve());
    assert_eq!(restored_smile.settings(), smile.settings());

    // a second export of the restored clip is identical
    assert_eq!(export_clip_json(&restored), export_clip_json(&clip));
}

/// it should leave imported targets dirty so the next rebuild validates them
#[test]
fn imported_targets_are_dirty() {
    let json = export_clip_json(&mk_clip()).to_string();
    let mut restored = parse_clip_json(&json).expect("parse");
    assert!(restored.any_dirty());
    let report = restored.rebuild();
    assert!(report.is_ok(), "{:?}", report.issues);
}

/// it should reject structurally invalid stored clips
#[test]
fn invalid_stored_clip_is_rejected() {
    let json = r#"{"name":"broken","animationLength":0.0,"controllers":[],"floatParams":[]}"#;
    assert!(parse_clip_json(json).is_err());
}
