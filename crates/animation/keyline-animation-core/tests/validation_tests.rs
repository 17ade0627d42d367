use keyline_animation_core::{
    validate_target, AnimationTarget, ControllerTarget, CurveType, Quat, ValidationIssue,
    ValidationReport, Vec3,
};

fn mk_target(times: &[f32]) -> ControllerTarget {
    let mut target = ControllerTarget::new("head", None);
    for time in times {
        target.set_keyframe(*time, Vec3::ZERO, Quat::IDENTITY);
    }
    target
}

/// it should accept a well-formed target without issues
#[test]
fn valid_target_passes() {
    let mut target = mk_target(&[0.0, 1.0, 2.0]);
    let mut report = ValidationReport::default();
    validate_target(&mut target, 2.0, &mut report);
    assert!(report.is_ok(), "{:?}", report.issues);
}

/// it should report a target with fewer than 2 keyframes and stop there
#[test]
fn too_few_keyframes() {
    let mut target = mk_target(&[0.0]);
    let mut report = ValidationReport::default();
    validate_target(&mut target, 2.0, &mut report);
    assert_eq!(
        report.issues,
        vec![ValidationIssue::NotEnoughKeyframes {
            target: "head".to_string(),
            count: 1,
        }]
    );
}

/// it should report a missing start frame
#[test]
fn missing_start_frame() {
    let mut target = mk_target(&[0.5, 2.0]);
    let mut report = ValidationReport::default();
    validate_target(&mut target, 2.0, &mut report);
    assert_eq!(
        report.issues,
        vec![ValidationIssue::MissingStartFrame {
            target: "head".to_string(),
        }]
    );
}

/// it should report a last frame that does not sit at the clip length
#[test]
fn wrong_end_frame() {
    let mut target = mk_target(&[0.0, 1.5]);
    let mut report = ValidationReport::default();
    validate_target(&mut target, 2.0, &mut report);
    assert_eq!(
        report.issues,
        vec![ValidationIssue::WrongEndFrame {
            target: "head".to_string(),
            last_ms: 1500,
            expected_ms: 2000,
        }]
    );
}

/// it should auto-repair by deleting exactly the orphaned settings entry,
/// leaving the curve untouched
#[test]
fn orphaned_settings_auto_repair() {
    let mut target = mk_target(&[0.0, 1.0, 2.0]);
    target.settings_mut().upsert(500, CurveType::Linear);
    let curve_before = target.lead_curve().clone();

    let mut report = ValidationReport::default();
    validate_target(&mut target, 2.0, &mut report);

    assert_eq!(
        report.issues,
        vec![ValidationIssue::OrphanedSettings {
            target: "head".to_string(),
            removed: 1,
        }]
    );
    assert!(!target.settings().contains(500));
    assert_eq!(target.settings().len(), 3);
    assert_eq!(target.lead_curve(), &curve_before);

    // repaired target validates cleanly on the next pass
    let mut report = ValidationReport::default();
    validate_target(&mut target, 2.0, &mut report);
    assert!(report.is_ok());
}

/// it should report a settings deficit without attempting repair
#[test]
fn settings_count_deficit() {
    let mut target = mk_target(&[0.0, 1.0, 2.0]);
    target.settings_mut().remove(1000);
    let mut report = ValidationReport::default();
    validate_target(&mut target, 2.0, &mut report);
    assert_eq!(
        report.issues,
        vec![ValidationIssue::SettingsCountMismatch {
            target: "head".to_string(),
            keyframes: 3,
            settings: 2,
        }]
    );
}
