use std::cell::RefCell;
use std::rc::Rc;

use keyline_animation_core::{
    AnimationTarget, Clip, ControllerTarget, CurveType, FloatParamTarget, Quat, Recorder,
    RecorderStatus, RecordError, TickContext, Vec3,
};
use keyline_api_core::{InMemoryController, InMemoryFloatParam};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn mk_clip(length: f32) -> (Clip, Rc<RefCell<InMemoryController>>) {
    let link = Rc::new(RefCell::new(InMemoryController {
        position: Vec3::new(1.0, 2.0, 3.0),
        rotation: Quat::IDENTITY,
    }));
    let mut clip = Clip::new("record test", length);
    clip.add_controller(ControllerTarget::new("head", Some(link.clone())));
    (clip, link)
}

fn tick(recorder: &mut Recorder, clip: &mut Clip, dt: f32, cancel: bool) -> RecorderStatus {
    let mut rebuilds = 0;
    let mut rebuild = || rebuilds += 1;
    let mut ctx = TickContext {
        dt,
        cancel_requested: cancel,
        rebuild: &mut rebuild,
    };
    recorder.tick(clip, &mut ctx)
}

/// it should refuse to arm while the clip is playing or a recording runs
#[test]
fn start_preconditions() {
    let (mut clip, _link) = mk_clip(2.0);
    let mut recorder = Recorder::new(vec!["head".to_string()], vec![]);
    clip.play();
    assert_eq!(recorder.start(&clip), Err(RecordError::ClipPlaying));
    clip.stop();
    assert_eq!(recorder.start(&clip), Ok(()));
    assert_eq!(recorder.start(&clip), Err(RecordError::AlreadyRecording));
}

/// it should count down in one-second ticks before capturing
#[test]
fn countdown_progression() {
    let (mut clip, _link) = mk_clip(2.0);
    let mut recorder = Recorder::new(vec!["head".to_string()], vec![]);
    recorder.start(&clip).unwrap();

    assert_eq!(
        tick(&mut recorder, &mut clip, 1.0, false),
        RecorderStatus::CountingDown { seconds_left: 4 }
    );
    assert_eq!(
        tick(&mut recorder, &mut clip, 1.0, false),
        RecorderStatus::CountingDown { seconds_left: 3 }
    );
    // sub-second ticks accumulate
    assert_eq!(
        tick(&mut recorder, &mut clip, 0.5, false),
        RecorderStatus::CountingDown { seconds_left: 3 }
    );
    assert_eq!(
        tick(&mut recorder, &mut clip, 0.5, false),
        RecorderStatus::CountingDown { seconds_left: 2 }
    );
    assert_eq!(
        tick(&mut recorder, &mut clip, 2.0, false),
        RecorderStatus::Capturing
    );
    assert!(clip.is_playing());
}

/// it should cancel during countdown with no side effects
#[test]
fn countdown_cancel_is_side_effect_free() {
    let (mut clip, _link) = mk_clip(2.0);
    clip.controller_mut("head")
        .unwrap()
        .set_keyframe(1.0, Vec3::ZERO, Quat::IDENTITY);
    clip.rebuild();

    let mut recorder = Recorder::new(vec!["head".to_string()], vec![]);
    recorder.start(&clip).unwrap();
    tick(&mut recorder, &mut clip, 1.0, false);
    assert_eq!(
        tick(&mut recorder, &mut clip, 1.0, true),
        RecorderStatus::Cancelled
    );
    assert!(recorder.is_idle());
    assert!(!clip.is_playing());
    // existing keyframes survive untouched
    assert!(clip.controller("head").unwrap().has_keyframe(1.0));
    assert!(!clip.any_dirty());
}

/// it should replace existing keyframes and capture one frame per tick
#[test]
fn capture_replaces_and_samples_per_tick() {
    let (mut clip, link) = mk_clip(2.0);
    clip.controller_mut("head")
        .unwrap()
        .set_keyframe(0.5, Vec3::ZERO, Quat::IDENTITY);

    let mut recorder =
        Recorder::new(vec!["head".to_string()], vec![]).with_countdown(1);
    recorder.start(&clip).unwrap();
    assert_eq!(
        tick(&mut recorder, &mut clip, 1.0, false),
        RecorderStatus::Capturing
    );
    // pre-existing keys are gone before the first captured frame
    assert!(!clip.controller("head").unwrap().has_keyframe(0.5));

    let mut status = RecorderStatus::Capturing;
    let mut frames = 0;
    while status == RecorderStatus::Capturing {
        status = tick(&mut recorder, &mut clip, 0.5, false);
        frames += 1;
        assert!(frames < 100, "recorder never finished");
    }
    assert_eq!(status, RecorderStatus::Finished);

    let target = clip.controller("head").unwrap();
    // captured at 0.0, 0.5, 1.0, 1.5, 2.0
    assert_eq!(target.lead_curve().len(), 5);
    assert!(target.has_keyframe(0.0));
    assert!(target.has_keyframe(2.0));
    approx(target.evaluate_position(0.0).x, 1.0, 1e-6);

    // finalize restored playback state and owed a rebuild
    assert!(!clip.is_playing());
    approx(clip.time(), 0.0, 1e-6);
    assert!(clip.any_dirty());

    let report = clip.rebuild();
    assert!(report.is_ok(), "{:?}", report.issues);
    assert!(!clip.any_dirty());

    // both edge frames carry the default Smooth curve type
    let snapshot = target_snapshot(&clip, 0.0);
    assert_eq!(snapshot, CurveType::Smooth);
    let snapshot = target_snapshot(&clip, 2.0);
    assert_eq!(snapshot, CurveType::Smooth);
    let _ = link;
}

fn target_snapshot(clip: &Clip, time: f32) -> CurveType {
    clip.controller("head")
        .unwrap()
        .get_curve_snapshot(time)
        .unwrap()
        .curve_type
}

/// it should capture a pose that moves mid-recording, interpolating between
/// start and end
#[test]
fn capture_moving_pose_scenario() {
    let (mut clip, link) = mk_clip(2.0);
    let mut recorder =
        Recorder::new(vec!["head".to_string()], vec![]).with_countdown(0);
    recorder.start(&clip).unwrap();
    assert_eq!(
        tick(&mut recorder, &mut clip, 0.0, false),
        RecorderStatus::Capturing
    );

    // move the pose only in the middle of the window
    let mut status = RecorderStatus::Capturing;
    while status == RecorderStatus::Capturing {
        let t = clip.time();
        link.borrow_mut().position = if t > 0.5 && t < 1.5 {
            Vec3::new(1.0 + t, 2.0, 3.0)
        } else {
            Vec3::new(1.0, 2.0, 3.0)
        };
        status = tick(&mut recorder, &mut clip, 0.25, false);
    }
    assert_eq!(status, RecorderStatus::Finished);
    clip.rebuild();

    let target = clip.controller("head").unwrap();
    approx(target.evaluate_position(0.0).x, 1.0, 1e-5);
    approx(target.evaluate_position(2.0).x, 1.0, 1e-5);
    // captured values differ mid-window, so t=1.0 sits strictly between
    // the boundary value and the peak
    let mid = target.evaluate_position(1.0).x;
    assert!(mid > 1.0, "mid={mid}");
}

/// it should run the finalize cleanup when cancelled mid-capture
#[test]
fn cancel_during_capture_still_finalizes() {
    let (mut clip, _link) = mk_clip(2.0);
    let mut recorder =
        Recorder::new(vec!["head".to_string()], vec![]).with_countdown(0);
    recorder.start(&clip).unwrap();
    tick(&mut recorder, &mut clip, 0.0, false);
    tick(&mut recorder, &mut clip, 0.25, false);
    assert!(clip.is_playing());

    assert_eq!(
        tick(&mut recorder, &mut clip, 0.25, true),
        RecorderStatus::Cancelled
    );
    assert!(recorder.is_idle());
    assert!(!clip.is_playing());
    approx(clip.time(), 0.0, 1e-6);
    assert!(clip.any_dirty());
}

/// it should finalize when playback is stopped externally
#[test]
fn external_stop_ends_capture() {
    let (mut clip, _link) = mk_clip(2.0);
    let mut recorder =
        Recorder::new(vec!["head".to_string()], vec![]).with_countdown(0);
    recorder.start(&clip).unwrap();
    tick(&mut recorder, &mut clip, 0.0, false);
    tick(&mut recorder, &mut clip, 0.25, false);

    clip.stop();
    assert_eq!(
        tick(&mut recorder, &mut clip, 0.25, false),
        RecorderStatus::Finished
    );
    assert!(recorder.is_idle());
}

/// it should record float params alongside controllers
#[test]
fn records_float_params() {
    let (mut clip, _link) = mk_clip(1.0);
    let param = Rc::new(RefCell::new(InMemoryFloatParam {
        value: 0.25,
        min: 0.0,
        max: 1.0,
        default_value: 0.0,
    }));
    clip.add_float_param(FloatParamTarget::new("smile", Some(param.clone())));

    let mut recorder = Recorder::new(
        vec!["head".to_string()],
        vec!["smile".to_string()],
    )
    .with_countdown(0);
    recorder.start(&clip).unwrap();
    tick(&mut recorder, &mut clip, 0.0, false);

    let mut status = RecorderStatus::Capturing;
    while status == RecorderStatus::Capturing {
        status = tick(&mut recorder, &mut clip, 0.5, false);
    }
    clip.rebuild();

    let target = clip.float_param("smile").unwrap();
    assert!(target.lead_curve().len() >= 2);
    approx(target.evaluate(0.0), 0.25, 1e-6);
}
