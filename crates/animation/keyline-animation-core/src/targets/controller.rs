//! Controller target: 7 coupled curves (3 position + 4 quaternion) moving as
//! one logical entity. All index-aligned operations are applied uniformly
//! across the channel array; the position x curve is the lead.

use serde::{Deserialize, Serialize};

use keyline_api_core::{Quat, Vec3};

use crate::curve::{Curve, Keyframe};
use crate::settings::{to_millis, CurveType, SettingsRegistry};
use crate::targets::{AnimationTarget, SharedControllerLink, TargetBase};

pub const CHANNELS: usize = 7;

const POS_X: usize = 0;
const POS_Y: usize = 1;
const POS_Z: usize = 2;
const ROT_X: usize = 3;
const ROT_Y: usize = 4;
const ROT_Z: usize = 5;
const ROT_W: usize = 6;

/// One keyframe across every channel plus its curve type, captured/restored
/// atomically.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub x: Keyframe,
    pub y: Keyframe,
    pub z: Keyframe,
    pub rot_x: Keyframe,
    pub rot_y: Keyframe,
    pub rot_z: Keyframe,
    pub rot_w: Keyframe,
    pub curve_type: CurveType,
}

pub struct ControllerTarget {
    name: String,
    link: Option<SharedControllerLink>,
    settings: SettingsRegistry,
    curves: [Curve; CHANNELS],
    base: TargetBase,
}

impl ControllerTarget {
    pub fn new(name: impl Into<String>, link: Option<SharedControllerLink>) -> Self {
        Self {
            name: name.into(),
            link,
            settings: SettingsRegistry::new(),
            curves: Default::default(),
            base: TargetBase::default(),
        }
    }

    pub fn link(&self) -> Option<&SharedControllerLink> {
        self.link.as_ref()
    }

    pub fn set_link(&mut self, link: Option<SharedControllerLink>) {
        self.link = link;
    }

    pub fn curves(&self) -> &[Curve; CHANNELS] {
        &self.curves
    }

    /// Write the current live pose as a keyframe; no-op without a link.
    pub fn set_keyframe_to_current_pose(&mut self, time: f32) -> Option<usize> {
        let link = self.link.clone()?;
        let (position, rotation) = {
            let link = link.borrow();
            (link.local_position(), link.local_rotation())
        };
        Some(self.set_keyframe(time, position, rotation))
    }

    /// Write a keyframe at `time` on every coupled curve and ensure a
    /// settings entry exists (default `Smooth`). Returns the lead index.
    pub fn set_keyframe(&mut self, time: f32, position: Vec3, rotation: Quat) -> usize {
        let index = self.curves[POS_X].set_keyframe(time, position.x);
        self.curves[POS_Y].set_keyframe(time, position.y);
        self.curves[POS_Z].set_keyframe(time, position.z);
        self.curves[ROT_X].set_keyframe(time, rotation.x);
        self.curves[ROT_Y].set_keyframe(time, rotation.y);
        self.curves[ROT_Z].set_keyframe(time, rotation.z);
        self.curves[ROT_W].set_keyframe(time, rotation.w);
        self.settings.ensure(to_millis(time));
        self.base.edited();
        index
    }

    pub fn evaluate_position(&self, time: f32) -> Vec3 {
        Vec3::new(
            self.curves[POS_X].evaluate(time),
            self.curves[POS_Y].evaluate(time),
            self.curves[POS_Z].evaluate(time),
        )
    }

    pub fn evaluate_rotation(&self, time: f32) -> Quat {
        Quat::new(
            self.curves[ROT_X].evaluate(time),
            self.curves[ROT_Y].evaluate(time),
            self.curves[ROT_Z].evaluate(time),
            self.curves[ROT_W].evaluate(time),
        )
    }

    /// Incrementally move the live pose toward the curve-evaluated target,
    /// capped by per-call deltas. Returns true once position is within
    /// tolerance.
    pub fn interpolate(&mut self, time: f32, max_pos_delta: f32, max_rot_delta: f32) -> bool {
        let target_position = self.evaluate_position(time);
        let target_rotation = self.evaluate_rotation(time);
        let Some(link) = self.link.as_ref() else {
            return false;
        };
        let mut link = link.borrow_mut();
        let position = Vec3::move_towards(link.local_position(), target_position, max_pos_delta);
        link.set_local_position(position);
        let rotation = Quat::rotate_towards(link.local_rotation(), target_rotation, max_rot_delta);
        link.set_local_rotation(rotation);
        // Rotation convergence is not checked; some poses never get near the
        // target rotation.
        Vec3::distance(position, target_position) < 0.01
    }

    /// Capture the full per-channel keyframe and curve type at `time`.
    /// `None` when no keyframe sits at that time.
    pub fn get_curve_snapshot(&self, time: f32) -> Option<ControllerSnapshot> {
        let index = self.curves[POS_X].keyframe_binary_search(time)?;
        Some(ControllerSnapshot {
            x: *self.curves[POS_X].key(index)?,
            y: *self.curves[POS_Y].key(index)?,
            z: *self.curves[POS_Z].key(index)?,
            rot_x: *self.curves[ROT_X].key(index)?,
            rot_y: *self.curves[ROT_Y].key(index)?,
            rot_z: *self.curves[ROT_Z].key(index)?,
            rot_w: *self.curves[ROT_W].key(index)?,
            curve_type: self
                .settings
                .get(to_millis(time))
                .map(|s| s.curve_type)
                .unwrap_or(CurveType::LeaveAsIs),
        })
    }

    /// Restore a snapshot at `time` across all channels atomically.
    pub fn set_curve_snapshot(&mut self, time: f32, snapshot: ControllerSnapshot) {
        self.curves[POS_X].set_key_snapshot(time, snapshot.x);
        self.curves[POS_Y].set_key_snapshot(time, snapshot.y);
        self.curves[POS_Z].set_key_snapshot(time, snapshot.z);
        self.curves[ROT_X].set_key_snapshot(time, snapshot.rot_x);
        self.curves[ROT_Y].set_key_snapshot(time, snapshot.rot_y);
        self.curves[ROT_Z].set_key_snapshot(time, snapshot.rot_z);
        self.curves[ROT_W].set_key_snapshot(time, snapshot.rot_w);
        self.settings.upsert(to_millis(time), snapshot.curve_type);
        self.base.edited();
    }

    /// Smooth tangents around an edited key on the position channels.
    /// Rotation channels keep their curve-type tangents.
    pub fn smooth_neighbors(&mut self, index: usize) {
        for channel in POS_X..=POS_Z {
            let curve = &mut self.curves[channel];
            curve.smooth_tangents(index, 1.0);
            if index > 0 {
                curve.smooth_tangents(index - 1, 1.0);
            }
            if index + 1 < curve.len() {
                curve.smooth_tangents(index + 1, 1.0);
            }
        }
    }
}

impl AnimationTarget for ControllerTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn lead_curve(&self) -> &Curve {
        &self.curves[POS_X]
    }

    fn base(&self) -> &TargetBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut TargetBase {
        &mut self.base
    }

    fn settings(&self) -> &SettingsRegistry {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut SettingsRegistry {
        &mut self.settings
    }

    fn delete_frame_by_key(&mut self, index: usize) {
        if let Some(key) = self.curves[POS_X].key(index) {
            self.settings.remove(to_millis(key.time));
        }
        for curve in &mut self.curves {
            curve.remove_key(index);
        }
        self.base.edited();
    }

    fn clear_keyframes(&mut self) {
        for curve in &mut self.curves {
            curve.clear();
        }
        self.settings.clear();
        self.base.edited();
    }

    fn add_edge_frames_if_missing(&mut self, animation_length: f32) {
        for curve in &mut self.curves {
            curve.add_edge_frames_if_missing(animation_length);
        }
        self.settings.ensure(0);
        self.settings.ensure(to_millis(animation_length));
        self.base.edited();
    }

    fn reapply_curve_types(&mut self, looping: bool) {
        if self.curves[POS_X].len() < 2 {
            return;
        }
        for curve in &mut self.curves {
            for index in 0..curve.len() {
                let time = match curve.key(index) {
                    Some(key) => key.time,
                    None => continue,
                };
                let Some(setting) = self.settings.get(to_millis(time)) else {
                    continue;
                };
                curve.apply_curve_type(index, setting.curve_type, looping);
            }
        }
    }

    fn smooth_loop(&mut self) {
        for curve in &mut self.curves {
            curve.smooth_loop();
        }
    }

    fn record_current(&mut self, time: f32) {
        self.set_keyframe_to_current_pose(time);
    }

    fn sample(&mut self, time: f32, weight: f32) {
        let target_position = self.evaluate_position(time);
        let target_rotation = self.evaluate_rotation(time);
        let Some(link) = self.link.as_ref() else {
            return;
        };
        let mut link = link.borrow_mut();
        let rotation = Quat::slerp(link.local_rotation(), target_rotation, weight);
        link.set_local_rotation(rotation);
        let position = Vec3::lerp(link.local_position(), target_position, weight);
        link.set_local_position(position);
    }
}
