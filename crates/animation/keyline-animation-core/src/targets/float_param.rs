//! Scalar parameter target: the single-curve subset of the controller
//! contract, with a numeric range enforced on writes.

use serde::{Deserialize, Serialize};

use crate::curve::{Curve, Keyframe};
use crate::settings::{to_millis, CurveType, SettingsRegistry};
use crate::targets::{AnimationTarget, SharedFloatParamLink, TargetBase};

/// One keyframe of the value curve plus its curve type.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatParamSnapshot {
    pub value: Keyframe,
    pub curve_type: CurveType,
}

pub struct FloatParamTarget {
    name: String,
    link: Option<SharedFloatParamLink>,
    settings: SettingsRegistry,
    value: Curve,
    base: TargetBase,
}

impl FloatParamTarget {
    pub fn new(name: impl Into<String>, link: Option<SharedFloatParamLink>) -> Self {
        Self {
            name: name.into(),
            link,
            settings: SettingsRegistry::new(),
            value: Curve::new(),
            base: TargetBase::default(),
        }
    }

    pub fn link(&self) -> Option<&SharedFloatParamLink> {
        self.link.as_ref()
    }

    pub fn set_link(&mut self, link: Option<SharedFloatParamLink>) {
        self.link = link;
    }

    pub fn curve(&self) -> &Curve {
        &self.value
    }

    /// Write the parameter's current value as a keyframe; no-op without a
    /// link.
    pub fn set_keyframe_to_current_value(&mut self, time: f32) -> Option<usize> {
        let link = self.link.clone()?;
        let value = link.borrow().value();
        Some(self.set_keyframe(time, value))
    }

    /// Write a keyframe at `time`, clamped into the parameter's range, and
    /// ensure a settings entry exists.
    pub fn set_keyframe(&mut self, time: f32, value: f32) -> usize {
        let value = match self.link.as_ref() {
            Some(link) => {
                let link = link.borrow();
                value.clamp(link.min(), link.max())
            }
            None => value,
        };
        let index = self.value.set_keyframe(time, value);
        self.settings.ensure(to_millis(time));
        self.base.edited();
        index
    }

    pub fn evaluate(&self, time: f32) -> f32 {
        self.value.evaluate(time)
    }

    pub fn get_curve_snapshot(&self, time: f32) -> Option<FloatParamSnapshot> {
        let index = self.value.keyframe_binary_search(time)?;
        Some(FloatParamSnapshot {
            value: *self.value.key(index)?,
            curve_type: self
                .settings
                .get(to_millis(time))
                .map(|s| s.curve_type)
                .unwrap_or(CurveType::LeaveAsIs),
        })
    }

    pub fn set_curve_snapshot(&mut self, time: f32, snapshot: FloatParamSnapshot) {
        self.value.set_key_snapshot(time, snapshot.value);
        self.settings.upsert(to_millis(time), snapshot.curve_type);
        self.base.edited();
    }
}

impl AnimationTarget for FloatParamTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn lead_curve(&self) -> &Curve {
        &self.value
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
        if let Some(key) = self.value.key(index) {
            self.settings.remove(to_millis(key.time));
        }
        self.value.remove_key(index);
        self.base.edited();
    }

    fn clear_keyframes(&mut self) {
        self.value.clear();
        self.settings.clear();
        self.base.edited();
    }

    fn add_edge_frames_if_missing(&mut self, animation_length: f32) {
        self.value.add_edge_frames_if_missing(animation_length);
        self.settings.ensure(0);
        self.settings.ensure(to_millis(animation_length));
        self.base.edited();
    }

    fn reapply_curve_types(&mut self, looping: bool) {
        if self.value.len() < 2 {
            return;
        }
        for index in 0..self.value.len() {
            let time = match self.value.key(index) {
                Some(key) => key.time,
                None => continue,
            };
            let Some(setting) = self.settings.get(to_millis(time)) else {
                continue;
            };
            self.value.apply_curve_type(index, setting.curve_type, looping);
        }
    }

    fn smooth_loop(&mut self) {
        self.value.smooth_loop();
    }

    fn record_current(&mut self, time: f32) {
        self.set_keyframe_to_current_value(time);
    }

    fn sample(&mut self, time: f32, weight: f32) {
        let target = self.evaluate(time);
        let Some(link) = self.link.as_ref() else {
            return;
        };
        let mut link = link.borrow_mut();
        let current = link.value();
        let blended = current + (target - current) * weight;
        let clamped = blended.clamp(link.min(), link.max());
        link.set_value(clamped);
    }
}
