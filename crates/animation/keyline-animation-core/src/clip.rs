//! Clip: a named, timed collection of animation targets sharing one timeline
//! length and loop flag, plus the minimal cooperative playback state the
//! recorder and external playback drivers consume.

use keyline_api_core::{Quat, Vec3};

use crate::targets::{AnimationTarget, ControllerTarget, FloatParamTarget};
use crate::validation::{validate_target, ValidationReport};

pub struct Clip {
    pub name: String,
    pub animation_length: f32,
    pub looping: bool,
    controllers: Vec<ControllerTarget>,
    float_params: Vec<FloatParamTarget>,
    time: f32,
    playing: bool,
}

impl Clip {
    pub fn new(name: impl Into<String>, animation_length: f32) -> Self {
        Self {
            name: name.into(),
            animation_length: animation_length.max(0.0),
            looping: false,
            controllers: Vec::new(),
            float_params: Vec::new(),
            time: 0.0,
            playing: false,
        }
    }

    // ---- Targets ----

    pub fn add_controller(&mut self, target: ControllerTarget) -> &mut ControllerTarget {
        self.controllers.push(target);
        self.controllers.last_mut().unwrap()
    }

    pub fn add_float_param(&mut self, target: FloatParamTarget) -> &mut FloatParamTarget {
        self.float_params.push(target);
        self.float_params.last_mut().unwrap()
    }

    /// Remove (destroy) a controller target by name.
    pub fn remove_controller(&mut self, name: &str) -> Option<ControllerTarget> {
        let index = self.controllers.iter().position(|t| t.name() == name)?;
        Some(self.controllers.remove(index))
    }

    pub fn remove_float_param(&mut self, name: &str) -> Option<FloatParamTarget> {
        let index = self.float_params.iter().position(|t| t.name() == name)?;
        Some(self.float_params.remove(index))
    }

    pub fn controllers(&self) -> &[ControllerTarget] {
        &self.controllers
    }

    pub fn float_params(&self) -> &[FloatParamTarget] {
        &self.float_params
    }

    pub fn controller(&self, name: &str) -> Option<&ControllerTarget> {
        self.controllers.iter().find(|t| t.name() == name)
    }

    pub fn controller_mut(&mut self, name: &str) -> Option<&mut ControllerTarget> {
        self.controllers.iter_mut().find(|t| t.name() == name)
    }

    pub fn float_param(&self, name: &str) -> Option<&FloatParamTarget> {
        self.float_params.iter().find(|t| t.name() == name)
    }

    pub fn float_param_mut(&mut self, name: &str) -> Option<&mut FloatParamTarget> {
        self.float_params.iter_mut().find(|t| t.name() == name)
    }

    pub fn targets(&self) -> impl Iterator<Item = &dyn AnimationTarget> {
        self.controllers
            .iter()
            .map(|t| t as &dyn AnimationTarget)
            .chain(self.float_params.iter().map(|t| t as &dyn AnimationTarget))
    }

    pub fn targets_mut(&mut self) -> impl Iterator<Item = &mut dyn AnimationTarget> {
        self.controllers
            .iter_mut()
            .map(|t| t as &mut dyn AnimationTarget)
            .chain(
                self.float_params
                    .iter_mut()
                    .map(|t| t as &mut dyn AnimationTarget),
            )
    }

    // ---- Dirty protocol ----

    pub fn any_dirty(&self) -> bool {
        self.targets().any(|t| t.base().is_dirty())
    }

    pub fn dirty_all(&mut self) {
        for target in self.targets_mut() {
            target.base_mut().mark_dirty();
        }
    }

    // ---- Playback state ----

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Seek, clamped into the clip's domain. Used by editors and the
    /// recorder; normal playback goes through `advance`.
    pub fn seek(&mut self, time: f32) {
        self.time = time.clamp(0.0, self.animation_length);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    /// Advance playback by `dt` (cooperative tick from the external driver).
    /// Looping wraps; otherwise playback stops at the end.
    pub fn advance(&mut self, dt: f32) {
        if !self.playing || self.animation_length <= 0.0 {
            return;
        }
        self.time += dt;
        if self.time > self.animation_length {
            if self.looping {
                self.time %= self.animation_length;
            } else {
                self.time = self.animation_length;
                self.playing = false;
            }
        }
    }

    /// Blend every target's curves into the live pose at `time`.
    pub fn sample(&mut self, time: f32, weight: f32) {
        for target in self.targets_mut() {
            target.sample(time, weight);
        }
    }

    // ---- Keyframe edits (range-guarded: out-of-range edits are no-ops) ----

    pub fn set_controller_keyframe(
        &mut self,
        name: &str,
        time: f32,
        position: Vec3,
        rotation: Quat,
    ) {
        if !self.in_range(time) {
            return;
        }
        if let Some(target) = self.controller_mut(name) {
            target.set_keyframe(time, position, rotation);
        }
    }

    pub fn set_float_param_keyframe(&mut self, name: &str, time: f32, value: f32) {
        if !self.in_range(time) {
            return;
        }
        if let Some(target) = self.float_param_mut(name) {
            target.set_keyframe(time, value);
        }
    }

    pub fn delete_frame(&mut self, name: &str, time: f32) {
        if !self.in_range(time) {
            return;
        }
        for target in self.targets_mut() {
            if target.name() == name {
                target.delete_frame(time);
                return;
            }
        }
    }

    fn in_range(&self, time: f32) -> bool {
        (0.0..=self.animation_length).contains(&time)
    }

    // ---- Rebuild ----

    /// Consume the dirty flags: for every dirty target, enforce edge frames,
    /// reapply curve types, smooth the loop boundary when looping, and
    /// validate. The returned report is never fatal.
    pub fn rebuild(&mut self) -> ValidationReport {
        let mut report = ValidationReport::default();
        let length = self.animation_length;
        let looping = self.looping;
        for target in self.targets_mut() {
            if !target.base().is_dirty() {
                continue;
            }
            target.add_edge_frames_if_missing(length);
            target.reapply_curve_types(looping);
            if looping {
                target.smooth_loop();
            }
            validate_target(target, length, &mut report);
            target.base_mut().clear_dirty();
        }
        report
    }
}
