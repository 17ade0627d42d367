//! Animation targets: the polymorphic unit of animation. A target owns its
//! channel curves and settings registry exclusively; the host scene is
//! reached only through an optional link.

mod controller;
mod float_param;

pub use controller::{ControllerSnapshot, ControllerTarget};
pub use float_param::{FloatParamSnapshot, FloatParamTarget};

use std::cell::RefCell;
use std::rc::Rc;

use keyline_api_core::{ControllerLink, FloatParamLink};

use crate::curve::Curve;
use crate::settings::{CurveType, SettingsRegistry};

/// Shared handle to a host pose object (single-threaded cooperative model).
pub type SharedControllerLink = Rc<RefCell<dyn ControllerLink>>;
/// Shared handle to a host float parameter.
pub type SharedFloatParamLink = Rc<RefCell<dyn FloatParamLink>>;

/// Edit protocol selected on a target. `Recording` batches the per-edit dirty
/// bookkeeping: keyframe writes do not mark dirty until recording ends.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Manual,
    Recording,
}

/// Dirty flag and edit mode shared by all target variants.
#[derive(Clone, Debug, Default)]
pub struct TargetBase {
    dirty: bool,
    mode: EditMode,
}

impl TargetBase {
    /// Record that a structural edit happened. In `Recording` mode the flag
    /// is deferred until `end_recording`.
    pub fn edited(&mut self) {
        if self.mode == EditMode::Manual {
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Cleared only by the consumer that performs the rebuild.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn begin_recording(&mut self) {
        self.mode = EditMode::Recording;
    }

    pub fn end_recording(&mut self) {
        self.mode = EditMode::Manual;
        self.dirty = true;
    }
}

/// Operations shared by every target variant. The lead curve is the
/// designated channel for all time-indexed structural queries.
pub trait AnimationTarget {
    fn name(&self) -> &str;
    fn lead_curve(&self) -> &Curve;
    fn base(&self) -> &TargetBase;
    fn base_mut(&mut self) -> &mut TargetBase;
    fn settings(&self) -> &SettingsRegistry;
    fn settings_mut(&mut self) -> &mut SettingsRegistry;

    /// Remove the keyframe at `index` from every coupled curve and the
    /// matching settings entry.
    fn delete_frame_by_key(&mut self, index: usize);

    /// Remove every keyframe and settings entry.
    fn clear_keyframes(&mut self);

    fn add_edge_frames_if_missing(&mut self, animation_length: f32);

    /// Recompute tangents for every keyframe of every coupled curve from its
    /// settings entry.
    fn reapply_curve_types(&mut self, looping: bool);

    /// Enforce first/last tangent continuity on every coupled curve.
    fn smooth_loop(&mut self);

    /// Write the live pose/parameter value as a keyframe at `time`.
    /// No-op when the link is unavailable.
    fn record_current(&mut self, time: f32);

    /// Blend the curve-evaluated value into the live pose with `weight`.
    fn sample(&mut self, time: f32, weight: f32);

    fn delete_frame(&mut self, time: f32) {
        if let Some(index) = self.lead_curve().keyframe_binary_search(time) {
            self.delete_frame_by_key(index);
        }
    }

    fn has_keyframe(&self, time: f32) -> bool {
        self.lead_curve().keyframe_binary_search(time).is_some()
    }

    fn keyframe_times(&self) -> Vec<f32> {
        self.lead_curve().keys().iter().map(|k| k.time).collect()
    }

    /// Snap to the nearest keyframe time; `None` only while unauthored.
    fn time_closest_to(&self, time: f32) -> Option<f32> {
        let index = self.lead_curve().nearest_keyframe(time)?;
        Some(self.lead_curve().key(index)?.time)
    }

    /// Update only the settings entry; tangent recompute is deferred to the
    /// next `reapply_curve_types` pass.
    fn change_curve_type(&mut self, time: f32, curve_type: CurveType) {
        let time_ms = crate::settings::to_millis(time);
        self.settings_mut().set(time_ms, curve_type);
        self.base_mut().edited();
    }
}
