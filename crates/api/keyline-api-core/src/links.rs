//! Host-facing links: the scene's pose and parameter objects are opaque to
//! the animation core and reached only through these traits. A missing link
//! makes the affected operation a no-op, never an error.

use serde::{Deserialize, Serialize};

use crate::math::{Quat, Vec3};

/// Pose source/sink for one articulated controller.
pub trait ControllerLink {
    fn local_position(&self) -> Vec3;
    fn local_rotation(&self) -> Quat;
    fn set_local_position(&mut self, position: Vec3);
    fn set_local_rotation(&mut self, rotation: Quat);
}

/// Scalar parameter source/sink with a static range.
pub trait FloatParamLink {
    fn value(&self) -> f32;
    fn set_value(&mut self, value: f32);
    fn min(&self) -> f32;
    fn max(&self) -> f32;
    fn default_value(&self) -> f32;
}

/// Reference implementation backed by plain fields, for hosts without a live
/// scene and for tests.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryController {
    pub position: Vec3,
    pub rotation: Quat,
}

impl ControllerLink for InMemoryController {
    fn local_position(&self) -> Vec3 {
        self.position
    }
    fn local_rotation(&self) -> Quat {
        self.rotation
    }
    fn set_local_position(&mut self, position: Vec3) {
        self.position = position;
    }
    fn set_local_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }
}

/// Reference implementation of a ranged float parameter.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InMemoryFloatParam {
    pub value: f32,
    pub min: f32,
    pub max: f32,
    pub default_value: f32,
}

impl Default for InMemoryFloatParam {
    fn default() -> Self {
        Self {
            value: 0.0,
            min: 0.0,
            max: 1.0,
            default_value: 0.0,
        }
    }
}

impl FloatParamLink for InMemoryFloatParam {
    fn value(&self) -> f32 {
        self.value
    }
    fn set_value(&mut self, value: f32) {
        self.value = value.clamp(self.min, self.max);
    }
    fn min(&self) -> f32 {
        self.min
    }
    fn max(&self) -> f32 {
        self.max
    }
    fn default_value(&self) -> f32 {
        self.default_value
    }
}
