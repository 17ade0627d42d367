//! keyline-api-core: host-facing math and link traits (engine-agnostic)

pub mod links;
pub mod math;

pub use links::{ControllerLink, FloatParamLink, InMemoryController, InMemoryFloatParam};
pub use math::{Quat, Vec3};
