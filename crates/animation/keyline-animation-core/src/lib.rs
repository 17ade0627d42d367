//! Keyline Animation Core (engine-agnostic)
//!
//! Keyframe animation authoring and playback: per-channel Hermite curves
//! with per-keyframe curve-type settings, coupled controller and scalar
//! parameter targets, structural validation with auto-repair, loop-boundary
//! smoothing, a persisted clip form, and the temporal recording state
//! machine that captures live pose samples into curves.

pub mod clip;
pub mod curve;
pub mod recorder;
pub mod settings;
pub mod stored;
pub mod targets;
pub mod validation;

// Re-exports for consumers (adapters)
pub use clip::Clip;
pub use curve::{Curve, Keyframe, KEY_EPSILON};
pub use recorder::{
    RecordError, Recorder, RecorderStatus, TickContext, DEFAULT_COUNTDOWN_TICKS,
};
pub use settings::{to_millis, CurveType, KeyframeSettings, SettingsRegistry};
pub use stored::{
    export_clip, export_clip_json, import_clip, parse_clip_json, StoredClip, StoredError,
};
pub use targets::{
    AnimationTarget, ControllerSnapshot, ControllerTarget, EditMode, FloatParamSnapshot,
    FloatParamTarget, SharedControllerLink, SharedFloatParamLink, TargetBase,
};
pub use validation::{validate_target, ValidationIssue, ValidationReport};
pub use keyline_api_core::{ControllerLink, FloatParamLink, Quat, Vec3};
