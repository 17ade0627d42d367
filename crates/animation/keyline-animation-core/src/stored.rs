//! Persisted clip form: per target an ordered list of frames carrying the
//! time, value and tangents for every channel, and the curve type. The
//! snapshot primitives round-trip keyframes bit-exactly, so an external
//! serializer built on this schema loses nothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clip::Clip;
use crate::targets::{
    AnimationTarget, ControllerSnapshot, ControllerTarget, FloatParamSnapshot, FloatParamTarget,
};

#[derive(Debug, Error)]
pub enum StoredError {
    #[error("stored clip parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid stored clip: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredClip {
    pub name: String,
    #[serde(rename = "animationLength")]
    pub animation_length: f32,
    #[serde(rename = "loop", default)]
    pub looping: bool,
    #[serde(default)]
    pub controllers: Vec<StoredControllerTarget>,
    #[serde(rename = "floatParams", default)]
    pub float_params: Vec<StoredFloatParamTarget>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredControllerTarget {
    pub name: String,
    pub frames: Vec<StoredControllerFrame>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredControllerFrame {
    pub time: f32,
    #[serde(flatten)]
    pub snapshot: ControllerSnapshot,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredFloatParamTarget {
    pub name: String,
    pub frames: Vec<StoredFloatParamFrame>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredFloatParamFrame {
    pub time: f32,
    #[serde(flatten)]
    pub snapshot: FloatParamSnapshot,
}

impl StoredClip {
    /// Basic invariants: positive length, frame times non-decreasing.
    pub fn validate_basic(&self) -> Result<(), StoredError> {
        if !self.animation_length.is_finite() || self.animation_length <= 0.0 {
            return Err(StoredError::Invalid(
                "animationLength must be > 0".to_string(),
            ));
        }
        let check = |name: &str, times: &mut dyn Iterator<Item = f32>| {
            let mut last = f32::NEG_INFINITY;
            for t in times {
                if !t.is_finite() || t < last {
                    return Err(StoredError::Invalid(format!(
                        "frame times must be finite and non-decreasing for '{name}'"
                    )));
                }
                last = t;
            }
            Ok(())
        };
        for target in &self.controllers {
            check(&target.name, &mut target.frames.iter().map(|f| f.time))?;
        }
        for target in &self.float_params {
            check(&target.name, &mut target.frames.iter().map(|f| f.time))?;
        }
        Ok(())
    }
}

/// Capture a clip's targets into the persisted form. Host links are not part
/// of the stored identity beyond the target name.
pub fn export_clip(clip: &Clip) -> StoredClip {
    StoredClip {
        name: clip.name.clone(),
        animation_length: clip.animation_length,
        looping: clip.looping,
        controllers: clip
            .controllers()
            .iter()
            .map(|target| StoredControllerTarget {
                name: target.name().to_string(),
                frames: target
                    .keyframe_times()
                    .into_iter()
                    .filter_map(|time| {
                        target
                            .get_curve_snapshot(time)
                            .map(|snapshot| StoredControllerFrame { time, snapshot })
                    })
                    .collect(),
            })
            .collect(),
        float_params: clip
            .float_params()
            .iter()
            .map(|target| StoredFloatParamTarget {
                name: target.name().to_string(),
                frames: target
                    .keyframe_times()
                    .into_iter()
                    .filter_map(|time| {
                        target
                            .get_curve_snapshot(time)
                            .map(|snapshot| StoredFloatParamFrame { time, snapshot })
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Rebuild a clip from the persisted form. Targets come back dirty so the
/// next `rebuild` pass validates them; links must be re-attached by the
/// host.
pub fn import_clip(stored: &StoredClip) -> Result<Clip, StoredError> {
    stored.validate_basic()?;
    let mut clip = Clip::new(stored.name.clone(), stored.animation_length);
    clip.looping = stored.looping;
    for st in &stored.controllers {
        let mut target = ControllerTarget::new(st.name.clone(), None);
        for frame in &st.frames {
            target.set_curve_snapshot(frame.time, frame.snapshot);
        }
        clip.add_controller(target);
    }
    for st in &stored.float_params {
        let mut target = FloatParamTarget::new(st.name.clone(), None);
        for frame in &st.frames {
            target.set_curve_snapshot(frame.time, frame.snapshot);
        }
        clip.add_float_param(target);
    }
    Ok(clip)
}

/// Parse the persisted JSON form into a live clip.
pub fn parse_clip_json(s: &str) -> Result<Clip, StoredError> {
    let stored: StoredClip = serde_json::from_str(s)?;
    import_clip(&stored)
}

/// Export a clip as `serde_json::Value` (stable schema for serializers).
pub fn export_clip_json(clip: &Clip) -> serde_json::Value {
    serde_json::to_value(export_clip(clip)).unwrap_or(serde_json::Value::Null)
}
