//! Per-keyframe curve-type settings, keyed by quantized time.
//!
//! Curve keyframes carry float times; settings are a sparse sidecar keyed by
//! integer milliseconds so lookups never suffer float mismatch. Every caller
//! must go through [`to_millis`] to produce a key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Quantize a time in seconds to integer milliseconds.
#[inline]
pub fn to_millis(time: f32) -> u32 {
    (time * 1000.0).round().max(0.0) as u32
}

/// Tangent-generation policy attached to one keyframe time.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveType {
    /// Averaged-neighbor (Catmull-Rom) tangents.
    #[default]
    Smooth,
    /// Tangents equal to the chord slope toward each neighbor.
    Linear,
    /// Zero tangents.
    Flat,
    /// Overshoot tangents for elastic effects.
    Bounce,
    /// Hold: value forced to the previous keyframe's value, zero tangents.
    CopyPrevious,
    /// Tangents untouched (e.g. snapshot restore).
    LeaveAsIs,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyframeSettings {
    pub curve_type: CurveType,
}

/// Sparse time-keyed settings, kept in lock-step with the owning target's
/// lead curve. The reconciliation invariant (same time set on both sides) is
/// checked by the validator, not enforced here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsRegistry {
    entries: BTreeMap<u32, KeyframeSettings>,
}

impl SettingsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, time_ms: u32) -> Option<KeyframeSettings> {
        self.entries.get(&time_ms).copied()
    }

    pub fn contains(&self, time_ms: u32) -> bool {
        self.entries.contains_key(&time_ms)
    }

    /// Insert a default (`Smooth`) entry if none exists at this time.
    pub fn ensure(&mut self, time_ms: u32) {
        self.entries.entry(time_ms).or_default();
    }

    /// Update an existing entry's curve type; ignored when absent.
    pub fn set(&mut self, time_ms: u32, curve_type: CurveType) {
        if let Some(entry) = self.entries.get_mut(&time_ms) {
            entry.curve_type = curve_type;
        }
    }

    /// Update or create the entry at this time.
    pub fn upsert(&mut self, time_ms: u32, curve_type: CurveType) {
        self.entries.insert(time_ms, KeyframeSettings { curve_type });
    }

    pub fn remove(&mut self, time_ms: u32) -> bool {
        self.entries.remove(&time_ms).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Quantized times in ascending order.
    pub fn times(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.keys().copied()
    }

    /// Drop every entry whose time is not in `keep`, returning how many were
    /// removed. Used by validation auto-repair.
    pub fn retain_times(&mut self, keep: &[u32]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|time_ms, _| keep.contains(time_ms));
        before - self.entries.len()
    }
}
