//! Ordered keyframe curve: binary-searchable sparse time series with cubic
//! Hermite evaluation and per-keyframe tangent policies.

use serde::{Deserialize, Serialize};

use crate::settings::CurveType;

/// Times closer than this are the same keyframe (half a millisecond, matching
/// the settings registry's quantization).
pub const KEY_EPSILON: f32 = 0.0005;

/// Overshoot factor for `CurveType::Bounce`: tangents are the negated chord
/// slopes scaled by this, dipping below the segment before overshooting past
/// its end.
const BOUNCE_OVERSHOOT: f32 = 1.1;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    pub in_tangent: f32,
    pub out_tangent: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }
}

/// A scalar channel: keyframes strictly increasing by time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    keys: Vec<Keyframe>,
}

impl Curve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn key(&self, index: usize) -> Option<&Keyframe> {
        self.keys.get(index)
    }

    pub fn first(&self) -> Option<&Keyframe> {
        self.keys.first()
    }

    pub fn last(&self) -> Option<&Keyframe> {
        self.keys.last()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Insert or overwrite the keyframe at `time`, returning its index.
    /// Overwriting keeps existing tangents; tangent recompute is deferred to
    /// the next curve-type reapplication pass.
    pub fn set_keyframe(&mut self, time: f32, value: f32) -> usize {
        if let Some(index) = self.keyframe_binary_search(time) {
            self.keys[index].value = value;
            return index;
        }
        let index = self.keys.partition_point(|k| k.time < time);
        self.keys.insert(index, Keyframe::new(time, value));
        index
    }

    /// Insert or overwrite the full keyframe (value and tangents) at `time`.
    /// Used by snapshot restore and deserialization.
    pub fn set_key_snapshot(&mut self, time: f32, key: Keyframe) -> usize {
        let key = Keyframe { time, ..key };
        if let Some(index) = self.keyframe_binary_search(time) {
            self.keys[index] = key;
            return index;
        }
        let index = self.keys.partition_point(|k| k.time < time);
        self.keys.insert(index, key);
        index
    }

    pub fn remove_key(&mut self, index: usize) {
        if index < self.keys.len() {
            self.keys.remove(index);
        }
    }

    /// Exact search: the index of the keyframe within [`KEY_EPSILON`] of
    /// `time`, if any.
    pub fn keyframe_binary_search(&self, time: f32) -> Option<usize> {
        let index = self.keys.partition_point(|k| k.time < time - KEY_EPSILON);
        match self.keys.get(index) {
            Some(k) if (k.time - time).abs() <= KEY_EPSILON => Some(index),
            _ => None,
        }
    }

    /// Nearest search: the index of the keyframe closest to `time`.
    /// `None` only for an empty curve.
    pub fn nearest_keyframe(&self, time: f32) -> Option<usize> {
        if self.keys.is_empty() {
            return None;
        }
        let index = self.keys.partition_point(|k| k.time < time);
        if index == 0 {
            return Some(0);
        }
        if index == self.keys.len() {
            return Some(self.keys.len() - 1);
        }
        let before = time - self.keys[index - 1].time;
        let after = self.keys[index].time - time;
        Some(if before <= after { index - 1 } else { index })
    }

    /// Piecewise cubic Hermite evaluation. Time before the first or after the
    /// last keyframe clamps to the boundary value; no extrapolation.
    pub fn evaluate(&self, time: f32) -> f32 {
        let n = self.keys.len();
        match n {
            0 => 0.0,
            1 => self.keys[0].value,
            _ => {
                if time <= self.keys[0].time {
                    return self.keys[0].value;
                }
                if time >= self.keys[n - 1].time {
                    return self.keys[n - 1].value;
                }
                let right = self
                    .keys
                    .partition_point(|k| k.time <= time)
                    .clamp(1, n - 1);
                let left = right - 1;
                hermite(&self.keys[left], &self.keys[right], time)
            }
        }
    }

    /// Guarantee keyframes at `t = 0` and `t = length`, copying the nearest
    /// existing value when synthesizing. An empty curve gets zero values.
    pub fn add_edge_frames_if_missing(&mut self, length: f32) {
        if self.keys.is_empty() {
            self.set_keyframe(0.0, 0.0);
            self.set_keyframe(length, 0.0);
            return;
        }
        if self.keyframe_binary_search(0.0).is_none() {
            let value = self.keys[0].value;
            self.set_keyframe(0.0, value);
        }
        if self.keyframe_binary_search(length).is_none() {
            let value = self.keys[self.keys.len() - 1].value;
            self.set_keyframe(length, value);
        }
    }

    /// Recompute in/out tangents at `index` from its neighbors (Catmull-Rom)
    /// scaled by `weight`, producing C1 continuity at that key.
    pub fn smooth_tangents(&mut self, index: usize, weight: f32) {
        let n = self.keys.len();
        if index >= n || n < 2 {
            return;
        }
        let slope = if index == 0 {
            chord(&self.keys[0], &self.keys[1])
        } else if index == n - 1 {
            chord(&self.keys[n - 2], &self.keys[n - 1])
        } else {
            chord(&self.keys[index - 1], &self.keys[index + 1])
        };
        let tangent = slope * weight;
        self.keys[index].in_tangent = tangent;
        self.keys[index].out_tangent = tangent;
    }

    /// Derive the tangents (and for `CopyPrevious`, the value) of the key at
    /// `index` from its curve type. Reapplication is idempotent.
    pub fn apply_curve_type(&mut self, index: usize, curve_type: CurveType, looping: bool) {
        let n = self.keys.len();
        if index >= n {
            return;
        }
        match curve_type {
            CurveType::LeaveAsIs => {}
            CurveType::Flat => {
                self.keys[index].in_tangent = 0.0;
                self.keys[index].out_tangent = 0.0;
            }
            CurveType::Linear => {
                let (into, out) = self.chord_slopes(index);
                self.keys[index].in_tangent = into;
                self.keys[index].out_tangent = out;
            }
            CurveType::Bounce => {
                let (into, out) = self.chord_slopes(index);
                self.keys[index].in_tangent = -into * BOUNCE_OVERSHOOT;
                self.keys[index].out_tangent = -out * BOUNCE_OVERSHOOT;
            }
            CurveType::Smooth => {
                let tangent = self.smooth_slope(index, looping);
                self.keys[index].in_tangent = tangent;
                self.keys[index].out_tangent = tangent;
            }
            CurveType::CopyPrevious => {
                if index > 0 {
                    self.keys[index].value = self.keys[index - 1].value;
                }
                self.keys[index].in_tangent = 0.0;
                self.keys[index].out_tangent = 0.0;
            }
        }
    }

    /// Enforce tangent continuity across the loop boundary: the first and
    /// last keyframes are treated as neighbors of each other and both receive
    /// the tangent of that circular neighborhood.
    pub fn smooth_loop(&mut self) {
        let n = self.keys.len();
        if n < 2 {
            return;
        }
        let length = self.keys[n - 1].time;
        // The last key mirrors the first across the wrap point, so the
        // circular previous neighbor of key 0 is the key before the last,
        // shifted back by one loop length.
        let prev = if n >= 3 { self.keys[n - 2] } else { self.keys[0] };
        let next = self.keys[1];
        let dt = next.time - (prev.time - length);
        let tangent = if dt.abs() > f32::EPSILON {
            (next.value - prev.value) / dt
        } else {
            0.0
        };
        self.keys[0].in_tangent = tangent;
        self.keys[0].out_tangent = tangent;
        self.keys[n - 1].in_tangent = tangent;
        self.keys[n - 1].out_tangent = tangent;
    }

    /// Chord slopes toward the previous and next neighbor; zero where a
    /// neighbor is missing.
    fn chord_slopes(&self, index: usize) -> (f32, f32) {
        let n = self.keys.len();
        let into = if index > 0 {
            chord(&self.keys[index - 1], &self.keys[index])
        } else {
            0.0
        };
        let out = if index + 1 < n {
            chord(&self.keys[index], &self.keys[index + 1])
        } else {
            0.0
        };
        (into, out)
    }

    fn smooth_slope(&self, index: usize, looping: bool) -> f32 {
        let n = self.keys.len();
        if n < 2 {
            return 0.0;
        }
        let length = self.keys[n - 1].time;
        if index == 0 {
            if looping && n >= 3 {
                let prev = &self.keys[n - 2];
                let next = &self.keys[1];
                let dt = next.time - (prev.time - length);
                if dt.abs() > f32::EPSILON {
                    return (next.value - prev.value) / dt;
                }
            }
            return chord(&self.keys[0], &self.keys[1]);
        }
        if index == n - 1 {
            if looping && n >= 3 {
                let prev = &self.keys[n - 2];
                let next = &self.keys[1];
                let dt = (next.time + length) - prev.time;
                if dt.abs() > f32::EPSILON {
                    return (next.value - prev.value) / dt;
                }
            }
            return chord(&self.keys[n - 2], &self.keys[n - 1]);
        }
        chord(&self.keys[index - 1], &self.keys[index + 1])
    }
}

#[inline]
fn chord(a: &Keyframe, b: &Keyframe) -> f32 {
    let dt = b.time - a.time;
    if dt.abs() > f32::EPSILON {
        (b.value - a.value) / dt
    } else {
        0.0
    }
}

/// Cubic Hermite between two keyframes using their stored tangents.
fn hermite(left: &Keyframe, right: &Keyframe, time: f32) -> f32 {
    let dt = (right.time - left.time).max(f32::EPSILON);
    let u = ((time - left.time) / dt).clamp(0.0, 1.0);
    let u2 = u * u;
    let u3 = u2 * u;
    let m0 = left.out_tangent * dt;
    let m1 = right.in_tangent * dt;
    let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
    let h10 = u3 - 2.0 * u2 + u;
    let h01 = -2.0 * u3 + 3.0 * u2;
    let h11 = u3 - u2;
    h00 * left.value + h10 * m0 + h01 * right.value + h11 * m1
}
