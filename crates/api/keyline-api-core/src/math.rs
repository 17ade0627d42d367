//! Minimal vector/quaternion math for pose sampling and blending.
//! All numeric types use f32.

use serde::{Deserialize, Serialize};

/// 3D vector (local position).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation between `a` and `b`.
    #[inline]
    pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
        Vec3 {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            z: a.z + (b.z - a.z) * t,
        }
    }

    #[inline]
    pub fn distance(a: Vec3, b: Vec3) -> f32 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let dz = b.z - a.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Step from `current` toward `target` by at most `max_delta`.
    /// Never overshoots; reaches `target` exactly once within range.
    pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
        let dx = target.x - current.x;
        let dy = target.y - current.y;
        let dz = target.z - current.z;
        let dist2 = dx * dx + dy * dy + dz * dz;
        if dist2 == 0.0 || (max_delta >= 0.0 && dist2 <= max_delta * max_delta) {
            return target;
        }
        let dist = dist2.sqrt();
        Vec3 {
            x: current.x + dx / dist * max_delta,
            y: current.y + dy / dist * max_delta,
            z: current.z + dz / dist * max_delta,
        }
    }
}

/// Quaternion (x, y, z, w).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    #[inline]
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    #[inline]
    pub fn dot(self, other: Quat) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    #[inline]
    pub fn normalize(self) -> Quat {
        let len2 = self.dot(self);
        if len2 > 0.0 {
            let inv = len2.sqrt().recip();
            Quat {
                x: self.x * inv,
                y: self.y * inv,
                z: self.z * inv,
                w: self.w * inv,
            }
        } else {
            Quat::IDENTITY
        }
    }

    #[inline]
    fn negate(self) -> Quat {
        Quat {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: -self.w,
        }
    }

    /// Spherical interpolation with shortest-arc correction.
    /// Falls back to normalized lerp when the quaternions are nearly aligned.
    pub fn slerp(a: Quat, b: Quat, t: f32) -> Quat {
        let mut b = b;
        let mut d = a.dot(b);
        if d < 0.0 {
            b = b.negate();
            d = -d;
        }
        if d > 0.9995 {
            return Quat {
                x: a.x + (b.x - a.x) * t,
                y: a.y + (b.y - a.y) * t,
                z: a.z + (b.z - a.z) * t,
                w: a.w + (b.w - a.w) * t,
            }
            .normalize();
        }
        let theta0 = d.clamp(-1.0, 1.0).acos();
        let theta = theta0 * t;
        let sin_theta0 = theta0.sin();
        let s0 = ((1.0 - t) * theta0).sin() / sin_theta0;
        let s1 = theta.sin() / sin_theta0;
        Quat {
            x: a.x * s0 + b.x * s1,
            y: a.y * s0 + b.y * s1,
            z: a.z * s0 + b.z * s1,
            w: a.w * s0 + b.w * s1,
        }
        .normalize()
    }

    /// Angle between two rotations, in radians.
    pub fn angle_to(self, other: Quat) -> f32 {
        let d = self.normalize().dot(other.normalize()).abs().min(1.0);
        2.0 * d.acos()
    }

    /// Rotate from `current` toward `target` by at most `max_radians`.
    pub fn rotate_towards(current: Quat, target: Quat, max_radians: f32) -> Quat {
        let angle = current.angle_to(target);
        if angle <= max_radians || angle < 1e-6 {
            return target;
        }
        Quat::slerp(current, target, (max_radians / angle).min(1.0))
    }
}
