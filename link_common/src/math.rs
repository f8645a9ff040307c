//! Minimal vector math for pose conversion.
//!
//! The host engine is right-handed with +X to the left; the Link consumer is
//! left-handed with +X to the right. Positions cross the boundary through
//! [`Vec3::flip_x`]. Facing directions are derived with [`forward_from_angles`],
//! which already produces consumer-frame vectors.

use serde::Serialize;
use std::ops::Add;

/// Three-component double precision vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3 {
    /// X component
    pub x: f64,
    /// Y component (up)
    pub y: f64,
    /// Z component
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    /// Create a vector from components.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Mirror across the YZ plane (host frame <-> consumer frame).
    #[inline]
    pub const fn flip_x(self) -> Self {
        Self::new(-self.x, self.y, self.z)
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Components as an array, in X, Y, Z order.
    #[inline]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Derive a consumer-frame unit facing vector from yaw and pitch (radians).
///
/// `yaw` is body yaw plus head yaw offset, `pitch` is head pitch.
/// yaw = 0, pitch = 0 faces (-1, 0, 0).
#[inline]
pub fn forward_from_angles(yaw: f64, pitch: f64) -> Vec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    Vec3::new(-cos_yaw * cos_pitch, -sin_pitch, -sin_yaw * cos_pitch)
}
