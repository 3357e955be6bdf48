//! Geometry and animation core for the yule holiday scene.
//!
//! Every entity class (particles, ornaments, gifts, photos) has one
//! precomputed [`geometry::PointSet`] per [`VisualMode`]. Each frame the
//! [`scene::Scene`] reads the latest [`HandSample`](yule_shared::HandSample),
//! lets the [`mode::ModeController`] pick the active mode, and blends every
//! entity toward its target in that mode's point set.

use serde::Serialize;

pub mod geometry;
pub mod media;
pub mod mode;
pub mod motion;
pub mod scene;

pub use geometry::{generate, PointSet, Shape};
pub use media::{AudioOutput, MediaError, MusicPlayer, PhotoQueue, MAX_PHOTOS};
pub use mode::ModeController;
pub use motion::{EntityField, GroupMotion, ModeTargets};
pub use scene::{Frame, Scene};
pub use yule_shared::VisualMode;

/// A 3D vector used for positions and offsets
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(&self, other: &Vec3) -> f32 {
        (*self - *other).magnitude()
    }

    /// Distance from the vertical axis
    pub fn horizontal_radius(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }

    /// Move `t` of the way toward `target`
    pub fn lerp(&self, target: &Vec3, t: f32) -> Self {
        Self {
            x: motion::blend(self.x, target.x, t),
            y: motion::blend(self.y, target.y, t),
            z: motion::blend(self.z, target.z, t),
        }
    }
}

impl core::ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_magnitude() {
        let v = Vec3::new(2.0, 3.0, 6.0);
        assert_eq!(v.magnitude(), 7.0);
    }

    #[test]
    fn test_vec3_distance() {
        let v1 = Vec3::new(1.0, 2.0, 3.0);
        let v2 = Vec3::new(3.0, 4.0, 4.0);
        assert_eq!(v2 - v1, Vec3::new(2.0, 2.0, 1.0));
        assert_eq!(v1.distance(&v2), 3.0);
    }

    #[test]
    fn test_vec3_lerp_halfway() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(2.0, -4.0, 8.0);
        assert_eq!(a.lerp(&b, 0.5), Vec3::new(1.0, -2.0, 4.0));
    }

    #[test]
    fn test_horizontal_radius_ignores_height() {
        let v = Vec3::new(3.0, 100.0, 4.0);
        assert_eq!(v.horizontal_radius(), 5.0);
    }
}
