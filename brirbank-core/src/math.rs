//! Math types for brirbank
//!
//! Directions use the spherical convention of the HRTF grid: azimuth is measured
//! from +X towards +Y in the horizontal plane, colatitude from +Z (the vertical
//! axis). Both are in radians.

pub use glam::{Quat, Vec3};

use std::f32::consts::PI;

/// Number of discrete listener orientations in a bank (one per degree).
pub const ORIENTATION_COUNT: usize = 360;

/// Unit vector pointing towards `(azimuth, colatitude)`.
pub fn direction(azimuth: f32, colatitude: f32) -> Vec3 {
    let (sin_colat, cos_colat) = colatitude.sin_cos();
    let (sin_azi, cos_azi) = azimuth.sin_cos();
    Vec3::new(sin_colat * cos_azi, sin_colat * sin_azi, cos_colat)
}

/// Inverse of [`direction`]. Returns `(azimuth, colatitude)` with azimuth in `[0, 2π)`.
pub fn spherical(direction: Vec3) -> (f32, f32) {
    let dir = direction.normalize_or_zero();
    let colatitude = dir.z.clamp(-1.0, 1.0).acos();
    let azimuth = dir.y.atan2(dir.x).rem_euclid(2.0 * PI);
    (azimuth, colatitude)
}

/// Listener orientation, as passed to a binaural renderer.
///
/// The orientation sweep only ever varies `azimuth`; `colatitude` stays at 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub azimuth: f32,
    pub colatitude: f32,
}

impl Orientation {
    pub fn new(azimuth: f32, colatitude: f32) -> Self {
        Self {
            azimuth,
            colatitude,
        }
    }

    /// Reference forward orientation (0°).
    pub fn forward() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Azimuth-only orientation for an integer number of degrees.
    pub fn from_degrees(degrees: usize) -> Self {
        Self::new((degrees as f32).to_radians(), 0.0)
    }

    /// Rotation of the listener's head in world coordinates.
    pub fn head_rotation(&self) -> Quat {
        Quat::from_rotation_z(self.azimuth) * Quat::from_rotation_y(self.colatitude)
    }

    /// Rotation mapping world directions into the listener's frame.
    ///
    /// Turning the head by `+k` moves every source by `-k` relative to the ears.
    pub fn listener_rotation(&self) -> Quat {
        self.head_rotation().inverse()
    }

    /// Express a world direction in the listener's frame.
    pub fn to_listener_frame(&self, world_direction: Vec3) -> Vec3 {
        self.listener_rotation() * world_direction
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::forward()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_direction_axes() {
        let front = direction(0.0, FRAC_PI_2);
        assert_approx_eq!(front.x, 1.0, 1e-6);
        assert_approx_eq!(front.z, 0.0, 1e-6);

        let left = direction(FRAC_PI_2, FRAC_PI_2);
        assert_approx_eq!(left.y, 1.0, 1e-6);

        let up = direction(1.234, 0.0);
        assert_approx_eq!(up.z, 1.0, 1e-6);
    }

    #[test]
    fn test_spherical_inverts_direction() {
        let (azi, colat) = spherical(direction(2.5, 1.1));
        assert_approx_eq!(azi, 2.5, 1e-5);
        assert_approx_eq!(colat, 1.1, 1e-5);
    }

    #[test]
    fn test_listener_rotation_subtracts_azimuth() {
        let source = direction(50f32.to_radians(), FRAC_PI_2);
        let rotated = Orientation::from_degrees(20).to_listener_frame(source);
        let (azi, colat) = spherical(rotated);
        assert_approx_eq!(azi.to_degrees(), 30.0, 1e-3);
        assert_approx_eq!(colat, FRAC_PI_2, 1e-5);
    }

    #[test]
    fn test_forward_orientation_is_identity() {
        let source = direction(0.7, 0.4);
        let rotated = Orientation::forward().to_listener_frame(source);
        assert!(rotated.abs_diff_eq(source, 1e-6));
    }
}
