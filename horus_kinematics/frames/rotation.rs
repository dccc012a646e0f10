//! Elementary rotations and translation helpers
//!
//! Right-handed rotations about a single axis. Roll is taken about Z, pitch
//! about Y and yaw about X, and the combined rotation multiplies them in
//! that order: `rotation_matrix(r, p, y) = roll_z(r) · pitch_y(p) · yaw_x(y)`.

use super::htm::HomogeneousTM;
use nalgebra::{Matrix3, Vector3};

impl HomogeneousTM {
    /// Translation column `[x, y, z]ᵗ`
    pub fn translation_vector(x: f64, y: f64, z: f64) -> Vector3<f64> {
        Vector3::new(x, y, z)
    }

    /// Rotation about the Z axis
    #[rustfmt::skip]
    pub fn roll_z(angle: f64) -> Matrix3<f64> {
        let (s, c) = angle.sin_cos();

        Matrix3::new(
            c,   -s,   0.0,
            s,    c,   0.0,
            0.0,  0.0, 1.0,
        )
    }

    /// Rotation about the Y axis
    #[rustfmt::skip]
    pub fn pitch_y(angle: f64) -> Matrix3<f64> {
        let (s, c) = angle.sin_cos();

        Matrix3::new(
            c,   0.0, s,
            0.0, 1.0, 0.0,
            -s,  0.0, c,
        )
    }

    /// Rotation about the X axis
    #[rustfmt::skip]
    pub fn yaw_x(angle: f64) -> Matrix3<f64> {
        let (s, c) = angle.sin_cos();

        Matrix3::new(
            1.0, 0.0,  0.0,
            0.0, c,   -s,
            0.0, s,    c,
        )
    }

    /// Combined rotation `roll_z(roll) · pitch_y(pitch) · yaw_x(yaw)`
    pub fn rotation_matrix(roll: f64, pitch: f64, yaw: f64) -> Matrix3<f64> {
        Self::roll_z(roll) * Self::pitch_y(pitch) * Self::yaw_x(yaw)
    }
}
