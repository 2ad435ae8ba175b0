//! Attitude query trait
//!
//! The boundary consumed by the attitude controller: it reads the orientation
//! once per tick after the filter update and never writes it.

use nalgebra::{Quaternion, Vector3};

use crate::madgwick::Madgwick;
use crate::math::QuaternionExt;

/// Read-only access to an orientation estimate
///
/// Euler angles follow the aerospace Z-Y-X sequence, in radians.
pub trait Attitude {
    /// Current unit orientation quaternion
    fn quaternion(&self) -> Quaternion<f32>;

    /// Roll in radians
    fn roll(&self) -> f32 {
        self.quaternion().roll()
    }

    /// Pitch in radians
    fn pitch(&self) -> f32 {
        self.quaternion().pitch()
    }

    /// Yaw in radians
    fn yaw(&self) -> f32 {
        self.quaternion().yaw()
    }

    /// `(roll, pitch, yaw)` in radians
    fn euler_angles(&self) -> (f32, f32, f32) {
        self.quaternion().euler_angles()
    }

    /// Rotate a body-frame vector into the earth frame
    fn rotate(&self, vector: Vector3<f32>) -> Vector3<f32> {
        self.quaternion().rotate_vector(vector)
    }
}

impl Attitude for Madgwick {
    fn quaternion(&self) -> Quaternion<f32> {
        Madgwick::quaternion(self)
    }
}
