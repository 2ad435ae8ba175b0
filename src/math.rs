//! Algebra primitives for the gradient-descent filter
//!
//! Fixed-size vectors and matrices are plain `nalgebra` aliases so every
//! scratch value of an update lives on the stack. Quaternion helpers are
//! provided as an extension trait on [`nalgebra::Quaternion`], which already
//! supplies the Hamilton product, component-wise addition, scalar
//! multiplication, `conjugate()` and `norm()`.

use nalgebra::{ComplexField, Quaternion, RealField, SMatrix, SVector, Vector3, Vector4};

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Fixed-length real vector, length known at compile time.
pub type Vect<const N: usize> = SVector<f32, N>;

/// Dense `R x C` real matrix indexed `(row, col)`.
pub type Matrix<const R: usize, const C: usize> = SMatrix<f32, R, C>;

/// Objective vector: three gravity residuals followed by three magnetic residuals.
pub type Objective = Vect<6>;

/// Jacobian of the [`Objective`] with respect to `(w, x, y, z)`.
pub type Jacobian = Matrix<6, 4>;

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// True when every component is finite
    fn is_finite(&self) -> bool;

    /// Unit vector in the same direction, or `None` for a zero or non-finite vector
    ///
    /// Any finite non-zero vector has a direction, however small or large its
    /// components.
    fn try_unit(&self) -> Option<Vector3<f32>>;
}

impl Vector3Ext for Vector3<f32> {
    fn is_finite(&self) -> bool {
        self.iter().all(|c| c.is_finite())
    }

    fn try_unit(&self) -> Option<Vector3<f32>> {
        if !Vector3Ext::is_finite(self) {
            return None;
        }
        // scale first so squaring can neither underflow nor overflow
        let largest = self.amax();
        if largest == 0.0 {
            return None;
        }
        let scaled = *self / largest;
        Some(scaled / scaled.norm())
    }
}

/// Extension trait for raw (not necessarily unit) quaternions
pub trait QuaternionExt: Sized {
    /// Reinterpret a 4-vector ordered `(w, x, y, z)` as a quaternion
    fn from_wxyz(components: Vector4<f32>) -> Self;

    /// Build a unit quaternion from aerospace Z-Y-X Euler angles in radians
    fn from_euler(roll: f32, pitch: f32, yaw: f32) -> Self;

    /// Vector part `(x, y, z)`
    fn vector_part(&self) -> Vector3<f32>;

    /// Unit quaternion, or `None` when the norm is zero or non-finite
    fn try_normalized(&self) -> Option<Self>;

    /// Unit quaternion, or the zero quaternion when normalisation is undefined
    fn normalized_or_zero(&self) -> Self;

    /// Rotate `vector` by this orientation: vector part of `q ⊗ v ⊗ q*`
    ///
    /// Only a pure rotation when `self` is unit norm.
    fn rotate_vector(&self, vector: Vector3<f32>) -> Vector3<f32>;

    /// Rotation about body X in radians
    fn roll(&self) -> f32;

    /// Rotation about body Y in radians, in `[-π/2, π/2]`
    fn pitch(&self) -> f32;

    /// Rotation about earth Z in radians
    fn yaw(&self) -> f32;

    /// `(roll, pitch, yaw)` in radians
    fn euler_angles(&self) -> (f32, f32, f32) {
        (self.roll(), self.pitch(), self.yaw())
    }

    /// `(roll, pitch, yaw)` in degrees
    fn euler_angles_degrees(&self) -> (f32, f32, f32) {
        let (roll, pitch, yaw) = self.euler_angles();
        (roll * RAD_TO_DEG, pitch * RAD_TO_DEG, yaw * RAD_TO_DEG)
    }
}

impl QuaternionExt for Quaternion<f32> {
    fn from_wxyz(components: Vector4<f32>) -> Self {
        // nalgebra stores quaternion coordinates as (i, j, k, w)
        Quaternion::new(components[0], components[1], components[2], components[3])
    }

    fn from_euler(roll: f32, pitch: f32, yaw: f32) -> Self {
        let (sr, cr) = ComplexField::sin_cos(roll * 0.5);
        let (sp, cp) = ComplexField::sin_cos(pitch * 0.5);
        let (sy, cy) = ComplexField::sin_cos(yaw * 0.5);

        Quaternion::new(
            cr * cp * cy + sr * sp * sy,
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
        )
    }

    fn vector_part(&self) -> Vector3<f32> {
        Vector3::new(self.i, self.j, self.k)
    }

    fn try_normalized(&self) -> Option<Self> {
        let norm = self.norm();
        if norm > 0.0 && norm.is_finite() {
            Some(*self / norm)
        } else {
            None
        }
    }

    fn normalized_or_zero(&self) -> Self {
        self.try_normalized()
            .unwrap_or_else(|| Quaternion::new(0.0, 0.0, 0.0, 0.0))
    }

    fn rotate_vector(&self, vector: Vector3<f32>) -> Vector3<f32> {
        (self * Quaternion::from_imag(vector) * self.conjugate()).vector_part()
    }

    fn roll(&self) -> f32 {
        let (w, x, y, z) = (self.w, self.i, self.j, self.k);
        RealField::atan2(2.0 * (w * x + y * z), 1.0 - 2.0 * (x * x + y * y))
    }

    fn pitch(&self) -> f32 {
        let (w, x, y, z) = (self.w, self.i, self.j, self.k);
        // rounding can push the argument just past ±1 near gimbal lock
        ComplexField::asin((2.0 * (w * y - z * x)).clamp(-1.0, 1.0))
    }

    fn yaw(&self) -> f32 {
        let (w, x, y, z) = (self.w, self.i, self.j, self.k);
        RealField::atan2(2.0 * (w * z + x * y), 1.0 - 2.0 * (y * y + z * z))
    }
}
