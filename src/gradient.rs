//! Gradient-descent correction step of the fusion law
//!
//! The objective stacks the residual between the gravity direction predicted
//! by the orientation `q` and the measured accelerometer direction, followed
//! by the residual between the magnetic field predicted from `q` and the earth
//! reference `B` and the measured magnetometer direction. Both predictions are
//! rows of the rotation matrix of `q` applied to `(0, 0, 1)` and to
//! `B = (bx, 0, bz)` respectively, so the objective is quadratic in `q`.
//!
//! The Jacobian is linear in `q`. Rows 0, 1 and 3 to 5 are the exact partial
//! derivatives of the objective. Row 2 is `(0, -4q1, 2q3, 2q2)` rather than
//! the exact `(0, -4q1, -4q2, 0)`; the two agree whenever `q2 = q3 = 0`, so
//! the correction only differs once the estimate carries pitch or yaw.
//!
//! All functions here are pure; the filter owns the only persistent state.

use nalgebra::{ComplexField, Quaternion, Vector3};

use crate::math::{Jacobian, Objective, QuaternionExt};

/// Tilt-compensated earth magnetic reference `B = (bx, 0, bz)`
///
/// Rebuilt every tick from the measured field rotated into the earth frame.
/// The east-west component is discarded, which assumes zero declination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticReference {
    /// Horizontal magnitude `sqrt(Hx² + Hy²)`
    pub bx: f32,
    /// Vertical component `Hz`
    pub bz: f32,
}

impl MagneticReference {
    /// Build the reference from a unit magnetometer reading and the current orientation.
    pub fn from_measurement(orientation: &Quaternion<f32>, magnetometer: Vector3<f32>) -> Self {
        let earth_field = orientation.rotate_vector(magnetometer);
        Self::from_earth_field(earth_field)
    }

    /// Collapse an earth-frame field `H` onto the north-down plane.
    pub fn from_earth_field(earth_field: Vector3<f32>) -> Self {
        let horizontal =
            ComplexField::sqrt(earth_field.x * earth_field.x + earth_field.y * earth_field.y);
        Self {
            bx: horizontal,
            bz: earth_field.z,
        }
    }

    /// Reference as an earth-frame vector
    pub fn as_vector(&self) -> Vector3<f32> {
        Vector3::new(self.bx, 0.0, self.bz)
    }
}

/// Gravity direction predicted by `q`, expressed in the body frame.
pub fn predicted_gravity(q: &Quaternion<f32>) -> Vector3<f32> {
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);

    Vector3::new(
        2.0 * (q1 * q3 - q0 * q2),
        2.0 * (q0 * q1 + q2 * q3),
        2.0 * (0.5 - q1 * q1 - q2 * q2),
    )
}

/// Magnetic field direction predicted by `q` and `reference`, in the body frame.
pub fn predicted_field(q: &Quaternion<f32>, reference: &MagneticReference) -> Vector3<f32> {
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);
    let (bx, bz) = (reference.bx, reference.bz);

    Vector3::new(
        2.0 * bx * (0.5 - q2 * q2 - q3 * q3) + 2.0 * bz * (q1 * q3 - q0 * q2),
        2.0 * bx * (q1 * q2 - q0 * q3) + 2.0 * bz * (q0 * q1 + q2 * q3),
        2.0 * bx * (q0 * q2 + q1 * q3) + 2.0 * bz * (0.5 - q1 * q1 - q2 * q2),
    )
}

/// Objective `F`: predicted minus measured, gravity rows first.
///
/// `accelerometer` and `magnetometer` must already be unit vectors.
pub fn objective(
    q: &Quaternion<f32>,
    accelerometer: &Vector3<f32>,
    magnetometer: &Vector3<f32>,
    reference: &MagneticReference,
) -> Objective {
    let gravity = predicted_gravity(q) - accelerometer;
    let field = predicted_field(q, reference) - magnetometer;

    Objective::new(gravity.x, gravity.y, gravity.z, field.x, field.y, field.z)
}

/// Closed-form 6x4 Jacobian of the fusion law with respect to `(q0, q1, q2, q3)`.
///
/// Every row except row 2 is `∂F/∂q`. Row 2 (the vertical gravity residual)
/// is fixed at `(0, -4q1, 2q3, 2q2)`, not its exact partial derivative
/// `(0, -4q1, -4q2, 0)`. Independent of the measurements, which only enter
/// `F` as constant offsets.
pub fn jacobian(q: &Quaternion<f32>, reference: &MagneticReference) -> Jacobian {
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);
    let (bx, bz) = (reference.bx, reference.bz);

    #[rustfmt::skip]
    let jacobian = Jacobian::from_row_slice(&[
        -2.0 * q2,                        2.0 * q3,                          -2.0 * q0,                         2.0 * q1,
         2.0 * q1,                        2.0 * q0,                           2.0 * q3,                         2.0 * q2,
         0.0,                            -4.0 * q1,                           2.0 * q3,                         2.0 * q2,
        -2.0 * bz * q2,                   2.0 * bz * q3,                     -4.0 * bx * q2 - 2.0 * bz * q0,   -4.0 * bx * q3 + 2.0 * bz * q1,
        -2.0 * bx * q3 + 2.0 * bz * q1,   2.0 * bx * q2 + 2.0 * bz * q0,      2.0 * bx * q1 + 2.0 * bz * q3,   -2.0 * bx * q0 + 2.0 * bz * q2,
         2.0 * bx * q2,                   2.0 * bx * q3 - 4.0 * bz * q1,      2.0 * bx * q0 - 4.0 * bz * q2,    2.0 * bx * q1,
    ]);

    jacobian
}

/// Normalised steepest-descent direction `Jᵀ·F / ‖Jᵀ·F‖` as a `(w, x, y, z)` quaternion.
///
/// Returns the zero quaternion when `Jᵀ·F` vanishes, so a stationary point
/// contributes no correction instead of a NaN.
pub fn descent_step(jacobian: &Jacobian, objective: &Objective) -> Quaternion<f32> {
    let gradient = jacobian.transpose() * objective;
    Quaternion::from_wxyz(gradient).normalized_or_zero()
}
