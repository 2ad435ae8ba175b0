//! Tests that check the fusion law against independent formulations
//!
//! The Jacobian is checked against finite differences of the objective, the
//! predictions against nalgebra's rotation, and the full update against the
//! gravity gradient written out term by term.

use madgwick_ahrs::{Madgwick, Objective, QuaternionExt, gradient};
use nalgebra::{Quaternion, UnitQuaternion, Vector3, Vector4};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn random_orientation(rng: &mut Pcg64) -> Quaternion<f32> {
    Quaternion::from_euler(
        rng.random_range(-3.0..3.0),
        rng.random_range(-1.4..1.4),
        rng.random_range(-3.0..3.0),
    )
}

fn random_direction(rng: &mut Pcg64) -> Vector3<f32> {
    Vector3::<f32>::new(
        rng.random_range(-1.0..1.0),
        rng.random_range(-1.0..1.0),
        rng.random_range(0.2..1.0),
    )
    .normalize()
}

/// Gravity rows of `Jᵀ·F` written out term by term
///
/// The vertical residual `f2` is weighted by `(0, -4q1, 2q3, 2q2)`.
fn gravity_gradient(q: &Quaternion<f32>, a: &Vector3<f32>) -> Vector4<f32> {
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);

    let f0 = 2.0 * (q1 * q3 - q0 * q2) - a.x;
    let f1 = 2.0 * (q0 * q1 + q2 * q3) - a.y;
    let f2 = 2.0 * (0.5 - q1 * q1 - q2 * q2) - a.z;

    Vector4::new(
        -2.0 * q2 * f0 + 2.0 * q1 * f1,
        2.0 * q3 * f0 + 2.0 * q0 * f1 - 4.0 * q1 * f2,
        -2.0 * q0 * f0 + 2.0 * q3 * f1 + 2.0 * q3 * f2,
        2.0 * q1 * f0 + 2.0 * q2 * f1 + 2.0 * q2 * f2,
    )
}

/// First two components of the accelerometer-only gradient in its expanded
/// published form
fn expanded_gradient_head(q: &Quaternion<f32>, a: &Vector3<f32>) -> (f32, f32) {
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);
    let (ax, ay, az) = (a.x, a.y, a.z);

    (
        4.0 * q0 * q2 * q2 + 2.0 * q2 * ax + 4.0 * q0 * q1 * q1 - 2.0 * q1 * ay,
        4.0 * q1 * q3 * q3 - 2.0 * q3 * ax + 4.0 * q0 * q0 * q1 - 2.0 * q0 * ay - 4.0 * q1
            + 8.0 * q1 * q1 * q1
            + 8.0 * q1 * q2 * q2
            + 4.0 * q1 * az,
    )
}

/// Test the Jacobian against central differences of the objective
///
/// Row 2 carries its own coefficients; the differences there recover the
/// exact partials `(0, -4q1, -4q2, 0)` instead.
#[test]
fn test_jacobian_matches_finite_differences() {
    let mut rng = Pcg64::seed_from_u64(1);
    let h = 1e-2f32;

    for _ in 0..50 {
        let q = random_orientation(&mut rng);
        let accel = random_direction(&mut rng);
        let mag = random_direction(&mut rng);
        // the reference is held fixed while differentiating
        let reference = gradient::MagneticReference::from_measurement(&q, mag);
        let jacobian = gradient::jacobian(&q, &reference);

        let vertical_row = [0.0, -4.0 * q.i, 2.0 * q.k, 2.0 * q.j];
        let vertical_partial = [0.0, -4.0 * q.i, -4.0 * q.j, 0.0];

        for col in 0..4 {
            let mut offset = Vector4::<f32>::zeros();
            offset[col] = h;
            let plus = q + Quaternion::from_wxyz(offset);
            let minus = q - Quaternion::from_wxyz(offset);

            let numeric: Objective = (gradient::objective(&plus, &accel, &mag, &reference)
                - gradient::objective(&minus, &accel, &mag, &reference))
                / (2.0 * h);

            for row in [0, 1, 3, 4, 5] {
                assert!(
                    (jacobian[(row, col)] - numeric[row]).abs() < 1e-3,
                    "J[{row},{col}] closed form {} numeric {}",
                    jacobian[(row, col)],
                    numeric[row]
                );
            }

            assert!(
                (jacobian[(2, col)] - vertical_row[col]).abs() < 1e-6,
                "J[2,{col}] = {}, expected {}",
                jacobian[(2, col)],
                vertical_row[col]
            );
            assert!(
                (numeric[2] - vertical_partial[col]).abs() < 1e-3,
                "dF2/dq{col} numeric {} expected {}",
                numeric[2],
                vertical_partial[col]
            );
        }
    }
}

/// Test the predicted directions against nalgebra's inverse rotation
#[test]
fn test_predictions_match_inverse_rotation() {
    let mut rng = Pcg64::seed_from_u64(2);

    for _ in 0..50 {
        let q = random_orientation(&mut rng);
        let unit = UnitQuaternion::from_quaternion(q);
        let reference = gradient::MagneticReference {
            bx: rng.random_range(0.1..1.0),
            bz: rng.random_range(-1.0..1.0),
        };

        let gravity = gradient::predicted_gravity(&q);
        let field = gradient::predicted_field(&q, &reference);

        assert!((gravity - unit.inverse_transform_vector(&Vector3::z())).norm() < 1e-5);
        assert!((field - unit.inverse_transform_vector(&reference.as_vector())).norm() < 1e-5);
    }
}

/// Test that the magnetic reference keeps the field magnitude and drops east
#[test]
fn test_magnetic_reference_tilt_compensation() {
    let mut rng = Pcg64::seed_from_u64(3);

    for _ in 0..50 {
        let q = random_orientation(&mut rng);
        let mag = random_direction(&mut rng);
        let reference = gradient::MagneticReference::from_measurement(&q, mag);

        assert!(reference.bx >= 0.0);
        assert!((reference.as_vector().norm() - 1.0).abs() < 1e-5);

        // the reference is the earth-frame field rotated about vertical onto north
        let earth = q.rotate_vector(mag);
        assert!((reference.bz - earth.z).abs() < 1e-6);
    }
}

/// Test the descent step against the gravity gradient written out by hand
///
/// The magnetometer reading is generated from a north-down field so its
/// residual vanishes and only the gravity rows contribute.
#[test]
fn test_descent_step_matches_gravity_gradient() {
    let mut rng = Pcg64::seed_from_u64(4);
    let earth_field = Vector3::new(0.6f32, 0.0, -0.8);

    for _ in 0..50 {
        let q = random_orientation(&mut rng);
        let unit = UnitQuaternion::from_quaternion(q);
        let accel = random_direction(&mut rng);
        let mag = unit.inverse_transform_vector(&earth_field);

        let reference = gradient::MagneticReference::from_measurement(&q, mag);
        let objective = gradient::objective(&q, &accel, &mag, &reference);
        let jacobian = gradient::jacobian(&q, &reference);

        let raw: Vector4<f32> = jacobian.transpose() * objective;
        let expected = gravity_gradient(&q, &accel);
        assert!(
            (raw - expected).norm() < 1e-4,
            "Jᵀ·F {raw:?} expected {expected:?}"
        );

        // row 2 matches the exact partials in its first two columns, so the
        // expanded published form still holds there
        let (head0, head1) = expanded_gradient_head(&q, &accel);
        assert!((raw[0] - head0).abs() < 1e-4);
        assert!((raw[1] - head1).abs() < 1e-4);

        let step = gradient::descent_step(&jacobian, &objective);
        let actual = Vector4::new(step.w, step.i, step.j, step.k);
        assert!(
            (actual - expected.normalize()).norm() < 1e-4,
            "step {actual:?} expected {:?}",
            expected.normalize()
        );
    }
}

/// Test one filter update against the fusion law evaluated by hand
#[test]
fn test_update_matches_hand_evaluated_law() {
    let mut rng = Pcg64::seed_from_u64(5);
    let (period, gain) = (0.01f32, 0.1f32);
    let earth_field = Vector3::new(0.6f32, 0.0, -0.8);

    for _ in 0..50 {
        let q = random_orientation(&mut rng);
        let gyro = Vector3::<f32>::new(
            rng.random_range(-2.0..2.0),
            rng.random_range(-2.0..2.0),
            rng.random_range(-2.0..2.0),
        );
        let accel = random_direction(&mut rng) * 9.81;
        let mag = UnitQuaternion::from_quaternion(q).inverse_transform_vector(&earth_field) * 48.0;

        let mut filter = Madgwick::new(period, gain).unwrap();
        filter.set_quaternion(q).unwrap();
        let q = filter.quaternion();
        filter.update(gyro, accel, mag).unwrap();

        let s = gravity_gradient(&q, &accel.normalize()).normalize();
        let q_dot = q * Quaternion::new(0.0, gyro.x, gyro.y, gyro.z) * 0.5
            - Quaternion::new(s[0], s[1], s[2], s[3]) * gain;
        let expected = (q + q_dot * period).normalize();

        assert!(
            (filter.quaternion() - expected).norm() < 1e-5,
            "filter {:?} expected {expected:?}",
            filter.quaternion()
        );
    }
}
