//! Gradient-descent AHRS filter

use log::{debug, trace, warn};
use nalgebra::{Quaternion, Vector3};

use crate::error::{SettingsError, UpdateError};
use crate::gradient::{self, MagneticReference};
use crate::math::{Objective, QuaternionExt, Vector3Ext};
use crate::types::{MadgwickSettings, MadgwickStates};

/// Madgwick orientation filter
///
/// Fuses gyroscope, accelerometer and magnetometer samples into a unit
/// orientation quaternion. Each update integrates the gyroscope rate and
/// subtracts one normalised gradient-descent step, scaled by the gain, toward
/// the orientation implied by the gravity and magnetic field directions.
///
/// The orientation is the only state carried between updates. Updates must be
/// strictly sequential; `&mut self` makes the borrow checker enforce it.
#[derive(Debug, Clone)]
pub struct Madgwick {
    /// Algorithm settings
    settings: MadgwickSettings,
    /// Current orientation quaternion (WXYZ), always unit norm
    quaternion: Quaternion<f32>,
    /// Objective vector from the last completed correction
    objective: Objective,
    /// Skipped update counter
    skipped_updates: u32,
}

impl Madgwick {
    /// Create a filter with the given sample period (seconds) and gain
    ///
    /// # Example
    /// ```
    /// use madgwick_ahrs::Madgwick;
    ///
    /// let filter = Madgwick::new(0.01, 0.1).unwrap();
    /// assert_eq!(filter.roll(), 0.0);
    ///
    /// assert!(Madgwick::new(0.0, 0.1).is_err());
    /// ```
    pub fn new(sample_period: f32, gain: f32) -> Result<Self, SettingsError> {
        Self::with_settings(MadgwickSettings {
            sample_period,
            gain,
        })
    }

    /// Create a filter with the specified settings
    pub fn with_settings(settings: MadgwickSettings) -> Result<Self, SettingsError> {
        settings.validate()?;

        Ok(Madgwick {
            settings,
            quaternion: Quaternion::identity(),
            objective: Objective::zeros(),
            skipped_updates: 0,
        })
    }

    /// Return to the identity orientation and clear diagnostics
    pub fn reset(&mut self) {
        self.quaternion = Quaternion::identity();
        self.objective = Objective::zeros();
        self.skipped_updates = 0;
    }

    /// Replace the settings, keeping the current orientation
    pub fn set_settings(&mut self, settings: MadgwickSettings) -> Result<(), SettingsError> {
        if let Err(error) = settings.validate() {
            warn!("rejected filter settings: {error}");
            return Err(error);
        }
        self.settings = settings;
        Ok(())
    }

    /// Get current filter settings
    pub fn settings(&self) -> MadgwickSettings {
        self.settings
    }

    /// Advance the orientation by one tick
    ///
    /// # Arguments
    /// * `gyroscope` - Angular rate in radians per second, body frame
    /// * `accelerometer` - Specific force in any unit (only direction is used)
    /// * `magnetometer` - Magnetic field in any unit (only direction is used)
    ///
    /// # Errors
    /// Returns an [`UpdateError`] when the tick was skipped. A skipped tick
    /// leaves the orientation bit-identical, including the gyroscope
    /// integration, so a sensor dropout freezes the attitude for that tick.
    ///
    /// # Example
    /// ```
    /// use madgwick_ahrs::{Madgwick, UpdateError};
    /// use nalgebra::Vector3;
    ///
    /// let mut filter = Madgwick::default();
    /// let gyro = Vector3::new(0.0, 0.0, 0.1);
    /// let mag = Vector3::new(0.6, 0.0, -0.8);
    ///
    /// filter.update(gyro, Vector3::new(0.0, 0.0, 1.0), mag).unwrap();
    ///
    /// let before = filter.quaternion();
    /// assert_eq!(
    ///     filter.update(gyro, Vector3::zeros(), mag),
    ///     Err(UpdateError::DegenerateAccelerometer)
    /// );
    /// assert_eq!(filter.quaternion(), before);
    /// ```
    pub fn update(
        &mut self,
        gyroscope: Vector3<f32>,
        accelerometer: Vector3<f32>,
        magnetometer: Vector3<f32>,
    ) -> Result<(), UpdateError> {
        match self.step(gyroscope, accelerometer, magnetometer) {
            Ok(()) => Ok(()),
            Err(error) => {
                self.skipped_updates = self.skipped_updates.saturating_add(1);
                debug!("update skipped ({}): {error}", error.as_str());
                Err(error)
            }
        }
    }

    /// Get current orientation quaternion
    pub fn quaternion(&self) -> Quaternion<f32> {
        self.quaternion
    }

    /// Set the orientation directly; the quaternion is re-normalised
    pub fn set_quaternion(&mut self, quaternion: Quaternion<f32>) -> Result<(), UpdateError> {
        self.quaternion = quaternion
            .try_normalized()
            .ok_or(UpdateError::DegenerateOrientation)?;
        Ok(())
    }

    /// Roll in radians
    pub fn roll(&self) -> f32 {
        self.quaternion.roll()
    }

    /// Pitch in radians
    ///
    /// Near ±90° roll and yaw become coupled and individually meaningless.
    pub fn pitch(&self) -> f32 {
        self.quaternion.pitch()
    }

    /// Yaw in radians
    pub fn yaw(&self) -> f32 {
        self.quaternion.yaw()
    }

    /// Rotate a body-frame vector into the earth frame
    pub fn rotate(&self, vector: Vector3<f32>) -> Vector3<f32> {
        self.quaternion.rotate_vector(vector)
    }

    /// Gravity direction predicted by the current orientation, body frame
    pub fn gravity(&self) -> Vector3<f32> {
        gradient::predicted_gravity(&self.quaternion)
    }

    /// Get internal filter states
    pub fn internal_states(&self) -> MadgwickStates {
        MadgwickStates {
            acceleration_error: self.objective.fixed_rows::<3>(0).norm(),
            magnetic_error: self.objective.fixed_rows::<3>(3).norm(),
            skipped_updates: self.skipped_updates,
        }
    }

    fn step(
        &mut self,
        gyroscope: Vector3<f32>,
        accelerometer: Vector3<f32>,
        magnetometer: Vector3<f32>,
    ) -> Result<(), UpdateError> {
        let accelerometer = accelerometer
            .try_unit()
            .ok_or(UpdateError::DegenerateAccelerometer)?;
        let magnetometer = magnetometer
            .try_unit()
            .ok_or(UpdateError::DegenerateMagnetometer)?;
        if !gyroscope.is_finite() {
            return Err(UpdateError::NonFiniteSample);
        }

        let q = self.quaternion;

        // Gradient descent corrective step
        let reference = MagneticReference::from_measurement(&q, magnetometer);
        let objective = gradient::objective(&q, &accelerometer, &magnetometer, &reference);
        let jacobian = gradient::jacobian(&q, &reference);
        let correction = gradient::descent_step(&jacobian, &objective);
        if correction.norm() == 0.0 {
            trace!("zero correction step, integrating gyroscope only");
        }

        // Integrate rate of change: 0.5 * q ⊗ ω - β * step
        let rate = q * Quaternion::from_imag(gyroscope) * 0.5;
        let derivative = rate - correction * self.settings.gain;
        let integrated = q + derivative * self.settings.sample_period;

        self.quaternion = integrated
            .try_normalized()
            .ok_or(UpdateError::DegenerateOrientation)?;
        self.objective = objective;
        Ok(())
    }
}

impl Default for Madgwick {
    fn default() -> Self {
        Madgwick {
            settings: MadgwickSettings::default(),
            quaternion: Quaternion::identity(),
            objective: Objective::zeros(),
            skipped_updates: 0,
        }
    }
}
