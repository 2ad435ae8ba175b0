//! Configuration and diagnostic types for the Madgwick filter

use crate::error::SettingsError;

/// Filter settings
///
/// Both values are fixed for the lifetime of a tuning; the sample period is
/// used as the integration step and is never measured.
///
/// # Example
/// ```
/// use madgwick_ahrs::{Madgwick, MadgwickSettings};
///
/// let settings = MadgwickSettings {
///     sample_period: 0.005, // 200 Hz control loop
///     gain: 0.05,           // smoother, slower correction
/// };
/// let filter = Madgwick::with_settings(settings).unwrap();
/// assert_eq!(filter.settings().gain, 0.05);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MadgwickSettings {
    /// Expected seconds between consecutive updates
    pub sample_period: f32,
    /// Correction gain (beta)
    ///
    /// Zero integrates the gyroscope only and drifts forever. Larger values
    /// pull faster toward the accelerometer/magnetometer orientation at the
    /// cost of noise sensitivity.
    pub gain: f32,
}

impl MadgwickSettings {
    /// Check that the period is positive and the gain non-negative, both finite
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.sample_period.is_finite() && self.sample_period > 0.0) {
            return Err(SettingsError::InvalidSamplePeriod(self.sample_period));
        }
        if !(self.gain.is_finite() && self.gain >= 0.0) {
            return Err(SettingsError::InvalidGain(self.gain));
        }
        Ok(())
    }
}

impl Default for MadgwickSettings {
    fn default() -> Self {
        Self {
            sample_period: 0.01,
            gain: 0.1,
        }
    }
}

/// Filter internal states
///
/// Residual magnitudes come from the objective vector of the last update
/// that ran the correction step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MadgwickStates {
    /// Norm of the gravity half of the objective (unit-vector distance)
    pub acceleration_error: f32,
    /// Norm of the magnetic half of the objective (unit-vector distance)
    pub magnetic_error: f32,
    /// Updates skipped since construction or the last reset
    pub skipped_updates: u32,
}
