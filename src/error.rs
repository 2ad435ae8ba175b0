//! Error types for filter configuration and updates

/// Rejected filter settings
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SettingsError {
    /// Sample period must be finite and strictly positive
    #[error("sample period must be finite and positive, got {0}")]
    InvalidSamplePeriod(f32),
    /// Gain must be finite and non-negative
    #[error("gain must be finite and non-negative, got {0}")]
    InvalidGain(f32),
}

/// Reason a call to [`Madgwick::update`](crate::Madgwick::update) left the
/// orientation untouched
///
/// A skipped tick performs no correction and no gyroscope integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UpdateError {
    /// Accelerometer reading is zero or has a non-finite component
    #[error("accelerometer reading has no direction")]
    DegenerateAccelerometer,
    /// Magnetometer reading is zero or has a non-finite component
    #[error("magnetometer reading has no direction")]
    DegenerateMagnetometer,
    /// Gyroscope sample contains NaN or infinity
    #[error("gyroscope sample contains a non-finite component")]
    NonFiniteSample,
    /// Integration produced a quaternion that cannot be normalised
    #[error("integrated orientation cannot be normalised")]
    DegenerateOrientation,
}

impl UpdateError {
    /// Return variant name as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateError::DegenerateAccelerometer => "DegenerateAccelerometer",
            UpdateError::DegenerateMagnetometer => "DegenerateMagnetometer",
            UpdateError::NonFiniteSample => "NonFiniteSample",
            UpdateError::DegenerateOrientation => "DegenerateOrientation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_names_variant() {
        assert_eq!(UpdateError::DegenerateAccelerometer.as_str(), "DegenerateAccelerometer");
        assert_eq!(UpdateError::DegenerateMagnetometer.as_str(), "DegenerateMagnetometer");
        assert_eq!(UpdateError::NonFiniteSample.as_str(), "NonFiniteSample");
        assert_eq!(UpdateError::DegenerateOrientation.as_str(), "DegenerateOrientation");
    }
}
