#![no_std]

//! Madgwick AHRS - gradient-descent attitude and heading reference filter
//!
//! Fuses gyroscope, accelerometer and magnetometer samples into a unit
//! orientation quaternion for the attitude loop of a small multi-rotor. Each
//! tick integrates the gyroscope rate and subtracts one normalised
//! gradient-descent step toward the orientation implied by gravity and the
//! tilt-compensated magnetic field.
//!
//! # Features
//!
//! - Closed-form 6x4 Jacobian, stack-allocated `nalgebra` fixed-size algebra
//! - Magnetic reference rebuilt every tick (no persisted reference, no bias state)
//! - Degenerate or non-finite samples skip the tick instead of poisoning the state
//! - `#![no_std]`, `log` facade for diagnostics
//! - Optional `serde` feature for [`MadgwickSettings`]
//!
//! # Quick Start
//!
//! ```rust
//! use madgwick_ahrs::Madgwick;
//! use nalgebra::Vector3;
//!
//! let mut filter = Madgwick::new(0.01, 0.1).unwrap(); // 100 Hz, beta = 0.1
//!
//! // Sensor readings
//! let gyroscope = Vector3::new(0.01, -0.02, 0.0);     // rad/s
//! let accelerometer = Vector3::new(0.0, 0.0, 1.0);    // g (direction only)
//! let magnetometer = Vector3::new(22.0, 0.0, -41.0);  // uT (direction only)
//!
//! // Update once per control tick
//! filter.update(gyroscope, accelerometer, magnetometer).unwrap();
//!
//! // Read the orientation back
//! let (roll, pitch, yaw) = (filter.roll(), filter.pitch(), filter.yaw());
//! let up = filter.rotate(Vector3::new(0.0, 0.0, 1.0));
//! ```

mod attitude;
mod error;
pub mod gradient;
mod madgwick;
pub mod math;
mod types;

pub use attitude::Attitude;
pub use error::{SettingsError, UpdateError};
pub use madgwick::Madgwick;
pub use math::{DEG_TO_RAD, Jacobian, Objective, QuaternionExt, RAD_TO_DEG, Vector3Ext};
pub use types::{MadgwickSettings, MadgwickStates};
