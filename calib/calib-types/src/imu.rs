//! Inertial measurement samples.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One raw sample from an inertial measurement unit.
///
/// # Units
///
/// - Angular velocity: radians per second (rad/s)
/// - Linear acceleration: meters per second squared (m/s²)
///
/// # Example
///
/// ```
/// use calib_types::ImuMeasurement;
///
/// // Stored column order: omega_x, omega_y, omega_z, ax, ay, az
/// let sample = ImuMeasurement::from_array([0.0, 0.0, 0.1, 0.0, 0.0, 9.81]);
///
/// assert_eq!(sample.angular_velocity, [0.0, 0.0, 0.1]);
/// assert!(sample.linear_acceleration[2] > 9.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImuMeasurement {
    /// Angular velocity in rad/s: `[omega_x, omega_y, omega_z]`.
    pub angular_velocity: [f64; 3],

    /// Linear acceleration in m/s²: `[ax, ay, az]`.
    ///
    /// Includes gravity; a sensor at rest reads roughly 9.81 m/s² in
    /// magnitude.
    pub linear_acceleration: [f64; 3],
}

impl ImuMeasurement {
    /// Creates a measurement from angular velocity and linear acceleration.
    #[must_use]
    pub const fn new(angular_velocity: [f64; 3], linear_acceleration: [f64; 3]) -> Self {
        Self {
            angular_velocity,
            linear_acceleration,
        }
    }

    /// Creates a measurement from the stored six-column layout.
    #[must_use]
    pub const fn from_array(values: [f64; 6]) -> Self {
        let [wx, wy, wz, ax, ay, az] = values;
        Self {
            angular_velocity: [wx, wy, wz],
            linear_acceleration: [ax, ay, az],
        }
    }

    /// Returns the measurement in the stored six-column layout.
    #[must_use]
    pub const fn to_array(&self) -> [f64; 6] {
        let [wx, wy, wz] = self.angular_velocity;
        let [ax, ay, az] = self.linear_acceleration;
        [wx, wy, wz, ax, ay, az]
    }
}

impl From<[f64; 6]> for ImuMeasurement {
    fn from(values: [f64; 6]) -> Self {
        Self::from_array(values)
    }
}
