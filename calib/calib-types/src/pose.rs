//! Six-parameter rigid transforms and frame convention conversion.
//!
//! Poses are stored as `[rx, ry, rz, x, y, z]`: an axis-angle rotation
//! vector (direction is the axis, norm is the angle in radians) followed by
//! a translation in meters.

use nalgebra::{Matrix4, Point3, Rotation3, Unit, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rotation angles below this are treated as the identity rotation.
const ROTATION_EPSILON: f64 = 1e-12;

/// A rigid transform "A-from-B" as axis-angle rotation plus translation.
///
/// # Example
///
/// ```
/// use calib_types::Pose6;
///
/// let pose = Pose6::from_array([0.1, -0.2, 0.3, 1.0, 2.0, 3.0]);
/// let round_trip = pose.inverse().inverse();
///
/// for (a, b) in pose.to_array().iter().zip(round_trip.to_array()) {
///     assert!((a - b).abs() < 1e-12);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose6 {
    /// Axis-angle rotation vector in radians: `[rx, ry, rz]`.
    pub rotation: Vector3<f64>,
    /// Translation in meters: `[x, y, z]`.
    pub translation: Vector3<f64>,
}

impl Pose6 {
    /// Creates a pose from a rotation vector and a translation.
    #[must_use]
    pub const fn new(rotation: Vector3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Creates the identity pose.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: Vector3::zeros(),
            translation: Vector3::zeros(),
        }
    }

    /// Creates a pose from the stored `[rx, ry, rz, x, y, z]` layout.
    #[must_use]
    pub fn from_array(values: [f64; 6]) -> Self {
        let [rx, ry, rz, x, y, z] = values;
        Self {
            rotation: Vector3::new(rx, ry, rz),
            translation: Vector3::new(x, y, z),
        }
    }

    /// Returns the pose in the stored `[rx, ry, rz, x, y, z]` layout.
    #[must_use]
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
            self.translation.x,
            self.translation.y,
            self.translation.z,
        ]
    }

    /// Rotation angle in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.rotation.norm()
    }

    /// Returns the rotation as a 3x3 rotation matrix.
    ///
    /// A near-zero rotation vector maps to the identity instead of being
    /// normalized.
    #[must_use]
    pub fn rotation_matrix(&self) -> Rotation3<f64> {
        let angle = self.angle();
        if angle < ROTATION_EPSILON {
            return Rotation3::identity();
        }
        Rotation3::from_axis_angle(&Unit::new_unchecked(self.rotation / angle), angle)
    }

    /// Builds the 4x4 homogeneous matrix `[R t; 0 1]`.
    #[must_use]
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        let mut matrix = Matrix4::identity();
        matrix
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(self.rotation_matrix().matrix());
        matrix
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&self.translation);
        matrix
    }

    /// Extracts a pose from a 4x4 homogeneous matrix.
    ///
    /// The upper-left block must be a rotation. The rotation vector is
    /// recovered through a unit quaternion, which stays well conditioned for
    /// angles near zero and near pi.
    #[must_use]
    pub fn from_homogeneous(matrix: &Matrix4<f64>) -> Self {
        let rotation =
            Rotation3::from_matrix_unchecked(matrix.fixed_view::<3, 3>(0, 0).into_owned());
        Self {
            rotation: UnitQuaternion::from_rotation_matrix(&rotation).scaled_axis(),
            translation: matrix.fixed_view::<3, 1>(0, 3).into_owned(),
        }
    }

    /// Returns the inverse transform ("B-from-A" for an "A-from-B" pose).
    ///
    /// The homogeneous inverse is formed algebraically: the rotation block is
    /// transposed and the translation becomes `-R^T t`.
    ///
    /// The returned rotation vector is canonical, with an angle in `[0, pi]`.
    /// Inverting twice therefore reproduces the input vector only when its
    /// angle is below pi; a larger angle comes back as the equivalent
    /// shorter rotation about the opposite axis. The transform itself is
    /// always preserved.
    ///
    /// # Example
    ///
    /// ```
    /// use calib_types::Pose6;
    /// use nalgebra::Point3;
    ///
    /// let pose = Pose6::from_array([0.0, 0.0, 4.0, 1.0, 2.0, 3.0]);
    /// let round_trip = pose.inverse().inverse();
    ///
    /// assert!(round_trip.angle() <= std::f64::consts::PI);
    /// let point = Point3::new(0.5, -1.0, 2.0);
    /// let moved = pose.transform_point(&point);
    /// assert!((round_trip.transform_point(&point) - moved).norm() < 1e-12);
    /// ```
    #[must_use]
    pub fn inverse(&self) -> Self {
        let matrix = self.to_homogeneous();
        let rotation_t = matrix.fixed_view::<3, 3>(0, 0).transpose();
        let translation = -(&rotation_t * matrix.fixed_view::<3, 1>(0, 3));

        let mut inverse = Matrix4::identity();
        inverse.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation_t);
        inverse.fixed_view_mut::<3, 1>(0, 3).copy_from(&translation);

        Self::from_homogeneous(&inverse)
    }

    /// Maps a point from frame B into frame A.
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.rotation_matrix() * point + self.translation
    }
}

impl Default for Pose6 {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[f64; 6]> for Pose6 {
    fn from(values: [f64; 6]) -> Self {
        Self::from_array(values)
    }
}

/// Frame convention applied to camera poses when they are loaded.
///
/// Calibration stores camera poses as sensor-from-world: the transform that
/// takes target points from the world frame into the camera optical frame.
/// World-referenced displays need world-from-sensor instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PoseConvention {
    /// Keep poses as stored (sensor-from-world).
    AsStored,
    /// Invert stored poses to world-from-sensor.
    #[default]
    WorldFromSensor,
}

impl PoseConvention {
    /// Converts a stored sensor-from-world pose into this convention.
    #[must_use]
    pub fn apply(self, stored: Pose6) -> Pose6 {
        match self {
            Self::AsStored => stored,
            Self::WorldFromSensor => stored.inverse(),
        }
    }
}
