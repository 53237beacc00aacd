//! Table records as handed over by the query layer.
//!
//! Every table is keyed by `(timestamp, sensor_name)`; pose and reprojection
//! error tables add a free-form `step_name` naming the pipeline stage that
//! produced the row.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::matrix::MatrixPayload;
use crate::target::ExtractedTargetPayload;
use crate::time::Timestamp;

/// Kind of sensor, which decides the base table defining its frames.
///
/// # Example
///
/// ```
/// use calib_types::SensorKind;
///
/// assert_eq!(SensorKind::Camera.base_table(), "images");
/// assert_eq!(SensorKind::Imu.to_string(), "imu");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SensorKind {
    /// Camera-like sensor; frames come from the image table.
    Camera,
    /// Inertial sensor; frames come from the raw IMU table.
    Imu,
}

impl SensorKind {
    /// Returns the short name of the sensor kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Imu => "imu",
        }
    }

    /// Name of the table whose rows define the frames of this kind.
    #[must_use]
    pub const fn base_table(self) -> &'static str {
        match self {
            Self::Camera => "images",
            Self::Imu => "imu_data",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access to the `(sensor, timestamp)` key every record carries.
pub trait FrameKey {
    /// Name of the sensor the row belongs to.
    fn sensor_name(&self) -> &str;

    /// Timestamp of the row.
    fn timestamp(&self) -> Timestamp;
}

/// Row of the `images` table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageRecord {
    /// Capture time.
    pub timestamp: Timestamp,
    /// Camera name.
    pub sensor_name: String,
    /// Encoded image bytes; recordings stored without pixels leave this empty.
    #[cfg_attr(feature = "serde", serde(default))]
    pub data: Option<Vec<u8>>,
}

/// Row of the `extracted_targets` table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtractedTargetRecord {
    /// Capture time of the image the target was found in.
    pub timestamp: Timestamp,
    /// Camera name.
    pub sensor_name: String,
    /// Stored target arrays.
    pub target: ExtractedTargetPayload,
}

/// Row of the `camera_poses` table.
///
/// Poses are stored sensor-from-world.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoseRecord {
    /// Frame time.
    pub timestamp: Timestamp,
    /// Camera name.
    pub sensor_name: String,
    /// Pipeline stage that produced the pose (e.g. `initial`, `optimized`).
    pub step_name: String,
    /// `[rx, ry, rz, x, y, z]`.
    pub pose: [f64; 6],
}

/// Row of the `reprojection_errors` table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReprojectionErrorRecord {
    /// Frame time.
    pub timestamp: Timestamp,
    /// Camera name.
    pub sensor_name: String,
    /// Pipeline stage whose pose produced the residuals.
    pub step_name: String,
    /// Per-point 2D residuals (2 columns), row-aligned with the target points.
    pub error: MatrixPayload<f64>,
}

/// Row of the `imu_data` table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImuRecord {
    /// Sample time.
    pub timestamp: Timestamp,
    /// IMU name.
    pub sensor_name: String,
    /// `[omega_x, omega_y, omega_z, ax, ay, az]`.
    pub measurement: [f64; 6],
}

/// Row of the `external_poses` table (e.g. motion-capture ground truth).
///
/// External poses are sampled on their own clock and are not attributes of
/// any frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExternalPoseRecord {
    /// Sample time.
    pub timestamp: Timestamp,
    /// Tracked body name.
    pub sensor_name: String,
    /// `[rx, ry, rz, x, y, z]`.
    pub pose: [f64; 6],
}

impl FrameKey for ImageRecord {
    fn sensor_name(&self) -> &str {
        &self.sensor_name
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl FrameKey for ExtractedTargetRecord {
    fn sensor_name(&self) -> &str {
        &self.sensor_name
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl FrameKey for PoseRecord {
    fn sensor_name(&self) -> &str {
        &self.sensor_name
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl FrameKey for ReprojectionErrorRecord {
    fn sensor_name(&self) -> &str {
        &self.sensor_name
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl FrameKey for ImuRecord {
    fn sensor_name(&self) -> &str {
        &self.sensor_name
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl FrameKey for ExternalPoseRecord {
    fn sensor_name(&self) -> &str {
        &self.sensor_name
    }

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(record: &impl FrameKey) -> (String, u64) {
        (record.sensor_name().to_string(), record.timestamp().as_nanos())
    }

    #[test]
    fn sensor_kind_names() {
        assert_eq!(SensorKind::Camera.as_str(), "camera");
        assert_eq!(SensorKind::Imu.base_table(), "imu_data");
    }

    #[test]
    fn records_expose_keys() {
        let image = ImageRecord {
            timestamp: Timestamp::from_nanos(100),
            sensor_name: "/cam0".to_string(),
            data: None,
        };
        let pose = PoseRecord {
            timestamp: Timestamp::from_nanos(200),
            sensor_name: "/cam1".to_string(),
            step_name: "initial".to_string(),
            pose: [0.0; 6],
        };

        assert_eq!(key_of(&image), ("/cam0".to_string(), 100));
        assert_eq!(key_of(&pose), ("/cam1".to_string(), 200));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn image_record_without_data_deserializes() {
        let json = r#"{"timestamp": 1520528314314184960, "sensor_name": "/cam0/image_raw"}"#;
        let record: ImageRecord = serde_json::from_str(json).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(record.timestamp.as_nanos(), 1_520_528_314_314_184_960);
        assert!(record.data.is_none());
    }
}
