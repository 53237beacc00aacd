//! Nested `sensor -> timestamp -> frame` index.

use std::collections::BTreeMap;

use calib_types::{DMatrix, ExtractedTarget, FrameKey, ImuMeasurement, Pose6, Timestamp};
use hashbrown::HashMap;
use serde::Serialize;
use tracing::warn;

use crate::error::{LoadError, Result, Table};

/// Frames of one sensor, keyed by timestamp.
pub type SensorFrames<F> = HashMap<Timestamp, F>;

/// Frames of every sensor of one kind.
///
/// Frames are created only from base table rows. Dependent tables attach
/// attributes to existing frames through [`attach`](Self::attach), which
/// refuses records whose `(sensor, timestamp)` key is unknown.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrameIndex<F> {
    sensors: HashMap<String, SensorFrames<F>>,
}

impl<F> Default for FrameIndex<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> FrameIndex<F> {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sensors: HashMap::new(),
        }
    }

    /// Number of sensors.
    #[must_use]
    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Number of frames over all sensors.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.sensors.values().map(HashMap::len).sum()
    }

    /// Returns true if no sensor has frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Sensor names in ascending order.
    #[must_use]
    pub fn sensor_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.sensors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Frames of one sensor.
    #[must_use]
    pub fn frames(&self, sensor: &str) -> Option<&SensorFrames<F>> {
        self.sensors.get(sensor)
    }

    /// One frame.
    #[must_use]
    pub fn frame(&self, sensor: &str, timestamp: Timestamp) -> Option<&F> {
        self.sensors.get(sensor)?.get(&timestamp)
    }

    /// Returns true if the frame exists.
    #[must_use]
    pub fn contains(&self, sensor: &str, timestamp: Timestamp) -> bool {
        self.frame(sensor, timestamp).is_some()
    }

    /// Iterates over sensors and their frames in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SensorFrames<F>)> {
        self.sensors
            .iter()
            .map(|(name, frames)| (name.as_str(), frames))
    }

    /// Returns the frame for a base table row, creating it if needed.
    ///
    /// Rows repeating an existing key return the existing frame.
    pub fn upsert(&mut self, record: &impl FrameKey) -> &mut F
    where
        F: Default,
    {
        self.sensors
            .entry(record.sensor_name().to_owned())
            .or_default()
            .entry(record.timestamp())
            .or_default()
    }

    /// Returns the existing frame a dependent record belongs to.
    ///
    /// # Errors
    ///
    /// - [`LoadError::UnknownSensor`] if the base table never named the sensor
    /// - [`LoadError::UnknownFrame`] if the sensor has no frame at the timestamp
    pub fn attach(&mut self, table: Table, record: &impl FrameKey) -> Result<&mut F> {
        let Some(frames) = self.sensors.get_mut(record.sensor_name()) else {
            warn!(
                table = table.as_str(),
                sensor = record.sensor_name(),
                timestamp = record.timestamp().as_nanos(),
                "Record references unknown sensor"
            );
            return Err(LoadError::unknown_sensor(table, record));
        };

        match frames.get_mut(&record.timestamp()) {
            Some(frame) => Ok(frame),
            None => {
                warn!(
                    table = table.as_str(),
                    sensor = record.sensor_name(),
                    timestamp = record.timestamp().as_nanos(),
                    "Record references unknown frame"
                );
                Err(LoadError::unknown_frame(table, record))
            }
        }
    }
}

/// Attributes of one camera frame.
///
/// The frame itself comes from the `images` table; every other field is an
/// optional attribute attached by a dependent table.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CameraFrame {
    /// Encoded image bytes, if the recording stored pixels.
    pub image: Option<Vec<u8>>,

    /// Detected calibration target.
    pub extracted_target: Option<ExtractedTarget>,

    /// Pose per pipeline step, in the convention chosen at load time.
    pub poses: BTreeMap<String, Pose6>,

    /// Per-point residuals (`N x 2`) per pipeline step.
    pub reprojection_errors: BTreeMap<String, DMatrix<f64>>,
}

impl CameraFrame {
    /// Returns true if image bytes are present.
    #[must_use]
    pub const fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Pose of one pipeline step.
    #[must_use]
    pub fn pose(&self, step: &str) -> Option<&Pose6> {
        self.poses.get(step)
    }

    /// Reprojection error of one pipeline step.
    #[must_use]
    pub fn reprojection_error(&self, step: &str) -> Option<&DMatrix<f64>> {
        self.reprojection_errors.get(step)
    }
}

/// Attributes of one IMU frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ImuFrame {
    /// Raw inertial sample.
    pub measurement: Option<ImuMeasurement>,
}

/// Camera frames of a recording.
pub type CameraFrames = FrameIndex<CameraFrame>;

/// IMU frames of a recording.
pub type ImuFrames = FrameIndex<ImuFrame>;
