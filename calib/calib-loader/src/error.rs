//! Error types for calib-loader crate.

use std::fmt;

use calib_types::{DecodeError, FrameKey, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tables of a calibration recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Camera base table.
    Images,
    /// Calibration targets detected in images.
    ExtractedTargets,
    /// Camera pose estimates per pipeline step.
    CameraPoses,
    /// Per-point residuals per pipeline step.
    ReprojectionErrors,
    /// Inertial base table.
    ImuData,
    /// Independently sampled ground-truth poses.
    ExternalPoses,
}

impl Table {
    /// Returns the table name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::ExtractedTargets => "extracted_targets",
            Self::CameraPoses => "camera_poses",
            Self::ReprojectionErrors => "reprojection_errors",
            Self::ImuData => "imu_data",
            Self::ExternalPoses => "external_poses",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a load.
///
/// Integrity and decode errors mean the source violates the recording
/// model. They are deterministic, so retrying the same source fails the
/// same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// A dependent record names a sensor absent from its base table.
    #[error("{table}: unknown sensor {sensor} at {timestamp}")]
    UnknownSensor {
        /// Table holding the record.
        table: Table,
        /// Sensor named by the record.
        sensor: String,
        /// Timestamp of the record.
        timestamp: Timestamp,
    },

    /// A dependent record names a frame absent from its base table.
    #[error("{table}: no frame for sensor {sensor} at {timestamp}")]
    UnknownFrame {
        /// Table holding the record.
        table: Table,
        /// Sensor named by the record.
        sensor: String,
        /// Timestamp of the record.
        timestamp: Timestamp,
    },

    /// A reprojection error arrived for a step with no pose on its frame.
    #[error("reprojection_errors: sensor {sensor} has no {step} pose at {timestamp}")]
    MissingPose {
        /// Sensor named by the record.
        sensor: String,
        /// Pipeline step named by the record.
        step: String,
        /// Timestamp of the record.
        timestamp: Timestamp,
    },

    /// A matrix payload could not be decoded.
    #[error("{table}: bad payload for sensor {sensor} at {timestamp}: {source}")]
    Decode {
        /// Table holding the record.
        table: Table,
        /// Sensor named by the record.
        sensor: String,
        /// Timestamp of the record.
        timestamp: Timestamp,
        /// Underlying decode failure.
        #[source]
        source: DecodeError,
    },

    /// Playback tick marks need a step of at least one second.
    #[error("invalid tick step: {0}s (must be at least 1)")]
    InvalidTickStep(u64),

    /// The record source failed to produce a table.
    #[error("{table}: source failed: {reason}")]
    Source {
        /// Table being read.
        table: Table,
        /// Failure reported by the source.
        reason: String,
    },
}

impl LoadError {
    /// Creates an unknown sensor error for `record`.
    #[must_use]
    pub fn unknown_sensor(table: Table, record: &impl FrameKey) -> Self {
        Self::UnknownSensor {
            table,
            sensor: record.sensor_name().to_owned(),
            timestamp: record.timestamp(),
        }
    }

    /// Creates an unknown frame error for `record`.
    #[must_use]
    pub fn unknown_frame(table: Table, record: &impl FrameKey) -> Self {
        Self::UnknownFrame {
            table,
            sensor: record.sensor_name().to_owned(),
            timestamp: record.timestamp(),
        }
    }

    /// Creates a missing pose error.
    #[must_use]
    pub fn missing_pose(
        sensor: impl Into<String>,
        step: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self::MissingPose {
            sensor: sensor.into(),
            step: step.into(),
            timestamp,
        }
    }

    /// Creates a decode error for `record`.
    #[must_use]
    pub fn decode(table: Table, record: &impl FrameKey, source: DecodeError) -> Self {
        Self::Decode {
            table,
            sensor: record.sensor_name().to_owned(),
            timestamp: record.timestamp(),
            source,
        }
    }

    /// Creates a source error.
    #[must_use]
    pub fn source_failed(table: Table, reason: impl Into<String>) -> Self {
        Self::Source {
            table,
            reason: reason.into(),
        }
    }

    /// Returns true if the error is a referential-integrity violation.
    #[must_use]
    pub const fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownSensor { .. } | Self::UnknownFrame { .. } | Self::MissingPose { .. }
        )
    }

    /// Table the failing record belongs to.
    ///
    /// Returns `None` for errors raised before any table is read.
    #[must_use]
    pub const fn table(&self) -> Option<Table> {
        match self {
            Self::UnknownSensor { table, .. }
            | Self::UnknownFrame { table, .. }
            | Self::Decode { table, .. }
            | Self::Source { table, .. } => Some(*table),
            Self::MissingPose { .. } => Some(Table::ReprojectionErrors),
            Self::InvalidTickStep(_) => None,
        }
    }
}

/// Result type for load operations.
pub type Result<T> = std::result::Result<T, LoadError>;
