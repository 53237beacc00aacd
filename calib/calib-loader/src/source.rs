//! Boundary to the query layer that reads recording tables.

use std::borrow::Cow;

use calib_types::{
    ExternalPoseRecord, ExtractedTargetRecord, ImageRecord, ImuRecord, PoseRecord,
    ReprojectionErrorRecord,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A source of already materialized table records.
///
/// Each method returns every row of one table. A table the recording does
/// not contain is returned as an empty sequence; the provided methods do
/// exactly that, so a source only implements the tables it has.
///
/// Sources are read once per load and treated as immutable snapshots.
pub trait RecordSource {
    /// Identity of the snapshot, e.g. the path it was read from.
    ///
    /// Used as the cache key.
    fn identity(&self) -> &str;

    /// Rows of the `images` table.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Source`](crate::LoadError::Source) if the table
    /// cannot be read.
    fn images(&self) -> Result<Cow<'_, [ImageRecord]>> {
        Ok(Cow::Borrowed(&[]))
    }

    /// Rows of the `extracted_targets` table.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Source`](crate::LoadError::Source) if the table
    /// cannot be read.
    fn extracted_targets(&self) -> Result<Cow<'_, [ExtractedTargetRecord]>> {
        Ok(Cow::Borrowed(&[]))
    }

    /// Rows of the `camera_poses` table.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Source`](crate::LoadError::Source) if the table
    /// cannot be read.
    fn camera_poses(&self) -> Result<Cow<'_, [PoseRecord]>> {
        Ok(Cow::Borrowed(&[]))
    }

    /// Rows of the `reprojection_errors` table.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Source`](crate::LoadError::Source) if the table
    /// cannot be read.
    fn reprojection_errors(&self) -> Result<Cow<'_, [ReprojectionErrorRecord]>> {
        Ok(Cow::Borrowed(&[]))
    }

    /// Rows of the `imu_data` table.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Source`](crate::LoadError::Source) if the table
    /// cannot be read.
    fn imu_data(&self) -> Result<Cow<'_, [ImuRecord]>> {
        Ok(Cow::Borrowed(&[]))
    }

    /// Rows of the `external_poses` table.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Source`](crate::LoadError::Source) if the table
    /// cannot be read.
    fn external_poses(&self) -> Result<Cow<'_, [ExternalPoseRecord]>> {
        Ok(Cow::Borrowed(&[]))
    }
}

/// A recording held in memory.
///
/// Deserializes from a document with one array per table; missing tables
/// default to empty.
///
/// # Example
///
/// ```
/// use calib_loader::{MemorySource, RecordSource};
/// use calib_types::{ImageRecord, Timestamp};
///
/// let mut source = MemorySource::new("session-01");
/// source.images.push(ImageRecord {
///     timestamp: Timestamp::from_nanos(100),
///     sensor_name: "/cam0".to_string(),
///     data: None,
/// });
///
/// assert_eq!(source.identity(), "session-01");
/// assert_eq!(source.images().unwrap().len(), 1);
/// assert!(source.imu_data().unwrap().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySource {
    /// Snapshot identity.
    pub identity: String,
    /// `images` rows.
    pub images: Vec<ImageRecord>,
    /// `extracted_targets` rows.
    pub extracted_targets: Vec<ExtractedTargetRecord>,
    /// `camera_poses` rows.
    pub camera_poses: Vec<PoseRecord>,
    /// `reprojection_errors` rows.
    pub reprojection_errors: Vec<ReprojectionErrorRecord>,
    /// `imu_data` rows.
    pub imu_data: Vec<ImuRecord>,
    /// `external_poses` rows.
    pub external_poses: Vec<ExternalPoseRecord>,
}

impl MemorySource {
    /// Creates an empty recording with the given identity.
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            ..Default::default()
        }
    }
}

impl RecordSource for MemorySource {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn images(&self) -> Result<Cow<'_, [ImageRecord]>> {
        Ok(Cow::Borrowed(&self.images))
    }

    fn extracted_targets(&self) -> Result<Cow<'_, [ExtractedTargetRecord]>> {
        Ok(Cow::Borrowed(&self.extracted_targets))
    }

    fn camera_poses(&self) -> Result<Cow<'_, [PoseRecord]>> {
        Ok(Cow::Borrowed(&self.camera_poses))
    }

    fn reprojection_errors(&self) -> Result<Cow<'_, [ReprojectionErrorRecord]>> {
        Ok(Cow::Borrowed(&self.reprojection_errors))
    }

    fn imu_data(&self) -> Result<Cow<'_, [ImuRecord]>> {
        Ok(Cow::Borrowed(&self.imu_data))
    }

    fn external_poses(&self) -> Result<Cow<'_, [ExternalPoseRecord]>> {
        Ok(Cow::Borrowed(&self.external_poses))
    }
}
