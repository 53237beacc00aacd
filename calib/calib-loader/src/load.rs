//! The load operation: source tables in, immutable recording out.

use std::collections::BTreeMap;

use calib_sync::{Alignment, PlaybackTimeline, SyncPolicy, TimeSeries, align};
use calib_types::{Pose6, SensorKind, Timestamp};
use serde::Serialize;
use tracing::{debug, info};

use crate::assembler::{assemble_camera_frames, assemble_imu_frames};
use crate::error::Result;
use crate::frames::{CameraFrame, FrameIndex, ImuFrame};
use crate::index::{FrameAttributes, SensorStatistics, Statistics, TimestampIndex, build_index};
use crate::params::LoadParams;
use crate::source::RecordSource;

/// Frames of one sensor kind with their derived index and statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorData<F> {
    /// `sensor -> timestamp -> frame`.
    pub frames: FrameIndex<F>,
    /// Sorted frame timestamps per sensor.
    pub timestamps: TimestampIndex,
    /// Attribute counters per sensor.
    pub statistics: Statistics,
}

impl<F: FrameAttributes> SensorData<F> {
    /// Derives the index and statistics of `frames`.
    #[must_use]
    pub fn from_frames(frames: FrameIndex<F>) -> Self {
        let (timestamps, statistics) = build_index(&frames);
        Self {
            frames,
            timestamps,
            statistics,
        }
    }
}

impl<F> SensorData<F> {
    /// Returns true if no sensor of this kind has frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<F: FrameAttributes> Default for SensorData<F> {
    fn default() -> Self {
        Self::from_frames(FrameIndex::new())
    }
}

/// A fully loaded recording.
///
/// Built once per load from an immutable source snapshot and never mutated
/// afterwards. Reloading produces a new `Recording`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recording {
    /// Identity of the source snapshot.
    pub identity: String,
    /// Parameters the recording was loaded with.
    pub params: LoadParams,
    /// Camera frames.
    pub camera: SensorData<CameraFrame>,
    /// IMU frames.
    pub imu: SensorData<ImuFrame>,
    /// Ground-truth poses per tracked body.
    pub external_poses: BTreeMap<String, TimeSeries<Pose6>>,
}

impl Recording {
    /// Sorted frame timestamps of a sensor; empty if it has no frames.
    #[must_use]
    pub fn timestamps(&self, kind: SensorKind, sensor: &str) -> &[Timestamp] {
        match kind {
            SensorKind::Camera => self.camera.timestamps.timestamps(sensor),
            SensorKind::Imu => self.imu.timestamps.timestamps(sensor),
        }
    }

    /// Statistics of a sensor, or `None` if it has no frames.
    #[must_use]
    pub fn statistics(&self, kind: SensorKind, sensor: &str) -> Option<&SensorStatistics> {
        match kind {
            SensorKind::Camera => self.camera.statistics.get(sensor),
            SensorKind::Imu => self.imu.statistics.get(sensor),
        }
    }

    /// Playback timeline of a sensor, with marks every
    /// [`LoadParams::tick_step_secs`] seconds.
    ///
    /// A sensor without frames gets an empty timeline.
    ///
    /// # Errors
    ///
    /// Returns [`calib_sync::SyncError::InvalidConfig`] if the tick step is
    /// zero, which only happens for a hand-built `Recording`.
    pub fn playback(&self, kind: SensorKind, sensor: &str) -> calib_sync::Result<PlaybackTimeline> {
        PlaybackTimeline::new(self.timestamps(kind, sensor), self.params.tick_step_secs)
    }

    /// Aligns a camera's frames with the nearest external pose samples.
    ///
    /// Returns `None` if the recording has no external poses for `body`.
    #[must_use]
    pub fn align_external_poses(
        &self,
        camera: &str,
        body: &str,
        policy: SyncPolicy,
    ) -> Option<Vec<Alignment<'_, Pose6>>> {
        let series = self.external_poses.get(body)?;
        Some(align(self.camera.timestamps.timestamps(camera), series, policy))
    }
}

/// Loads a recording from `source`.
///
/// Base tables are merged before their dependent tables. The first
/// integrity or decode error aborts the load; no partial recording is
/// returned.
///
/// # Errors
///
/// Returns [`LoadError::InvalidTickStep`](crate::LoadError::InvalidTickStep)
/// before reading any table if `params` do not validate, otherwise the first
/// [`LoadError`](crate::LoadError) raised by the source or by any table merge.
///
/// # Example
///
/// ```
/// use calib_loader::{LoadParams, MemorySource, load_recording};
/// use calib_types::{ImageRecord, SensorKind, Timestamp};
///
/// let mut source = MemorySource::new("session-01");
/// for nanos in [200, 100] {
///     source.images.push(ImageRecord {
///         timestamp: Timestamp::from_nanos(nanos),
///         sensor_name: "/cam0".to_string(),
///         data: None,
///     });
/// }
///
/// let recording = load_recording(&source, &LoadParams::default()).unwrap();
/// let stats = recording.statistics(SensorKind::Camera, "/cam0").unwrap();
///
/// assert_eq!(stats.total_frames, 2);
/// assert_eq!(
///     recording.timestamps(SensorKind::Camera, "/cam0"),
///     [100, 200].map(Timestamp::from_nanos)
/// );
/// ```
pub fn load_recording<S>(source: &S, params: &LoadParams) -> Result<Recording>
where
    S: RecordSource + ?Sized,
{
    params.validate()?;
    info!(source = source.identity(), "Loading recording");

    let camera = load_camera_data(source, params)?;
    let imu = load_imu_data(source)?;
    let external_poses = if params.load_external_poses {
        load_external_poses(source)?
    } else {
        BTreeMap::new()
    };

    info!(
        source = source.identity(),
        cameras = camera.frames.sensor_count(),
        camera_frames = camera.frames.frame_count(),
        imus = imu.frames.sensor_count(),
        imu_frames = imu.frames.frame_count(),
        external_streams = external_poses.len(),
        "Loaded recording"
    );

    Ok(Recording {
        identity: source.identity().to_owned(),
        params: params.clone(),
        camera,
        imu,
        external_poses,
    })
}

/// Loads the camera tables of `source`.
///
/// # Errors
///
/// Returns the first source, integrity or decode error.
pub fn load_camera_data<S>(source: &S, params: &LoadParams) -> Result<SensorData<CameraFrame>>
where
    S: RecordSource + ?Sized,
{
    let frames = assemble_camera_frames(
        &source.images()?,
        &source.extracted_targets()?,
        &source.camera_poses()?,
        &source.reprojection_errors()?,
        params.pose_convention,
        params.require_pose_for_reprojection_error,
    )?;
    Ok(SensorData::from_frames(frames))
}

/// Loads the IMU table of `source`.
///
/// # Errors
///
/// Returns the error of the source, if any.
pub fn load_imu_data<S>(source: &S) -> Result<SensorData<ImuFrame>>
where
    S: RecordSource + ?Sized,
{
    let frames = assemble_imu_frames(&source.imu_data()?);
    Ok(SensorData::from_frames(frames))
}

/// Loads external poses of `source`, one sorted series per tracked body.
///
/// External poses are sampled on their own clock, so they are not checked
/// against any frame.
///
/// # Errors
///
/// Returns the error of the source, if any.
pub fn load_external_poses<S>(source: &S) -> Result<BTreeMap<String, TimeSeries<Pose6>>>
where
    S: RecordSource + ?Sized,
{
    let records = source.external_poses()?;

    let mut grouped: BTreeMap<&str, Vec<(Timestamp, Pose6)>> = BTreeMap::new();
    for record in records.iter() {
        grouped
            .entry(record.sensor_name.as_str())
            .or_default()
            .push((record.timestamp, Pose6::from_array(record.pose)));
    }

    let series: BTreeMap<_, _> = grouped
        .into_iter()
        .map(|(body, samples)| (body.to_owned(), TimeSeries::from_unsorted(samples)))
        .collect();

    debug!(
        table = "external_poses",
        records = records.len(),
        streams = series.len(),
        "Loaded external poses"
    );
    Ok(series)
}
