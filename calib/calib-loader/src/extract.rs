//! Time-ordered series extracted from frames, for plotting.

use calib_sync::TimeSeries;
use calib_types::{DMatrix, ImuMeasurement, Pose6};

use crate::frames::{CameraFrames, FrameIndex, ImuFrames};

/// Collects `extract(frame)` over one sensor's frames in ascending time.
///
/// Frames for which `extract` returns `None` are skipped; a missing
/// attribute is never an error. An unknown sensor yields an empty series.
///
/// # Example
///
/// ```
/// use calib_loader::{CameraFrames, extract_sorted};
/// use calib_types::{ImageRecord, Timestamp};
///
/// let mut frames = CameraFrames::new();
/// for (nanos, data) in [(300, Some(vec![3])), (100, Some(vec![1])), (200, None)] {
///     frames
///         .upsert(&ImageRecord {
///             timestamp: Timestamp::from_nanos(nanos),
///             sensor_name: "/cam0".to_string(),
///             data: None,
///         })
///         .image = data;
/// }
///
/// let sizes = extract_sorted(&frames, "/cam0", |f| f.image.as_ref().map(Vec::len));
/// let (timestamps, values) = sizes.into_parts();
/// assert_eq!(timestamps, [100, 300].map(Timestamp::from_nanos));
/// assert_eq!(values, [1, 1]);
/// ```
#[must_use]
pub fn extract_sorted<'a, F, T>(
    frames: &'a FrameIndex<F>,
    sensor: &str,
    extract: impl Fn(&'a F) -> Option<T>,
) -> TimeSeries<T> {
    frames
        .frames(sensor)
        .into_iter()
        .flatten()
        .filter_map(|(&timestamp, frame)| Some((timestamp, extract(frame)?)))
        .collect()
}

/// Poses of one pipeline step for a camera.
#[must_use]
pub fn pose_series(frames: &CameraFrames, sensor: &str, step: &str) -> TimeSeries<Pose6> {
    extract_sorted(frames, sensor, |frame| frame.pose(step).copied())
}

/// Reprojection errors of one pipeline step for a camera.
#[must_use]
pub fn reprojection_error_series<'a>(
    frames: &'a CameraFrames,
    sensor: &str,
    step: &str,
) -> TimeSeries<&'a DMatrix<f64>> {
    extract_sorted(frames, sensor, |frame| frame.reprojection_error(step))
}

/// Mean residual norm per frame for one pipeline step, in pixels.
///
/// Frames with an empty residual matrix are skipped.
#[must_use]
pub fn mean_reprojection_error_series(
    frames: &CameraFrames,
    sensor: &str,
    step: &str,
) -> TimeSeries<f64> {
    extract_sorted(frames, sensor, |frame| {
        let residuals = frame.reprojection_error(step)?;
        if residuals.nrows() == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let rows = residuals.nrows() as f64;
        Some(residuals.row_iter().map(|row| row.norm()).sum::<f64>() / rows)
    })
}

/// Raw inertial samples of one IMU.
#[must_use]
pub fn imu_series(frames: &ImuFrames, sensor: &str) -> TimeSeries<ImuMeasurement> {
    extract_sorted(frames, sensor, |frame| frame.measurement)
}
