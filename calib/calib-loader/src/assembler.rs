//! Merges table records into frame indices.
//!
//! Base tables (`images`, `imu_data`) create frames. Dependent tables attach
//! attributes to frames that already exist and fail on any record whose key
//! the base table never produced. Merging a table again overwrites the same
//! attributes (last write wins) and never duplicates frames.
//!
//! On error the index holds part of the failing table and must be
//! discarded.

use calib_types::{
    ExtractedTargetRecord, FrameKey, ImageRecord, ImuMeasurement, ImuRecord, Pose6,
    PoseConvention, PoseRecord, ReprojectionErrorRecord,
};
use tracing::{debug, warn};

use crate::error::{LoadError, Result, Table};
use crate::frames::{CameraFrames, FrameIndex, ImuFrames};

/// Columns of a reprojection error matrix (`du`, `dv`).
pub const REPROJECTION_ERROR_COLS: usize = 2;

/// Merges `images` rows, creating camera frames.
///
/// Returns the number of frames created.
pub fn merge_images(frames: &mut CameraFrames, records: &[ImageRecord]) -> usize {
    let before = frames.frame_count();
    for record in records {
        frames.upsert(record).image.clone_from(&record.data);
    }

    let created = frames.frame_count() - before;
    log_merged(Table::Images, records.len(), created);
    created
}

/// Merges `imu_data` rows, creating IMU frames.
///
/// Returns the number of frames created.
pub fn merge_imu_data(frames: &mut ImuFrames, records: &[ImuRecord]) -> usize {
    let before = frames.frame_count();
    for record in records {
        frames.upsert(record).measurement = Some(ImuMeasurement::from_array(record.measurement));
    }

    let created = frames.frame_count() - before;
    log_merged(Table::ImuData, records.len(), created);
    created
}

/// Attaches decoded `extracted_targets` rows to their camera frames.
///
/// # Errors
///
/// - [`LoadError::UnknownSensor`] / [`LoadError::UnknownFrame`] for records
///   without a frame
/// - [`LoadError::Decode`] for malformed target payloads
pub fn merge_extracted_targets(
    frames: &mut CameraFrames,
    records: &[ExtractedTargetRecord],
) -> Result<()> {
    for record in records {
        let frame = frames.attach(Table::ExtractedTargets, record)?;
        let target = record
            .target
            .decode()
            .map_err(|e| LoadError::decode(Table::ExtractedTargets, record, e))?;
        frame.extracted_target = Some(target);
    }

    log_merged(Table::ExtractedTargets, records.len(), 0);
    Ok(())
}

/// Attaches `camera_poses` rows to their camera frames.
///
/// Stored poses are sensor-from-world; `convention` decides what the frame
/// holds.
///
/// # Errors
///
/// [`LoadError::UnknownSensor`] / [`LoadError::UnknownFrame`] for records
/// without a frame.
pub fn merge_camera_poses(
    frames: &mut CameraFrames,
    records: &[PoseRecord],
    convention: PoseConvention,
) -> Result<()> {
    for record in records {
        let pose = convention.apply(Pose6::from_array(record.pose));
        frames
            .attach(Table::CameraPoses, record)?
            .poses
            .insert(record.step_name.clone(), pose);
    }

    log_merged(Table::CameraPoses, records.len(), 0);
    Ok(())
}

/// Attaches decoded `reprojection_errors` rows to their camera frames.
///
/// With `require_pose`, a record is only accepted if its frame already
/// carries a pose of the same step, so poses must be merged first.
///
/// # Errors
///
/// - [`LoadError::UnknownSensor`] / [`LoadError::UnknownFrame`] for records
///   without a frame
/// - [`LoadError::MissingPose`] if `require_pose` is set and the step has no pose
/// - [`LoadError::Decode`] for malformed residual payloads
pub fn merge_reprojection_errors(
    frames: &mut CameraFrames,
    records: &[ReprojectionErrorRecord],
    require_pose: bool,
) -> Result<()> {
    for record in records {
        let frame = frames.attach(Table::ReprojectionErrors, record)?;
        if require_pose && !frame.poses.contains_key(&record.step_name) {
            warn!(
                sensor = record.sensor_name(),
                step = record.step_name.as_str(),
                timestamp = record.timestamp().as_nanos(),
                "Reprojection error without matching pose"
            );
            return Err(LoadError::missing_pose(
                record.sensor_name(),
                record.step_name.as_str(),
                record.timestamp(),
            ));
        }

        let residuals = record
            .error
            .decode(REPROJECTION_ERROR_COLS)
            .map_err(|e| LoadError::decode(Table::ReprojectionErrors, record, e))?;
        frame
            .reprojection_errors
            .insert(record.step_name.clone(), residuals);
    }

    log_merged(Table::ReprojectionErrors, records.len(), 0);
    Ok(())
}

/// Builds camera frames from all camera tables.
///
/// # Errors
///
/// Propagates the first error of any dependent table merge.
pub fn assemble_camera_frames(
    images: &[ImageRecord],
    targets: &[ExtractedTargetRecord],
    poses: &[PoseRecord],
    errors: &[ReprojectionErrorRecord],
    convention: PoseConvention,
    require_pose: bool,
) -> Result<CameraFrames> {
    let mut frames = FrameIndex::new();
    merge_images(&mut frames, images);
    merge_extracted_targets(&mut frames, targets)?;
    merge_camera_poses(&mut frames, poses, convention)?;
    merge_reprojection_errors(&mut frames, errors, require_pose)?;
    Ok(frames)
}

/// Builds IMU frames from the `imu_data` table.
#[must_use]
pub fn assemble_imu_frames(records: &[ImuRecord]) -> ImuFrames {
    let mut frames = FrameIndex::new();
    merge_imu_data(&mut frames, records);
    frames
}

fn log_merged(table: Table, records: usize, created: usize) {
    debug!(
        table = table.as_str(),
        records,
        frames_created = created,
        "Merged table"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use approx::assert_relative_eq;
    use calib_types::{ExtractedTargetPayload, MatrixPayload, Timestamp};

    use super::*;

    const CAM: &str = "/cam0/image_raw";

    fn t(nanos: u64) -> Timestamp {
        Timestamp::from_nanos(nanos)
    }

    fn image(nanos: u64, data: Option<Vec<u8>>) -> ImageRecord {
        ImageRecord {
            timestamp: t(nanos),
            sensor_name: CAM.to_string(),
            data,
        }
    }

    fn target(nanos: u64, rows: usize) -> ExtractedTargetRecord {
        ExtractedTargetRecord {
            timestamp: t(nanos),
            sensor_name: CAM.to_string(),
            target: ExtractedTargetPayload {
                pixels: MatrixPayload::new(rows, vec![1.0; rows * 2]),
                points: MatrixPayload::new(rows, vec![0.5; rows * 3]),
                indices: MatrixPayload::new(rows, vec![0; rows * 2]),
            },
        }
    }

    fn pose(nanos: u64, step: &str, values: [f64; 6]) -> PoseRecord {
        PoseRecord {
            timestamp: t(nanos),
            sensor_name: CAM.to_string(),
            step_name: step.to_string(),
            pose: values,
        }
    }

    fn residuals(nanos: u64, step: &str, rows: usize) -> ReprojectionErrorRecord {
        ReprojectionErrorRecord {
            timestamp: t(nanos),
            sensor_name: CAM.to_string(),
            step_name: step.to_string(),
            error: MatrixPayload::new(rows, vec![0.25; rows * 2]),
        }
    }

    fn base() -> CameraFrames {
        let mut frames = CameraFrames::new();
        merge_images(&mut frames, &[image(100, None), image(200, Some(vec![7]))]);
        frames
    }

    #[test]
    fn images_define_frames() {
        let frames = base();

        assert_eq!(frames.frame_count(), 2);
        assert!(!frames.frame(CAM, t(100)).unwrap().has_image());
        assert!(frames.frame(CAM, t(200)).unwrap().has_image());
    }

    #[test]
    fn merging_base_twice_is_idempotent() {
        let mut frames = base();
        let created = merge_images(&mut frames, &[image(100, Some(vec![1, 2])), image(200, None)]);

        assert_eq!(created, 0);
        assert_eq!(frames.frame_count(), 2);
        // Last write wins per field
        assert_eq!(frames.frame(CAM, t(100)).unwrap().image, Some(vec![1, 2]));
        assert!(!frames.frame(CAM, t(200)).unwrap().has_image());
    }

    #[test]
    fn targets_attach_without_new_frames() {
        let mut frames = base();
        merge_extracted_targets(&mut frames, &[target(100, 4)]).unwrap();

        assert_eq!(frames.frame_count(), 2);
        let frame = frames.frame(CAM, t(100)).unwrap();
        assert_eq!(frame.extracted_target.as_ref().unwrap().len(), 4);
        assert!(frames.frame(CAM, t(200)).unwrap().extracted_target.is_none());
    }

    #[test]
    fn target_without_frame_fails() {
        let mut frames = base();
        let err = merge_extracted_targets(&mut frames, &[target(150, 1)]).unwrap_err();

        assert!(matches!(
            err,
            LoadError::UnknownFrame {
                table: Table::ExtractedTargets,
                ..
            }
        ));
    }

    #[test]
    fn malformed_target_is_decode_error() {
        let mut frames = base();
        let mut record = target(100, 2);
        record.target.points.data.pop();

        let err = merge_extracted_targets(&mut frames, &[record]).unwrap_err();
        assert!(matches!(err, LoadError::Decode { .. }));
    }

    #[test]
    fn poses_are_converted_and_keyed_by_step() {
        let mut frames = base();
        let stored = [0.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        merge_camera_poses(
            &mut frames,
            &[pose(100, "initial", stored), pose(100, "optimized", stored)],
            PoseConvention::WorldFromSensor,
        )
        .unwrap();

        let frame = frames.frame(CAM, t(100)).unwrap();
        assert_eq!(frame.poses.len(), 2);
        assert_eq!(
            frame.pose("initial").unwrap().to_array(),
            [0.0, 0.0, 0.0, -1.0, -2.0, -3.0]
        );

        merge_camera_poses(
            &mut frames,
            &[pose(200, "initial", stored)],
            PoseConvention::AsStored,
        )
        .unwrap();
        let kept = frames.frame(CAM, t(200)).unwrap().pose("initial").unwrap();
        assert_relative_eq!(kept.translation.x, 1.0);
    }

    #[test]
    fn pose_for_unknown_sensor_fails() {
        let mut frames = base();
        let mut record = pose(100, "initial", [0.0; 6]);
        record.sensor_name = "/cam1/image_raw".to_string();

        let err = merge_camera_poses(&mut frames, &[record], PoseConvention::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownSensor { .. }));
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn reprojection_errors_decode_two_columns() {
        let mut frames = base();
        merge_reprojection_errors(&mut frames, &[residuals(100, "initial", 3)], false).unwrap();

        let residual = frames
            .frame(CAM, t(100))
            .unwrap()
            .reprojection_error("initial")
            .unwrap();
        assert_eq!(residual.shape(), (3, 2));
    }

    #[test]
    fn reprojection_errors_can_require_pose() {
        let mut frames = base();
        let records = [residuals(100, "optimized", 1)];

        let err = merge_reprojection_errors(&mut frames, &records, true).unwrap_err();
        assert!(matches!(err, LoadError::MissingPose { ref step, .. } if step == "optimized"));

        merge_camera_poses(
            &mut frames,
            &[pose(100, "optimized", [0.0; 6])],
            PoseConvention::default(),
        )
        .unwrap();
        merge_reprojection_errors(&mut frames, &records, true).unwrap();
    }

    #[test]
    fn assemble_runs_every_table() {
        let frames = assemble_camera_frames(
            &[image(100, None), image(200, None)],
            &[target(100, 2)],
            &[pose(100, "initial", [0.0; 6])],
            &[residuals(100, "initial", 2)],
            PoseConvention::default(),
            true,
        )
        .unwrap();

        let frame = frames.frame(CAM, t(100)).unwrap();
        assert!(frame.extracted_target.is_some());
        assert!(frame.pose("initial").is_some());
        assert!(frame.reprojection_error("initial").is_some());
    }

    #[test]
    fn imu_rows_define_frames() {
        let record = ImuRecord {
            timestamp: t(5),
            sensor_name: "/imu0".to_string(),
            measurement: [0.1, 0.2, 0.3, 0.0, 0.0, 9.81],
        };
        let frames = assemble_imu_frames(&[record.clone(), record]);

        assert_eq!(frames.frame_count(), 1);
        let sample = frames.frame("/imu0", t(5)).unwrap().measurement.unwrap();
        assert_eq!(sample.linear_acceleration[2], 9.81);
    }
}
