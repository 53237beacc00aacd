//! End-to-end tests for loading calibration recordings.
//!
//! Organized in tiers:
//!
//! - Tier 1: Assembly and referential integrity
//! - Tier 2: Timestamp index and statistics
//! - Tier 3: Synchronization and playback over a loaded recording
//! - Tier 4: Caching and serialized sources

// Allow test-specific patterns
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::float_cmp)]

use calib_loader::prelude::*;
use calib_loader::{FRAMES_WITH_EXTRACTED_TARGET, FRAMES_WITH_POSE, Table, pose_series};
use calib_sync::SyncPolicy;
use calib_types::{
    Duration, ExternalPoseRecord, ExtractedTargetPayload, ExtractedTargetRecord, ImageRecord,
    ImuRecord, MatrixPayload, PoseConvention, PoseRecord, ReprojectionErrorRecord, SensorKind,
    Timestamp,
};

const CAM: &str = "/cam0";

fn t(nanos: u64) -> Timestamp {
    Timestamp::from_nanos(nanos)
}

fn image(sensor: &str, nanos: u64) -> ImageRecord {
    ImageRecord {
        timestamp: t(nanos),
        sensor_name: sensor.to_string(),
        data: Some(vec![0; 4]),
    }
}

fn target(sensor: &str, nanos: u64) -> ExtractedTargetRecord {
    ExtractedTargetRecord {
        timestamp: t(nanos),
        sensor_name: sensor.to_string(),
        target: ExtractedTargetPayload {
            pixels: MatrixPayload::new(2, vec![10.0, 20.0, 30.0, 40.0]),
            points: MatrixPayload::new(2, vec![0.0, 0.1, 0.0, 0.0, 0.0, 0.0]),
            indices: MatrixPayload::new(2, vec![0, 1, 0, 0]),
        },
    }
}

fn pose(sensor: &str, nanos: u64, step: &str, values: [f64; 6]) -> PoseRecord {
    PoseRecord {
        timestamp: t(nanos),
        sensor_name: sensor.to_string(),
        step_name: step.to_string(),
        pose: values,
    }
}

fn residual(sensor: &str, nanos: u64, step: &str) -> ReprojectionErrorRecord {
    ReprojectionErrorRecord {
        timestamp: t(nanos),
        sensor_name: sensor.to_string(),
        step_name: step.to_string(),
        error: MatrixPayload::new(1, vec![0.5, -0.5]),
    }
}

/// Two camera frames; the first carries a target and an `initial` pose.
fn two_frame_source() -> MemorySource {
    let mut source = MemorySource::new("two-frames");
    source.images = vec![image(CAM, 100), image(CAM, 200)];
    source.extracted_targets = vec![target(CAM, 100)];
    source.camera_poses = vec![pose(CAM, 100, "initial", [0.0, 0.0, 0.0, 1.0, 2.0, 3.0])];
    source
}

// =============================================================================
// TIER 1: Assembly and Referential Integrity
// =============================================================================

mod tier1_assembly {
    use super::*;

    #[test]
    fn frames_carry_merged_attributes() {
        let recording = load_recording(&two_frame_source(), &LoadParams::default()).unwrap();
        let frames = &recording.camera.frames;

        let first = frames.frame(CAM, t(100)).unwrap();
        assert!(first.has_image());
        assert_eq!(first.extracted_target.as_ref().unwrap().len(), 2);
        assert!(first.pose("initial").is_some());

        let bare = frames.frame(CAM, t(200)).unwrap();
        assert!(bare.has_image());
        assert!(bare.extracted_target.is_none());
        assert!(bare.poses.is_empty());
        assert!(bare.reprojection_errors.is_empty());
    }

    #[test]
    fn poses_follow_requested_convention() {
        let source = two_frame_source();

        let stored = load_recording(&source, &LoadParams::raw()).unwrap();
        let stored_pose = stored.camera.frames.frame(CAM, t(100)).unwrap().pose("initial").unwrap();
        assert_eq!(stored_pose.translation.x, 1.0);

        let world = load_recording(&source, &LoadParams::default()).unwrap();
        let world_pose = world.camera.frames.frame(CAM, t(100)).unwrap().pose("initial").unwrap();
        assert!((world_pose.translation.x + 1.0).abs() < 1e-12);
        assert!((world_pose.translation.z + 3.0).abs() < 1e-12);
    }

    #[test]
    fn dependent_record_without_sensor_fails() {
        let mut source = two_frame_source();
        source.extracted_targets.push(target("/cam1", 100));

        let err = load_recording(&source, &LoadParams::default()).unwrap_err();
        assert_eq!(
            err,
            LoadError::UnknownSensor {
                table: Table::ExtractedTargets,
                sensor: "/cam1".to_string(),
                timestamp: t(100),
            }
        );
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn dependent_record_without_frame_fails() {
        let mut source = two_frame_source();
        source.reprojection_errors.push(residual(CAM, 150, "initial"));

        let err = load_recording(&source, &LoadParams::default()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::UnknownFrame { table: Table::ReprojectionErrors, timestamp, .. }
                if timestamp == t(150)
        ));
    }

    #[test]
    fn strict_params_require_pose_for_residual() {
        let mut source = two_frame_source();
        source.reprojection_errors.push(residual(CAM, 100, "optimized"));

        load_recording(&source, &LoadParams::default()).unwrap();

        let err = load_recording(&source, &LoadParams::strict()).unwrap_err();
        assert!(matches!(err, LoadError::MissingPose { ref step, .. } if step == "optimized"));
    }

    #[test]
    fn malformed_payload_is_decode_error() {
        let mut source = two_frame_source();
        let mut bad = residual(CAM, 200, "initial");
        bad.error = MatrixPayload::new(2, vec![1.0, 2.0, 3.0]);
        source.reprojection_errors.push(bad);

        let err = load_recording(&source, &LoadParams::default()).unwrap_err();
        assert!(matches!(err, LoadError::Decode { table: Table::ReprojectionErrors, .. }));
        assert!(!err.is_integrity_violation());
    }

    #[test]
    fn repeated_rows_do_not_duplicate_frames() {
        let mut source = two_frame_source();
        source.images.push(image(CAM, 100));
        source
            .camera_poses
            .push(pose(CAM, 100, "initial", [0.0, 0.0, 0.0, 7.0, 0.0, 0.0]));

        let recording = load_recording(&source, &LoadParams::raw()).unwrap();
        assert_eq!(recording.camera.frames.frame_count(), 2);

        let frame = recording.camera.frames.frame(CAM, t(100)).unwrap();
        assert_eq!(frame.poses.len(), 1);
        assert_eq!(frame.pose("initial").unwrap().translation.x, 7.0);
    }
}

// =============================================================================
// TIER 2: Timestamp Index and Statistics
// =============================================================================

mod tier2_index {
    use super::*;

    #[test]
    fn statistics_count_attributes() {
        let recording = load_recording(&two_frame_source(), &LoadParams::default()).unwrap();
        let stats = recording.statistics(SensorKind::Camera, CAM).unwrap();

        assert_eq!(stats.total_frames, 2);
        assert_eq!(stats.count(FRAMES_WITH_EXTRACTED_TARGET), Some(1));
        assert_eq!(stats.variant_count(FRAMES_WITH_POSE, "initial"), Some(1));
        assert_eq!(stats.variant_count(FRAMES_WITH_POSE, "optimized"), None);
    }

    #[test]
    fn timestamps_sort_numerically() {
        let mut source = MemorySource::new("numeric");
        for nanos in [10, 9, 100, 1_000_000_000_000, 20] {
            source.images.push(image(CAM, nanos));
        }

        let recording = load_recording(&source, &LoadParams::default()).unwrap();
        assert_eq!(
            recording.timestamps(SensorKind::Camera, CAM),
            [9, 10, 20, 100, 1_000_000_000_000].map(t)
        );
    }

    #[test]
    fn sensors_are_indexed_independently() {
        let mut source = two_frame_source();
        source.images.push(image("/cam1", 50));
        source.imu_data.push(ImuRecord {
            timestamp: t(120),
            sensor_name: "/imu0".to_string(),
            measurement: [0.0, 0.0, 0.1, 0.0, 0.0, 9.81],
        });

        let recording = load_recording(&source, &LoadParams::default()).unwrap();

        assert_eq!(recording.camera.frames.sensor_names(), ["/cam0", "/cam1"]);
        assert_eq!(recording.timestamps(SensorKind::Camera, "/cam1"), [t(50)]);
        assert_eq!(recording.timestamps(SensorKind::Imu, "/imu0"), [t(120)]);
        assert_eq!(recording.statistics(SensorKind::Imu, "/imu0").unwrap().total_frames, 1);
        assert!(recording.timestamps(SensorKind::Camera, "/imu0").is_empty());
    }

    #[test]
    fn pose_series_is_time_ordered() {
        let mut source = MemorySource::new("series");
        for nanos in [300, 100, 200] {
            source.images.push(image(CAM, nanos));
            #[allow(clippy::cast_precision_loss)]
            let x = nanos as f64;
            source.camera_poses.push(pose(CAM, nanos, "initial", [0.0, 0.0, 0.0, x, 0.0, 0.0]));
        }

        let recording = load_recording(&source, &LoadParams::raw()).unwrap();
        let series = pose_series(&recording.camera.frames, CAM, "initial");

        let xs: Vec<f64> = series.values().iter().map(|p| p.translation.x).collect();
        assert_eq!(xs, vec![100.0, 200.0, 300.0]);
    }
}

// =============================================================================
// TIER 3: Synchronization and Playback
// =============================================================================

mod tier3_sync {
    use super::*;

    #[test]
    fn external_poses_align_to_camera_frames() {
        let mut source = two_frame_source();
        for nanos in [190, 95, 140] {
            source.external_poses.push(ExternalPoseRecord {
                timestamp: t(nanos),
                sensor_name: "/vicon/body".to_string(),
                pose: [0.0; 6],
            });
        }

        let recording = load_recording(&source, &LoadParams::default()).unwrap();

        let aligned = recording
            .align_external_poses(CAM, "/vicon/body", SyncPolicy::Unbounded)
            .unwrap();
        let matched: Vec<_> = aligned.iter().map(|a| a.matched.map(|(ts, _)| ts)).collect();
        assert_eq!(matched, vec![Some(t(95)), Some(t(190))]);

        let loose = recording
            .align_external_poses(CAM, "/vicon/body", SyncPolicy::within(Duration::from_nanos(10)))
            .unwrap();
        assert!(loose.iter().all(|a| a.is_matched()));

        let tight = recording
            .align_external_poses(CAM, "/vicon/body", SyncPolicy::within(Duration::from_nanos(5)))
            .unwrap();
        assert!(tight[0].is_matched());
        assert!(!tight[1].is_matched());
        assert_eq!(tight[1].delta, Some(Duration::from_nanos(10)));

        assert!(
            recording
                .align_external_poses(CAM, "/unknown", SyncPolicy::Unbounded)
                .is_none()
        );
    }

    #[test]
    fn playback_marks_over_loaded_frames() {
        // One frame every 500ms for 12 seconds
        let mut source = MemorySource::new("playback");
        for i in 0..=24 {
            source.images.push(image(CAM, i * 500_000_000));
        }

        let recording = load_recording(&source, &LoadParams::default()).unwrap();
        let timeline = recording.playback(SensorKind::Camera, CAM).unwrap();

        assert_eq!(timeline.len(), 25);
        let marks = timeline.marks();
        let expected: Vec<(usize, String)> = vec![
            (0, "0s".to_string()),
            (10, "5s".to_string()),
            (20, "10s".to_string()),
        ];
        assert_eq!(marks.into_iter().collect::<Vec<_>>(), expected);
        assert_eq!(timeline.next_index(timeline.max_index()), 0);
    }

    #[test]
    fn zero_tick_step_fails_the_load() {
        let params = LoadParams::default().with_tick_step_secs(0);
        let err = load_recording(&two_frame_source(), &params).unwrap_err();
        assert_eq!(err, LoadError::InvalidTickStep(0));

        let mut cache = RecordingCache::new(params);
        assert!(cache.get_or_load(&two_frame_source()).is_err());
        assert!(cache.is_empty());
    }
}

// =============================================================================
// TIER 4: Caching and Serialized Sources
// =============================================================================

mod tier4_cache {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn cache_shares_recordings() {
        let source = two_frame_source();
        let mut cache = RecordingCache::new(LoadParams::default());

        let first = cache.get_or_load(&source).unwrap();
        let second = cache.get_or_load(&source).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.get("two-frames").unwrap().identity, "two-frames");
    }

    #[test]
    fn source_from_json_fixture() {
        let json = r#"{
            "identity": "fixture",
            "images": [
                {"timestamp": 2000, "sensor_name": "/cam0"},
                {"timestamp": 1000, "sensor_name": "/cam0", "data": [1, 2, 3]}
            ],
            "camera_poses": [
                {"timestamp": 1000, "sensor_name": "/cam0", "step_name": "initial",
                 "pose": [0.0, 0.0, 0.0, 0.5, 0.0, 0.0]}
            ],
            "reprojection_errors": [
                {"timestamp": 1000, "sensor_name": "/cam0", "step_name": "initial",
                 "error": {"rows": 1, "data": [0.25, 0.75]}}
            ]
        }"#;
        let source: MemorySource = serde_json::from_str(json).unwrap();

        let recording = load_recording(&source, &LoadParams::strict()).unwrap();
        assert_eq!(recording.identity, "fixture");
        assert_eq!(recording.timestamps(SensorKind::Camera, CAM), [t(1000), t(2000)]);

        let frame = recording.camera.frames.frame(CAM, t(1000)).unwrap();
        assert_eq!(frame.image.as_deref(), Some(&[1_u8, 2, 3][..]));
        assert_eq!(frame.reprojection_error("initial").unwrap().shape(), (1, 2));
        assert!(!recording.camera.frames.frame(CAM, t(2000)).unwrap().has_image());
        assert_eq!(recording.params.pose_convention, PoseConvention::WorldFromSensor);
    }

    #[test]
    fn recording_serializes_to_json() {
        let recording = load_recording(&two_frame_source(), &LoadParams::default()).unwrap();
        let value = serde_json::to_value(&recording).unwrap();

        assert_eq!(value["identity"], "two-frames");
        assert_eq!(value["camera"]["timestamps"]["/cam0"], serde_json::json!([100, 200]));
    }
}
