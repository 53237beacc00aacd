//! Loading calibration recordings into per-sensor frame indices.
//!
//! A recording arrives as six flat tables keyed by `(timestamp, sensor_name)`.
//! This crate joins them into frames and derives what a viewer needs:
//!
//! # Frame Assembly
//!
//! - [`RecordSource`] - Read access to the tables of one source snapshot
//! - [`FrameIndex`] - `sensor -> timestamp -> frame` for cameras and IMUs
//! - [`assemble_camera_frames`] - Base table first, then targets, poses and residuals
//! - [`LoadError`] - Referential-integrity and decode failures, with the offending key
//!
//! # Derived Views
//!
//! - [`build_index`] - Sorted reference timestamps and statistics per sensor
//! - [`extract_sorted`] - Time-ordered attribute series for plotting
//! - [`Recording`] - The immutable result of one load
//! - [`RecordingCache`] - Recordings shared per source identity
//!
//! # Example
//!
//! ```
//! use calib_loader::{LoadParams, MemorySource, load_recording};
//! use calib_types::{ImageRecord, PoseRecord, SensorKind, Timestamp};
//!
//! let mut source = MemorySource::new("session-01");
//! for nanos in [100, 200] {
//!     source.images.push(ImageRecord {
//!         timestamp: Timestamp::from_nanos(nanos),
//!         sensor_name: "/cam0".to_string(),
//!         data: None,
//!     });
//! }
//! source.camera_poses.push(PoseRecord {
//!     timestamp: Timestamp::from_nanos(100),
//!     sensor_name: "/cam0".to_string(),
//!     step_name: "initial".to_string(),
//!     pose: [0.0; 6],
//! });
//!
//! let recording = load_recording(&source, &LoadParams::default()).unwrap();
//! let stats = recording.statistics(SensorKind::Camera, "/cam0").unwrap();
//! assert_eq!(stats.total_frames, 2);
//! assert_eq!(stats.variant_count("frames_with_pose", "initial"), Some(1));
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod assembler;
mod cache;
mod error;
mod extract;
mod frames;
mod index;
mod load;
mod params;
mod source;

pub use assembler::{
    REPROJECTION_ERROR_COLS, assemble_camera_frames, assemble_imu_frames, merge_camera_poses,
    merge_extracted_targets, merge_images, merge_imu_data, merge_reprojection_errors,
};
pub use cache::RecordingCache;
pub use error::{LoadError, Result, Table};
pub use extract::{
    extract_sorted, imu_series, mean_reprojection_error_series, pose_series,
    reprojection_error_series,
};
pub use frames::{CameraFrame, CameraFrames, FrameIndex, ImuFrame, ImuFrames, SensorFrames};
pub use index::{
    FRAMES_WITH_EXTRACTED_TARGET, FRAMES_WITH_IMAGE, FRAMES_WITH_IMU_MEASUREMENT,
    FRAMES_WITH_POSE, FRAMES_WITH_REPROJECTION_ERROR, FrameAttributes, SensorStatistics,
    Statistics, TOTAL_FRAMES, TimestampIndex, build_index,
};
pub use load::{
    Recording, SensorData, load_camera_data, load_external_poses, load_imu_data, load_recording,
};
pub use params::LoadParams;
pub use source::{MemorySource, RecordSource};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        CameraFrame, FrameIndex, ImuFrame, LoadError, LoadParams, MemorySource, RecordSource,
        Recording, RecordingCache, SensorStatistics, load_recording,
    };
}
