//! Data types for multi-sensor calibration recordings.
//!
//! This crate provides the leaf types shared by the loading and
//! synchronization crates:
//!
//! - [`Timestamp`] / [`Duration`] - Nanosecond-precision epoch time
//! - [`decode_matrix`] / [`MatrixPayload`] - Column-major matrix payload decoding
//! - [`ExtractedTarget`] - Pixel/point/index triple of a detected calibration target
//! - [`Pose6`] - Axis-angle + translation rigid transform, with frame convention inversion
//! - [`ImuMeasurement`] - Angular velocity and linear acceleration sample
//! - Table records ([`ImageRecord`], [`PoseRecord`], ...) as handed over by the query layer
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no GUI dependencies and no I/O. Rows are
//! fetched by an external query layer and arrive here already materialized.
//!
//! # Example
//!
//! ```
//! use calib_types::{Pose6, decode_matrix};
//!
//! // Two pixels stored column-major: u0, u1, v0, v1
//! let pixels = decode_matrix(2, &[1.0, 2.0, 10.0, 20.0], 2).unwrap();
//! assert_eq!(pixels[(1, 0)], 2.0);
//! assert_eq!(pixels[(1, 1)], 20.0);
//!
//! // Pure translations invert by negation
//! let pose = Pose6::from_array([0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
//! assert_eq!(pose.inverse().to_array(), [0.0, 0.0, 0.0, -1.0, -2.0, -3.0]);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod imu;
mod matrix;
mod pose;
mod record;
mod target;
mod time;

pub use error::{DecodeError, Result};
pub use imu::ImuMeasurement;
pub use matrix::{MatrixPayload, decode_matrix, to_rows};
pub use pose::{Pose6, PoseConvention};
pub use record::{
    ExternalPoseRecord, ExtractedTargetRecord, FrameKey, ImageRecord, ImuRecord, PoseRecord,
    ReprojectionErrorRecord, SensorKind,
};
pub use target::{ExtractedTarget, ExtractedTargetPayload};
pub use time::{Duration, Timestamp};

/// Re-exported so downstream crates name matrix types without a direct dependency.
pub use nalgebra::DMatrix;
