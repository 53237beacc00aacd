//! Parameters for loading a recording.

use calib_sync::DEFAULT_TICK_STEP_SECS;
use calib_types::PoseConvention;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};

/// Parameters for loading a recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadParams {
    /// Convention camera poses are converted to on load.
    /// Default: world-from-sensor (stored poses are inverted)
    pub pose_convention: PoseConvention,

    /// Whether a reprojection error needs a pose of the same step on its
    /// frame. Default: false
    ///
    /// The calibration database tooling always enforced this check when it
    /// formatted residual tables; [`strict`](Self::strict) restores that
    /// behavior.
    pub require_pose_for_reprojection_error: bool,

    /// Whether the `external_poses` table is read. Default: true
    pub load_external_poses: bool,

    /// Spacing of playback tick marks in seconds. Default: 5
    pub tick_step_secs: u64,
}

impl Default for LoadParams {
    fn default() -> Self {
        Self {
            pose_convention: PoseConvention::WorldFromSensor,
            require_pose_for_reprojection_error: false,
            load_external_poses: true,
            tick_step_secs: DEFAULT_TICK_STEP_SECS,
        }
    }
}

impl LoadParams {
    /// Create params that keep every table as stored.
    ///
    /// Poses stay sensor-from-world and no cross-table checks beyond frame
    /// integrity are made.
    #[must_use]
    pub fn raw() -> Self {
        Self {
            pose_convention: PoseConvention::AsStored,
            ..Default::default()
        }
    }

    /// Create params that also check reprojection errors against poses.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            require_pose_for_reprojection_error: true,
            ..Default::default()
        }
    }

    /// Set the pose convention.
    #[must_use]
    pub const fn with_pose_convention(mut self, convention: PoseConvention) -> Self {
        self.pose_convention = convention;
        self
    }

    /// Set whether reprojection errors need a matching pose.
    #[must_use]
    pub const fn with_require_pose_for_reprojection_error(mut self, require: bool) -> Self {
        self.require_pose_for_reprojection_error = require;
        self
    }

    /// Set whether external poses are loaded.
    #[must_use]
    pub const fn with_external_poses(mut self, load: bool) -> Self {
        self.load_external_poses = load;
        self
    }

    /// Set the tick mark spacing.
    ///
    /// A zero step is rejected by [`validate`](Self::validate).
    #[must_use]
    pub const fn with_tick_step_secs(mut self, step: u64) -> Self {
        self.tick_step_secs = step;
        self
    }

    /// Validates the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidTickStep`] if `tick_step_secs` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.tick_step_secs == 0 {
            return Err(LoadError::InvalidTickStep(self.tick_step_secs));
        }
        Ok(())
    }
}
