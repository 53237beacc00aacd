//! Playback timeline: elapsed time, tick marks and frame stepping.

use std::collections::BTreeMap;

use calib_types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Default spacing of playback tick marks, in seconds.
pub const DEFAULT_TICK_STEP_SECS: u64 = 5;

/// Seconds elapsed since the first timestamp, for every timestamp.
///
/// `sorted` must be ascending.
#[must_use]
pub fn elapsed_seconds(sorted: &[Timestamp]) -> Vec<f64> {
    let Some(&origin) = sorted.first() else {
        return Vec::new();
    };
    sorted.iter().map(|t| t.elapsed_secs_since(origin)).collect()
}

/// A labeled mark on a playback scrub control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Index of the frame the mark snaps to.
    pub index: usize,
    /// Elapsed seconds at that frame.
    pub elapsed_seconds: f64,
    /// Label of the nominal mark position, e.g. `"10s"`.
    pub label: String,
}

/// Computes evenly spaced tick marks over an ascending timestamp sequence.
///
/// For every multiple of `step_secs` from zero up to the whole number of
/// elapsed seconds, the mark snaps to the frame whose elapsed time is
/// closest. On a tie the earlier frame wins. Marks snap to existing frames,
/// so the last mark can fall short of the true span.
///
/// # Errors
///
/// Returns [`SyncError::InvalidConfig`] if `step_secs` is zero.
///
/// # Example
///
/// ```
/// use calib_sync::ticks;
/// use calib_types::Timestamp;
///
/// let frames: Vec<_> = (0..20).map(|s| Timestamp::from_nanos(s * 1_000_000_000)).collect();
/// let marks = ticks(&frames, 5).unwrap();
///
/// let indices: Vec<_> = marks.iter().map(|t| t.index).collect();
/// let labels: Vec<_> = marks.iter().map(|t| t.label.as_str()).collect();
/// assert_eq!(indices, [0, 5, 10, 15]);
/// assert_eq!(labels, ["0s", "5s", "10s", "15s"]);
///
/// assert!(ticks(&[], 5).unwrap().is_empty());
/// ```
pub fn ticks(sorted: &[Timestamp], step_secs: u64) -> Result<Vec<Tick>> {
    if step_secs == 0 {
        return Err(SyncError::invalid_config("tick step must be positive"));
    }

    let elapsed = elapsed_seconds(sorted);
    let Some(&max_elapsed) = elapsed.last() else {
        return Ok(Vec::new());
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let last_mark = max_elapsed.floor() as u64;

    let mut marks = Vec::new();
    let mut mark = 0_u64;
    while mark <= last_mark {
        #[allow(clippy::cast_precision_loss)]
        let index = snap(sorted, &elapsed, mark as f64);
        marks.push(Tick {
            index,
            elapsed_seconds: elapsed[index],
            label: format!("{mark}s"),
        });

        match mark.checked_add(step_secs) {
            Some(next) => mark = next,
            None => break,
        }
    }

    Ok(marks)
}

/// Index of the first frame whose elapsed time is closest to `target`.
fn snap(sorted: &[Timestamp], elapsed: &[f64], target: f64) -> usize {
    let pos = elapsed.partition_point(|e| *e < target);
    let mut index = if pos == 0 {
        0
    } else if pos == elapsed.len() {
        pos - 1
    } else if target - elapsed[pos - 1] <= elapsed[pos] - target {
        pos - 1
    } else {
        pos
    };

    // Duplicate timestamps: report the first frame carrying the value.
    while index > 0 && sorted[index - 1] == sorted[index] {
        index -= 1;
    }
    index
}

/// Steps forward one frame, wrapping to zero after `max`.
///
/// # Example
///
/// ```
/// use calib_sync::looping_increment;
///
/// assert_eq!(looping_increment(3, 9), 4);
/// assert_eq!(looping_increment(9, 9), 0);
/// assert_eq!(looping_increment(0, 0), 0);
/// ```
#[must_use]
pub const fn looping_increment(value: usize, max: usize) -> usize {
    if value >= max { 0 } else { value + 1 }
}

/// Frame timeline of one sensor, as driven by a scrub control.
///
/// Holds the sensor's reference timestamps together with the tick marks
/// computed from them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackTimeline {
    timestamps: Vec<Timestamp>,
    ticks: Vec<Tick>,
}

impl PlaybackTimeline {
    /// Builds a timeline with marks every `step_secs` seconds.
    ///
    /// # Errors
    ///
    /// - [`SyncError::OutOfOrder`] if `sorted` is not ascending
    /// - [`SyncError::InvalidConfig`] if `step_secs` is zero
    pub fn new(sorted: &[Timestamp], step_secs: u64) -> Result<Self> {
        if let Some(pair) = sorted.windows(2).find(|pair| pair[1] < pair[0]) {
            return Err(SyncError::out_of_order(pair[0], pair[1]));
        }

        Ok(Self {
            timestamps: sorted.to_vec(),
            ticks: ticks(sorted, step_secs)?,
        })
    }

    /// Builds a timeline with marks every [`DEFAULT_TICK_STEP_SECS`] seconds.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::OutOfOrder`] if `sorted` is not ascending.
    pub fn with_default_step(sorted: &[Timestamp]) -> Result<Self> {
        Self::new(sorted, DEFAULT_TICK_STEP_SECS)
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Returns true if the timeline has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Highest valid frame index; zero for an empty timeline.
    #[must_use]
    pub fn max_index(&self) -> usize {
        self.timestamps.len().saturating_sub(1)
    }

    /// Timestamp of the frame at `index`.
    #[must_use]
    pub fn timestamp_at(&self, index: usize) -> Option<Timestamp> {
        self.timestamps.get(index).copied()
    }

    /// Seconds from the first frame to the frame at `index`.
    #[must_use]
    pub fn elapsed_at(&self, index: usize) -> Option<f64> {
        let origin = self.timestamps.first()?;
        Some(self.timestamp_at(index)?.elapsed_secs_since(*origin))
    }

    /// Frame index after `index`, wrapping to the first frame.
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        looping_increment(index, self.max_index())
    }

    /// All reference timestamps, ascending.
    #[must_use]
    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Tick marks in ascending order.
    #[must_use]
    pub fn ticks(&self) -> &[Tick] {
        &self.ticks
    }

    /// Slider marks, frame index to label.
    ///
    /// When two marks snap to the same frame the later label is kept.
    #[must_use]
    pub fn marks(&self) -> BTreeMap<usize, String> {
        self.ticks
            .iter()
            .map(|tick| (tick.index, tick.label.clone()))
            .collect()
    }
}
