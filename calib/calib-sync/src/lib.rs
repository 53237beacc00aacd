//! Timestamp synchronization for calibration recordings.
//!
//! This crate provides derived views over the sorted reference timestamps of
//! a loaded recording:
//!
//! # Nearest-Timestamp Alignment
//!
//! - [`closest`] / [`closest_index`] - Binary-search nearest match in an ascending slice
//! - [`TimeSeries`] - Independently sampled auxiliary stream (e.g. ground-truth poses)
//! - [`SyncPolicy`] - Caller-supplied tolerance for accepting a match
//! - [`align`] - Matches every reference timestamp against an auxiliary stream
//!
//! # Playback
//!
//! - [`ticks`] - Evenly spaced `(index, seconds, label)` marks for a scrub control
//! - [`PlaybackTimeline`] - Slider marks, frame lookup and looping stepping
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no GUI dependencies. All inputs must already
//! be sorted ascending; nothing here re-sorts per query.
//!
//! # Example
//!
//! ```
//! use calib_sync::{SyncPolicy, TimeSeries, align, ticks};
//! use calib_types::Timestamp;
//!
//! let frames: Vec<_> = (0..4).map(|i| Timestamp::from_nanos(i * 100)).collect();
//! let external = TimeSeries::from_unsorted([
//!     (Timestamp::from_nanos(240), 'b'),
//!     (Timestamp::from_nanos(10), 'a'),
//! ]);
//!
//! let aligned = align(&frames, &external, SyncPolicy::Unbounded);
//! let matched: Vec<_> = aligned.iter().filter_map(|a| a.value().copied()).collect();
//! assert_eq!(matched, ['a', 'a', 'b', 'b']);
//!
//! // Sub-second recordings get a single mark at zero
//! assert_eq!(ticks(&frames, 5).unwrap().len(), 1);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod nearest;
mod playback;
mod series;

pub use error::{Result, SyncError};
pub use nearest::{Alignment, SyncPolicy, align, closest, closest_index};
pub use playback::{
    DEFAULT_TICK_STEP_SECS, PlaybackTimeline, Tick, elapsed_seconds, looping_increment, ticks,
};
pub use series::TimeSeries;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        Alignment, PlaybackTimeline, SyncError, SyncPolicy, Tick, TimeSeries, align, closest,
        ticks,
    };
}
