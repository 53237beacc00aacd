//! Time types for recording data.
//!
//! Recordings key every row by a nanosecond epoch timestamp. These values are
//! large integers (around `1.5e18` for current dates) and are always ordered
//! numerically.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Epoch time of a recorded row, in nanoseconds.
///
/// Ordering is numeric. Text renderings of timestamps must never be used
/// for ordering, since lexicographic order disagrees with numeric order once
/// digit counts diverge.
///
/// # Example
///
/// ```
/// use calib_types::{Duration, Timestamp};
///
/// let first = Timestamp::from_nanos(1_520_528_314_264_184_960);
/// let second = Timestamp::from_nanos(1_520_528_314_314_184_960);
/// assert_eq!(second.abs_diff(first), Duration::from_millis(50));
///
/// // Numeric, not lexicographic
/// assert!(Timestamp::from_nanos(9) < Timestamp::from_nanos(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Timestamp {
    nanos: u64,
}

impl Timestamp {
    /// Wraps a stored `timestamp_ns` column value.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// The stored `timestamp_ns` value.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// The epoch itself.
    #[must_use]
    pub const fn zero() -> Self {
        Self { nanos: 0 }
    }

    /// Distance to `other`, regardless of which is later.
    #[must_use]
    pub const fn abs_diff(self, other: Self) -> Duration {
        Duration::from_nanos(self.nanos.abs_diff(other.nanos))
    }

    /// Seconds elapsed since `origin`.
    ///
    /// The difference is taken in integer nanoseconds before converting, so
    /// epoch-sized timestamps keep sub-microsecond resolution. Timestamps
    /// before `origin` report `0.0`.
    ///
    /// # Example
    ///
    /// ```
    /// use calib_types::Timestamp;
    ///
    /// let t0 = Timestamp::from_nanos(1_520_528_314_314_184_960);
    /// let t1 = Timestamp::from_nanos(1_520_528_316_814_184_960);
    /// assert!((t1.elapsed_secs_since(t0) - 2.5).abs() < 1e-12);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn elapsed_secs_since(self, origin: Self) -> f64 {
        self.nanos.saturating_sub(origin.nanos) as f64 / 1e9
    }
}

impl From<u64> for Timestamp {
    fn from(nanos: u64) -> Self {
        Self::from_nanos(nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.nanos)
    }
}

/// Distance between two timestamps, used for sync tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Duration {
    nanos: u64,
}

impl Duration {
    /// Nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Milliseconds, saturating at `u64::MAX` nanoseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            nanos: millis.saturating_mul(1_000_000),
        }
    }

    /// Whole seconds, saturating at `u64::MAX` nanoseconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            nanos: secs.saturating_mul(1_000_000_000),
        }
    }

    /// Length in nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.nanos)
    }
}
