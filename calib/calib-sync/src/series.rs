//! Time-ordered series for independently sampled streams.

use calib_types::{Duration, Timestamp};
use serde::Serialize;

use crate::error::{Result, SyncError};
use crate::nearest::{SyncPolicy, closest_index};

/// A time-ordered series of samples.
///
/// Timestamps are kept ascending in their own contiguous slice, so the series
/// can be handed to [`closest`](crate::closest) and
/// [`ticks`](crate::ticks) without copying. Equal timestamps are allowed and
/// keep their insertion order.
///
/// # Example
///
/// ```
/// use calib_sync::TimeSeries;
/// use calib_types::Timestamp;
///
/// let mut series: TimeSeries<f64> = TimeSeries::new();
/// series.push(Timestamp::from_nanos(10), 1.0).unwrap();
/// series.push(Timestamp::from_nanos(20), 2.0).unwrap();
/// assert!(series.push(Timestamp::from_nanos(15), 1.5).is_err());
///
/// let (t, v) = series.closest(Timestamp::from_nanos(18)).unwrap();
/// assert_eq!(t, Timestamp::from_nanos(20));
/// assert!((v - 2.0_f64).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries<T> {
    timestamps: Vec<Timestamp>,
    values: Vec<T>,
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimeSeries<T> {
    /// Creates an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timestamps: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Builds a series from samples in any order.
    ///
    /// The sort is stable: samples sharing a timestamp keep their input
    /// order.
    pub fn from_unsorted(samples: impl IntoIterator<Item = (Timestamp, T)>) -> Self {
        let mut samples: Vec<_> = samples.into_iter().collect();
        samples.sort_by_key(|(timestamp, _)| *timestamp);

        let (timestamps, values) = samples.into_iter().unzip();
        Self { timestamps, values }
    }

    /// Appends a sample.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::OutOfOrder`] if `timestamp` is older than the
    /// latest sample.
    pub fn push(&mut self, timestamp: Timestamp, value: T) -> Result<()> {
        if let Some(&previous) = self.timestamps.last() {
            if timestamp < previous {
                return Err(SyncError::out_of_order(previous, timestamp));
            }
        }
        self.timestamps.push(timestamp);
        self.values.push(value);
        Ok(())
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Returns true if the series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Ascending sample timestamps.
    #[must_use]
    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Sample values, index-aligned with [`timestamps`](Self::timestamps).
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Splits the series into its timestamps and values.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Timestamp>, Vec<T>) {
        (self.timestamps, self.values)
    }

    /// Returns the timestamp range `(first, last)`.
    ///
    /// Returns `None` if the series is empty.
    #[must_use]
    pub fn timestamp_range(&self) -> Option<(Timestamp, Timestamp)> {
        Some((*self.timestamps.first()?, *self.timestamps.last()?))
    }

    /// Returns the time covered by the series.
    ///
    /// Returns `None` if the series has fewer than 2 samples.
    #[must_use]
    pub fn time_span(&self) -> Option<Duration> {
        if self.len() < 2 {
            return None;
        }
        let (first, last) = self.timestamp_range()?;
        Some(last.abs_diff(first))
    }

    /// Gets a sample by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<(Timestamp, &T)> {
        Some((*self.timestamps.get(index)?, self.values.get(index)?))
    }

    /// Returns an iterator over all samples in time order.
    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, &T)> {
        self.timestamps.iter().copied().zip(self.values.iter())
    }

    /// Returns the samples within `[start, end]`.
    pub fn range(&self, start: Timestamp, end: Timestamp) -> impl Iterator<Item = (Timestamp, &T)> {
        let lo = self.timestamps.partition_point(|t| *t < start);
        let hi = self.timestamps.partition_point(|t| *t <= end).max(lo);
        self.timestamps[lo..hi]
            .iter()
            .copied()
            .zip(self.values[lo..hi].iter())
    }

    /// Returns the sample nearest to `query`.
    ///
    /// Returns `None` only if the series is empty.
    #[must_use]
    pub fn closest(&self, query: Timestamp) -> Option<(Timestamp, &T)> {
        self.get(closest_index(&self.timestamps, query)?)
    }

    /// Returns the sample nearest to `query` if `policy` accepts its distance.
    #[must_use]
    pub fn closest_within(&self, query: Timestamp, policy: SyncPolicy) -> Option<(Timestamp, &T)> {
        self.closest(query)
            .filter(|(matched, _)| policy.accepts(query.abs_diff(*matched)))
    }
}

impl<T> FromIterator<(Timestamp, T)> for TimeSeries<T> {
    fn from_iter<I: IntoIterator<Item = (Timestamp, T)>>(iter: I) -> Self {
        Self::from_unsorted(iter)
    }
}
