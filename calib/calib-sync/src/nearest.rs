//! Nearest-timestamp lookup and cross-stream alignment.

use calib_types::{Duration, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::series::TimeSeries;

/// Finds the index of the timestamp closest to `query`.
///
/// `sorted` must be in ascending order; it is not re-sorted here. The
/// insertion point is found by binary search and the two neighbors around it
/// are compared. When both are equally close the earlier sample wins.
/// Queries before the first or after the last sample clamp to that end.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn closest_index(sorted: &[Timestamp], query: Timestamp) -> Option<usize> {
    if sorted.is_empty() {
        return None;
    }

    let pos = sorted.partition_point(|t| *t < query);
    if pos == 0 {
        return Some(0);
    }
    if pos == sorted.len() {
        return Some(sorted.len() - 1);
    }

    let before = pos - 1;
    if query.abs_diff(sorted[before]) <= sorted[pos].abs_diff(query) {
        Some(before)
    } else {
        Some(pos)
    }
}

/// Finds the timestamp closest to `query` in an ascending slice.
///
/// # Example
///
/// ```
/// use calib_sync::closest;
/// use calib_types::Timestamp;
///
/// let sorted: Vec<Timestamp> = [10, 20, 30].map(Timestamp::from_nanos).to_vec();
///
/// assert_eq!(closest(&sorted, Timestamp::from_nanos(24)), Some(Timestamp::from_nanos(20)));
/// assert_eq!(closest(&sorted, Timestamp::from_nanos(5)), Some(Timestamp::from_nanos(10)));
/// assert_eq!(closest(&sorted, Timestamp::from_nanos(35)), Some(Timestamp::from_nanos(30)));
/// assert_eq!(closest(&[], Timestamp::from_nanos(1)), None);
/// ```
#[must_use]
pub fn closest(sorted: &[Timestamp], query: Timestamp) -> Option<Timestamp> {
    closest_index(sorted, query).map(|i| sorted[i])
}

/// How far a nearest match may lie from the query.
///
/// # Example
///
/// ```
/// use calib_sync::SyncPolicy;
/// use calib_types::Duration;
///
/// let policy = SyncPolicy::within(Duration::from_millis(5));
/// assert!(policy.accepts(Duration::from_millis(5)));
/// assert!(!policy.accepts(Duration::from_millis(6)));
/// assert!(SyncPolicy::default().accepts(Duration::from_secs(3600)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SyncPolicy {
    /// Accept the nearest sample however far away it is.
    #[default]
    Unbounded,

    /// Accept the nearest sample only if it lies within the given distance.
    Within(Duration),
}

impl SyncPolicy {
    /// Creates a bounded policy.
    #[must_use]
    pub const fn within(max_delta: Duration) -> Self {
        Self::Within(max_delta)
    }

    /// Returns true if a match `delta` away from the query is acceptable.
    #[must_use]
    pub const fn accepts(&self, delta: Duration) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Within(max) => delta.as_nanos() <= max.as_nanos(),
        }
    }
}

/// Result of aligning one reference timestamp against an auxiliary stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment<'a, T> {
    /// Timestamp of the reference frame.
    pub reference: Timestamp,

    /// Matched auxiliary sample, if one was accepted.
    pub matched: Option<(Timestamp, &'a T)>,

    /// Distance from the reference to the nearest auxiliary sample.
    ///
    /// Set even when the policy rejected the match; `None` only if the
    /// auxiliary stream is empty.
    pub delta: Option<Duration>,
}

impl<T> Alignment<'_, T> {
    /// Returns true if an auxiliary sample was accepted.
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        self.matched.is_some()
    }

    /// Returns the matched value.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.matched.map(|(_, value)| value)
    }
}

/// Aligns every reference timestamp with the nearest sample of `series`.
///
/// The output has one entry per reference timestamp, in the same order.
/// Matches the policy rejects are reported with `matched: None` and the
/// rejected distance in `delta`.
///
/// # Example
///
/// ```
/// use calib_sync::{SyncPolicy, TimeSeries, align};
/// use calib_types::{Duration, Timestamp};
///
/// let ground_truth = TimeSeries::from_unsorted([
///     (Timestamp::from_nanos(95), "a"),
///     (Timestamp::from_nanos(210), "b"),
/// ]);
/// let frames = [Timestamp::from_nanos(100), Timestamp::from_nanos(500)];
///
/// let aligned = align(&frames, &ground_truth, SyncPolicy::within(Duration::from_nanos(20)));
/// assert_eq!(aligned[0].value(), Some(&"a"));
/// assert!(!aligned[1].is_matched());
/// ```
#[must_use]
pub fn align<'a, T>(
    reference: &[Timestamp],
    series: &'a TimeSeries<T>,
    policy: SyncPolicy,
) -> Vec<Alignment<'a, T>> {
    let alignments: Vec<_> = reference
        .iter()
        .map(|&timestamp| match series.closest(timestamp) {
            Some((matched, value)) => {
                let delta = timestamp.abs_diff(matched);
                Alignment {
                    reference: timestamp,
                    matched: policy.accepts(delta).then_some((matched, value)),
                    delta: Some(delta),
                }
            }
            None => Alignment {
                reference: timestamp,
                matched: None,
                delta: None,
            },
        })
        .collect();

    let matched = alignments.iter().filter(|a| a.is_matched()).count();
    debug!(
        references = reference.len(),
        samples = series.len(),
        matched,
        rejected = alignments.len() - matched,
        "Aligned auxiliary stream"
    );

    alignments
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn ts(values: &[u64]) -> Vec<Timestamp> {
        values.iter().copied().map(Timestamp::from_nanos).collect()
    }

    #[test]
    fn closest_picks_nearer_neighbor() {
        let sorted = ts(&[10, 20, 30]);
        assert_eq!(closest(&sorted, Timestamp::from_nanos(24)), Some(Timestamp::from_nanos(20)));
        assert_eq!(closest(&sorted, Timestamp::from_nanos(26)), Some(Timestamp::from_nanos(30)));
    }

    #[test]
    fn closest_clamps_at_both_ends() {
        let sorted = ts(&[10, 20, 30]);
        assert_eq!(closest(&sorted, Timestamp::from_nanos(5)), Some(Timestamp::from_nanos(10)));
        assert_eq!(closest(&sorted, Timestamp::from_nanos(35)), Some(Timestamp::from_nanos(30)));
        assert_eq!(closest(&sorted, Timestamp::zero()), Some(Timestamp::from_nanos(10)));
    }

    #[test]
    fn closest_exact_match() {
        let sorted = ts(&[10, 20, 30]);
        assert_eq!(closest_index(&sorted, Timestamp::from_nanos(20)), Some(1));
        assert_eq!(closest_index(&sorted, Timestamp::from_nanos(30)), Some(2));
    }

    #[test]
    fn closest_tie_prefers_earlier() {
        let sorted = ts(&[10, 20]);
        assert_eq!(closest_index(&sorted, Timestamp::from_nanos(15)), Some(0));
    }

    #[test]
    fn closest_single_and_empty() {
        assert_eq!(closest_index(&ts(&[42]), Timestamp::from_nanos(7)), Some(0));
        assert_eq!(closest_index(&[], Timestamp::from_nanos(7)), None);
    }

    #[test]
    fn closest_on_epoch_magnitudes() {
        let base = 1_520_528_314_314_184_960;
        let sorted = ts(&[base, base + 50_000_000, base + 100_000_000]);
        let query = Timestamp::from_nanos(base + 60_000_000);
        assert_eq!(closest_index(&sorted, query), Some(1));
    }

    #[test]
    fn policy_default_is_unbounded() {
        assert_eq!(SyncPolicy::default(), SyncPolicy::Unbounded);
        assert!(SyncPolicy::Unbounded.accepts(Duration::from_nanos(u64::MAX)));
    }

    #[test]
    fn align_reports_every_reference() {
        let series = TimeSeries::from_unsorted([
            (Timestamp::from_nanos(12), 1.0_f64),
            (Timestamp::from_nanos(31), 3.0),
        ]);
        let reference = ts(&[10, 20, 30, 100]);

        let aligned = align(&reference, &series, SyncPolicy::within(Duration::from_nanos(10)));

        assert_eq!(aligned.len(), 4);
        assert_eq!(aligned[0].matched.map(|(t, _)| t), Some(Timestamp::from_nanos(12)));
        assert_eq!(aligned[1].delta, Some(Duration::from_nanos(8)));
        assert_eq!(aligned[2].value(), Some(&3.0));
        assert!(!aligned[3].is_matched());
        assert_eq!(aligned[3].delta, Some(Duration::from_nanos(69)));
    }

    #[test]
    fn align_against_empty_series() {
        let series: TimeSeries<u8> = TimeSeries::new();
        let aligned = align(&ts(&[1, 2]), &series, SyncPolicy::Unbounded);

        assert!(aligned.iter().all(|a| a.matched.is_none() && a.delta.is_none()));
    }
}
