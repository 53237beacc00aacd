//! Reference timestamp index and completeness statistics.

use std::collections::BTreeMap;

use calib_types::Timestamp;
use serde::Serialize;

use crate::frames::{CameraFrame, FrameIndex, ImuFrame};

/// Frames of the sensor.
pub const TOTAL_FRAMES: &str = "total_frames";
/// Camera frames with image bytes.
pub const FRAMES_WITH_IMAGE: &str = "frames_with_image";
/// Camera frames with a detected target.
pub const FRAMES_WITH_EXTRACTED_TARGET: &str = "frames_with_extracted_target";
/// Camera frames with a pose, per step.
pub const FRAMES_WITH_POSE: &str = "frames_with_pose";
/// Camera frames with a reprojection error, per step.
pub const FRAMES_WITH_REPROJECTION_ERROR: &str = "frames_with_reprojection_error";
/// IMU frames with a measurement.
pub const FRAMES_WITH_IMU_MEASUREMENT: &str = "frames_with_imu_measurement";

/// Per-sensor sorted frame timestamps.
///
/// This is the authoritative timeline of every sensor: ascending and free
/// of duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TimestampIndex {
    sensors: BTreeMap<String, Vec<Timestamp>>,
}

impl TimestampIndex {
    /// Sorted timestamps of `sensor`; empty if the sensor has no frames.
    #[must_use]
    pub fn timestamps(&self, sensor: &str) -> &[Timestamp] {
        self.get(sensor).unwrap_or_default()
    }

    /// Sorted timestamps of `sensor`, or `None` if the sensor is unknown.
    #[must_use]
    pub fn get(&self, sensor: &str) -> Option<&[Timestamp]> {
        self.sensors.get(sensor).map(Vec::as_slice)
    }

    /// Sensor names in ascending order.
    pub fn sensors(&self) -> impl Iterator<Item = &str> {
        self.sensors.keys().map(String::as_str)
    }

    /// Iterates over sensors and their timestamps.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Timestamp])> {
        self.sensors
            .iter()
            .map(|(name, stamps)| (name.as_str(), stamps.as_slice()))
    }

    /// Number of sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Returns true if no sensor is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

/// Attribute counters of one sensor.
///
/// A counter of zero means that pipeline stage never produced output for
/// the sensor.
///
/// # Example
///
/// ```
/// use calib_loader::SensorStatistics;
///
/// let mut stats = SensorStatistics::seeded(&["frames_with_image"], &["frames_with_pose"]);
/// stats.total_frames = 2;
/// stats.increment_variant("frames_with_pose", "initial");
///
/// assert_eq!(stats.count("total_frames"), Some(2));
/// assert_eq!(stats.count("frames_with_image"), Some(0));
/// assert_eq!(stats.variant_count("frames_with_pose", "initial"), Some(1));
/// assert_eq!(stats.empty_stages(), vec!["frames_with_image".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SensorStatistics {
    /// Number of frames.
    pub total_frames: usize,
    counters: BTreeMap<String, usize>,
    variant_counters: BTreeMap<String, BTreeMap<String, usize>>,
}

impl SensorStatistics {
    /// Creates statistics with the given counters and variant groups at zero.
    #[must_use]
    pub fn seeded(counters: &[&str], variant_groups: &[&str]) -> Self {
        Self {
            total_frames: 0,
            counters: counters.iter().map(|name| ((*name).to_owned(), 0)).collect(),
            variant_counters: variant_groups
                .iter()
                .map(|name| ((*name).to_owned(), BTreeMap::new()))
                .collect(),
        }
    }

    /// Increments a counter, creating it if needed.
    pub fn increment(&mut self, counter: &str) {
        if let Some(count) = self.counters.get_mut(counter) {
            *count += 1;
        } else {
            self.counters.insert(counter.to_owned(), 1);
        }
    }

    /// Increments the counter of one variant within a group.
    pub fn increment_variant(&mut self, group: &str, variant: &str) {
        let variants = self.variant_counters.entry(group.to_owned()).or_default();
        if let Some(count) = variants.get_mut(variant) {
            *count += 1;
        } else {
            variants.insert(variant.to_owned(), 1);
        }
    }

    /// Value of a counter; `total_frames` is included.
    #[must_use]
    pub fn count(&self, counter: &str) -> Option<usize> {
        if counter == TOTAL_FRAMES {
            return Some(self.total_frames);
        }
        self.counters.get(counter).copied()
    }

    /// Value of one variant counter.
    #[must_use]
    pub fn variant_count(&self, group: &str, variant: &str) -> Option<usize> {
        self.variant_counters.get(group)?.get(variant).copied()
    }

    /// All variant counters of a group.
    #[must_use]
    pub fn variants(&self, group: &str) -> Option<&BTreeMap<String, usize>> {
        self.variant_counters.get(group)
    }

    /// Flattens the statistics into labeled counts.
    ///
    /// Variant counters are labeled `group/variant`. `total_frames` comes
    /// first; the rest follow in name order.
    #[must_use]
    pub fn labeled(&self) -> Vec<(String, usize)> {
        let mut labeled = vec![(TOTAL_FRAMES.to_owned(), self.total_frames)];
        labeled.extend(self.counters.iter().map(|(name, &count)| (name.clone(), count)));
        for (group, variants) in &self.variant_counters {
            labeled.extend(
                variants
                    .iter()
                    .map(|(variant, &count)| (format!("{group}/{variant}"), count)),
            );
        }
        labeled
    }

    /// Stages that produced nothing for this sensor.
    ///
    /// Lists zero counters and variant groups without any variant.
    #[must_use]
    pub fn empty_stages(&self) -> Vec<String> {
        let counters = self
            .counters
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(name, _)| name.clone());
        let groups = self
            .variant_counters
            .iter()
            .filter(|(_, variants)| variants.values().all(|&count| count == 0))
            .map(|(group, _)| group.clone());
        counters.chain(groups).collect()
    }
}

/// Statistics of every sensor of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Statistics {
    sensors: BTreeMap<String, SensorStatistics>,
}

impl Statistics {
    /// Statistics of `sensor`, or `None` if it has no frames.
    #[must_use]
    pub fn get(&self, sensor: &str) -> Option<&SensorStatistics> {
        self.sensors.get(sensor)
    }

    /// Iterates over sensors in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SensorStatistics)> {
        self.sensors.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    /// Number of sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Returns true if no sensor has statistics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

/// Frame types that report completeness counters.
pub trait FrameAttributes {
    /// Counters reported for every sensor, even when zero.
    const COUNTERS: &'static [&'static str];

    /// Per-variant counter groups reported for every sensor.
    const VARIANT_GROUPS: &'static [&'static str] = &[];

    /// Adds the attributes present on this frame to `stats`.
    fn tally(&self, stats: &mut SensorStatistics);
}

impl FrameAttributes for CameraFrame {
    const COUNTERS: &'static [&'static str] = &[FRAMES_WITH_IMAGE, FRAMES_WITH_EXTRACTED_TARGET];
    const VARIANT_GROUPS: &'static [&'static str] =
        &[FRAMES_WITH_POSE, FRAMES_WITH_REPROJECTION_ERROR];

    fn tally(&self, stats: &mut SensorStatistics) {
        if self.has_image() {
            stats.increment(FRAMES_WITH_IMAGE);
        }
        if self.extracted_target.is_some() {
            stats.increment(FRAMES_WITH_EXTRACTED_TARGET);
        }
        for step in self.poses.keys() {
            stats.increment_variant(FRAMES_WITH_POSE, step);
        }
        for step in self.reprojection_errors.keys() {
            stats.increment_variant(FRAMES_WITH_REPROJECTION_ERROR, step);
        }
    }
}

impl FrameAttributes for ImuFrame {
    const COUNTERS: &'static [&'static str] = &[FRAMES_WITH_IMU_MEASUREMENT];

    fn tally(&self, stats: &mut SensorStatistics) {
        if self.measurement.is_some() {
            stats.increment(FRAMES_WITH_IMU_MEASUREMENT);
        }
    }
}

/// Derives the reference timestamp index and statistics from frames.
///
/// Timestamps are sorted numerically and de-duplicated per sensor.
///
/// # Example
///
/// ```
/// use calib_loader::{CameraFrames, build_index};
/// use calib_types::{ImageRecord, Timestamp};
///
/// let mut frames = CameraFrames::new();
/// for nanos in [10, 5, 20] {
///     frames.upsert(&ImageRecord {
///         timestamp: Timestamp::from_nanos(nanos),
///         sensor_name: "/cam0".to_string(),
///         data: None,
///     });
/// }
///
/// let (index, stats) = build_index(&frames);
/// assert_eq!(index.timestamps("/cam0"), [5, 10, 20].map(Timestamp::from_nanos));
/// assert_eq!(stats.get("/cam0").unwrap().total_frames, 3);
/// ```
#[must_use]
pub fn build_index<F: FrameAttributes>(frames: &FrameIndex<F>) -> (TimestampIndex, Statistics) {
    let mut index = TimestampIndex::default();
    let mut statistics = Statistics::default();

    for (sensor, sensor_frames) in frames.iter() {
        let mut timestamps: Vec<Timestamp> = sensor_frames.keys().copied().collect();
        timestamps.sort_unstable();
        timestamps.dedup();

        let mut stats = SensorStatistics::seeded(F::COUNTERS, F::VARIANT_GROUPS);
        stats.total_frames = timestamps.len();
        for frame in sensor_frames.values() {
            frame.tally(&mut stats);
        }

        index.sensors.insert(sensor.to_owned(), timestamps);
        statistics.sensors.insert(sensor.to_owned(), stats);
    }

    (index, statistics)
}
