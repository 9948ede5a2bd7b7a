//! Timeline mapping
//!
//! Converts between global elapsed seconds on the virtual concatenated
//! timeline and `(clip index, offset within clip)`.
//!
//! A [`Timeline`] is an immutable snapshot of the duration table. The clip
//! registry builds a new one whenever a duration changes, so a reader holding
//! a snapshot never observes a half-applied update.

use super::types::PlaybackPosition;

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    durations: Vec<f64>,
    /// prefix[i] = sum of durations[..i]; one longer than `durations`
    prefix: Vec<f64>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new([])
    }
}

impl Timeline {
    /// Build a snapshot. Negative or non-finite durations count as zero.
    pub fn new(durations: impl IntoIterator<Item = f64>) -> Self {
        let durations: Vec<f64> = durations
            .into_iter()
            .map(|d| if d.is_finite() && d > 0.0 { d } else { 0.0 })
            .collect();

        let mut prefix = Vec::with_capacity(durations.len() + 1);
        let mut sum = 0.0;
        prefix.push(sum);
        for d in &durations {
            sum += d;
            prefix.push(sum);
        }

        Self { durations, prefix }
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    pub fn duration(&self, index: usize) -> Option<f64> {
        self.durations.get(index).copied()
    }

    pub fn total(&self) -> f64 {
        self.prefix.last().copied().unwrap_or(0.0)
    }

    /// Sum of the durations of clips `[0, index)`; indices past the end give the total
    pub fn cumulative_before(&self, index: usize) -> f64 {
        self.prefix[index.min(self.durations.len())]
    }

    /// Map global seconds to a clip and an offset inside it.
    ///
    /// The input is clamped to `[0, total]`. A time exactly on a boundary
    /// belongs to the start of the next clip, and the total itself maps to
    /// `(len, 0)`, the finished position.
    ///
    /// ```
    /// # use dialogue_player::playback::Timeline;
    /// let timeline = Timeline::new([3.0, 4.0, 5.0]);
    /// let position = timeline.locate(6.0);
    /// assert_eq!((position.index, position.offset), (1, 3.0));
    /// assert_eq!(timeline.locate(3.0).index, 1);
    /// assert_eq!(timeline.locate(12.0).index, 3);
    /// ```
    pub fn locate(&self, seconds: f64) -> PlaybackPosition {
        let total = self.total();
        let t = if seconds.is_finite() { seconds.clamp(0.0, total) } else { 0.0 };

        if t >= total {
            return PlaybackPosition { index: self.len(), offset: 0.0 };
        }

        // Count the clips that end at or before t; that count is the index of
        // the clip containing t (zero-length clips are skipped over).
        let index = self.prefix[1..].partition_point(|&end| end <= t);
        PlaybackPosition {
            index,
            offset: t - self.prefix[index],
        }
    }

    /// Global seconds for a position, the inverse of [`locate`](Self::locate)
    pub fn global_seconds(&self, position: PlaybackPosition) -> f64 {
        (self.cumulative_before(position.index) + position.offset.max(0.0)).min(self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    #[test]
    fn test_default_timeline_is_empty() {
        let timeline = Timeline::default();
        assert_eq!(timeline, Timeline::new([]));
        assert_eq!(timeline.cumulative_before(0), 0.0);
        assert_eq!(timeline.cumulative_before(4), 0.0);
        assert_eq!(timeline.total(), 0.0);
        assert_eq!(timeline.global_seconds(PlaybackPosition { index: 0, offset: 1.0 }), 0.0);
        assert_eq!(timeline.locate(2.0).index, 0);
    }

    #[test]
    fn test_cumulative_before() {
        let timeline = Timeline::new([3.0, 4.0, 5.0]);
        assert_eq!(timeline.cumulative_before(0), 0.0);
        assert_eq!(timeline.cumulative_before(1), 3.0);
        assert_eq!(timeline.cumulative_before(2), 7.0);
        assert_eq!(timeline.cumulative_before(3), 12.0);
        assert_eq!(timeline.cumulative_before(99), 12.0);
        assert_eq!(timeline.total(), 12.0);
    }

    #[test]
    fn test_locate_half_way() {
        let timeline = Timeline::new([3.0, 4.0, 5.0]);
        let position = timeline.locate(0.5 * timeline.total());
        assert_eq!(position.index, 1);
        assert_eq!(position.offset, 3.0);
    }

    #[test]
    fn test_locate_boundaries_resolve_to_next_clip() {
        let timeline = Timeline::new([3.0, 4.0, 5.0]);
        assert_eq!(timeline.locate(0.0), PlaybackPosition { index: 0, offset: 0.0 });
        assert_eq!(timeline.locate(3.0), PlaybackPosition { index: 1, offset: 0.0 });
        assert_eq!(timeline.locate(7.0), PlaybackPosition { index: 2, offset: 0.0 });
        assert_eq!(timeline.locate(12.0), PlaybackPosition { index: 3, offset: 0.0 });
    }

    #[test]
    fn test_locate_clamps() {
        let timeline = Timeline::new([3.0, 4.0]);
        assert_eq!(timeline.locate(-5.0).index, 0);
        assert_eq!(timeline.locate(100.0).index, 2);
        assert_eq!(timeline.locate(f64::NAN).index, 0);
    }

    #[test]
    fn test_locate_skips_zero_length_clips() {
        let timeline = Timeline::new([2.0, 0.0, 0.0, 1.0]);
        assert_eq!(timeline.locate(2.0).index, 3);
        assert_eq!(timeline.locate(1.0).index, 0);
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = Timeline::new(Vec::new());
        assert_eq!(timeline.total(), 0.0);
        assert_eq!(timeline.locate(0.0), PlaybackPosition { index: 0, offset: 0.0 });
        assert_eq!(timeline.cumulative_before(3), 0.0);
    }

    #[test]
    fn test_invalid_durations_count_as_zero() {
        let timeline = Timeline::new([f64::NAN, -1.0, 2.0]);
        assert_eq!(timeline.durations(), &[0.0, 0.0, 2.0]);
        assert_eq!(timeline.total(), 2.0);
    }

    #[test]
    fn test_global_seconds_round_trip() {
        let timeline = Timeline::new([1.5, 2.5, 3.0]);
        let position = timeline.locate(4.25);
        assert_eq!(position.index, 2);
        assert!((timeline.global_seconds(position) - 4.25).abs() < 1e-9);
    }

    #[quickcheck_macros::quickcheck]
    fn prop_locate_brackets_seek_time(raw: Vec<u16>, fraction: u16) -> TestResult {
        let durations: Vec<f64> = raw.iter().map(|&d| f64::from(d) / 100.0).collect();
        let timeline = Timeline::new(durations.iter().copied());
        if timeline.total() <= 0.0 {
            return TestResult::discard();
        }

        let f = f64::from(fraction) / f64::from(u16::MAX);
        let t = f * timeline.total();
        let position = timeline.locate(t);

        if position.index > durations.len() {
            return TestResult::failed();
        }
        if position.index == durations.len() {
            return TestResult::from_bool(t >= timeline.total());
        }

        let start = timeline.cumulative_before(position.index);
        let end = timeline.cumulative_before(position.index + 1);
        TestResult::from_bool(start <= t && t < end)
    }

    #[quickcheck_macros::quickcheck]
    fn prop_cumulative_is_monotonic(raw: Vec<u16>) -> bool {
        let timeline = Timeline::new(raw.iter().map(|&d| f64::from(d)));
        (0..timeline.len()).all(|i| timeline.cumulative_before(i) <= timeline.cumulative_before(i + 1))
    }
}
