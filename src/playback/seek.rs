//! Seek resolution
//!
//! Turns a progress-bar fraction into a position on the timeline. The player
//! then hands the resolved clip index to the controller as a reposition.

use crate::error::PlayerError;

use super::timeline::Timeline;
use super::types::PlaybackPosition;

/// Where a fraction seek lands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekTarget {
    /// The fraction after clamping to `[0, 1]`
    pub fraction: f64,
    pub seconds: f64,
    pub position: PlaybackPosition,
}

impl SeekTarget {
    /// The target is past the last clip
    pub fn is_end(&self, timeline: &Timeline) -> bool {
        self.position.index >= timeline.len()
    }
}

/// Resolve a fraction of the total duration.
///
/// ```
/// # use dialogue_player::playback::{resolve_fraction, Timeline};
/// let timeline = Timeline::new([3.0, 4.0, 5.0]);
/// let target = resolve_fraction(0.5, &timeline).unwrap();
/// assert_eq!(target.seconds, 6.0);
/// assert_eq!(target.position.index, 1);
///
/// assert!(resolve_fraction(f64::NAN, &timeline).is_err());
/// ```
pub fn resolve_fraction(fraction: f64, timeline: &Timeline) -> Result<SeekTarget, PlayerError> {
    if !fraction.is_finite() {
        return Err(PlayerError::InvalidSeek(fraction));
    }
    let fraction = fraction.clamp(0.0, 1.0);
    let seconds = fraction * timeline.total();
    Ok(SeekTarget {
        fraction,
        seconds,
        position: timeline.locate(seconds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_clamps_fraction() {
        let timeline = Timeline::new([3.0, 4.0, 5.0]);

        let low = resolve_fraction(-0.5, &timeline).unwrap();
        assert_eq!(low.fraction, 0.0);
        assert_eq!(low.position, PlaybackPosition { index: 0, offset: 0.0 });

        let high = resolve_fraction(7.0, &timeline).unwrap();
        assert_eq!(high.fraction, 1.0);
        assert!(high.is_end(&timeline));
    }

    #[test]
    fn test_resolve_rejects_non_finite() {
        let timeline = Timeline::new([1.0]);
        assert_eq!(
            resolve_fraction(f64::INFINITY, &timeline),
            Err(PlayerError::InvalidSeek(f64::INFINITY))
        );
    }

    #[test]
    fn test_resolve_on_boundary_picks_next_clip() {
        let timeline = Timeline::new([2.0, 2.0]);
        let target = resolve_fraction(0.5, &timeline).unwrap();
        assert_eq!(target.position.index, 1);
        assert_eq!(target.position.offset, 0.0);
        assert!(!target.is_end(&timeline));
    }
}
