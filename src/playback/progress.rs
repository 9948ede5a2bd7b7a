//! Progress reporting
//!
//! Samples the live position while playing and turns it into a normalized
//! fraction plus `m:ss` labels. Owns the one ticker that drives sampling.

use std::time::Duration;

use tracing::{debug, trace};

use super::timeline::Timeline;
use super::transport::PlayerHost;
use super::types::{PlayerEvent, TickerTicket};

/// Format seconds as `m:ss`.
///
/// ```
/// # use dialogue_player::playback::format_time;
/// assert_eq!(format_time(0.0), "0:00");
/// assert_eq!(format_time(65.9), "1:05");
/// assert_eq!(format_time(f64::NAN), "0:00");
/// ```
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

/// One progress reading
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSample {
    pub fraction: f64,
    pub elapsed: f64,
    pub total: f64,
}

impl ProgressSample {
    fn new(elapsed: f64, total: f64) -> Self {
        let fraction = if total > 0.0 { (elapsed / total).clamp(0.0, 1.0) } else { 0.0 };
        Self { fraction, elapsed, total }
    }

    pub fn to_event(&self) -> PlayerEvent {
        PlayerEvent::Progress {
            fraction: self.fraction,
            current_label: format_time(self.elapsed),
            total_label: format_time(self.total),
            elapsed_seconds: self.elapsed,
            total_seconds: self.total,
        }
    }
}

#[derive(Debug)]
pub struct ProgressReporter {
    interval: Duration,
    ticker: Option<TickerTicket>,
    issued: u64,
    /// Global start of the bound clip, captured when it was bound
    anchor: f64,
    floor_elapsed: f64,
    floor_fraction: f64,
    last: ProgressSample,
}

impl ProgressReporter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ticker: None,
            issued: 0,
            anchor: 0.0,
            floor_elapsed: 0.0,
            floor_fraction: 0.0,
            last: ProgressSample::new(0.0, 0.0),
        }
    }

    /// Start the ticker, replacing any live one
    pub fn start<H: PlayerHost>(&mut self, host: &mut H) -> TickerTicket {
        self.cancel(host);
        self.issued = self.issued.wrapping_add(1);
        let ticket = TickerTicket(self.issued);
        host.start_ticker(ticket, self.interval);
        self.ticker = Some(ticket);
        debug!(ticket = ticket.0, "progress ticker started");
        ticket
    }

    pub fn cancel<H: PlayerHost>(&mut self, host: &mut H) {
        if let Some(ticket) = self.ticker.take() {
            host.cancel_ticker(ticket);
            debug!(ticket = ticket.0, "progress ticker cancelled");
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Whether a tick carrying `ticket` should be sampled
    pub fn accepts(&self, ticket: TickerTicket) -> bool {
        self.ticker == Some(ticket)
    }

    /// Record the start of a newly bound clip on the global timeline
    pub fn anchor(&mut self, clip_start: f64) {
        self.anchor = clip_start;
    }

    /// Allow the next reading to move backwards
    pub fn reset_floor(&mut self) {
        self.floor_elapsed = 0.0;
        self.floor_fraction = 0.0;
    }

    /// Reading for the bound clip at `offset` seconds into it
    pub fn sample(&mut self, offset: f64, timeline: &Timeline) -> ProgressSample {
        let offset = if offset.is_finite() { offset.max(0.0) } else { 0.0 };
        self.show(self.anchor + offset, timeline)
    }

    /// Reading at an explicit global position
    pub fn show(&mut self, elapsed: f64, timeline: &Timeline) -> ProgressSample {
        let total = timeline.total();
        let elapsed = elapsed.clamp(0.0, total).max(self.floor_elapsed.min(total));
        let mut sample = ProgressSample::new(elapsed, total);
        sample.fraction = sample.fraction.max(self.floor_fraction);

        self.floor_elapsed = sample.elapsed;
        self.floor_fraction = sample.fraction;
        trace!(fraction = sample.fraction, elapsed = sample.elapsed, "progress");
        self.last = sample.clone();
        sample
    }

    /// Zero progress; clears the floor
    pub fn clear(&mut self, timeline: &Timeline) -> ProgressSample {
        self.anchor = 0.0;
        self.reset_floor();
        self.show(0.0, timeline)
    }

    /// Re-emit the last reading against a changed total
    pub fn refresh(&mut self, timeline: &Timeline) -> ProgressSample {
        let elapsed = self.last.elapsed;
        self.show(elapsed, timeline)
    }

    pub fn last(&self) -> &ProgressSample {
        &self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::transport::ClipTransport;
    use crate::playback::types::{LoadRequest, PlayTicket};

    #[derive(Default)]
    struct TickerLog {
        started: Vec<TickerTicket>,
        cancelled: Vec<TickerTicket>,
    }

    struct NoClip;

    impl ClipTransport for NoClip {
        fn load(&mut self, _request: &LoadRequest) {}
        fn play(&mut self, _ticket: PlayTicket) {}
        fn pause(&mut self) {}
        fn set_position(&mut self, _seconds: f64) {}
        fn position(&self) -> f64 {
            0.0
        }
        fn set_volume(&mut self, _volume: f32) {}
    }

    impl PlayerHost for TickerLog {
        type Transport = NoClip;

        fn open_clip(&mut self, _index: usize) -> NoClip {
            NoClip
        }

        fn start_ticker(&mut self, ticket: TickerTicket, _interval: Duration) {
            self.started.push(ticket);
        }

        fn cancel_ticker(&mut self, ticket: TickerTicket) {
            self.cancelled.push(ticket);
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(9.99), "0:09");
        assert_eq!(format_time(60.0), "1:00");
        assert_eq!(format_time(754.0), "12:34");
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }

    #[test]
    fn test_single_ticker() {
        let mut host = TickerLog::default();
        let mut reporter = ProgressReporter::new(Duration::from_millis(100));

        let first = reporter.start(&mut host);
        let second = reporter.start(&mut host);
        assert_ne!(first, second);
        assert_eq!(host.started, vec![first, second]);
        assert_eq!(host.cancelled, vec![first]);
        assert!(!reporter.accepts(first));
        assert!(reporter.accepts(second));

        reporter.cancel(&mut host);
        assert!(!reporter.is_running());
        assert!(!reporter.accepts(second));
        reporter.cancel(&mut host);
        assert_eq!(host.cancelled, vec![first, second]);
    }

    #[test]
    fn test_sample_uses_anchor() {
        let timeline = Timeline::new([3.0, 4.0, 5.0]);
        let mut reporter = ProgressReporter::new(Duration::from_millis(100));
        reporter.anchor(timeline.cumulative_before(1));

        let sample = reporter.sample(1.0, &timeline);
        assert_eq!(sample.elapsed, 4.0);
        assert!((sample.fraction - 4.0 / 12.0).abs() < 1e-9);
        assert_eq!(sample.to_event(), PlayerEvent::Progress {
            fraction: sample.fraction,
            current_label: "0:04".to_string(),
            total_label: "0:12".to_string(),
            elapsed_seconds: 4.0,
            total_seconds: 12.0,
        });
    }

    #[test]
    fn test_longer_total_does_not_move_fraction_back() {
        let mut reporter = ProgressReporter::new(Duration::from_millis(100));
        let before = Timeline::new([2.0, 2.0]);
        reporter.anchor(2.0);
        let first = reporter.sample(1.0, &before);
        assert!((first.fraction - 0.75).abs() < 1e-9);

        let after = Timeline::new([8.0, 2.0]);
        let second = reporter.sample(1.1, &after);
        assert!(second.fraction >= first.fraction);
        assert!(second.elapsed >= first.elapsed);
    }

    #[test]
    fn test_reset_floor_allows_backwards() {
        let timeline = Timeline::new([10.0]);
        let mut reporter = ProgressReporter::new(Duration::from_millis(100));
        reporter.show(8.0, &timeline);
        assert_eq!(reporter.show(2.0, &timeline).elapsed, 8.0);

        reporter.reset_floor();
        assert_eq!(reporter.show(2.0, &timeline).elapsed, 2.0);
    }

    #[test]
    fn test_clear_and_empty_timeline() {
        let mut reporter = ProgressReporter::new(Duration::from_millis(100));
        let empty = Timeline::default();
        let sample = reporter.clear(&empty);
        assert_eq!(sample.fraction, 0.0);
        assert_eq!(sample.to_event(), PlayerEvent::Progress {
            fraction: 0.0,
            current_label: "0:00".to_string(),
            total_label: "0:00".to_string(),
            elapsed_seconds: 0.0,
            total_seconds: 0.0,
        });
    }
}
