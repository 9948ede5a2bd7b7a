//! Host-facing seams
//!
//! The engine never touches audio itself. A host (the browser bindings, a
//! test harness) supplies one [`ClipTransport`] per clip and a periodic
//! ticker, and reports what happened back through the
//! [`DialoguePlayer`](super::DialoguePlayer) notification methods.

use std::time::Duration;

use super::types::{LoadRequest, PlayTicket, TickerTicket};

/// Audio transport of a single clip
///
/// Every method returns immediately. Outcomes arrive later:
/// - `load` -> `clip_loaded(epoch, index, seconds)` or `clip_errored(epoch, index, message)`
/// - `play` -> `play_started(ticket)` or `play_rejected(ticket, message)`,
///   then `clip_ended(ticket)` when the clip reaches its natural end
pub trait ClipTransport {
    fn load(&mut self, request: &LoadRequest);
    fn play(&mut self, ticket: PlayTicket);
    fn pause(&mut self);
    fn set_position(&mut self, seconds: f64);
    /// Live playback position in seconds
    fn position(&self) -> f64;
    fn set_volume(&mut self, volume: f32);
    /// The clip was discarded; drop any underlying resource
    fn release(&mut self) {}
}

pub trait PlayerHost {
    type Transport: ClipTransport;

    /// Create the transport for clip `index`. Loading starts separately.
    fn open_clip(&mut self, index: usize) -> Self::Transport;

    /// Start calling `tick(ticket)` every `interval`
    fn start_ticker(&mut self, ticket: TickerTicket, interval: Duration);

    fn cancel_ticker(&mut self, ticket: TickerTicket);
}
