//! # Playback Module
//!
//! Plays a dialogue as a sequence of independently loaded audio clips, one
//! per line, while presenting them as a single timeline.
//!
//! ## Purpose
//! 1. **Sequencing** - play every line in order, advancing at the end of each clip
//! 2. **Single phrases** - play one selected line with no auto-advance
//! 3. **Seeking** - jump to a fraction of the whole dialogue or to a line
//! 4. **Progress** - a normalized fraction plus `m:ss` labels, sampled every tick
//! 5. **Highlighting** - which transcript line is active
//!
//! ## Sub-modules
//! - `types` - modes, tickets, positions and [`PlayerEvent`]
//! - `transport` - the [`ClipTransport`] and [`PlayerHost`] seams a host implements
//! - `timeline` - [`Timeline`] snapshot mapping global seconds to (clip, offset)
//! - `registry` - [`ClipRegistry`] owning the clips, their durations and transports
//! - `engine` - the pure [`transition`] function of the playback state machine
//! - `controller` - [`PlaybackController`], the only code commanding transports
//! - `progress` - [`ProgressReporter`] and [`format_time`]
//! - `seek` - [`resolve_fraction`]
//! - `player` - [`DialoguePlayer`], wiring everything to a host
//!
//! ## Host protocol
//! ```text
//!   host                         DialoguePlayer
//!    │  load / play / seek ...  ──▶  │
//!    │  ◀── ClipTransport::load/play/pause/set_position
//!    │  clip_loaded / clip_errored ─▶│  (tagged with LoadEpoch)
//!    │  play_started / play_rejected / clip_ended ─▶ (tagged with PlayTicket)
//!    │  tick ─▶                      │  (tagged with TickerTicket)
//!    │  ◀── drain_events()           │
//! ```
//! Every notification carries the tag it was issued with, so anything that
//! belongs to an earlier load, bind or ticker is dropped.
//!
//! ## Timeline
//! A clip's duration is its measured length once the resource has loaded,
//! and an estimate from the word count until then:
//!
//! ```text
//! durations  [3.0, 4.0, 5.0]
//! prefix     0.0  3.0  7.0  12.0
//! locate(6.0) = (clip 1, 3.0 s in)
//! ```

mod controller;
mod engine;
mod player;
mod progress;
mod registry;
mod seek;
mod timeline;
mod transport;
mod types;


pub use controller::PlaybackController;
pub use engine::{transition, Binding, Effect, Input, PlaybackState, Step};
pub use player::{DialoguePlayer, DEFAULT_UNMUTE_VOLUME};
pub use progress::{format_time, ProgressReporter, ProgressSample};
pub use registry::{Clip, ClipCatalog, ClipRegistry, ClipSource, ClipStatus, DurationUpdate, LoadFailure};
pub use seek::{resolve_fraction, SeekTarget};
pub use timeline::Timeline;
pub use transport::{ClipTransport, PlayerHost};
pub use types::{
    Generation, LoadAttempt, LoadEpoch, LoadRequest, PlayTicket, PlaybackMode, PlaybackPosition, PlayerEvent,
    TickerTicket,
};
