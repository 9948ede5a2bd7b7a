//! Playback type definitions
//!
//! Modes, positions, the tickets that tag asynchronous notifications, and the
//! events the player emits towards the presentation layer.

use serde::Serialize;

/// Playback mode of the controller
///
/// Governs whether the end of a clip auto-advances to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackMode {
    #[default]
    Stopped,
    /// Playing through all lines in order
    SequencePlaying,
    SequencePaused,
    /// Playing exactly one line, no auto-advance
    SinglePhrasePlaying,
    /// The selected line played to its end; cursor still points at it
    SinglePhraseFinished,
}

impl PlaybackMode {
    pub fn is_playing(self) -> bool {
        matches!(self, PlaybackMode::SequencePlaying | PlaybackMode::SinglePhrasePlaying)
    }
}

/// Id of one bind of a clip to the transport
///
/// Every bind gets a fresh generation; notifications carrying an older one
/// belong to a superseded bind and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

/// Handed to [`ClipTransport::play`](super::ClipTransport::play); the host
/// echoes it back with `play_started`, `play_rejected` and `clip_ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayTicket {
    pub index: usize,
    pub generation: Generation,
}

/// Id of one dialogue load; loaded/errored notifications from an earlier
/// load are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct LoadEpoch(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadAttempt {
    Primary,
    Fallback,
}

/// Request to start loading a clip resource
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRequest {
    pub epoch: LoadEpoch,
    pub index: usize,
    pub locator: String,
    pub attempt: LoadAttempt,
}

/// Id of the progress ticker; only one is live at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TickerTicket(pub u64);

/// (active clip index, seconds into that clip)
///
/// `index == clip count` means the dialogue finished.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackPosition {
    pub index: usize,
    pub offset: f64,
}

/// Events for the presentation layer, drained from the player after each call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerEvent {
    #[serde(rename_all = "camelCase")]
    Progress {
        fraction: f64,
        current_label: String,
        total_label: String,
        elapsed_seconds: f64,
        total_seconds: f64,
    },
    /// `None` clears the highlight
    ActiveLineChanged { index: Option<usize> },
    ModeChanged { mode: PlaybackMode },
    ClipError { index: usize, message: String },
    Warning { message: String },
    VolumeChanged { volume: f32, muted: bool },
    TranslationsToggled { visible: bool },
}
