//! # Dialogue player
//!
//! Wires the clip registry, the playback controller, the progress reporter
//! and seek resolution to a [`PlayerHost`], and queues [`PlayerEvent`]s for
//! the presentation layer.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use dialogue_player::playback::{
//!     ClipTransport, DialoguePlayer, LoadRequest, PlayTicket, PlaybackMode, PlayerHost, TickerTicket,
//! };
//! use dialogue_player::{parse_script, PlayerConfig};
//!
//! struct Silent;
//! impl ClipTransport for Silent {
//!     fn load(&mut self, _request: &LoadRequest) {}
//!     fn play(&mut self, _ticket: PlayTicket) {}
//!     fn pause(&mut self) {}
//!     fn set_position(&mut self, _seconds: f64) {}
//!     fn position(&self) -> f64 { 0.0 }
//!     fn set_volume(&mut self, _volume: f32) {}
//! }
//!
//! struct Host;
//! impl PlayerHost for Host {
//!     type Transport = Silent;
//!     fn open_clip(&mut self, _index: usize) -> Silent { Silent }
//!     fn start_ticker(&mut self, _ticket: TickerTicket, _interval: Duration) {}
//!     fn cancel_ticker(&mut self, _ticket: TickerTicket) {}
//! }
//!
//! let dialogue = parse_script("Speaker: Ana\nText: Bom dia!\nSpeaker: Rui\nText: Olá.").unwrap();
//! let mut player = DialoguePlayer::new(PlayerConfig::default(), Host);
//! player.load("greetings", dialogue);
//! player.play();
//! assert_eq!(player.mode(), PlaybackMode::SequencePlaying);
//! assert_eq!(player.active_line(), Some(0));
//! ```

use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::dialogue::Dialogue;
use crate::error::PlayerError;
use crate::script::parse_script_with_format;

use super::controller::PlaybackController;
use super::engine::{Effect, Input};
use super::progress::ProgressReporter;
use super::registry::{ClipRegistry, DurationUpdate, LoadFailure};
use super::seek::resolve_fraction;
use super::timeline::Timeline;
use super::transport::{ClipTransport, PlayerHost};
use super::types::{LoadEpoch, PlayTicket, PlaybackMode, PlaybackPosition, PlayerEvent, TickerTicket};

/// Volume restored by unmuting when no earlier level is known
pub const DEFAULT_UNMUTE_VOLUME: f32 = 0.7;

pub struct DialoguePlayer<H: PlayerHost> {
    config: PlayerConfig,
    host: H,
    registry: ClipRegistry<H::Transport>,
    controller: PlaybackController,
    progress: ProgressReporter,
    dialogue: Dialogue,
    volume: f32,
    last_volume: f32,
    show_translations: bool,
    events: Vec<PlayerEvent>,
}

impl<H: PlayerHost> DialoguePlayer<H> {
    pub fn new(config: PlayerConfig, host: H) -> Self {
        let progress = ProgressReporter::new(config.progress.interval());
        let volume = config.audio.volume.clamp(0.0, 1.0);
        let show_translations = config.show_translations;
        Self {
            config,
            host,
            registry: ClipRegistry::new(),
            controller: PlaybackController::new(),
            progress,
            dialogue: Dialogue::default(),
            volume,
            last_volume: volume,
            show_translations,
            events: Vec::new(),
        }
    }

    /// Replace the loaded dialogue. Playback stops and every clip of the
    /// previous dialogue is released before the new clips start loading.
    pub fn load(&mut self, dialogue_id: &str, dialogue: Dialogue) {
        if !self.registry.is_empty() || self.controller.mode() != PlaybackMode::Stopped {
            self.dispatch(Input::Stop);
        }

        self.registry.load(dialogue_id, &dialogue.lines, &self.config.audio, &mut self.host);
        self.controller.set_volume(self.volume, &mut self.registry);
        info!(dialogue = dialogue_id, lines = dialogue.len(), "dialogue loaded");
        self.dialogue = dialogue;

        if self.registry.is_empty() {
            self.warn(PlayerError::ConfigurationMissing(format!("dialogue '{dialogue_id}' has no lines")));
        }
        let sample = self.progress.clear(self.registry.timeline());
        self.events.push(sample.to_event());
    }

    /// Parse a script with the configured format and load it
    pub fn load_script(&mut self, dialogue_id: &str, source: &str) -> Result<(), PlayerError> {
        let dialogue = parse_script_with_format(source, &self.config.script)?;
        self.load(dialogue_id, dialogue);
        Ok(())
    }

    /// Load a dialogue compiled into the binary
    pub fn load_embedded(&mut self, dialogue_id: &str) -> Result<(), PlayerError> {
        let dialogue = crate::embedded_dialogue(dialogue_id, &self.config.script)?;
        self.load(dialogue_id, dialogue);
        Ok(())
    }

    /// Start, resume or (while playing a sequence) pause
    pub fn play(&mut self) {
        self.dispatch(Input::Play);
    }

    pub fn pause(&mut self) {
        self.dispatch(Input::Pause);
    }

    pub fn stop(&mut self) {
        if self.registry.is_empty() {
            self.warn(PlayerError::ConfigurationMissing("no dialogue loaded".to_string()));
            return;
        }
        self.dispatch(Input::Stop);
    }

    /// Play exactly one line from its beginning
    pub fn select_line(&mut self, index: usize) {
        self.dispatch(Input::PlaySinglePhrase(index));
    }

    pub fn seek_to_phrase_index(&mut self, index: usize) {
        self.select_line(index);
    }

    /// Seek to a fraction of the whole dialogue.
    ///
    /// While playing, the clip under the target restarts from its beginning.
    /// Otherwise only the cursor, highlight and progress move.
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        if self.registry.is_empty() {
            self.warn(PlayerError::ConfigurationMissing("no dialogue loaded".to_string()));
            return;
        }
        let target = match resolve_fraction(fraction, self.registry.timeline()) {
            Ok(target) => target,
            Err(error) => {
                self.warn(error);
                return;
            }
        };
        debug!(fraction = target.fraction, seconds = target.seconds, index = target.position.index, "seek");

        self.dispatch(Input::Reposition(target.position.index));
        if !target.is_end(self.registry.timeline()) && !self.controller.mode().is_playing() {
            let sample = self.progress.show(target.seconds, self.registry.timeline());
            self.events.push(sample.to_event());
            // Playback restarts at the clip start, behind the shown position
            self.progress.reset_floor();
        }
    }

    /// Set the volume of every clip, clamped to `[0, 1]`
    pub fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            warn!(volume, "ignoring non-numeric volume");
            self.events.push(PlayerEvent::Warning {
                message: format!("Invalid volume: {volume}"),
            });
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        if volume > 0.0 {
            self.last_volume = volume;
        }
        self.apply_volume(volume);
    }

    /// Mute, or restore the level from before muting
    pub fn toggle_mute(&mut self) {
        if self.volume > 0.0 {
            self.last_volume = self.volume;
            self.apply_volume(0.0);
        } else {
            let restore = if self.last_volume > 0.0 { self.last_volume } else { DEFAULT_UNMUTE_VOLUME };
            self.apply_volume(restore);
        }
    }

    /// Flip whether translations are shown alongside each line
    pub fn toggle_translations(&mut self) {
        self.set_show_translations(!self.show_translations);
    }

    pub fn set_show_translations(&mut self, visible: bool) {
        if self.show_translations == visible {
            return;
        }
        self.show_translations = visible;
        debug!(visible, "translation visibility changed");
        self.events.push(PlayerEvent::TranslationsToggled { visible });
    }

    fn apply_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.controller.set_volume(volume, &mut self.registry);
        self.events.push(PlayerEvent::VolumeChanged {
            volume,
            muted: volume == 0.0,
        });
    }

    /// A clip resource finished loading and reported its duration
    pub fn clip_loaded(&mut self, epoch: LoadEpoch, index: usize, seconds: f64) {
        if let DurationUpdate::Applied { .. } = self.registry.clip_loaded(epoch, index, seconds) {
            self.duration_changed();
        }
    }

    /// A clip resource failed to load
    pub fn clip_errored(&mut self, epoch: LoadEpoch, index: usize, message: &str) {
        match self.registry.clip_errored(epoch, index, message) {
            LoadFailure::Ignored | LoadFailure::Retrying { .. } => {}
            LoadFailure::Unplayable(error) => {
                self.events.push(PlayerEvent::ClipError {
                    index,
                    message: error.to_string(),
                });
                self.duration_changed();

                if let Some(binding) = self.controller.bound() {
                    if binding.index == index && self.controller.mode().is_playing() {
                        self.dispatch(Input::PlayRejected {
                            ticket: binding.ticket(),
                            message: message.to_string(),
                        });
                    }
                }
            }
        }
    }

    pub fn play_started(&mut self, ticket: PlayTicket) {
        self.dispatch(Input::PlayStarted(ticket));
    }

    pub fn play_rejected(&mut self, ticket: PlayTicket, message: &str) {
        self.dispatch(Input::PlayRejected {
            ticket,
            message: message.to_string(),
        });
    }

    pub fn clip_ended(&mut self, ticket: PlayTicket) {
        self.dispatch(Input::ClipEnded(ticket));
    }

    /// Periodic ticker callback
    pub fn tick(&mut self, ticket: TickerTicket) {
        if !self.progress.accepts(ticket) {
            debug!(ticket = ticket.0, "ignoring stale tick");
            return;
        }
        self.sample_progress();
    }

    /// Take the queued events
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn mode(&self) -> PlaybackMode {
        self.controller.mode()
    }

    pub fn cursor(&self) -> usize {
        self.controller.cursor()
    }

    pub fn active_line(&self) -> Option<usize> {
        self.controller.state().highlighted
    }

    pub fn position(&self) -> PlaybackPosition {
        self.controller.position(&self.registry)
    }

    pub fn timeline(&self) -> &Timeline {
        self.registry.timeline()
    }

    pub fn registry(&self) -> &ClipRegistry<H::Transport> {
        &self.registry
    }

    pub fn dialogue(&self) -> &Dialogue {
        &self.dialogue
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.volume == 0.0
    }

    pub fn shows_translations(&self) -> bool {
        self.show_translations
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn dispatch(&mut self, input: Input) {
        let effects = self.controller.apply(input, &mut self.registry);
        for effect in effects {
            self.handle_effect(effect);
        }
    }

    fn handle_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Bind(ticket) => {
                let start = self.registry.timeline().cumulative_before(ticket.index);
                self.progress.anchor(start);
            }
            Effect::StartTicker => {
                self.progress.start(&mut self.host);
            }
            Effect::CancelTicker => self.progress.cancel(&mut self.host),
            Effect::ResetProgress => {
                self.progress.reset_floor();
                if self.progress.is_running() {
                    self.sample_progress();
                }
            }
            Effect::ClearProgress => {
                let sample = self.progress.clear(self.registry.timeline());
                self.events.push(sample.to_event());
            }
            Effect::ActiveLine(index) => self.events.push(PlayerEvent::ActiveLineChanged { index }),
            Effect::ModeChanged(mode) => self.events.push(PlayerEvent::ModeChanged { mode }),
            Effect::Warning(error) => self.warn(error),
            // Transport commands are carried out by the controller
            Effect::Silence(_) | Effect::SilenceAll | Effect::Pause(_) | Effect::Play(_) => {}
        }
    }

    fn sample_progress(&mut self) {
        let Some(binding) = self.controller.bound() else {
            return;
        };
        let offset = self
            .registry
            .transport(binding.index)
            .map_or(0.0, |transport| transport.position());
        let sample = self.progress.sample(offset, self.registry.timeline());
        self.events.push(sample.to_event());
    }

    /// The duration table changed; re-emit progress against the new total
    fn duration_changed(&mut self) {
        if self.progress.is_running() && self.controller.bound().is_some() {
            self.sample_progress();
        } else {
            let sample = self.progress.refresh(self.registry.timeline());
            self.events.push(sample.to_event());
        }
    }

    fn warn(&mut self, error: PlayerError) {
        warn!(%error, "playback warning");
        self.events.push(PlayerEvent::Warning {
            message: error.to_string(),
        });
    }
}
