//! Playback controller
//!
//! Holds the [`PlaybackState`] and is the only component that commands clip
//! transports to play, pause or seek. Inputs are run through
//! [`transition`]; transport effects are carried out here and the remaining
//! effects (ticker, progress, outward events) are handed back to the caller.

use tracing::{debug, trace};

use super::engine::{transition, Binding, Effect, Input, PlaybackState};
use super::registry::ClipRegistry;
use super::transport::ClipTransport;
use super::types::{PlaybackMode, PlaybackPosition};

#[derive(Debug, Default)]
pub struct PlaybackController {
    state: PlaybackState,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one input. Returns the effects that are not transport commands.
    pub fn apply<T: ClipTransport>(&mut self, input: Input, registry: &mut ClipRegistry<T>) -> Vec<Effect> {
        trace!(?input, mode = ?self.state.mode, "playback input");
        let step = transition(&self.state, input, &*registry);
        self.state = step.state;

        let mut rest = Vec::new();
        for effect in step.effects {
            match effect {
                Effect::Silence(index) => {
                    if let Some(transport) = registry.transport_mut(index) {
                        transport.pause();
                        transport.set_position(0.0);
                    }
                }
                Effect::SilenceAll => {
                    for transport in registry.transports_mut() {
                        transport.pause();
                        transport.set_position(0.0);
                    }
                }
                Effect::Pause(index) => {
                    if let Some(transport) = registry.transport_mut(index) {
                        transport.pause();
                    }
                }
                Effect::Bind(ticket) => {
                    if let Some(transport) = registry.transport_mut(ticket.index) {
                        transport.set_position(0.0);
                    }
                    // The progress anchor is taken by the caller
                    rest.push(effect);
                }
                Effect::Play(ticket) => match registry.transport_mut(ticket.index) {
                    Some(transport) => transport.play(ticket),
                    None => debug!(index = ticket.index, "no transport for clip"),
                },
                other => rest.push(other),
            }
        }
        rest
    }

    /// Apply a volume to every clip
    pub fn set_volume<T: ClipTransport>(&self, volume: f32, registry: &mut ClipRegistry<T>) {
        for transport in registry.transports_mut() {
            transport.set_volume(volume);
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn mode(&self) -> PlaybackMode {
        self.state.mode
    }

    pub fn cursor(&self) -> usize {
        self.state.cursor
    }

    pub fn bound(&self) -> Option<Binding> {
        self.state.bound
    }

    /// Cursor plus the live offset of the bound clip
    pub fn position<T: ClipTransport>(&self, registry: &ClipRegistry<T>) -> PlaybackPosition {
        let offset = match self.state.bound {
            Some(binding) if binding.index == self.state.cursor => {
                registry.transport(binding.index).map_or(0.0, |t| t.position().max(0.0))
            }
            _ => 0.0,
        };
        PlaybackPosition {
            index: self.state.cursor,
            offset,
        }
    }
}
