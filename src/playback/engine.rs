//! Playback state machine
//!
//! The controller's state is a plain [`PlaybackState`] value. Every command
//! and every transport notification goes through [`transition`], a pure
//! function returning the next state plus the list of [`Effect`]s to carry
//! out. Nothing here touches a transport, so the whole machine can be tested
//! without audio.
//!
//! ## Modes
//! ```text
//!              play                       clip end (last clip) / stop
//!   Stopped ─────────▶ SequencePlaying ─────────────────────────▶ Stopped
//!                        │  ▲      │ clip end: next clip, same mode
//!                 pause/ │  │ play │
//!                 play   ▼  │      │
//!                    SequencePaused
//!
//!   any ── play_single_phrase(k) ──▶ SinglePhrasePlaying ── clip end ──▶ SinglePhraseFinished
//!   SinglePhraseFinished ── play ──▶ SequencePlaying at k + 1
//! ```
//!
//! ## Stale notifications
//! Each bind of a clip gets a new [`Generation`]. `clip_ended`,
//! `play_started` and `play_rejected` are only acted on when their ticket
//! matches the current binding and the mode is still a playing one.

use tracing::debug;

use crate::error::PlayerError;

use super::registry::ClipCatalog;
use super::types::{Generation, PlayTicket, PlaybackMode};

/// The clip currently bound to the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub index: usize,
    pub generation: Generation,
}

impl Binding {
    pub fn ticket(self) -> PlayTicket {
        PlayTicket {
            index: self.index,
            generation: self.generation,
        }
    }

    fn matches(self, ticket: PlayTicket) -> bool {
        self.index == ticket.index && self.generation == ticket.generation
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackState {
    pub mode: PlaybackMode,
    pub cursor: usize,
    pub bound: Option<Binding>,
    /// Highlighted transcript line
    pub highlighted: Option<usize>,
    /// Last generation handed out
    pub generation: Generation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Play,
    Pause,
    Stop,
    PlaySinglePhrase(usize),
    /// Move the cursor to a clip; restarts playback there if playing
    Reposition(usize),
    PlayStarted(PlayTicket),
    PlayRejected { ticket: PlayTicket, message: String },
    ClipEnded(PlayTicket),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Pause a clip and rewind it to zero
    Silence(usize),
    /// Pause and rewind every clip
    SilenceAll,
    /// Pause a clip, keeping its position
    Pause(usize),
    /// A clip became the active one: rewind it and anchor progress at its start
    Bind(PlayTicket),
    /// Ask the transport to play
    Play(PlayTicket),
    StartTicker,
    CancelTicker,
    /// Playback was moved by the user; progress may go backwards once
    ResetProgress,
    /// Show zero progress
    ClearProgress,
    ActiveLine(Option<usize>),
    ModeChanged(PlaybackMode),
    Warning(PlayerError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: PlaybackState,
    pub effects: Vec<Effect>,
}

/// Compute the next state for `input`.
///
/// ```
/// use dialogue_player::playback::{transition, ClipCatalog, Input, PlaybackMode, PlaybackState};
///
/// struct ThreeClips;
/// impl ClipCatalog for ThreeClips {
///     fn clip_count(&self) -> usize { 3 }
///     fn is_playable(&self, _index: usize) -> bool { true }
/// }
///
/// let step = transition(&PlaybackState::default(), Input::Play, &ThreeClips);
/// assert_eq!(step.state.mode, PlaybackMode::SequencePlaying);
/// assert_eq!(step.state.cursor, 0);
/// ```
pub fn transition<C: ClipCatalog + ?Sized>(state: &PlaybackState, input: Input, clips: &C) -> Step {
    let mut machine = Machine {
        before: state.clone(),
        state: state.clone(),
        effects: Vec::new(),
        count: clips.clip_count(),
        clips,
        stopped: false,
        repositioned: false,
    };
    machine.handle(input);
    machine.finish()
}

struct Machine<'a, C: ?Sized> {
    before: PlaybackState,
    state: PlaybackState,
    effects: Vec<Effect>,
    count: usize,
    clips: &'a C,
    stopped: bool,
    repositioned: bool,
}

impl<C: ClipCatalog + ?Sized> Machine<'_, C> {
    fn handle(&mut self, input: Input) {
        match input {
            Input::Stop => self.stop(),
            Input::PlayStarted(ticket) => self.play_started(ticket),
            Input::ClipEnded(ticket) => self.clip_ended(ticket),
            Input::PlayRejected { ticket, message } => self.play_rejected(ticket, message),
            command if self.count == 0 => {
                debug!(?command, "no clips loaded");
                self.warn(PlayerError::ConfigurationMissing("no dialogue loaded".to_string()));
            }
            Input::Play => self.play(),
            Input::Pause => self.pause(),
            Input::PlaySinglePhrase(index) => self.play_single_phrase(index),
            Input::Reposition(index) => self.reposition(index),
        }
    }

    fn play(&mut self) {
        match self.state.mode {
            PlaybackMode::SequencePlaying => self.pause(),
            PlaybackMode::SinglePhrasePlaying => {
                self.state.mode = PlaybackMode::SequencePlaying;
                if self.state.bound.is_some() {
                    // The phrase keeps playing; its end now advances
                    debug!(cursor = self.state.cursor, "single phrase promoted to sequence playback");
                } else {
                    // The phrase never started, so no end will arrive for it
                    self.run_sequence(self.state.cursor, None);
                }
            }
            PlaybackMode::SequencePaused => {
                self.state.mode = PlaybackMode::SequencePlaying;
                match self.state.bound {
                    Some(binding) if binding.index == self.state.cursor => self.run_sequence(binding.index, Some(binding)),
                    _ => self.run_sequence(self.state.cursor, None),
                }
            }
            PlaybackMode::Stopped => {
                self.state.mode = PlaybackMode::SequencePlaying;
                let start = if self.state.cursor < self.count { self.state.cursor } else { 0 };
                self.run_sequence(start, None);
            }
            PlaybackMode::SinglePhraseFinished => {
                self.state.mode = PlaybackMode::SequencePlaying;
                let next = self.state.cursor + 1;
                let start = if next < self.count { next } else { 0 };
                self.run_sequence(start, None);
            }
        }
    }

    fn pause(&mut self) {
        if self.state.mode != PlaybackMode::SequencePlaying {
            debug!(mode = ?self.state.mode, "pause ignored");
            return;
        }
        if let Some(binding) = self.state.bound {
            self.effects.push(Effect::Pause(binding.index));
        }
        self.state.mode = PlaybackMode::SequencePaused;
    }

    fn stop(&mut self) {
        // The bound clip goes quiet before anything else changes
        if let Some(binding) = self.state.bound.take() {
            self.effects.push(Effect::Silence(binding.index));
        }
        self.effects.push(Effect::SilenceAll);
        self.state.cursor = 0;
        self.state.highlighted = None;
        self.state.mode = PlaybackMode::Stopped;
        self.stopped = true;
    }

    fn play_single_phrase(&mut self, index: usize) {
        if index >= self.count {
            self.warn(PlayerError::OutOfRange { index, count: self.count });
            return;
        }

        self.stop();
        self.state.cursor = index;
        self.state.mode = PlaybackMode::SinglePhrasePlaying;
        self.repositioned = true;

        let binding = self.bind(index);
        if self.clips.is_playable(index) {
            self.effects.push(Effect::Play(binding.ticket()));
        } else {
            self.state.bound = None;
            self.warn(PlayerError::PlaybackRejected {
                index,
                message: "audio is unavailable".to_string(),
            });
        }
    }

    fn reposition(&mut self, index: usize) {
        if index > self.count {
            self.warn(PlayerError::OutOfRange { index, count: self.count });
            return;
        }
        if index == self.count {
            debug!("repositioned to the end of the dialogue");
            self.stop();
            return;
        }

        if let Some(binding) = self.state.bound.take() {
            self.effects.push(Effect::Silence(binding.index));
        }
        self.state.cursor = index;
        self.repositioned = true;

        if self.state.mode.is_playing() {
            self.state.mode = PlaybackMode::SequencePlaying;
            self.run_sequence(index, None);
        } else {
            self.state.highlighted = Some(index);
            if self.state.mode == PlaybackMode::SinglePhraseFinished {
                self.state.mode = PlaybackMode::Stopped;
            }
        }
    }

    fn play_started(&mut self, ticket: PlayTicket) {
        match self.state.bound {
            Some(binding) if binding.matches(ticket) => {
                if !self.state.mode.is_playing() {
                    // Acknowledgment for a request that was paused in the meantime
                    debug!(index = ticket.index, "late play acknowledgment, pausing again");
                    self.effects.push(Effect::Pause(ticket.index));
                }
            }
            Some(binding) if binding.index == ticket.index => {
                debug!(index = ticket.index, "stale acknowledgment for a rebound clip");
            }
            _ => {
                debug!(index = ticket.index, "stale play acknowledgment, silencing clip");
                self.effects.push(Effect::Silence(ticket.index));
            }
        }
    }

    fn clip_ended(&mut self, ticket: PlayTicket) {
        if !self.is_current(ticket) {
            debug!(index = ticket.index, generation = ticket.generation.0, "ignoring stale clip end");
            return;
        }

        match self.state.mode {
            PlaybackMode::SequencePlaying => self.advance_from(ticket.index),
            PlaybackMode::SinglePhrasePlaying => {
                self.state.bound = None;
                self.state.highlighted = None;
                self.state.mode = PlaybackMode::SinglePhraseFinished;
            }
            PlaybackMode::SequencePaused => {
                // Finished just before the pause landed; resume at the next line
                debug!(index = ticket.index, "clip ended while paused");
                self.state.bound = None;
                let next = ticket.index + 1;
                if next < self.count {
                    self.state.cursor = next;
                    self.state.highlighted = Some(next);
                } else {
                    self.stop();
                }
            }
            mode => debug!(?mode, index = ticket.index, "clip ended outside playback"),
        }
    }

    fn play_rejected(&mut self, ticket: PlayTicket, message: String) {
        if !self.is_current(ticket) || !self.state.mode.is_playing() {
            debug!(index = ticket.index, "ignoring stale play rejection");
            return;
        }

        self.warn(PlayerError::PlaybackRejected {
            index: ticket.index,
            message,
        });
        if self.state.mode == PlaybackMode::SequencePlaying {
            self.advance_from(ticket.index);
        } else {
            self.state.bound = None;
        }
    }

    /// Natural advance (or skip) past the clip at `index`
    fn advance_from(&mut self, index: usize) {
        self.state.bound = None;
        self.run_sequence(index + 1, None);
    }

    /// Start sequence playback at `index`, skipping clips known to be
    /// unplayable. `resume` reuses an existing binding without rewinding.
    fn run_sequence(&mut self, mut index: usize, mut resume: Option<Binding>) {
        loop {
            if index >= self.count {
                debug!("end of dialogue");
                self.stop();
                return;
            }
            self.state.cursor = index;

            if self.clips.is_playable(index) {
                let binding = match resume {
                    Some(binding) => binding,
                    None => self.bind(index),
                };
                self.effects.push(Effect::Play(binding.ticket()));
                return;
            }

            self.warn(PlayerError::PlaybackRejected {
                index,
                message: "audio is unavailable, skipping".to_string(),
            });
            if let Some(binding) = resume.take() {
                self.effects.push(Effect::Silence(binding.index));
                self.state.bound = None;
            }
            index += 1;
        }
    }

    fn bind(&mut self, index: usize) -> Binding {
        self.state.generation = self.state.generation.next();
        let binding = Binding {
            index,
            generation: self.state.generation,
        };
        self.state.bound = Some(binding);
        self.state.highlighted = Some(index);
        self.effects.push(Effect::Bind(binding.ticket()));
        binding
    }

    fn is_current(&self, ticket: PlayTicket) -> bool {
        self.state.bound.is_some_and(|binding| binding.matches(ticket))
    }

    fn warn(&mut self, error: PlayerError) {
        self.effects.push(Effect::Warning(error));
    }

    fn finish(mut self) -> Step {
        let was_playing = self.before.mode.is_playing();
        let is_playing = self.state.mode.is_playing();

        if !was_playing && is_playing {
            self.effects.push(Effect::StartTicker);
        } else if was_playing && !is_playing {
            self.effects.push(Effect::CancelTicker);
        }

        if self.stopped && !is_playing {
            self.effects.push(Effect::ClearProgress);
        } else if self.stopped || self.repositioned {
            self.effects.push(Effect::ResetProgress);
        }

        if self.state.highlighted != self.before.highlighted {
            self.effects.push(Effect::ActiveLine(self.state.highlighted));
        }
        if self.state.mode != self.before.mode {
            debug!(from = ?self.before.mode, to = ?self.state.mode, cursor = self.state.cursor, "playback mode changed");
            self.effects.push(Effect::ModeChanged(self.state.mode));
        }

        Step {
            state: self.state,
            effects: self.effects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Clips {
        playable: Vec<bool>,
    }

    impl Clips {
        fn all(count: usize) -> Self {
            Self { playable: vec![true; count] }
        }
    }

    impl ClipCatalog for Clips {
        fn clip_count(&self) -> usize {
            self.playable.len()
        }

        fn is_playable(&self, index: usize) -> bool {
            self.playable.get(index).copied().unwrap_or(false)
        }
    }

    fn run(state: &PlaybackState, inputs: &[Input], clips: &Clips) -> (PlaybackState, Vec<Effect>) {
        let mut state = state.clone();
        let mut effects = Vec::new();
        for input in inputs {
            let step = transition(&state, input.clone(), clips);
            state = step.state;
            effects.extend(step.effects);
        }
        (state, effects)
    }

    fn ended(state: &PlaybackState) -> Input {
        Input::ClipEnded(state.bound.expect("a bound clip").ticket())
    }

    #[test]
    fn test_play_from_stopped_binds_first_clip() {
        let clips = Clips::all(3);
        let step = transition(&PlaybackState::default(), Input::Play, &clips);

        let binding = step.state.bound.unwrap();
        assert_eq!(binding.index, 0);
        assert_eq!(
            step.effects,
            vec![
                Effect::Bind(binding.ticket()),
                Effect::Play(binding.ticket()),
                Effect::StartTicker,
                Effect::ActiveLine(Some(0)),
                Effect::ModeChanged(PlaybackMode::SequencePlaying),
            ]
        );
    }

    #[test]
    fn test_play_while_playing_pauses() {
        let clips = Clips::all(3);
        let (state, _) = run(&PlaybackState::default(), &[Input::Play], &clips);
        let step = transition(&state, Input::Play, &clips);
        assert_eq!(step.state.mode, PlaybackMode::SequencePaused);
        assert!(step.effects.contains(&Effect::Pause(0)));
        assert!(step.effects.contains(&Effect::CancelTicker));
    }

    #[test]
    fn test_pause_twice_is_noop() {
        let clips = Clips::all(3);
        let (paused, _) = run(&PlaybackState::default(), &[Input::Play, Input::Pause], &clips);
        assert_eq!(paused.mode, PlaybackMode::SequencePaused);

        let step = transition(&paused, Input::Pause, &clips);
        assert_eq!(step.state, paused);
        assert!(step.effects.is_empty());
    }

    #[test]
    fn test_resume_keeps_binding_and_position() {
        let clips = Clips::all(3);
        let (paused, _) = run(&PlaybackState::default(), &[Input::Play, Input::Pause], &clips);
        let binding = paused.bound.unwrap();

        let step = transition(&paused, Input::Play, &clips);
        assert_eq!(step.state.bound, Some(binding));
        assert!(step.effects.contains(&Effect::Play(binding.ticket())));
        assert!(!step.effects.iter().any(|e| matches!(e, Effect::Bind(_))));
    }

    #[test]
    fn test_stop_silences_bound_clip_first() {
        let clips = Clips::all(3);
        let (playing, _) = run(&PlaybackState::default(), &[Input::Play], &clips);
        let step = transition(&playing, Input::Stop, &clips);

        assert_eq!(step.effects[0], Effect::Silence(0));
        assert_eq!(step.effects[1], Effect::SilenceAll);
        assert_eq!(step.state.mode, PlaybackMode::Stopped);
        assert_eq!(step.state.cursor, 0);
        assert_eq!(step.state.bound, None);
        assert!(step.effects.contains(&Effect::ClearProgress));
        assert!(step.effects.contains(&Effect::ActiveLine(None)));
    }

    #[test]
    fn test_sequence_advances_and_stops_at_end() {
        let clips = Clips::all(2);
        let (mut state, _) = run(&PlaybackState::default(), &[Input::Play], &clips);

        let step = transition(&state, ended(&state), &clips);
        state = step.state;
        assert_eq!(state.cursor, 1);
        assert_eq!(state.mode, PlaybackMode::SequencePlaying);
        assert!(step.effects.contains(&Effect::ActiveLine(Some(1))));

        let step = transition(&state, ended(&state), &clips);
        assert_eq!(step.state.mode, PlaybackMode::Stopped);
        assert_eq!(step.state.cursor, 0);
        assert!(step.effects.contains(&Effect::CancelTicker));
    }

    #[test]
    fn test_stale_clip_end_ignored() {
        let clips = Clips::all(3);
        let (first, _) = run(&PlaybackState::default(), &[Input::Play], &clips);
        let old_ticket = first.bound.unwrap().ticket();

        let (rebound, _) = run(&first, &[Input::Stop, Input::PlaySinglePhrase(0)], &clips);
        let step = transition(&rebound, Input::ClipEnded(old_ticket), &clips);
        assert_eq!(step.state, rebound);
        assert!(step.effects.is_empty());
    }

    #[test]
    fn test_single_phrase_finishes_without_advance() {
        let clips = Clips::all(3);
        let (state, _) = run(&PlaybackState::default(), &[Input::PlaySinglePhrase(1)], &clips);
        assert_eq!(state.mode, PlaybackMode::SinglePhrasePlaying);

        let step = transition(&state, ended(&state), &clips);
        assert_eq!(step.state.mode, PlaybackMode::SinglePhraseFinished);
        assert_eq!(step.state.cursor, 1);
        assert!(!step.effects.iter().any(|e| matches!(e, Effect::Play(_))));
    }

    #[test]
    fn test_play_after_single_phrase_starts_at_next_line() {
        let clips = Clips::all(3);
        let (state, _) = run(&PlaybackState::default(), &[Input::PlaySinglePhrase(1)], &clips);
        let (finished, _) = run(&state, &[ended(&state)], &clips);

        let step = transition(&finished, Input::Play, &clips);
        assert_eq!(step.state.mode, PlaybackMode::SequencePlaying);
        assert_eq!(step.state.cursor, 2);
        assert_eq!(step.state.bound.unwrap().index, 2);
    }

    #[test]
    fn test_play_after_last_single_phrase_wraps() {
        let clips = Clips::all(3);
        let (state, _) = run(&PlaybackState::default(), &[Input::PlaySinglePhrase(2)], &clips);
        let (finished, _) = run(&state, &[ended(&state)], &clips);
        let step = transition(&finished, Input::Play, &clips);
        assert_eq!(step.state.cursor, 0);
    }

    #[test]
    fn test_single_phrase_out_of_range() {
        let clips = Clips::all(3);
        let step = transition(&PlaybackState::default(), Input::PlaySinglePhrase(3), &clips);
        assert_eq!(step.state, PlaybackState::default());
        assert_eq!(step.effects, vec![Effect::Warning(PlayerError::OutOfRange { index: 3, count: 3 })]);
    }

    #[test]
    fn test_unplayable_clips_skipped_in_sequence() {
        let clips = Clips { playable: vec![true, false, false, true] };
        let (state, _) = run(&PlaybackState::default(), &[Input::Play], &clips);
        let step = transition(&state, ended(&state), &clips);

        assert_eq!(step.state.cursor, 3);
        assert_eq!(step.state.bound.unwrap().index, 3);
        let warnings = step.effects.iter().filter(|e| matches!(e, Effect::Warning(_))).count();
        assert_eq!(warnings, 2);
    }

    #[test]
    fn test_unplayable_single_phrase_keeps_mode() {
        let clips = Clips { playable: vec![true, false] };
        let step = transition(&PlaybackState::default(), Input::PlaySinglePhrase(1), &clips);
        assert_eq!(step.state.mode, PlaybackMode::SinglePhrasePlaying);
        assert_eq!(step.state.bound, None);
        assert_eq!(step.state.highlighted, Some(1));
        assert!(!step.effects.iter().any(|e| matches!(e, Effect::Play(_))));
        assert!(step
            .effects
            .iter()
            .any(|e| matches!(e, Effect::Warning(PlayerError::PlaybackRejected { index: 1, .. }))));
    }

    #[test]
    fn test_rejection_after_pause_ignored() {
        let clips = Clips::all(3);
        let (playing, _) = run(&PlaybackState::default(), &[Input::Play], &clips);
        let ticket = playing.bound.unwrap().ticket();
        let (paused, _) = run(&playing, &[Input::Pause], &clips);

        let step = transition(
            &paused,
            Input::PlayRejected { ticket, message: "AbortError".to_string() },
            &clips,
        );
        assert_eq!(step.state, paused);
        assert!(step.effects.is_empty());
    }

    #[test]
    fn test_late_start_acknowledgment_repauses() {
        let clips = Clips::all(3);
        let (playing, _) = run(&PlaybackState::default(), &[Input::Play], &clips);
        let ticket = playing.bound.unwrap().ticket();
        let (paused, _) = run(&playing, &[Input::Pause], &clips);

        let step = transition(&paused, Input::PlayStarted(ticket), &clips);
        assert_eq!(step.effects, vec![Effect::Pause(0)]);
        assert_eq!(step.state.mode, PlaybackMode::SequencePaused);
    }

    #[test]
    fn test_start_acknowledgment_for_superseded_clip_silences_it() {
        let clips = Clips::all(3);
        let (playing, _) = run(&PlaybackState::default(), &[Input::Play], &clips);
        let ticket = playing.bound.unwrap().ticket();
        let (moved, _) = run(&playing, &[Input::Reposition(2)], &clips);

        let step = transition(&moved, Input::PlayStarted(ticket), &clips);
        assert_eq!(step.effects, vec![Effect::Silence(0)]);
    }

    #[test]
    fn test_reposition_while_playing_restarts_target() {
        let clips = Clips::all(3);
        let (playing, _) = run(&PlaybackState::default(), &[Input::Play], &clips);
        let step = transition(&playing, Input::Reposition(2), &clips);

        assert_eq!(step.effects[0], Effect::Silence(0));
        let binding = step.state.bound.unwrap();
        assert_eq!(binding.index, 2);
        assert!(step.effects.contains(&Effect::Bind(binding.ticket())));
        assert!(step.effects.contains(&Effect::ResetProgress));
        assert!(!step.effects.contains(&Effect::StartTicker));
    }

    #[test]
    fn test_reposition_while_stopped_only_moves_cursor() {
        let clips = Clips::all(3);
        let step = transition(&PlaybackState::default(), Input::Reposition(1), &clips);
        assert_eq!(step.state.mode, PlaybackMode::Stopped);
        assert_eq!(step.state.cursor, 1);
        assert_eq!(step.state.highlighted, Some(1));
        assert!(!step.effects.iter().any(|e| matches!(e, Effect::Play(_))));

        let step = transition(&step.state, Input::Play, &clips);
        assert_eq!(step.state.bound.unwrap().index, 1);
    }

    #[test]
    fn test_reposition_while_paused_drops_binding() {
        let clips = Clips::all(3);
        let (paused, _) = run(&PlaybackState::default(), &[Input::Play, Input::Pause], &clips);
        let step = transition(&paused, Input::Reposition(2), &clips);
        assert_eq!(step.state.mode, PlaybackMode::SequencePaused);
        assert_eq!(step.state.bound, None);
        assert_eq!(step.effects[0], Effect::Silence(0));

        let step = transition(&step.state, Input::Play, &clips);
        assert_eq!(step.state.bound.unwrap().index, 2);
    }

    #[test]
    fn test_reposition_to_end_stops() {
        let clips = Clips::all(3);
        let (playing, _) = run(&PlaybackState::default(), &[Input::Play], &clips);
        let step = transition(&playing, Input::Reposition(3), &clips);
        assert_eq!(step.state.mode, PlaybackMode::Stopped);
    }

    #[test]
    fn test_play_during_single_phrase_promotes() {
        let clips = Clips::all(3);
        let (single, _) = run(&PlaybackState::default(), &[Input::PlaySinglePhrase(0)], &clips);
        let step = transition(&single, Input::Play, &clips);
        assert_eq!(step.state.mode, PlaybackMode::SequencePlaying);
        assert_eq!(step.state.bound, single.bound);
        assert_eq!(step.effects, vec![Effect::ModeChanged(PlaybackMode::SequencePlaying)]);

        let step = transition(&step.state, ended(&step.state), &clips);
        assert_eq!(step.state.cursor, 1);
    }

    #[test]
    fn test_play_after_rejected_single_phrase_requests_it_again() {
        let clips = Clips::all(3);
        let (single, _) = run(&PlaybackState::default(), &[Input::PlaySinglePhrase(1)], &clips);
        let ticket = single.bound.unwrap().ticket();
        let (rejected, _) = run(
            &single,
            &[Input::PlayRejected { ticket, message: "NotAllowedError".to_string() }],
            &clips,
        );
        assert_eq!(rejected.mode, PlaybackMode::SinglePhrasePlaying);
        assert_eq!(rejected.bound, None);

        let step = transition(&rejected, Input::Play, &clips);
        assert_eq!(step.state.mode, PlaybackMode::SequencePlaying);
        let binding = step.state.bound.unwrap();
        assert_eq!(binding.index, 1);
        assert!(binding.generation > ticket.generation);
        assert!(step.effects.contains(&Effect::Play(binding.ticket())));
    }

    #[test]
    fn test_play_after_unplayable_single_phrase_skips_ahead() {
        let clips = Clips { playable: vec![true, false, true] };
        let (single, _) = run(&PlaybackState::default(), &[Input::PlaySinglePhrase(1)], &clips);

        let step = transition(&single, Input::Play, &clips);
        assert_eq!(step.state.mode, PlaybackMode::SequencePlaying);
        let binding = step.state.bound.unwrap();
        assert_eq!(binding.index, 2);
        assert!(step.effects.contains(&Effect::Play(binding.ticket())));
        assert!(step
            .effects
            .iter()
            .any(|e| matches!(e, Effect::Warning(PlayerError::PlaybackRejected { index: 1, .. }))));
    }

    #[test]
    fn test_clip_end_while_paused_resumes_at_next_line() {
        let clips = Clips::all(3);
        let (playing, _) = run(&PlaybackState::default(), &[Input::Play], &clips);
        let ticket = playing.bound.unwrap().ticket();
        let (paused, _) = run(&playing, &[Input::Pause, Input::ClipEnded(ticket)], &clips);
        assert_eq!(paused.mode, PlaybackMode::SequencePaused);
        assert_eq!(paused.bound, None);
        assert_eq!(paused.cursor, 1);
        assert_eq!(paused.highlighted, Some(1));

        let step = transition(&paused, Input::Play, &clips);
        let binding = step.state.bound.unwrap();
        assert_eq!(binding.index, 1);
        assert_ne!(binding.ticket(), ticket);
        assert!(step.effects.contains(&Effect::Play(binding.ticket())));
    }

    #[test]
    fn test_last_clip_end_while_paused_stops() {
        let clips = Clips::all(2);
        let (last, _) = run(&PlaybackState::default(), &[Input::PlaySinglePhrase(1), Input::Play], &clips);
        let ticket = last.bound.unwrap().ticket();
        let step = transition(&last, Input::Pause, &clips);
        let step = transition(&step.state, Input::ClipEnded(ticket), &clips);
        assert_eq!(step.state.mode, PlaybackMode::Stopped);
        assert_eq!(step.state.cursor, 0);
        assert!(step.effects.contains(&Effect::ClearProgress));
    }

    #[test]
    fn test_commands_without_clips_warn() {
        let clips = Clips::all(0);
        for input in [Input::Play, Input::Pause, Input::PlaySinglePhrase(0), Input::Reposition(0)] {
            let step = transition(&PlaybackState::default(), input, &clips);
            assert_eq!(step.state, PlaybackState::default());
            assert!(matches!(step.effects.as_slice(), [Effect::Warning(PlayerError::ConfigurationMissing(_))]));
        }
    }

    #[test]
    fn test_generations_increase_per_bind() {
        let clips = Clips::all(3);
        let (a, _) = run(&PlaybackState::default(), &[Input::Play], &clips);
        let (b, _) = run(&a, &[ended(&a)], &clips);
        assert!(b.bound.unwrap().generation > a.bound.unwrap().generation);
    }
}
