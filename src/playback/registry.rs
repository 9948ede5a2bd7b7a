//! Clip registry
//!
//! Owns the per-line clips of the loaded dialogue: their locators, load
//! status, estimated and measured durations, and their transports. The
//! registry keeps an immutable [`Timeline`] snapshot of the duration table
//! and swaps it wholesale on every duration change.

use tracing::{debug, info, warn};

use crate::config::{render_template, AudioSettings};
use crate::dialogue::DialogueLine;
use crate::error::PlayerError;

use super::timeline::Timeline;
use super::transport::{ClipTransport, PlayerHost};
use super::types::{LoadAttempt, LoadEpoch, LoadRequest};

#[derive(Debug, Clone, PartialEq)]
pub struct ClipSource {
    pub primary: String,
    pub fallback: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipStatus {
    Loading(LoadAttempt),
    Ready,
    /// Both locations failed; the estimate is used for the timeline from now on
    Unplayable,
}

#[derive(Debug)]
pub struct Clip<T> {
    pub index: usize,
    pub source: ClipSource,
    pub estimated: f64,
    pub measured: Option<f64>,
    pub status: ClipStatus,
    pub(crate) transport: T,
}

impl<T> Clip<T> {
    /// Duration used by the timeline: measured if known, else the estimate
    pub fn duration(&self) -> f64 {
        self.measured.unwrap_or(self.estimated)
    }

    pub fn is_playable(&self) -> bool {
        self.status != ClipStatus::Unplayable
    }
}

/// Result of a `clip_loaded` notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationUpdate {
    Ignored,
    /// Measured duration recorded; `previous` is the value it replaced
    Applied { index: usize, previous: f64, current: f64 },
}

/// Result of a `clip_errored` notification
#[derive(Debug, Clone, PartialEq)]
pub enum LoadFailure {
    Ignored,
    /// The fallback location is being tried
    Retrying { index: usize, locator: String },
    /// Both locations failed
    Unplayable(PlayerError),
}

/// Read-only view used by the transition function
pub trait ClipCatalog {
    fn clip_count(&self) -> usize;
    fn is_playable(&self, index: usize) -> bool;
}

#[derive(Debug)]
pub struct ClipRegistry<T> {
    dialogue_id: Option<String>,
    epoch: LoadEpoch,
    clips: Vec<Clip<T>>,
    timeline: Timeline,
}

impl<T> Default for ClipRegistry<T> {
    fn default() -> Self {
        Self {
            dialogue_id: None,
            epoch: LoadEpoch::default(),
            clips: Vec::new(),
            timeline: Timeline::default(),
        }
    }
}

impl<T: ClipTransport> ClipRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the clip set with one clip per line and start loading them all.
    ///
    /// Every transport of the previous set is paused, rewound and released
    /// before it is dropped. Returns the new load epoch.
    pub fn load<H>(&mut self, dialogue_id: &str, lines: &[DialogueLine], settings: &AudioSettings, host: &mut H) -> LoadEpoch
    where
        H: PlayerHost<Transport = T>,
    {
        self.discard();
        self.epoch = LoadEpoch(self.epoch.0.wrapping_add(1));
        self.dialogue_id = Some(dialogue_id.to_string());

        let fallback_estimate = settings.fallback_duration;
        self.clips = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let source = ClipSource {
                    primary: render_template(&settings.primary_path, &settings.language, dialogue_id, index),
                    fallback: settings
                        .fallback_path
                        .as_deref()
                        .map(|template| render_template(template, &settings.language, dialogue_id, index)),
                };
                let mut transport = host.open_clip(index);
                transport.set_volume(settings.volume);
                Clip {
                    index,
                    source,
                    estimated: fallback_estimate.estimate(&line.text),
                    measured: None,
                    status: ClipStatus::Loading(LoadAttempt::Primary),
                    transport,
                }
            })
            .collect();
        self.rebuild_timeline();

        for clip in &mut self.clips {
            let request = LoadRequest {
                epoch: self.epoch,
                index: clip.index,
                locator: clip.source.primary.clone(),
                attempt: LoadAttempt::Primary,
            };
            clip.transport.load(&request);
        }

        info!(
            dialogue = dialogue_id,
            clips = self.clips.len(),
            estimated_total = self.timeline.total(),
            "loading dialogue clips"
        );
        self.epoch
    }

    /// Silence and drop every clip
    pub fn discard(&mut self) {
        for clip in &mut self.clips {
            clip.transport.pause();
            clip.transport.set_position(0.0);
            clip.transport.release();
        }
        self.clips.clear();
        self.dialogue_id = None;
        self.rebuild_timeline();
    }

    /// Record a measured duration.
    ///
    /// Notifications from an earlier load, for unknown clips, or carrying a
    /// duration that isn't a positive number are ignored.
    pub fn clip_loaded(&mut self, epoch: LoadEpoch, index: usize, seconds: f64) -> DurationUpdate {
        if epoch != self.epoch {
            debug!(index, "ignoring load notification from a superseded dialogue");
            return DurationUpdate::Ignored;
        }
        let Some(clip) = self.clips.get_mut(index) else {
            warn!(index, "load notification for unknown clip");
            return DurationUpdate::Ignored;
        };
        if !(seconds.is_finite() && seconds > 0.0) {
            debug!(index, seconds, "ignoring unusable measured duration");
            return DurationUpdate::Ignored;
        }

        let previous = clip.duration();
        clip.measured = Some(seconds);
        clip.status = ClipStatus::Ready;
        debug!(index, previous, measured = seconds, "clip duration measured");
        self.rebuild_timeline();
        DurationUpdate::Applied { index, previous, current: seconds }
    }

    /// Handle a failed load: retry once at the fallback location, then give up.
    pub fn clip_errored(&mut self, epoch: LoadEpoch, index: usize, message: &str) -> LoadFailure {
        if epoch != self.epoch {
            return LoadFailure::Ignored;
        }
        let Some(clip) = self.clips.get_mut(index) else {
            warn!(index, "error notification for unknown clip");
            return LoadFailure::Ignored;
        };

        let status = clip.status;
        match status {
            ClipStatus::Loading(LoadAttempt::Primary) => {
                if let Some(fallback) = clip.source.fallback.clone() {
                    warn!(index, error = message, fallback = %fallback, "clip failed at primary path, retrying");
                    clip.status = ClipStatus::Loading(LoadAttempt::Fallback);
                    clip.transport.load(&LoadRequest {
                        epoch,
                        index,
                        locator: fallback.clone(),
                        attempt: LoadAttempt::Fallback,
                    });
                    return LoadFailure::Retrying { index, locator: fallback };
                }
                self.mark_unplayable(index, message)
            }
            ClipStatus::Loading(LoadAttempt::Fallback) => self.mark_unplayable(index, message),
            ClipStatus::Ready | ClipStatus::Unplayable => {
                debug!(index, error = message, "ignoring error for a settled clip");
                LoadFailure::Ignored
            }
        }
    }

    fn mark_unplayable(&mut self, index: usize, message: &str) -> LoadFailure {
        warn!(index, error = message, "clip is unplayable, using estimated duration");
        if let Some(clip) = self.clips.get_mut(index) {
            clip.status = ClipStatus::Unplayable;
            clip.measured = None;
        }
        self.rebuild_timeline();
        LoadFailure::Unplayable(PlayerError::ResourceLoad {
            index,
            message: message.to_string(),
        })
    }

    fn rebuild_timeline(&mut self) {
        self.timeline = Timeline::new(self.clips.iter().map(Clip::duration));
    }

    pub fn epoch(&self) -> LoadEpoch {
        self.epoch
    }

    pub fn dialogue_id(&self) -> Option<&str> {
        self.dialogue_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clip(&self, index: usize) -> Option<&Clip<T>> {
        self.clips.get(index)
    }

    pub fn clips(&self) -> &[Clip<T>] {
        &self.clips
    }

    pub fn duration_known(&self, index: usize) -> bool {
        self.clips.get(index).is_some_and(|clip| clip.measured.is_some())
    }

    /// Current snapshot of the duration table
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub(crate) fn transport_mut(&mut self, index: usize) -> Option<&mut T> {
        self.clips.get_mut(index).map(|clip| &mut clip.transport)
    }

    pub(crate) fn transport(&self, index: usize) -> Option<&T> {
        self.clips.get(index).map(|clip| &clip.transport)
    }

    pub(crate) fn transports_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.clips.iter_mut().map(|clip| &mut clip.transport)
    }
}

impl<T> ClipCatalog for ClipRegistry<T> {
    fn clip_count(&self) -> usize {
        self.clips.len()
    }

    fn is_playable(&self, index: usize) -> bool {
        self.clips.get(index).is_some_and(Clip::is_playable)
    }
}
