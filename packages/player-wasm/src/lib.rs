use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use dialogue_player::playback::{
    ClipTransport, DialoguePlayer, Generation, LoadAttempt, LoadEpoch, LoadRequest, PlayTicket, PlayerEvent,
    PlayerHost, TickerTicket,
};
use dialogue_player::{PlayerConfig, PlayerError};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// What JavaScript has to do with its audio elements and timer
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
enum HostCommand {
    #[serde(rename_all = "camelCase")]
    Load {
        index: usize,
        locator: String,
        epoch: u64,
        attempt: LoadAttempt,
    },
    Play { index: usize, generation: u64 },
    Pause { index: usize },
    Seek { index: usize, seconds: f64 },
    Volume { index: usize, volume: f32 },
    Release { index: usize },
    #[serde(rename_all = "camelCase")]
    StartTicker { ticket: u64, interval_ms: u64 },
    CancelTicker { ticket: u64 },
}

#[derive(Serialize)]
struct Batch {
    commands: Vec<HostCommand>,
    events: Vec<PlayerEvent>,
}

#[derive(Serialize)]
struct ErrorJson {
    message: String,
    line: Option<usize>,
    index: Option<usize>,
}

fn error_to_json(e: PlayerError) -> ErrorJson {
    let message = e.to_string();
    match e {
        PlayerError::ScriptError { line, .. } => ErrorJson {
            message,
            line: Some(line),
            index: None,
        },
        PlayerError::ResourceLoad { index, .. }
        | PlayerError::PlaybackRejected { index, .. }
        | PlayerError::OutOfRange { index, .. } => ErrorJson {
            message,
            line: None,
            index: Some(index),
        },
        PlayerError::ConfigurationMissing(_)
        | PlayerError::InvalidSeek(_)
        | PlayerError::ConfigError(_)
        | PlayerError::UnknownDialogue(_) => ErrorJson {
            message,
            line: None,
            index: None,
        },
    }
}

fn to_js_error(e: PlayerError) -> JsValue {
    match serde_json::to_string(&error_to_json(e)) {
        Ok(json) => JsValue::from_str(&json),
        Err(e) => JsValue::from_str(&e.to_string()),
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// Commands queued for JavaScript plus the positions it last reported
#[derive(Default)]
struct Bridge {
    commands: Vec<HostCommand>,
    positions: Vec<f64>,
}

impl Bridge {
    fn position(&self, index: usize) -> f64 {
        self.positions.get(index).copied().unwrap_or(0.0)
    }

    fn set_position(&mut self, index: usize, seconds: f64) {
        if self.positions.len() <= index {
            self.positions.resize(index + 1, 0.0);
        }
        self.positions[index] = seconds;
    }
}

struct JsTransport {
    index: usize,
    bridge: Rc<RefCell<Bridge>>,
}

impl ClipTransport for JsTransport {
    fn load(&mut self, request: &LoadRequest) {
        self.bridge.borrow_mut().commands.push(HostCommand::Load {
            index: request.index,
            locator: request.locator.clone(),
            epoch: request.epoch.0,
            attempt: request.attempt,
        });
    }

    fn play(&mut self, ticket: PlayTicket) {
        self.bridge.borrow_mut().commands.push(HostCommand::Play {
            index: ticket.index,
            generation: ticket.generation.0,
        });
    }

    fn pause(&mut self) {
        self.bridge.borrow_mut().commands.push(HostCommand::Pause { index: self.index });
    }

    fn set_position(&mut self, seconds: f64) {
        let mut bridge = self.bridge.borrow_mut();
        bridge.set_position(self.index, seconds);
        bridge.commands.push(HostCommand::Seek {
            index: self.index,
            seconds,
        });
    }

    fn position(&self) -> f64 {
        self.bridge.borrow().position(self.index)
    }

    fn set_volume(&mut self, volume: f32) {
        self.bridge.borrow_mut().commands.push(HostCommand::Volume {
            index: self.index,
            volume,
        });
    }

    fn release(&mut self) {
        self.bridge.borrow_mut().commands.push(HostCommand::Release { index: self.index });
    }
}

struct JsHost {
    bridge: Rc<RefCell<Bridge>>,
}

impl PlayerHost for JsHost {
    type Transport = JsTransport;

    fn open_clip(&mut self, index: usize) -> JsTransport {
        self.bridge.borrow_mut().set_position(index, 0.0);
        JsTransport {
            index,
            bridge: Rc::clone(&self.bridge),
        }
    }

    fn start_ticker(&mut self, ticket: TickerTicket, interval: Duration) {
        self.bridge.borrow_mut().commands.push(HostCommand::StartTicker {
            ticket: ticket.0,
            interval_ms: interval.as_millis() as u64,
        });
    }

    fn cancel_ticker(&mut self, ticket: TickerTicket) {
        self.bridge
            .borrow_mut()
            .commands
            .push(HostCommand::CancelTicker { ticket: ticket.0 });
    }
}

/// Dialogue player driven from JavaScript.
///
/// Every method returns `{ commands, events }`: the audio commands to carry
/// out and the events to render. JavaScript reports back through the
/// notification methods with the `epoch` / `generation` / `ticket` values it
/// received.
#[wasm_bindgen]
pub struct WasmPlayer {
    player: DialoguePlayer<JsHost>,
    bridge: Rc<RefCell<Bridge>>,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create a player from an optional YAML configuration
    #[wasm_bindgen(constructor)]
    pub fn new(config_yaml: Option<String>) -> Result<WasmPlayer, JsValue> {
        let config = match config_yaml {
            Some(source) => PlayerConfig::from_yaml(&source).map_err(to_js_error)?,
            None => PlayerConfig::default(),
        };
        let bridge = Rc::new(RefCell::new(Bridge::default()));
        let host = JsHost {
            bridge: Rc::clone(&bridge),
        };
        Ok(WasmPlayer {
            player: DialoguePlayer::new(config, host),
            bridge,
        })
    }

    /// Parse and load a dialogue script
    #[wasm_bindgen(js_name = loadScript)]
    pub fn load_script(&mut self, dialogue_id: &str, source: &str) -> Result<JsValue, JsValue> {
        self.player.load_script(dialogue_id, source).map_err(to_js_error)?;
        self.flush()
    }

    /// Load a dialogue bundled with the module
    #[wasm_bindgen(js_name = loadEmbedded)]
    pub fn load_embedded(&mut self, dialogue_id: &str) -> Result<JsValue, JsValue> {
        self.player.load_embedded(dialogue_id).map_err(to_js_error)?;
        self.flush()
    }

    /// The loaded dialogue as `{ title, lines: [{ speaker, text, translations }] }`
    pub fn transcript(&self) -> Result<JsValue, JsValue> {
        to_js(self.player.dialogue())
    }

    pub fn play(&mut self) -> Result<JsValue, JsValue> {
        self.player.play();
        self.flush()
    }

    pub fn pause(&mut self) -> Result<JsValue, JsValue> {
        self.player.pause();
        self.flush()
    }

    pub fn stop(&mut self) -> Result<JsValue, JsValue> {
        self.player.stop();
        self.flush()
    }

    #[wasm_bindgen(js_name = selectLine)]
    pub fn select_line(&mut self, index: usize) -> Result<JsValue, JsValue> {
        self.player.select_line(index);
        self.flush()
    }

    #[wasm_bindgen(js_name = seekToFraction)]
    pub fn seek_to_fraction(&mut self, fraction: f64) -> Result<JsValue, JsValue> {
        self.player.seek_to_fraction(fraction);
        self.flush()
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, volume: f32) -> Result<JsValue, JsValue> {
        self.player.set_volume(volume);
        self.flush()
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self) -> Result<JsValue, JsValue> {
        self.player.toggle_mute();
        self.flush()
    }

    #[wasm_bindgen(js_name = toggleTranslations)]
    pub fn toggle_translations(&mut self) -> Result<JsValue, JsValue> {
        self.player.toggle_translations();
        self.flush()
    }

    #[wasm_bindgen(js_name = showsTranslations)]
    pub fn shows_translations(&self) -> bool {
        self.player.shows_translations()
    }

    #[wasm_bindgen(js_name = clipLoaded)]
    pub fn clip_loaded(&mut self, epoch: u64, index: usize, seconds: f64) -> Result<JsValue, JsValue> {
        self.player.clip_loaded(LoadEpoch(epoch), index, seconds);
        self.flush()
    }

    #[wasm_bindgen(js_name = clipErrored)]
    pub fn clip_errored(&mut self, epoch: u64, index: usize, message: &str) -> Result<JsValue, JsValue> {
        self.player.clip_errored(LoadEpoch(epoch), index, message);
        self.flush()
    }

    #[wasm_bindgen(js_name = playStarted)]
    pub fn play_started(&mut self, index: usize, generation: u64) -> Result<JsValue, JsValue> {
        self.player.play_started(ticket(index, generation));
        self.flush()
    }

    #[wasm_bindgen(js_name = playRejected)]
    pub fn play_rejected(&mut self, index: usize, generation: u64, message: &str) -> Result<JsValue, JsValue> {
        self.player.play_rejected(ticket(index, generation), message);
        self.flush()
    }

    #[wasm_bindgen(js_name = clipEnded)]
    pub fn clip_ended(&mut self, index: usize, generation: u64) -> Result<JsValue, JsValue> {
        self.player.clip_ended(ticket(index, generation));
        self.flush()
    }

    /// Timer callback; `position` is the `currentTime` of clip `index`
    pub fn tick(&mut self, ticket: u64, index: usize, position: f64) -> Result<JsValue, JsValue> {
        self.bridge.borrow_mut().set_position(index, position);
        self.player.tick(TickerTicket(ticket));
        self.flush()
    }

    pub fn mode(&self) -> Result<JsValue, JsValue> {
        to_js(&self.player.mode())
    }

    #[wasm_bindgen(js_name = activeLine)]
    pub fn active_line(&self) -> Option<usize> {
        self.player.active_line()
    }

    fn flush(&mut self) -> Result<JsValue, JsValue> {
        let commands = std::mem::take(&mut self.bridge.borrow_mut().commands);
        let batch = Batch {
            commands,
            events: self.player.drain_events(),
        };
        to_js(&batch)
    }
}

fn ticket(index: usize, generation: u64) -> PlayTicket {
    PlayTicket {
        index,
        generation: Generation(generation),
    }
}

/// Parse a dialogue script to JSON
#[wasm_bindgen(js_name = parseScript)]
pub fn parse_script(source: &str) -> Result<String, JsValue> {
    dialogue_player::parse_script(source)
        .map_err(to_js_error)
        .and_then(|dialogue| serde_json::to_string(&dialogue).map_err(|e| JsValue::from_str(&e.to_string())))
}

/// Ids of the bundled dialogues as a JSON array
#[wasm_bindgen(js_name = listDialogues)]
pub fn list_dialogues() -> String {
    serde_json::to_string(&dialogue_scripts::list_dialogues()).unwrap_or_else(|_| "[]".to_string())
}

/// Raw script text of a bundled dialogue
#[wasm_bindgen(js_name = getDialogueScript)]
pub fn get_dialogue_script(id: &str) -> Option<String> {
    dialogue_scripts::get_dialogue(id).map(|script| script.content)
}

/// `m:ss` label for a number of seconds
#[wasm_bindgen(js_name = formatTime)]
pub fn format_time(seconds: f64) -> String {
    dialogue_player::playback::format_time(seconds)
}
