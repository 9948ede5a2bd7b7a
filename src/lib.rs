pub mod config;
pub mod dialogue;
pub mod error;
pub mod locale;
pub mod playback;
pub mod script;

pub use config::PlayerConfig;
pub use dialogue::{Dialogue, DialogueLine};
pub use error::*;
pub use locale::{default_languages, detect_language, Language, UiTranslations, FALLBACK_LANGUAGE};
pub use playback::{DialoguePlayer, PlaybackMode, PlayerEvent};
pub use script::{parse_script, parse_script_with_format};

use config::ScriptFormat;

/// Parse a dialogue compiled into the binary.
/// Unknown ids fail with [`PlayerError::UnknownDialogue`].
pub fn embedded_dialogue(id: &str, format: &ScriptFormat) -> Result<Dialogue, PlayerError> {
    let script = dialogue_scripts::get_dialogue(id).ok_or_else(|| PlayerError::UnknownDialogue(id.to_string()))?;
    parse_script_with_format(&script.content, format)
}

/// Ids of the dialogues compiled into the binary
pub fn embedded_dialogue_ids() -> Vec<&'static str> {
    dialogue_scripts::list_dialogues()
}
