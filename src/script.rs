//! # Script Parser
//!
//! Parses the line-oriented dialogue script format into a [`Dialogue`].
//!
//! ## Format
//! Each non-blank line is trimmed and classified by its prefix:
//! - `Title:` sets the dialogue title
//! - `Speaker:` starts a new line of dialogue
//! - `Text:` sets the utterance text
//! - `PT:`, `ES:`, `EN:` (configurable) add a translation to the current line
//!
//! Prefixes are matched without regard to ASCII case. Anything else is
//! ignored, so scripts can carry `#` comments or notes.
//!
//! ## Example
//! ```rust
//! use dialogue_player::parse_script;
//!
//! let source = r#"
//! Title: At the Cafe
//! Speaker: Waiter
//! Text: What can I get you?
//! PT: O que posso te servir?
//! Speaker: Anna
//! Text: A coffee, please.
//! "#;
//!
//! let dialogue = parse_script(source).unwrap();
//! assert_eq!(dialogue.title.as_deref(), Some("At the Cafe"));
//! assert_eq!(dialogue.lines.len(), 2);
//! assert_eq!(dialogue.lines[0].translation("pt"), Some("O que posso te servir?"));
//! ```

use tracing::debug;

use crate::config::ScriptFormat;
use crate::dialogue::{Dialogue, DialogueLine};
use crate::error::PlayerError;

/// Parse a script with the default prefixes
pub fn parse_script(source: &str) -> Result<Dialogue, PlayerError> {
    parse_script_with_format(source, &ScriptFormat::default())
}

/// Parse a script with custom prefixes
pub fn parse_script_with_format(source: &str, format: &ScriptFormat) -> Result<Dialogue, PlayerError> {
    let mut dialogue = Dialogue::default();
    let mut current: Option<DialogueLine> = None;

    for (line_number, raw) in source.lines().enumerate().map(|(i, l)| (i + 1, l)) {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(title) = strip(line, &format.title_prefix) {
            dialogue.title = Some(title.to_string());
        } else if let Some(speaker) = strip(line, &format.speaker_prefix) {
            flush(&mut dialogue, current.take());
            current = Some(DialogueLine::new(speaker, ""));
        } else if let Some(text) = strip(line, &format.text_prefix) {
            let speaker = match current.take() {
                // A second Text: for the same speaker is a new utterance
                Some(filled) if !filled.text.is_empty() => {
                    let speaker = filled.speaker.clone();
                    flush(&mut dialogue, Some(filled));
                    speaker
                }
                Some(empty) => empty.speaker,
                None => String::new(),
            };
            current = Some(DialogueLine::new(speaker, text));
        } else if let Some((language, translation)) = match_translation(line, format) {
            match current.as_mut() {
                Some(entry) if !entry.text.is_empty() => {
                    entry.translations.insert(language.to_string(), translation.to_string());
                }
                _ => {
                    return Err(PlayerError::ScriptError {
                        line: line_number,
                        message: format!("Translation ({}) before any text line", language),
                    });
                }
            }
        } else {
            debug!(line = line_number, "ignoring unrecognized script line");
        }
    }

    flush(&mut dialogue, current);
    Ok(dialogue)
}

/// Prefixes match ignoring ASCII case, so `PT:` also accepts `pt:`
fn strip<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| line[prefix.len()..].trim())
}

fn match_translation<'a, 'f>(line: &'a str, format: &'f ScriptFormat) -> Option<(&'f str, &'a str)> {
    format
        .translation_prefixes
        .iter()
        .find_map(|(language, prefix)| strip(line, prefix).map(|text| (language.as_str(), text)))
}

/// Lines without text (a dangling `Speaker:`) are dropped
fn flush(dialogue: &mut Dialogue, line: Option<DialogueLine>) {
    if let Some(line) = line {
        if !line.text.is_empty() {
            dialogue.lines.push(line);
        }
    }
}
