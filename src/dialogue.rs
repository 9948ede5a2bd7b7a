//! # Dialogue Types
//!
//! ```text
//! Dialogue
//!   ├── title: Option<String>
//!   └── Vec<DialogueLine>
//!         ├── speaker: String
//!         ├── text: String
//!         └── translations: HashMap<language code, String>
//! ```
//!
//! Lines are created by the script parser and never mutated afterwards. The
//! position of a line in `lines` is its index everywhere else: clip index,
//! highlighted line, seek target.

use std::collections::HashMap;

use serde::Serialize;

/// One utterance of a dialogue
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueLine {
    pub speaker: String,
    pub text: String,
    pub translations: HashMap<String, String>,
}

impl DialogueLine {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
            translations: HashMap::new(),
        }
    }

    pub fn with_translation(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.translations.insert(language.into(), text.into());
        self
    }

    /// Translation shown in the overlay for `language`, if the script has one
    pub fn translation(&self, language: &str) -> Option<&str> {
        self.translations.get(language).map(String::as_str)
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialogue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub lines: Vec<DialogueLine>,
}

impl Dialogue {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Overlay text for every line, index-aligned with `lines`
    pub fn translations_for(&self, language: &str) -> Vec<Option<&str>> {
        self.lines.iter().map(|line| line.translation(language)).collect()
    }

    /// Languages that have a translation on at least one line, sorted
    pub fn translation_languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self
            .lines
            .iter()
            .flat_map(|line| line.translations.keys().map(String::as_str))
            .collect();
        languages.sort_unstable();
        languages.dedup();
        languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_lookup() {
        let line = DialogueLine::new("Anna", "Good morning!").with_translation("pt", "Bom dia!");
        assert_eq!(line.translation("pt"), Some("Bom dia!"));
        assert_eq!(line.translation("es"), None);
        assert_eq!(line.word_count(), 2);
    }

    #[test]
    fn test_translations_for_is_index_aligned() {
        let dialogue = Dialogue {
            title: None,
            lines: vec![
                DialogueLine::new("A", "Hello").with_translation("es", "Hola"),
                DialogueLine::new("B", "Bye"),
            ],
        };
        assert_eq!(dialogue.translations_for("es"), vec![Some("Hola"), None]);
        assert_eq!(dialogue.translation_languages(), vec!["es"]);
    }
}
