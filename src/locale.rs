//! # Locale
//!
//! UI text substitution and language selection.
//!
//! - [`Language`] / [`default_languages`] - the languages the UI can switch to
//! - [`UiTranslations`] - `language -> key -> text` table with a fallback chain
//! - [`detect_language`] - pick a UI language from the user's preferred tags
//!
//! ## Fallback Chain
//! `text(lang, key)` looks in `lang`, then in the table's default language,
//! and finally returns the key itself so the UI never shows an empty label.
//!
//! ## Example
//! ```rust
//! use dialogue_player::locale::UiTranslations;
//!
//! let table = UiTranslations::from_yaml(r#"
//! en:
//!   play: Play
//!   loadMore: Load More Themes
//! pt:
//!   play: Tocar
//! "#).unwrap();
//!
//! assert_eq!(table.text("pt", "play"), "Tocar");
//! assert_eq!(table.text("pt", "loadMore"), "Load More Themes");
//! assert_eq!(table.text("pt", "stop"), "stop");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlayerError;

/// Language used when nothing else matches
pub const FALLBACK_LANGUAGE: &str = "pt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
    /// Flag asset name, e.g. `br` for `assets/images/flags/br.svg`
    pub flag: String,
}

impl Language {
    pub fn new(code: &str, name: &str, flag: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            flag: flag.to_string(),
        }
    }
}

/// Built-in language list, used when no language configuration is supplied
pub fn default_languages() -> Vec<Language> {
    vec![
        Language::new("en", "English", "us"),
        Language::new("es", "Español", "es"),
        Language::new("pt", "Português", "br"),
        Language::new("fr", "Français", "fr"),
        Language::new("de", "Deutsch", "de"),
        Language::new("it", "Italiano", "it"),
        Language::new("ja", "日本語", "jp"),
        Language::new("ko", "한국어", "kr"),
        Language::new("zh", "中文", "cn"),
        Language::new("ru", "Русский", "ru"),
        Language::new("hi", "हिन्दी", "in"),
    ]
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiTranslations {
    default_language: String,
    table: HashMap<String, HashMap<String, String>>,
}

impl UiTranslations {
    /// Load a `language -> key -> text` table. JSON input works too.
    pub fn from_yaml(source: &str) -> Result<Self, PlayerError> {
        let table: HashMap<String, HashMap<String, String>> =
            serde_yaml::from_str(source).map_err(|e| PlayerError::ConfigError(e.to_string()))?;
        Ok(Self {
            default_language: "en".to_string(),
            table,
        })
    }

    pub fn with_default_language(mut self, language: &str) -> Self {
        self.default_language = language.to_string();
        self
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.table.contains_key(language)
    }

    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.table.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Look up `key` in `language`, then in the default language
    pub fn lookup(&self, language: &str, key: &str) -> Option<&str> {
        [language, self.default_language.as_str()]
            .into_iter()
            .find_map(|lang| self.table.get(lang).and_then(|texts| texts.get(key)))
            .map(String::as_str)
    }

    /// Like [`lookup`](Self::lookup) but falls back to the key itself
    pub fn text<'a>(&'a self, language: &str, key: &'a str) -> &'a str {
        self.lookup(language, key).unwrap_or_else(|| {
            debug!(language, key, "missing UI translation");
            key
        })
    }

    /// Every key of the default language resolved for `language`
    pub fn resolve_all(&self, language: &str) -> HashMap<&str, &str> {
        self.table
            .get(&self.default_language)
            .into_iter()
            .flat_map(|texts| texts.keys())
            .chain(self.table.get(language).into_iter().flat_map(|texts| texts.keys()))
            .map(|key| (key.as_str(), self.text(language, key)))
            .collect()
    }
}

/// Pick a UI language.
///
/// `preferred` holds language tags in the user's order of preference
/// (`pt-BR`, `en-US`, `es`). The first tag whose primary subtag is available
/// wins; otherwise `fallback` is returned.
///
/// ```
/// # use dialogue_player::locale::detect_language;
/// let available = ["en", "es", "pt"];
/// assert_eq!(detect_language(&["fr-FR", "es-MX"], &available, "pt"), "es");
/// assert_eq!(detect_language(&["ja"], &available, "pt"), "pt");
/// ```
pub fn detect_language<'a, S: AsRef<str>>(preferred: &[S], available: &[&'a str], fallback: &'a str) -> &'a str {
    preferred
        .iter()
        .filter_map(|tag| primary_subtag(tag.as_ref()))
        .find_map(|code| available.iter().copied().find(|lang| lang.eq_ignore_ascii_case(&code)))
        .unwrap_or(fallback)
}

fn primary_subtag(tag: &str) -> Option<String> {
    let primary = tag.trim().split(['-', '_']).next()?;
    if primary.is_empty() {
        None
    } else {
        Some(primary.to_ascii_lowercase())
    }
}
