//! # Player Configuration
//!
//! Settings shared by the script parser, the clip registry and the progress
//! reporter. Configuration is YAML with kebab-case keys; every section and
//! every key is optional.
//!
//! ## Example
//! ```rust
//! use dialogue_player::PlayerConfig;
//!
//! let config = PlayerConfig::from_yaml(r#"
//! audio:
//!   language: es
//!   fallback-duration:
//!     base-seconds: 1.5
//! progress:
//!   interval-ms: 250
//! "#).unwrap();
//!
//! assert_eq!(config.audio.language, "es");
//! assert_eq!(config.audio.fallback_duration.base_seconds, 1.5);
//! assert_eq!(config.audio.fallback_duration.seconds_per_word, 0.4);
//! assert_eq!(config.progress.interval_ms, 250);
//! ```
//!
//! ## Path Templates
//! Clip locators are rendered from templates with three placeholders:
//! `{language}`, `{dialogue}` and `{index}` (0-based line index).

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::PlayerError;

const PLACEHOLDERS: [&str; 3] = ["language", "dialogue", "index"];

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct PlayerConfig {
    pub script: ScriptFormat,
    pub audio: AudioSettings,
    pub progress: ProgressSettings,
    /// Show line translations under the transcript at startup
    pub show_translations: bool,
}

/// Line prefixes recognized by the script parser
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct ScriptFormat {
    pub title_prefix: String,
    pub speaker_prefix: String,
    pub text_prefix: String,
    /// language code -> prefix, e.g. `pt: "PT:"`
    pub translation_prefixes: BTreeMap<String, String>,
}

impl Default for ScriptFormat {
    fn default() -> Self {
        let translation_prefixes = [("en", "EN:"), ("es", "ES:"), ("pt", "PT:")]
            .into_iter()
            .map(|(code, prefix)| (code.to_string(), prefix.to_string()))
            .collect();

        Self {
            title_prefix: "Title:".to_string(),
            speaker_prefix: "Speaker:".to_string(),
            text_prefix: "Text:".to_string(),
            translation_prefixes,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct AudioSettings {
    /// Language of the recordings, substituted for `{language}`
    pub language: String,
    pub primary_path: String,
    pub fallback_path: Option<String>,
    pub fallback_duration: FallbackDuration,
    /// Initial volume in [0, 1]
    pub volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            primary_path: "languages/{language}/dialogues/{dialogue}/audios/line_{index}.mp3".to_string(),
            fallback_path: Some("languages/{language}/dialogues/{dialogue}/line_{index}.mp3".to_string()),
            fallback_duration: FallbackDuration::default(),
            volume: 1.0,
        }
    }
}

/// Word-count based duration estimate used until a clip reports its real length
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct FallbackDuration {
    pub base_seconds: f64,
    pub seconds_per_word: f64,
}

impl Default for FallbackDuration {
    fn default() -> Self {
        Self {
            base_seconds: 2.0,
            seconds_per_word: 0.4,
        }
    }
}

impl FallbackDuration {
    /// Estimate how long it takes to say `text`.
    ///
    /// ```
    /// # use dialogue_player::config::FallbackDuration;
    /// let estimate = FallbackDuration { base_seconds: 2.0, seconds_per_word: 0.5 };
    /// assert_eq!(estimate.estimate("Hi"), 2.0);
    /// assert_eq!(estimate.estimate("one two three four five six"), 3.0);
    /// ```
    pub fn estimate(&self, text: &str) -> f64 {
        let words = text.split_whitespace().count() as f64;
        self.base_seconds.max(words * self.seconds_per_word)
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct ProgressSettings {
    pub interval_ms: u64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self { interval_ms: 100 }
    }
}

impl ProgressSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl PlayerConfig {
    /// Parse and validate a YAML configuration document.
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(source: &str) -> Result<Self, PlayerError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: PlayerConfig =
            serde_yaml::from_str(source).map_err(|e| PlayerError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlayerError> {
        check_template(&self.audio.primary_path)?;
        if let Some(fallback) = &self.audio.fallback_path {
            check_template(fallback)?;
        }

        let estimate = &self.audio.fallback_duration;
        if !(estimate.base_seconds >= 0.0 && estimate.seconds_per_word >= 0.0) {
            return Err(PlayerError::ConfigError(
                "fallback-duration values must be non-negative numbers".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(PlayerError::ConfigError(format!(
                "volume must be between 0 and 1, got {}",
                self.audio.volume
            )));
        }
        if self.progress.interval_ms == 0 {
            return Err(PlayerError::ConfigError("progress interval-ms must be positive".to_string()));
        }
        for (field, prefix) in [
            ("title-prefix", &self.script.title_prefix),
            ("speaker-prefix", &self.script.speaker_prefix),
            ("text-prefix", &self.script.text_prefix),
        ] {
            if prefix.trim().is_empty() {
                return Err(PlayerError::ConfigError(format!("{} must not be empty", field)));
            }
        }
        Ok(())
    }
}

/// Render a clip locator from a path template.
///
/// ```
/// # use dialogue_player::config::render_template;
/// let path = render_template("audio/{language}/{dialogue}/line_{index}.mp3", "en", "at_the_cafe", 3);
/// assert_eq!(path, "audio/en/at_the_cafe/line_3.mp3");
/// ```
pub fn render_template(template: &str, language: &str, dialogue: &str, index: usize) -> String {
    template
        .replace("{language}", language)
        .replace("{dialogue}", dialogue)
        .replace("{index}", &index.to_string())
}

fn check_template(template: &str) -> Result<(), PlayerError> {
    if template.trim().is_empty() {
        return Err(PlayerError::ConfigError("path template must not be empty".to_string()));
    }

    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            PlayerError::ConfigError(format!("Unclosed placeholder in path template: {}", template))
        })?;
        let name = &after[..close];
        if !PLACEHOLDERS.contains(&name) {
            return Err(PlayerError::ConfigError(format!(
                "Unknown placeholder {{{}}} in path template: {}",
                name, template
            )));
        }
        rest = &after[close + 1..];
    }

    if !template.contains("{index}") {
        return Err(PlayerError::ConfigError(format!(
            "Path template must contain {{index}}: {}",
            template
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = PlayerConfig::from_yaml("").unwrap();
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(config.progress.interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_show_translations_flag() {
        assert!(!PlayerConfig::default().show_translations);
        let config = PlayerConfig::from_yaml("show-translations: true\n").unwrap();
        assert!(config.show_translations);
    }

    #[test]
    fn test_script_prefixes_override() {
        let config = PlayerConfig::from_yaml(
            r#"
script:
  speaker-prefix: "S:"
  translation-prefixes:
    fr: "FR:"
"#,
        )
        .unwrap();
        assert_eq!(config.script.speaker_prefix, "S:");
        assert_eq!(config.script.title_prefix, "Title:");
        assert_eq!(config.script.translation_prefixes.len(), 1);
        assert_eq!(config.script.translation_prefixes["fr"], "FR:");
    }

    #[test]
    fn test_unknown_placeholder_rejected() {
        let result = PlayerConfig::from_yaml(
            r#"
audio:
  primary-path: "clips/{speaker}/{index}.mp3"
"#,
        );
        assert!(matches!(result, Err(PlayerError::ConfigError(msg)) if msg.contains("{speaker}")));
    }

    #[test]
    fn test_template_requires_index() {
        let result = PlayerConfig::from_yaml(
            r#"
audio:
  fallback-path: "clips/{dialogue}.mp3"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_no_fallback_path() {
        let config = PlayerConfig::from_yaml(
            r#"
audio:
  fallback-path: null
"#,
        )
        .unwrap();
        assert_eq!(config.audio.fallback_path, None);
    }

    #[test]
    fn test_volume_out_of_range() {
        let result = PlayerConfig::from_yaml("audio:\n  volume: 1.5\n");
        assert!(matches!(result, Err(PlayerError::ConfigError(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = PlayerConfig::from_yaml("progress:\n  interval-ms: 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        let result = PlayerConfig::from_yaml("audio: [unclosed");
        assert!(matches!(result, Err(PlayerError::ConfigError(_))));
    }

    #[test]
    fn test_estimate_counts_words_not_spaces() {
        let estimate = FallbackDuration::default();
        assert_eq!(estimate.estimate("  Good   morning  "), 2.0);
        let long = "word ".repeat(10);
        assert!((estimate.estimate(&long) - 4.0).abs() < 1e-9);
    }
}
