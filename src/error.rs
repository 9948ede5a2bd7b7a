//! # Error Types
//!
//! This module defines all error types for the dialogue player.
//!
//! None of these errors is fatal to the host. Script and configuration errors
//! are returned from the loading functions; everything that happens during
//! playback is surfaced as a warning event and the player keeps going.
//!
//! ## Error Types
//! - `ResourceLoad` - A clip failed to load at both its primary and fallback path
//! - `PlaybackRejected` - The transport refused to play a clip
//! - `OutOfRange` - A seek or phrase selection targeted a line that doesn't exist
//! - `ConfigurationMissing` - A playback command arrived with no clips loaded
//! - `InvalidSeek` - A seek fraction that isn't a number
//! - `ScriptError` - Malformed dialogue script, with a 1-based line number
//! - `ConfigError` - Invalid YAML configuration or path template
//! - `UnknownDialogue` - Dialogue id missing from the embedded catalog
//!
//! ## Usage
//! ```rust
//! use dialogue_player::{parse_script, PlayerError};
//!
//! match parse_script("EN: orphan translation") {
//!     Ok(dialogue) => println!("{} lines", dialogue.lines.len()),
//!     Err(PlayerError::ScriptError { line, message }) => {
//!         eprintln!("Script error at line {}: {}", line, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// A clip could not be loaded from either of its locations.
    ///
    /// The clip stays in the registry so indices never shift; its estimated
    /// duration stands in for timeline math from then on.
    ///
    /// # Example
    /// ```
    /// # use dialogue_player::PlayerError;
    /// let err = PlayerError::ResourceLoad {
    ///     index: 2,
    ///     message: "404 Not Found".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Failed to load audio for line 2: 404 Not Found");
    /// ```
    #[error("Failed to load audio for line {index}: {message}")]
    ResourceLoad { index: usize, message: String },

    /// The transport refused to start a clip.
    #[error("Playback rejected for line {index}: {message}")]
    PlaybackRejected { index: usize, message: String },

    /// A seek or phrase selection pointed past the end of the dialogue.
    ///
    /// # Example
    /// ```
    /// # use dialogue_player::PlayerError;
    /// let err = PlayerError::OutOfRange { index: 7, count: 3 };
    /// assert_eq!(err.to_string(), "Line 7 is out of range (dialogue has 3 lines)");
    /// ```
    #[error("Line {index} is out of range (dialogue has {count} lines)")]
    OutOfRange { index: usize, count: usize },

    /// A playback command arrived while there was nothing to play.
    #[error("Nothing to play: {0}")]
    ConfigurationMissing(String),

    /// A seek fraction that can't be mapped onto the timeline (NaN or infinite).
    #[error("Invalid seek position: {0}")]
    InvalidSeek(f64),

    /// Malformed dialogue script.
    ///
    /// # Example
    /// ```
    /// # use dialogue_player::PlayerError;
    /// let err = PlayerError::ScriptError {
    ///     line: 4,
    ///     message: "Translation before any text line".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Script error at line 4: Translation before any text line");
    /// ```
    #[error("Script error at line {line}: {message}")]
    ScriptError { line: usize, message: String },

    /// Invalid player configuration.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Dialogue id not found in the embedded catalog.
    #[error("Unknown dialogue: {0}")]
    UnknownDialogue(String),
}
