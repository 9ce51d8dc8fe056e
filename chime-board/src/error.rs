//! Error types for chime-board
//!
//! Every failure is recovered locally: the board logs it, leaves state
//! untouched, and keeps the other reminders running.

use thiserror::Error;

/// Main error type for the reminder board
#[derive(Error, Debug)]
pub enum Error {
    /// Category has no clips, or a clip could not be loaded
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Audio device refused to start a clip (permissions, decoding)
    #[error("Playback start failed: {0}")]
    PlaybackStart(String),

    /// Slot index outside the current collection bounds
    #[error("Invalid index {index} (reminders: {len})")]
    InvalidIndex { index: usize, len: usize },

    /// Edit attempted while the reminder's timer is running
    #[error("Reminder {index} is running; stop the timer before editing")]
    ConcurrentEdit { index: usize },

    /// Category key not present in the sound library
    #[error("Unknown sound category: {0}")]
    UnknownCategory(String),

    /// Malformed command or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration file loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors from the shared library
    #[error(transparent)]
    Common(#[from] chime_common::Error),
}

/// Convenience Result type using the board Error
pub type Result<T> = std::result::Result<T, Error>;
