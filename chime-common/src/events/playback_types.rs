//! Playback-related type definitions
//!
//! Supporting types for player and reminder slot state.

use serde::{Deserialize, Serialize};

/// Shared mini-player state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// A clip is audible
    Playing,
    /// A clip is loaded but paused by the user
    Paused,
    /// No active session
    #[default]
    Stopped,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Reminder slot lifecycle state
///
/// A slot stays `Running` between expiry and the restart that follows its
/// notification clip, so edits remain blocked for the whole cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    #[default]
    Idle,
    Running,
}

impl std::fmt::Display for SlotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotState::Idle => write!(f, "idle"),
            SlotState::Running => write!(f, "running"),
        }
    }
}

/// Why a playback session ended
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Clip played to the end
    Completed,
    /// Device reported an error mid-playback or rejected the start
    Failed,
    /// Owner slot was stopped or removed
    Cancelled,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndReason::Completed => write!(f, "completed"),
            EndReason::Failed => write!(f, "failed"),
            EndReason::Cancelled => write!(f, "cancelled"),
        }
    }
}
