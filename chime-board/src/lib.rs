//! # Chimeboard Reminder Board Library (chime-board)
//!
//! Coordination core for a multi-timer reminder board.
//!
//! **Purpose:** Run any number of independent countdowns, play a random clip
//! from each reminder's sound category when it elapses, serialize those
//! clips through one shared audio output, and restart each countdown once
//! its clip has finished.
//!
//! **Architecture:** A single-threaded [`Board`] context owns the reminder
//! collection, the timer engine, the playback queue and the mini player, and
//! is driven by a virtual clock. Audio goes through the [`AudioDevice`]
//! trait: `RodioDevice` for real output, `VirtualDevice` for tests and
//! headless runs.

pub mod audio;
pub mod board;
pub mod commands;
pub mod config;
pub mod error;
pub mod library;
pub mod playback;
pub mod reminders;
pub mod timers;

pub use audio::AudioDevice;
pub use board::{Board, BoardSettings};
pub use error::{Error, Result};
