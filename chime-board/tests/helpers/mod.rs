//! Test helpers for chimeboard integration tests
//!
//! Provides reusable test infrastructure:
//! - Board construction on the simulated audio device with a fixed seed
//! - Event draining and clip/category lookups on the device history

#![allow(dead_code)]

use chime_board::audio::VirtualDevice;
use chime_board::library::{SoundCategory, SoundLibrary};
use chime_board::{Board, BoardSettings};
use chime_common::events::BoardEvent;
use std::time::Duration;
use tokio::sync::broadcast::{error::TryRecvError, Receiver};

/// Clip length used by the default test device
pub const CLIP_LENGTH: Duration = Duration::from_secs(3);

pub fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Board on the built-in library with 3 second clips
pub fn board() -> Board<VirtualDevice> {
    board_with_library(SoundLibrary::builtin())
}

pub fn board_with_library(library: SoundLibrary) -> Board<VirtualDevice> {
    Board::new(
        BoardSettings::default(),
        library,
        VirtualDevice::with_clip_length(CLIP_LENGTH),
    )
    .with_seed(7)
}

/// Built-in library plus a `silent` category without clips
pub fn library_with_silent_category() -> SoundLibrary {
    let mut library = SoundLibrary::builtin();
    library.insert(SoundCategory {
        key: "silent".to_string(),
        display_name: "Silent".to_string(),
        vinyl: "disque/silent.png".to_string(),
        clips: Vec::new(),
    });
    library
}

/// Add a reminder with an `m:ss` duration and category; returns its index
pub fn add_slot(
    board: &mut Board<VirtualDevice>,
    minutes: u32,
    seconds: u32,
    category: &str,
) -> usize {
    let (_, index) = board.add_reminder();
    board.set_duration(index, minutes, seconds).unwrap();
    board.set_category(index, category).unwrap();
    index
}

/// Category directory of every clip the device started, in order
pub fn started_categories(board: &Board<VirtualDevice>) -> Vec<String> {
    board
        .device()
        .started()
        .iter()
        .map(|s| {
            s.clip
                .as_str()
                .split('/')
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

/// Everything currently buffered on a receiver
pub fn drain(rx: &mut Receiver<BoardEvent>) -> Vec<BoardEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return events,
        }
    }
}

/// Event type names, skipping high-frequency ticks and progress
pub fn event_types(events: &[BoardEvent]) -> Vec<&'static str> {
    events
        .iter()
        .filter(|e| !e.is_high_frequency())
        .map(|e| e.event_type())
        .collect()
}

/// Step the clock in `step` increments, checking `check` after each one
pub fn step_until<F>(board: &mut Board<VirtualDevice>, until: Duration, step: Duration, mut check: F)
where
    F: FnMut(&Board<VirtualDevice>),
{
    while board.now() < until {
        let next = (board.now() + step).min(until);
        board.advance_to(next);
        check(&*board);
    }
}
