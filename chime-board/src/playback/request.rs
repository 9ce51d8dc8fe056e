//! Playback requests and completion messages

use crate::reminders::SlotId;
use std::fmt;

/// Identity of one playback request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request-{}", self.0)
    }
}

/// Message delivered when a request's session ends naturally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Restart the slot's countdown with its current configuration
    RestartTimer(SlotId),
}

/// A pending or active request to play one clip
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    pub id: RequestId,

    /// Slot that asked for playback; `None` for test sounds
    pub owner: Option<SlotId>,

    /// Display index of the owner when the request was made (logging only)
    pub origin_index: Option<usize>,

    /// Sound library category key
    pub category: String,

    /// Voice volume (0.0-1.0)
    pub volume: f32,

    /// Delivered on natural end or error, never on hard cancel
    pub on_completion: Option<Completion>,
}

impl PlaybackRequest {
    /// Request raised by an expired countdown; completion restarts it
    pub fn for_expiry(id: RequestId, slot: SlotId, index: usize, category: &str, volume: f32) -> Self {
        Self {
            id,
            owner: Some(slot),
            origin_index: Some(index),
            category: category.to_string(),
            volume,
            on_completion: Some(Completion::RestartTimer(slot)),
        }
    }

    /// Manual test play; unowned and without completion
    pub fn test_sound(id: RequestId, index: usize, category: &str, volume: f32) -> Self {
        Self {
            id,
            owner: None,
            origin_index: Some(index),
            category: category.to_string(),
            volume,
            on_completion: None,
        }
    }

    pub fn is_owned_by(&self, slot: SlotId) -> bool {
        self.owner == Some(slot)
    }
}
